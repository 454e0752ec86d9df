//! Authentication and session handling

pub mod cookie;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use cookie::{clear_refresh_cookie, refresh_token_from_headers, set_refresh_cookie};
pub use jwt::{AccessClaims, RefreshClaims, TokenIssuer};
pub use middleware::{require_admin, require_auth};
