//! Refresh-token session cookie

use axum::http::HeaderMap;

/// Cookie name the browser frontend knows about.
pub const REFRESH_COOKIE: &str = "refreshToken";

const REFRESH_COOKIE_MAX_AGE: i64 = 7 * 24 * 3600;

// The flag set must be byte-identical between set and clear; browsers
// silently refuse to clear a cookie whose attributes differ.
fn flags(secure: bool) -> &'static str {
    if secure {
        "; Path=/; HttpOnly; SameSite=Strict; Secure"
    } else {
        "; Path=/; HttpOnly; SameSite=Strict"
    }
}

/// Build the `Set-Cookie` value that installs the refresh token.
/// HTTP-only and SameSite=Strict always; Secure only in production so local
/// development over plain HTTP still works.
pub fn set_refresh_cookie(token: &str, secure: bool) -> String {
    format!(
        "{}={}; Max-Age={}{}",
        REFRESH_COOKIE,
        token,
        REFRESH_COOKIE_MAX_AGE,
        flags(secure)
    )
}

/// Build the `Set-Cookie` value that expires the refresh cookie immediately.
pub fn clear_refresh_cookie(secure: bool) -> String {
    format!("{}=; Max-Age=0{}", REFRESH_COOKIE, flags(secure))
}

/// Extract the refresh token from the request's `Cookie` header, if present.
pub fn refresh_token_from_headers(headers: &HeaderMap) -> Option<String> {
    let cookie_header = headers.get(axum::http::header::COOKIE)?;
    let cookie_str = cookie_header.to_str().ok()?;

    for cookie in cookie_str.split(';') {
        let token = cookie
            .trim()
            .strip_prefix(REFRESH_COOKIE)
            .and_then(|rest| rest.strip_prefix('='));
        if let Some(token) = token {
            if !token.is_empty() {
                return Some(token.to_string());
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::COOKIE;

    #[test]
    fn test_set_cookie_flags() {
        let value = set_refresh_cookie("tok123", false);
        assert!(value.starts_with("refreshToken=tok123"));
        assert!(value.contains("Max-Age=604800"));
        assert!(value.contains("HttpOnly"));
        assert!(value.contains("SameSite=Strict"));
        assert!(!value.contains("Secure"));
    }

    #[test]
    fn test_secure_flag_in_production() {
        let value = set_refresh_cookie("tok123", true);
        assert!(value.contains("; Secure"));
    }

    #[test]
    fn test_clear_cookie_matches_set_flags() {
        // Everything after Max-Age must be identical or browsers keep the cookie
        let set = set_refresh_cookie("tok", true);
        let clear = clear_refresh_cookie(true);

        let set_flags = set.split_once("; Path").unwrap().1;
        let clear_flags = clear.split_once("; Path").unwrap().1;
        assert_eq!(set_flags, clear_flags);
        assert!(clear.contains("Max-Age=0"));
    }

    #[test]
    fn test_extract_token_from_header() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, "theme=dark; refreshToken=abc.def.ghi".parse().unwrap());
        assert_eq!(
            refresh_token_from_headers(&headers),
            Some("abc.def.ghi".to_string())
        );
    }

    #[test]
    fn test_extract_token_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, "theme=dark".parse().unwrap());
        assert_eq!(refresh_token_from_headers(&headers), None);

        let empty = HeaderMap::new();
        assert_eq!(refresh_token_from_headers(&empty), None);
    }

    #[test]
    fn test_extract_empty_token_is_none() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, "refreshToken=".parse().unwrap());
        assert_eq!(refresh_token_from_headers(&headers), None);
    }
}
