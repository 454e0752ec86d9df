//! HTTP API server

pub mod auth;
pub mod cards;
pub mod events;
pub mod server;

pub use server::*;
