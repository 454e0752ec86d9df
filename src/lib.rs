//! Cardforge - trading card catalog and community events backend
//!
//! This is the library interface for Cardforge, exposing the router and the
//! auth building blocks for integration tests and embedding.

pub mod api;
pub mod auth;
pub mod cards;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod events;

pub use config::Config;
pub use error::Error;
