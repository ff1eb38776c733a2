//! Shared foundation for AuraRadio services
//!
//! Error types, configuration resolution and database bootstrap used by the
//! generation service (and any future service crates).

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
