//! HTTP API for the generation service

mod generation;
mod health;

pub use generation::generation_routes;
pub use health::health_routes;
