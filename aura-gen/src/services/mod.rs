//! Generation pipeline services

pub mod catalog_matcher;
pub mod orchestrator;
pub mod request_builder;
pub mod suggestion_parser;
pub mod text_client;

pub use orchestrator::GenerationOrchestrator;
pub use text_client::{CompletionClient, TextGenError, TextGeneration};
