//! Domain models for the generation service

pub mod generation_job;
pub mod suggestion;

pub use generation_job::{GenerationJob, JobStatus};
pub use suggestion::{RadioSuggestion, SuggestedSong};
