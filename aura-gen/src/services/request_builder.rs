//! Generation prompt rendering
//!
//! Pure functions from request + catalog sample to prompt text. Identical
//! inputs render identical prompts; all randomness lives on the model side.

use chrono::{DateTime, Datelike, Utc};

use crate::catalog::CatalogEntry;

/// Song count heuristic: one song per ~3.5 minutes of requested playtime
const MINUTES_PER_SONG: f64 = 3.5;

/// Duration assumed when the request doesn't state one
const DEFAULT_DURATION_MINUTES: u32 = 60;

/// A generation request: either the user's free-form text or structured
/// parameters from the themed-generation form.
#[derive(Debug, Clone)]
pub enum GenerationRequest {
    FreeForm(String),
    Structured(GenerationParams),
}

/// Structured generation parameters
#[derive(Debug, Clone, Default)]
pub struct GenerationParams {
    pub theme: Option<String>,
    pub mood: Option<String>,
    pub genres: Vec<String>,
    pub duration_minutes: Option<u32>,
    pub target_audience: Option<String>,
    pub special_instructions: Option<String>,
}

/// Number of songs to request for a given playtime
pub fn song_count_for_duration(duration_minutes: u32) -> usize {
    ((duration_minutes as f64 / MINUTES_PER_SONG).round() as usize).max(1)
}

/// Render the single prompt sent to the text-generation client.
///
/// The prompt instructs the model to pick only from the listed catalog
/// entries and to answer with one JSON object of a fixed shape.
pub fn build_prompt(request: &GenerationRequest, catalog: &[CatalogEntry]) -> String {
    let duration = match request {
        GenerationRequest::FreeForm(_) => DEFAULT_DURATION_MINUTES,
        GenerationRequest::Structured(params) => {
            params.duration_minutes.unwrap_or(DEFAULT_DURATION_MINUTES)
        }
    };
    let song_count = song_count_for_duration(duration);

    let mut prompt = String::new();
    prompt.push_str("You are a radio station curator. Create a radio station from the request below.\n\n");

    match request {
        GenerationRequest::FreeForm(text) => {
            prompt.push_str("Request: ");
            prompt.push_str(text);
            prompt.push('\n');
        }
        GenerationRequest::Structured(params) => {
            prompt.push_str("Request:\n");
            if let Some(theme) = &params.theme {
                prompt.push_str(&format!("- Theme: {}\n", theme));
            }
            if let Some(mood) = &params.mood {
                prompt.push_str(&format!("- Mood: {}\n", mood));
            }
            if !params.genres.is_empty() {
                prompt.push_str(&format!("- Genres: {}\n", params.genres.join(", ")));
            }
            prompt.push_str(&format!("- Duration: {} minutes\n", duration));
            if let Some(audience) = &params.target_audience {
                prompt.push_str(&format!("- Target audience: {}\n", audience));
            }
            if let Some(instructions) = &params.special_instructions {
                prompt.push_str(&format!("- Special instructions: {}\n", instructions));
            }
        }
    }

    prompt.push_str("\nAvailable songs (choose ONLY from this list):\n");
    for entry in catalog {
        prompt.push_str(&format!(
            "- \"{}\" by {} [{}]\n",
            entry.title, entry.artist, entry.genre
        ));
    }

    prompt.push_str(&format!(
        "\nSelect about {} songs. Respond with a single JSON object and nothing else, \
         in exactly this shape:\n\
         {{\"name\": \"station name\", \"description\": \"one sentence\", \
         \"genre\": \"primary genre\", \"songs\": [{{\"title\": \"...\", \
         \"artist\": \"...\", \"reasoning\": \"why this song fits\"}}]}}\n",
        song_count
    ));

    prompt
}

/// Synthesize the themed prompt used by weekly generation
pub fn weekly_prompt(theme: &str, now: DateTime<Utc>) -> String {
    let week = now.iso_week().week();
    let year = now.iso_week().year();
    format!(
        "Weekly discovery mix for week {} of {}: {}. \
         Mix familiar moods with a few unexpected picks across genres.",
        week, year, theme
    )
}
