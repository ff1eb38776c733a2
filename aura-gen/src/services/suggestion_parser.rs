//! Suggestion parsing with deterministic fallback
//!
//! Model output carries no shape guarantees: it may wrap the JSON in prose
//! or markdown fences, or return nothing usable at all. The parser pulls
//! out the first balanced JSON object and validates it; every failure path
//! lands on the fallback suggestion so the pipeline always has something to
//! persist. A mediocre station costs the user less than a dropped job.

use crate::catalog::CatalogEntry;
use crate::models::{RadioSuggestion, SuggestedSong};

/// Number of catalog entries used for the fallback station
pub const FALLBACK_SONG_COUNT: usize = 10;

const FALLBACK_NAME: &str = "AI Generated Radio";
const FALLBACK_DESCRIPTION: &str = "A personalized mix picked from your catalog";
const FALLBACK_GENRE: &str = "Mixed";
const FALLBACK_REASONING: &str = "Selected for your listening pleasure";

/// Extract and validate a suggestion from raw model output.
///
/// Returns None when no balanced JSON object can be located, decoding
/// fails, or the decoded object fails validation.
pub fn parse_suggestion(raw: &str) -> Option<RadioSuggestion> {
    let json = first_json_object(raw)?;
    let suggestion: RadioSuggestion = match serde_json::from_str(json) {
        Ok(s) => s,
        Err(e) => {
            tracing::debug!(error = %e, "Model output located but failed to decode");
            return None;
        }
    };

    if suggestion.is_valid() {
        Some(suggestion)
    } else {
        tracing::debug!("Decoded suggestion failed validation");
        None
    }
}

/// Build the deterministic fallback suggestion from the catalog sample
/// order: the first [`FALLBACK_SONG_COUNT`] entries (or all of them when
/// the sample is smaller).
pub fn fallback_suggestion(catalog: &[CatalogEntry]) -> RadioSuggestion {
    let songs = catalog
        .iter()
        .take(FALLBACK_SONG_COUNT)
        .map(|entry| SuggestedSong {
            title: entry.title.clone(),
            artist: entry.artist.clone(),
            reasoning: FALLBACK_REASONING.to_string(),
        })
        .collect();

    RadioSuggestion {
        name: FALLBACK_NAME.to_string(),
        description: FALLBACK_DESCRIPTION.to_string(),
        genre: FALLBACK_GENRE.to_string(),
        songs,
    }
}

/// Locate the first syntactically complete `{…}` substring.
///
/// Brace counting is string- and escape-aware so braces inside JSON string
/// values don't terminate the scan early.
fn first_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let bytes = raw.as_bytes();

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, &b) in bytes[start..].iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&raw[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}
