//! Structured station suggestion decoded from model output
//!
//! A suggestion is ephemeral: produced per job, translated into a persisted
//! station plus song links, then discarded.

use serde::{Deserialize, Serialize};

/// One suggested song with the model's stated reasoning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestedSong {
    pub title: String,
    pub artist: String,
    #[serde(default)]
    pub reasoning: String,
}

/// A complete station suggestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadioSuggestion {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub genre: String,
    pub songs: Vec<SuggestedSong>,
}

impl RadioSuggestion {
    /// A suggestion is usable when it has a name and at least one song,
    /// and every song carries both a title and an artist.
    pub fn is_valid(&self) -> bool {
        if self.name.trim().is_empty() || self.songs.is_empty() {
            return false;
        }
        self.songs
            .iter()
            .all(|s| !s.title.trim().is_empty() && !s.artist.trim().is_empty())
    }
}
