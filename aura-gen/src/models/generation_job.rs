//! Generation job state machine
//!
//! A job progresses through exactly one of two paths:
//! pending → processing → completed
//! pending → processing → failed
//!
//! Transitions are one-directional; `completed` and `failed` are absorbing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Generation job status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Created, waiting to be picked up
    Pending,
    /// Generation in flight
    Processing,
    /// Station created and linked
    Completed,
    /// Generation aborted with a recorded error
    Failed,
}

impl JobStatus {
    /// Whether a transition to `next` is allowed by the state machine
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Processing)
                | (JobStatus::Processing, JobStatus::Completed)
                | (JobStatus::Processing, JobStatus::Failed)
        )
    }

    /// Terminal states admit no further transitions
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Status as stored in the database
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    /// Parse a stored status string
    pub fn parse(s: &str) -> Option<JobStatus> {
        match s {
            "pending" => Some(JobStatus::Pending),
            "processing" => Some(JobStatus::Processing),
            "completed" => Some(JobStatus::Completed),
            "failed" => Some(JobStatus::Failed),
            _ => None,
        }
    }
}

/// Generation job record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationJob {
    /// Unique job identifier
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Original prompt text as submitted
    pub prompt: String,

    /// Current status
    pub status: JobStatus,

    /// Resulting station, set on completion
    pub radio_station_id: Option<Uuid>,

    /// Captured error, set on failure
    pub error_message: Option<String>,

    /// Open key-value bag; keys are not enumerated by this service
    pub metadata: Map<String, Value>,

    /// Creation time
    pub created_at: DateTime<Utc>,

    /// Last mutation time
    pub updated_at: DateTime<Utc>,
}

impl GenerationJob {
    /// Create a new pending job for `user_id` with the given prompt
    pub fn new(user_id: Uuid, prompt: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            prompt,
            status: JobStatus::Pending,
            radio_station_id: None,
            error_message: None,
            metadata: Map::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the job has reached a terminal state
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
