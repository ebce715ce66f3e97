use serde::{Deserialize, Serialize};
use validator::Validate;

/// Lifecycle state of a remote generation job.
///
/// The remote vocabulary is service-defined; anything unrecognized maps to
/// `Unknown` instead of failing the status check.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Queued,
    Processing,
    Completed,
    Failed,
    Unknown,
}

impl JobState {
    /// Map a remote state string onto the local vocabulary. Luma reports
    /// in-progress jobs as "dreaming".
    pub fn from_remote(state: &str) -> Self {
        match state {
            "queued" => JobState::Queued,
            "processing" | "dreaming" => JobState::Processing,
            "completed" => JobState::Completed,
            "failed" => JobState::Failed,
            _ => JobState::Unknown,
        }
    }

    /// Completed and failed jobs transition no further.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }
}

/// A remote video-generation request and its last observed status.
///
/// Held in memory only: re-fetched on every status check and never durable
/// beyond `generation_id` until it completes and lands in the history table.
#[derive(Debug, Clone)]
pub struct GenerationJob {
    pub generation_id: String,
    pub prompt: String,
    pub state: JobState,
    pub video_url: Option<String>,
    pub failure_reason: Option<String>,
}

/// Form body accepted by POST /generate
#[derive(Deserialize, Debug, Validate)]
pub struct GenerateForm {
    #[validate(length(
        min = 1,
        max = 500,
        message = "Prompt must be between 1 and 500 characters"
    ))]
    pub prompt: String,
}
