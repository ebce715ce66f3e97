use serde::Serialize;

use super::models::{GenerationJob, JobState};
use super::service::PollOutcome;
use crate::db::models::AnimationRow;

/// Response for a successful generation submit
#[derive(Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub generation_id: String,
    pub prompt: String,
    pub state: JobState,
    /// Always null at submit time; the asset appears via status polling
    pub video_url: Option<String>,
}

impl From<GenerationJob> for GenerateResponse {
    fn from(job: GenerationJob) -> Self {
        GenerateResponse {
            success: true,
            generation_id: job.generation_id,
            prompt: job.prompt,
            state: job.state,
            video_url: job.video_url,
        }
    }
}

/// Response for a status poll
#[derive(Serialize)]
pub struct StatusResponse {
    pub success: bool,
    pub state: JobState,
    pub video_url: Option<String>,
    pub failure_reason: Option<String>,
    /// Present only when the job completed but writing the history row
    /// failed; polling again retries the write
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history_error: Option<String>,
}

impl From<PollOutcome> for StatusResponse {
    fn from(outcome: PollOutcome) -> Self {
        StatusResponse {
            success: true,
            state: outcome.job.state,
            video_url: outcome.job.video_url,
            failure_reason: outcome.job.failure_reason,
            history_error: outcome.history_error,
        }
    }
}

/// Response for the generation history listing, newest first
#[derive(Serialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub animations: Vec<AnimationRow>,
}

impl HistoryResponse {
    pub fn new(animations: Vec<AnimationRow>) -> Self {
        HistoryResponse {
            success: true,
            animations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn completed_job() -> GenerationJob {
        GenerationJob {
            generation_id: "gen_1".to_string(),
            prompt: "a cat flying".to_string(),
            state: JobState::Completed,
            video_url: Some("https://cdn/x.mp4".to_string()),
            failure_reason: None,
        }
    }

    #[test]
    fn generate_response_matches_the_wire_contract() {
        let response = GenerateResponse::from(GenerationJob {
            generation_id: "gen_1".to_string(),
            prompt: "a cat flying".to_string(),
            state: JobState::Queued,
            video_url: None,
            failure_reason: None,
        });

        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "success": true,
                "generation_id": "gen_1",
                "prompt": "a cat flying",
                "state": "queued",
                "video_url": null,
            })
        );
    }

    #[test]
    fn status_response_omits_history_error_when_absent() {
        let outcome = PollOutcome {
            job: completed_job(),
            history_error: None,
        };

        assert_eq!(
            serde_json::to_value(StatusResponse::from(outcome)).unwrap(),
            json!({
                "success": true,
                "state": "completed",
                "video_url": "https://cdn/x.mp4",
                "failure_reason": null,
            })
        );
    }

    #[test]
    fn status_response_reports_a_failed_history_write() {
        let outcome = PollOutcome {
            job: completed_job(),
            history_error: Some("Failed to save generation to history".to_string()),
        };

        let value = serde_json::to_value(StatusResponse::from(outcome)).unwrap();
        assert_eq!(value["success"], json!(true));
        assert_eq!(
            value["history_error"],
            json!("Failed to save generation to history")
        );
    }

    #[test]
    fn failed_jobs_carry_their_reason() {
        let outcome = PollOutcome {
            job: GenerationJob {
                generation_id: "gen_2".to_string(),
                prompt: String::new(),
                state: JobState::Failed,
                video_url: None,
                failure_reason: Some("content policy".to_string()),
            },
            history_error: None,
        };

        assert_eq!(
            serde_json::to_value(StatusResponse::from(outcome)).unwrap(),
            json!({
                "success": true,
                "state": "failed",
                "video_url": null,
                "failure_reason": "content policy",
            })
        );
    }
}
