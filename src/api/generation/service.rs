use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use sqlx::{Pool, Postgres};
use std::fmt;
use tracing::{debug, error, info, warn};

use super::models::{GenerationJob, JobState};
use crate::api::validation::ErrorResponse;
use crate::db::animation_repository::AnimationRepository;
use crate::db::models::{AnimationRow, NewAnimation};
use crate::luma::{LumaClient, LumaError};

/// Service-level errors
#[derive(Debug)]
pub enum ServiceError {
    /// The caller supplied an unusable prompt
    InvalidInput(String),

    /// The generation service answered with a non-2xx status
    UpstreamRejected { status: u16, message: String },

    /// The generation service answered 2xx with an unusable body
    UpstreamProtocol(String),

    /// The generation service could not be reached at all
    UpstreamUnreachable(reqwest::Error),

    /// Database operation failed
    Persistence(sqlx::Error),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            ServiceError::UpstreamRejected { status, message } => write!(
                f,
                "Generation service rejected request ({}): {}",
                status, message
            ),
            ServiceError::UpstreamProtocol(msg) => {
                write!(f, "Invalid generation service response: {}", msg)
            }
            ServiceError::UpstreamUnreachable(e) => {
                write!(f, "Generation service unreachable: {}", e)
            }
            ServiceError::Persistence(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<LumaError> for ServiceError {
    fn from(err: LumaError) -> Self {
        match err {
            LumaError::EmptyPrompt => {
                ServiceError::InvalidInput("No prompt provided".to_string())
            }
            LumaError::Rejected { status, message } => {
                ServiceError::UpstreamRejected { status, message }
            }
            LumaError::Protocol(msg) => ServiceError::UpstreamProtocol(msg),
            LumaError::Transport(e) => ServiceError::UpstreamUnreachable(e),
        }
    }
}

impl ResponseError for ServiceError {
    fn error_response(&self) -> HttpResponse {
        match self {
            ServiceError::InvalidInput(msg) => {
                warn!("Invalid generation input: {}", msg);
                HttpResponse::BadRequest().json(ErrorResponse::new(msg.clone()))
            }
            ServiceError::UpstreamRejected { status, message } => {
                error!(
                    "Generation service rejected request: status={}, message={}",
                    status, message
                );
                // Propagate the upstream status code to the caller
                let code = StatusCode::from_u16(*status)
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                HttpResponse::build(code).json(ErrorResponse::new(format!(
                    "Generation service error: {}",
                    message
                )))
            }
            ServiceError::UpstreamProtocol(msg) => {
                error!("Invalid response from generation service: {}", msg);
                HttpResponse::InternalServerError()
                    .json(ErrorResponse::new(format!("Invalid API response: {}", msg)))
            }
            ServiceError::UpstreamUnreachable(e) => {
                error!("Generation service unreachable: {}", e);
                HttpResponse::InternalServerError().json(ErrorResponse::new(
                    "Generation service unreachable".to_string(),
                ))
            }
            ServiceError::Persistence(e) => {
                error!("Database error: {}", e);
                HttpResponse::InternalServerError()
                    .json(ErrorResponse::new("Database error occurred".to_string()))
            }
        }
    }
}

/// Outcome of one status poll.
///
/// A persistence failure rides along next to the fetched job instead of
/// masking it: the caller keeps the status and can poll again to reattempt
/// the write.
#[derive(Debug)]
pub struct PollOutcome {
    pub job: GenerationJob,
    /// Set when the job completed but recording it failed
    pub history_error: Option<String>,
}

/// Generation service coordinating the remote client and the history store
pub struct GenerationService {
    pool: Pool<Postgres>,
    luma: LumaClient,
}

impl GenerationService {
    /// Create a new GenerationService instance
    pub fn new(pool: Pool<Postgres>, luma: LumaClient) -> Self {
        Self { pool, luma }
    }

    /// Submit a prompt to the generation service.
    ///
    /// Nothing is persisted here: the job cannot be complete yet.
    pub async fn request_generation(&self, prompt: &str) -> Result<GenerationJob, ServiceError> {
        let job = self.luma.submit(prompt).await?;

        info!(
            "Service: Generation {} accepted in state {:?}",
            job.generation_id, job.state
        );

        Ok(job)
    }

    /// Fetch the current status of a generation, recording it in the
    /// history once it has completed with a playable asset.
    pub async fn poll_generation(&self, generation_id: &str) -> Result<PollOutcome, ServiceError> {
        let job = self.luma.fetch_status(generation_id).await?;

        info!("Service: Generation {} is {:?}", generation_id, job.state);

        let video_url = match completed_video_url(&job) {
            Some(url) => url.to_string(),
            None => {
                return Ok(PollOutcome {
                    job,
                    history_error: None,
                });
            }
        };

        let animation = NewAnimation {
            generation_id,
            prompt: &job.prompt,
            video_url: &video_url,
        };

        match AnimationRepository::insert(&self.pool, &animation).await {
            Ok(Some(row)) => {
                info!(
                    "Service: Recorded completed generation {} as animation id={}",
                    generation_id, row.id
                );
                Ok(PollOutcome {
                    job,
                    history_error: None,
                })
            }
            Ok(None) => {
                debug!(
                    "Service: Generation {} already in history, nothing to record",
                    generation_id
                );
                Ok(PollOutcome {
                    job,
                    history_error: None,
                })
            }
            Err(e) => {
                // The status fetch succeeded; report the failed write
                // alongside it rather than swallowing either.
                error!(
                    "Service: Failed to record completed generation {}: {:?}",
                    generation_id, e
                );
                Ok(PollOutcome {
                    job,
                    history_error: Some("Failed to save generation to history".to_string()),
                })
            }
        }
    }

    /// All recorded animations, newest first
    pub async fn list_history(&self) -> Result<Vec<AnimationRow>, ServiceError> {
        AnimationRepository::list_all(&self.pool)
            .await
            .map_err(ServiceError::Persistence)
    }
}

/// A job is recorded exactly when it is completed and actually carries an
/// asset; every other combination leaves the history untouched.
fn completed_video_url(job: &GenerationJob) -> Option<&str> {
    if job.state == JobState::Completed {
        job.video_url.as_deref()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(state: JobState, video_url: Option<&str>) -> GenerationJob {
        GenerationJob {
            generation_id: "gen_1".to_string(),
            prompt: "a cat flying".to_string(),
            state,
            video_url: video_url.map(str::to_string),
            failure_reason: None,
        }
    }

    #[test]
    fn records_only_completed_jobs_with_an_asset() {
        assert_eq!(
            completed_video_url(&job(JobState::Completed, Some("https://cdn/x.mp4"))),
            Some("https://cdn/x.mp4")
        );
        assert_eq!(completed_video_url(&job(JobState::Completed, None)), None);
        assert_eq!(
            completed_video_url(&job(JobState::Queued, Some("https://cdn/x.mp4"))),
            None
        );
        assert_eq!(completed_video_url(&job(JobState::Processing, None)), None);
        assert_eq!(completed_video_url(&job(JobState::Failed, None)), None);
        assert_eq!(
            completed_video_url(&job(JobState::Unknown, Some("https://cdn/x.mp4"))),
            None
        );
    }

    #[test]
    fn luma_errors_map_onto_the_service_taxonomy() {
        assert!(matches!(
            ServiceError::from(LumaError::EmptyPrompt),
            ServiceError::InvalidInput(_)
        ));
        assert!(matches!(
            ServiceError::from(LumaError::Rejected {
                status: 404,
                message: "not found".to_string()
            }),
            ServiceError::UpstreamRejected { status: 404, .. }
        ));
        assert!(matches!(
            ServiceError::from(LumaError::Protocol("empty response body".to_string())),
            ServiceError::UpstreamProtocol(_)
        ));
    }
}
