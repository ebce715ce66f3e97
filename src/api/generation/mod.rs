pub mod models;
pub mod dto;
pub mod handlers;
pub mod service;

// Re-export commonly used types
pub use models::{GenerationJob, JobState};
pub use service::GenerationService;
