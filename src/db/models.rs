use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;

/// A persisted, immutable history entry for a completed generation
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AnimationRow {
    pub id: i32,
    pub generation_id: String,
    pub prompt: String,
    pub video_url: String,
    pub created_at: NaiveDateTime,
}

/// Fields supplied when recording a completed generation; `id` and
/// `created_at` are assigned by the store.
#[derive(Debug)]
pub struct NewAnimation<'a> {
    pub generation_id: &'a str,
    pub prompt: &'a str,
    pub video_url: &'a str,
}
