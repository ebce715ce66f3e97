use sqlx::{Pool, Postgres};
use tracing::debug;

use crate::db::models::{AnimationRow, NewAnimation};

/// Repository for animation history database operations
pub struct AnimationRepository;

impl AnimationRepository {
    /// Insert a completed generation into the history table.
    ///
    /// Returns the stored row, or `None` when a record for the same
    /// `generation_id` already exists: re-polling a finished job must not
    /// create duplicates.
    pub async fn insert(
        pool: &Pool<Postgres>,
        animation: &NewAnimation<'_>,
    ) -> Result<Option<AnimationRow>, sqlx::Error> {
        debug!(
            "Inserting animation: generation_id={}, prompt_len={}",
            animation.generation_id,
            animation.prompt.len()
        );

        let row = sqlx::query_as::<_, AnimationRow>(
            r#"
            INSERT INTO animations (generation_id, prompt, video_url)
            VALUES ($1, $2, $3)
            ON CONFLICT (generation_id) DO NOTHING
            RETURNING id, generation_id, prompt, video_url, created_at
            "#,
        )
        .bind(animation.generation_id)
        .bind(animation.prompt)
        .bind(animation.video_url)
        .fetch_optional(pool)
        .await?;

        match &row {
            Some(row) => debug!("Animation recorded with id={}", row.id),
            None => debug!(
                "Animation for generation_id={} already recorded",
                animation.generation_id
            ),
        }

        Ok(row)
    }

    /// Fetch the full history, most recently created first. The id
    /// tie-break keeps repeated reads identical when rows share a
    /// timestamp.
    pub async fn list_all(pool: &Pool<Postgres>) -> Result<Vec<AnimationRow>, sqlx::Error> {
        sqlx::query_as::<_, AnimationRow>(
            r#"
            SELECT id, generation_id, prompt, video_url, created_at
            FROM animations
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(pool)
        .await
    }
}
