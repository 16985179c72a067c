//! SQLite-backed gateway operations.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

use emosense_models::AnalysisRecord;

use crate::error::DbResult;

/// Handle to the relational store.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Connect to `url`, creating the database file if missing, and run
    /// embedded migrations.
    pub async fn connect(url: &str) -> DbResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        // An in-memory database exists per connection; a larger pool would
        // hand out empty databases.
        let max_connections = if url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("Connected to database at {}", url);

        Ok(Self { pool })
    }

    /// Access the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Cheap connectivity check for readiness probes.
    pub async fn ping(&self) -> DbResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Resolve a stimulus name to its ID.
    pub async fn stimulus_id(&self, name: &str) -> DbResult<Option<i64>> {
        let id = sqlx::query_scalar::<_, i64>("SELECT id FROM stimuli WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(id)
    }

    /// Insert a stimulus (seeding/operations; the service itself only reads).
    pub async fn insert_stimulus(&self, name: &str) -> DbResult<i64> {
        let result = sqlx::query("INSERT INTO stimuli (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    /// Start an evaluation session; returns the generated evaluation ID.
    pub async fn insert_evaluation(&self, test_id: i64, student_id: i64) -> DbResult<i64> {
        let result = sqlx::query("INSERT INTO evaluations (test_id, student_id) VALUES (?, ?)")
            .bind(test_id)
            .bind(student_id)
            .execute(&self.pool)
            .await?;
        let id = result.last_insert_rowid();
        info!("Started evaluation {} (test {}, student {})", id, test_id, student_id);
        Ok(id)
    }

    /// Record a finished capture.
    pub async fn insert_recording(
        &self,
        evaluation_id: i64,
        stimulus_id: i64,
        video_path: &str,
    ) -> DbResult<i64> {
        let result = sqlx::query(
            "INSERT INTO recordings (evaluation_id, stimulus_id, video_path) VALUES (?, ?, ?)",
        )
        .bind(evaluation_id)
        .bind(stimulus_id)
        .bind(video_path)
        .execute(&self.pool)
        .await?;
        info!(
            "Recorded video {} for evaluation {} / stimulus {}",
            video_path, evaluation_id, stimulus_id
        );
        Ok(result.last_insert_rowid())
    }

    /// Resolve the most recent recording path for an evaluation/stimulus pair.
    pub async fn recording_path(
        &self,
        evaluation_id: i64,
        stimulus_id: i64,
    ) -> DbResult<Option<String>> {
        let path = sqlx::query_scalar::<_, String>(
            "SELECT video_path FROM recordings \
             WHERE evaluation_id = ? AND stimulus_id = ? \
             ORDER BY id DESC LIMIT 1",
        )
        .bind(evaluation_id)
        .bind(stimulus_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(path)
    }

    /// Persist a full analysis result; returns the generated row ID.
    pub async fn insert_analysis(&self, record: &AnalysisRecord) -> DbResult<i64> {
        let samples = serde_json::to_string(&record.samples)?;
        let result = sqlx::query(
            "INSERT INTO analysis_results \
             (evaluation_id, test_id, stimulus_id, predominant_emotion, samples, student_answer, video_path) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.evaluation_id)
        .bind(record.test_id)
        .bind(record.stimulus_id)
        .bind(record.predominant_emotion.as_str())
        .bind(samples)
        .bind(record.student_answer.as_deref())
        .bind(&record.video_path)
        .execute(&self.pool)
        .await?;
        info!("Stored analysis for evaluation {}", record.evaluation_id);
        Ok(result.last_insert_rowid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emosense_models::{EmotionLabel, EmotionSample};

    async fn test_db() -> Database {
        Database::connect("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_stimulus_lookup() {
        let db = test_db().await;
        assert_eq!(db.stimulus_id("dog photo").await.unwrap(), None);

        let id = db.insert_stimulus("dog photo").await.unwrap();
        assert_eq!(db.stimulus_id("dog photo").await.unwrap(), Some(id));
    }

    #[tokio::test]
    async fn test_evaluation_ids_are_generated() {
        let db = test_db().await;
        let first = db.insert_evaluation(1, 100).await.unwrap();
        let second = db.insert_evaluation(1, 101).await.unwrap();
        assert!(second > first);
    }

    #[tokio::test]
    async fn test_recording_path_round_trip() {
        let db = test_db().await;
        assert_eq!(db.recording_path(1, 2).await.unwrap(), None);

        db.insert_recording(1, 2, "recordings/a.mp4").await.unwrap();
        assert_eq!(
            db.recording_path(1, 2).await.unwrap().as_deref(),
            Some("recordings/a.mp4")
        );

        // A later recording for the same pair wins.
        db.insert_recording(1, 2, "recordings/b.mp4").await.unwrap();
        assert_eq!(
            db.recording_path(1, 2).await.unwrap().as_deref(),
            Some("recordings/b.mp4")
        );

        // Other pairs are unaffected.
        assert_eq!(db.recording_path(1, 3).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_insert_analysis_serializes_samples() {
        let db = test_db().await;
        let record = AnalysisRecord {
            evaluation_id: 1,
            test_id: 2,
            stimulus_id: 3,
            predominant_emotion: EmotionLabel::NoFace,
            samples: vec![
                EmotionSample::new(1, EmotionLabel::NoFace),
                EmotionSample::new(2, EmotionLabel::Happy),
            ],
            student_answer: Some("no idea".to_string()),
            video_path: "recordings/a.mp4".to_string(),
        };

        db.insert_analysis(&record).await.unwrap();

        let (emotion, samples): (String, String) = sqlx::query_as(
            "SELECT predominant_emotion, samples FROM analysis_results WHERE evaluation_id = 1",
        )
        .fetch_one(db.pool())
        .await
        .unwrap();

        assert_eq!(emotion, "No face detected");
        assert_eq!(samples, r#"[[1,"No face detected"],[2,"happy"]]"#);
    }
}
