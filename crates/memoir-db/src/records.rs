//! PostgreSQL implementation of [`RecordRepository`].

use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{Pool, Postgres, Row};
use tracing::{debug, warn};
use uuid::Uuid;

use memoir_core::{
    AutobiographyRecord, Customization, Error, PersonalInfo, RecordRepository, Result,
    TimelineEvent, WritingStyle,
};

const SELECT_COLUMNS: &str = "id, owner_id, personal_info, childhood_memories, education,
    career_achievements, family_relationships, challenges, dreams_future, timeline,
    title, style, generated_story, created_at, updated_at";

/// Record repository backed by the `autobiography` table.
#[derive(Clone)]
pub struct PgRecordRepository {
    pool: Pool<Postgres>,
}

impl PgRecordRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn fetch_many(&self, sql: &str, owner_id: Option<&str>) -> Result<Vec<AutobiographyRecord>> {
        let start = Instant::now();
        let mut query = sqlx::query(sql);
        if let Some(owner_id) = owner_id {
            query = query.bind(owner_id);
        }
        let rows = query.fetch_all(&self.pool).await.map_err(Error::Database)?;
        let records: Vec<AutobiographyRecord> = rows.into_iter().map(map_row_to_record).collect();

        debug!(
            subsystem = "db",
            component = "records",
            op = "list",
            result_count = records.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Listed records"
        );
        Ok(records)
    }
}

fn map_row_to_record(row: PgRow) -> AutobiographyRecord {
    let id: Uuid = row.get("id");
    let style_tag: String = row.get("style");
    let style = style_tag.parse::<WritingStyle>().unwrap_or_else(|_| {
        warn!(
            subsystem = "db",
            component = "records",
            record_id = %id,
            style = %style_tag,
            "Stored style not recognised, using default"
        );
        WritingStyle::default()
    });
    let personal_info: Json<PersonalInfo> = row.get("personal_info");
    let timeline: Json<Vec<TimelineEvent>> = row.get("timeline");
    let created_at: DateTime<Utc> = row.get("created_at");
    let updated_at: DateTime<Utc> = row.get("updated_at");

    AutobiographyRecord {
        id: Some(id),
        owner_id: row.get("owner_id"),
        personal_info: personal_info.0,
        childhood_memories: row.get("childhood_memories"),
        education: row.get("education"),
        career_achievements: row.get("career_achievements"),
        family_relationships: row.get("family_relationships"),
        challenges: row.get("challenges"),
        dreams_future: row.get("dreams_future"),
        timeline: timeline.0,
        customization: Customization {
            title: row.get("title"),
            style,
        },
        generated_story: row.get("generated_story"),
        created_at: Some(created_at),
        updated_at: Some(updated_at),
    }
}

#[async_trait]
impl RecordRepository for PgRecordRepository {
    async fn insert(&self, record: &AutobiographyRecord) -> Result<Uuid> {
        record.check_storable()?;
        let id = Uuid::now_v7();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO autobiography (id, owner_id, personal_info, childhood_memories, education,
                career_achievements, family_relationships, challenges, dreams_future, timeline,
                title, style, generated_story, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)",
        )
        .bind(id)
        .bind(&record.owner_id)
        .bind(Json(&record.personal_info))
        .bind(&record.childhood_memories)
        .bind(&record.education)
        .bind(&record.career_achievements)
        .bind(&record.family_relationships)
        .bind(&record.challenges)
        .bind(&record.dreams_future)
        .bind(Json(&record.timeline))
        .bind(&record.customization.title)
        .bind(record.customization.style.as_str())
        .bind(&record.generated_story)
        .bind(record.created_at.unwrap_or(now))
        .bind(record.updated_at.unwrap_or(now))
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "records",
            op = "insert",
            record_id = %id,
            owner_id = %record.owner_id,
            "Inserted record"
        );
        Ok(id)
    }

    async fn update(&self, id: Uuid, record: &AutobiographyRecord) -> Result<()> {
        record.check_storable()?;
        let result = sqlx::query(
            "UPDATE autobiography SET
                personal_info = $2, childhood_memories = $3, education = $4,
                career_achievements = $5, family_relationships = $6, challenges = $7,
                dreams_future = $8, timeline = $9, title = $10, style = $11,
                generated_story = $12, updated_at = $13
             WHERE id = $1",
        )
        .bind(id)
        .bind(Json(&record.personal_info))
        .bind(&record.childhood_memories)
        .bind(&record.education)
        .bind(&record.career_achievements)
        .bind(&record.family_relationships)
        .bind(&record.challenges)
        .bind(&record.dreams_future)
        .bind(Json(&record.timeline))
        .bind(&record.customization.title)
        .bind(record.customization.style.as_str())
        .bind(&record.generated_story)
        .bind(record.updated_at.unwrap_or_else(Utc::now))
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        if result.rows_affected() == 0 {
            return Err(Error::RecordNotFound(id));
        }
        Ok(())
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<AutobiographyRecord>> {
        let sql = format!("SELECT {} FROM autobiography WHERE id = $1", SELECT_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(row.map(map_row_to_record))
    }

    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<AutobiographyRecord>> {
        let sql = format!(
            "SELECT {} FROM autobiography WHERE owner_id = $1 ORDER BY created_at, id",
            SELECT_COLUMNS
        );
        self.fetch_many(&sql, Some(owner_id)).await
    }

    async fn list_all(&self) -> Result<Vec<AutobiographyRecord>> {
        let sql = format!(
            "SELECT {} FROM autobiography ORDER BY created_at, id",
            SELECT_COLUMNS
        );
        self.fetch_many(&sql, None).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM autobiography WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn exists(&self, id: Uuid) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM autobiography WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .map_err(Error::Database)?;
        Ok(exists)
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
