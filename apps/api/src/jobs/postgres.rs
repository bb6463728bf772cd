use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::jobs::store::{JobFilter, JobStore, StoreError};
use crate::models::job::{JobPosting, JobRow, NewJobPosting};

const UNIQUE_VIOLATION: &str = "23505";

const JOB_COLUMNS: &str = "id, channel_id, message_id, hash, is_vacancy, title, company, grade, \
    location, description, salary_min, salary_max, currency, skills, is_remote, url, \
    original_text, raw, created, updated";

/// `JobStore` over the Postgres `jobs` table. Uniqueness of dedup keys is
/// enforced by partial unique indexes (see migrations).
#[derive(Clone)]
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_write_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some(UNIQUE_VIOLATION) {
            let key = db.constraint().unwrap_or("unique key").to_string();
            return StoreError::Conflict(key);
        }
    }
    StoreError::Database(err)
}

/// `%needle%` for ILIKE, with the pattern metacharacters escaped.
fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn create(&self, job: NewJobPosting) -> Result<JobPosting, StoreError> {
        let id = Uuid::new_v4();
        let fields = &job.fields;
        let sql = format!(
            r#"
            INSERT INTO jobs
                (id, channel_id, message_id, hash, is_vacancy, title, company, grade,
                 location, description, salary_min, salary_max, currency, skills, is_remote,
                 url, original_text, raw)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING {JOB_COLUMNS}
            "#
        );

        let row: JobRow = sqlx::query_as(&sql)
            .bind(id)
            .bind(&job.channel_id)
            .bind(job.message_id)
            .bind(&job.hash)
            .bind(fields.is_vacancy)
            .bind(&fields.title)
            .bind(&fields.company)
            .bind(&fields.grade)
            .bind(&fields.location)
            .bind(&fields.description)
            .bind(fields.salary_min)
            .bind(fields.salary_max)
            .bind(&fields.currency)
            .bind(Json(&fields.skills))
            .bind(fields.is_remote)
            .bind(&job.url)
            .bind(&job.original_text)
            .bind(&job.raw)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)?;

        info!(job_id = %row.id, is_vacancy = row.is_vacancy, "job created");
        Ok(row.into())
    }

    async fn update(&self, job: &JobPosting) -> Result<JobPosting, StoreError> {
        let sql = format!(
            r#"
            UPDATE jobs SET
                channel_id = $2, message_id = $3, hash = $4, is_vacancy = $5, title = $6,
                company = $7, grade = $8, location = $9, description = $10, salary_min = $11,
                salary_max = $12, currency = $13, skills = $14, is_remote = $15, url = $16,
                original_text = $17, raw = $18, updated = NOW()
            WHERE id = $1
            RETURNING {JOB_COLUMNS}
            "#
        );

        let row: Option<JobRow> = sqlx::query_as(&sql)
            .bind(job.id)
            .bind(&job.channel_id)
            .bind(job.message_id)
            .bind(&job.hash)
            .bind(job.is_vacancy)
            .bind(&job.title)
            .bind(&job.company)
            .bind(&job.grade)
            .bind(&job.location)
            .bind(&job.description)
            .bind(job.salary_min)
            .bind(job.salary_max)
            .bind(&job.currency)
            .bind(Json(&job.skills))
            .bind(job.is_remote)
            .bind(&job.url)
            .bind(&job.original_text)
            .bind(&job.raw)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)?;

        row.map(JobPosting::from).ok_or(StoreError::NotFound(job.id))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<JobPosting>, StoreError> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1");
        let row: Option<JobRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn find_by_source(
        &self,
        channel_id: &str,
        message_id: i64,
    ) -> Result<Option<JobPosting>, StoreError> {
        let sql =
            format!("SELECT {JOB_COLUMNS} FROM jobs WHERE channel_id = $1 AND message_id = $2");
        let row: Option<JobRow> = sqlx::query_as(&sql)
            .bind(channel_id)
            .bind(message_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn find_by_hash(&self, hash: &str) -> Result<Option<JobPosting>, StoreError> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE hash = $1");
        let row: Option<JobRow> = sqlx::query_as(&sql)
            .bind(hash)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    async fn list(&self, filter: &JobFilter) -> Result<Vec<JobPosting>, StoreError> {
        let sql = format!(
            r#"
            SELECT {JOB_COLUMNS} FROM jobs
            WHERE ($1::text IS NULL OR title ILIKE $1 OR company ILIKE $1 OR description ILIKE $1)
              AND ($2::bool IS NULL OR is_remote = $2)
              AND ($3::text IS NULL OR grade ILIKE $3)
            ORDER BY created DESC
            LIMIT $4 OFFSET $5
            "#
        );

        let rows: Vec<JobRow> = sqlx::query_as(&sql)
            .bind(filter.search.as_deref().map(like_pattern))
            .bind(filter.remote)
            .bind(filter.grade.as_deref().map(like_pattern))
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
