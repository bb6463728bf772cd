use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::extraction::analyzer::ExtractedVacancy;

/// A persisted job posting, one per unique source message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPosting {
    pub id: Uuid,
    pub channel_id: Option<String>,
    pub message_id: Option<i64>,
    pub hash: Option<String>,
    pub is_vacancy: bool,
    pub title: String,
    pub company: String,
    pub grade: String,
    pub location: String,
    pub description: String,
    pub salary_min: i64,
    pub salary_max: i64,
    pub currency: String,
    pub skills: Vec<String>,
    pub is_remote: bool,
    pub url: Option<String>,
    pub original_text: String,
    pub raw: Option<Value>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

/// Everything needed to create a posting; identity and timestamps are assigned on insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewJobPosting {
    pub channel_id: Option<String>,
    pub message_id: Option<i64>,
    pub hash: Option<String>,
    pub fields: ExtractedVacancy,
    pub url: Option<String>,
    pub original_text: String,
    pub raw: Option<Value>,
}

impl JobPosting {
    pub fn from_new(id: Uuid, new: NewJobPosting, now: DateTime<Utc>) -> Self {
        let mut job = Self {
            id,
            channel_id: new.channel_id,
            message_id: new.message_id,
            hash: new.hash,
            is_vacancy: false,
            title: String::new(),
            company: String::new(),
            grade: String::new(),
            location: String::new(),
            description: String::new(),
            salary_min: 0,
            salary_max: 0,
            currency: String::new(),
            skills: Vec::new(),
            is_remote: false,
            url: new.url,
            original_text: new.original_text,
            raw: new.raw,
            created: now,
            updated: now,
        };
        job.apply(new.fields);
        job
    }

    /// Overwrites every extracted field, leaving identity and provenance alone.
    pub fn apply(&mut self, fields: ExtractedVacancy) {
        self.is_vacancy = fields.is_vacancy;
        self.title = fields.title;
        self.company = fields.company;
        self.grade = fields.grade;
        self.location = fields.location;
        self.description = fields.description;
        self.salary_min = fields.salary_min;
        self.salary_max = fields.salary_max;
        self.currency = fields.currency;
        self.skills = fields.skills;
        self.is_remote = fields.is_remote;
    }
}

#[derive(Debug, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub channel_id: Option<String>,
    pub message_id: Option<i64>,
    pub hash: Option<String>,
    pub is_vacancy: bool,
    pub title: String,
    pub company: String,
    pub grade: String,
    pub location: String,
    pub description: String,
    pub salary_min: i64,
    pub salary_max: i64,
    pub currency: String,
    pub skills: Json<Vec<String>>,
    pub is_remote: bool,
    pub url: Option<String>,
    pub original_text: String,
    pub raw: Option<Value>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl From<JobRow> for JobPosting {
    fn from(row: JobRow) -> Self {
        Self {
            id: row.id,
            channel_id: row.channel_id,
            message_id: row.message_id,
            hash: row.hash,
            is_vacancy: row.is_vacancy,
            title: row.title,
            company: row.company,
            grade: row.grade,
            location: row.location,
            description: row.description,
            salary_min: row.salary_min,
            salary_max: row.salary_max,
            currency: row.currency,
            skills: row.skills.0,
            is_remote: row.is_remote,
            url: row.url,
            original_text: row.original_text,
            raw: row.raw,
            created: row.created,
            updated: row.updated,
        }
    }
}
