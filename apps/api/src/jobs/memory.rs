//! In-memory `JobStore` for tests, with the same uniqueness rules as Postgres.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::jobs::store::{JobFilter, JobStore, StoreError};
use crate::models::job::{JobPosting, NewJobPosting};

#[derive(Default)]
pub struct MemoryJobStore {
    jobs: RwLock<Vec<JobPosting>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn insert(&self, job: JobPosting) {
        self.jobs.write().await.push(job);
    }
}

fn source_key(job: &JobPosting) -> Option<(&str, i64)> {
    match (job.channel_id.as_deref(), job.message_id) {
        (Some(c), Some(m)) if !c.is_empty() => Some((c, m)),
        _ => None,
    }
}

fn hash_key(job: &JobPosting) -> Option<&str> {
    job.hash.as_deref().filter(|h| !h.is_empty())
}

fn conflict(existing: &[JobPosting], candidate: &JobPosting) -> Option<String> {
    existing
        .iter()
        .filter(|j| j.id != candidate.id)
        .find_map(|j| {
            if source_key(candidate).is_some() && source_key(j) == source_key(candidate) {
                Some("jobs_source_key".to_string())
            } else if hash_key(candidate).is_some() && hash_key(j) == hash_key(candidate) {
                Some("jobs_hash_key".to_string())
            } else {
                None
            }
        })
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn create(&self, job: NewJobPosting) -> Result<JobPosting, StoreError> {
        let mut jobs = self.jobs.write().await;
        let job = JobPosting::from_new(Uuid::new_v4(), job, Utc::now());
        if let Some(key) = conflict(&jobs, &job) {
            return Err(StoreError::Conflict(key));
        }
        jobs.push(job.clone());
        Ok(job)
    }

    async fn update(&self, job: &JobPosting) -> Result<JobPosting, StoreError> {
        let mut jobs = self.jobs.write().await;
        if let Some(key) = conflict(&jobs, job) {
            return Err(StoreError::Conflict(key));
        }
        let slot = jobs
            .iter_mut()
            .find(|j| j.id == job.id)
            .ok_or(StoreError::NotFound(job.id))?;
        *slot = JobPosting {
            updated: Utc::now(),
            ..job.clone()
        };
        Ok(slot.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<JobPosting>, StoreError> {
        Ok(self.jobs.read().await.iter().find(|j| j.id == id).cloned())
    }

    async fn find_by_source(
        &self,
        channel_id: &str,
        message_id: i64,
    ) -> Result<Option<JobPosting>, StoreError> {
        Ok(self
            .jobs
            .read()
            .await
            .iter()
            .find(|j| source_key(j) == Some((channel_id, message_id)))
            .cloned())
    }

    async fn find_by_hash(&self, hash: &str) -> Result<Option<JobPosting>, StoreError> {
        Ok(self
            .jobs
            .read()
            .await
            .iter()
            .find(|j| hash_key(j) == Some(hash))
            .cloned())
    }

    async fn list(&self, filter: &JobFilter) -> Result<Vec<JobPosting>, StoreError> {
        let mut found: Vec<JobPosting> = self
            .jobs
            .read()
            .await
            .iter()
            .filter(|j| filter.matches(j))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created.cmp(&a.created));
        Ok(found
            .into_iter()
            .skip(filter.offset.max(0) as usize)
            .take(filter.limit.max(0) as usize)
            .collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|j| j.id != id);
        Ok(jobs.len() < before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::analyzer::ExtractedVacancy;

    fn new_job(channel: Option<&str>, message: Option<i64>, hash: &str) -> NewJobPosting {
        NewJobPosting {
            channel_id: channel.map(str::to_string),
            message_id: message,
            hash: Some(hash.to_string()),
            fields: ExtractedVacancy::default(),
            url: None,
            original_text: "text".to_string(),
            raw: None,
        }
    }

    #[tokio::test]
    async fn test_rejects_duplicate_source_and_hash() {
        let store = MemoryJobStore::new();
        store.create(new_job(Some("c"), Some(1), "h1")).await.unwrap();

        let err = store
            .create(new_job(Some("c"), Some(1), "h2"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(k) if k == "jobs_source_key"));

        let err = store
            .create(new_job(Some("c"), Some(2), "h1"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(k) if k == "jobs_hash_key"));

        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_list_filters_and_orders_newest_first() {
        let store = MemoryJobStore::new();
        let now = Utc::now();
        for (i, (title, grade, remote)) in [
            ("Senior Golang Developer", "Senior", true),
            ("Frontend Engineer", "Middle", false),
            ("Go Team Lead", "Lead", true),
        ]
        .into_iter()
        .enumerate()
        {
            let mut new = new_job(None, None, &format!("h{i}"));
            new.fields = ExtractedVacancy {
                is_vacancy: true,
                title: title.to_string(),
                grade: grade.to_string(),
                is_remote: remote,
                ..Default::default()
            };
            let created = now + chrono::Duration::seconds(i as i64);
            store
                .insert(JobPosting::from_new(Uuid::new_v4(), new, created))
                .await;
        }

        let titles =
            |jobs: Vec<JobPosting>| jobs.into_iter().map(|j| j.title).collect::<Vec<_>>();
        let all = JobFilter {
            limit: 10,
            ..Default::default()
        };

        assert_eq!(
            titles(store.list(&all).await.unwrap()),
            ["Go Team Lead", "Frontend Engineer", "Senior Golang Developer"]
        );

        let remote_go = JobFilter {
            search: Some("GO".to_string()),
            remote: Some(true),
            ..all.clone()
        };
        assert_eq!(
            titles(store.list(&remote_go).await.unwrap()),
            ["Go Team Lead", "Senior Golang Developer"]
        );

        let senior = JobFilter {
            grade: Some("senior".to_string()),
            ..all.clone()
        };
        assert_eq!(
            titles(store.list(&senior).await.unwrap()),
            ["Senior Golang Developer"]
        );

        let second_page = JobFilter {
            limit: 1,
            offset: 1,
            ..Default::default()
        };
        assert_eq!(
            titles(store.list(&second_page).await.unwrap()),
            ["Frontend Engineer"]
        );
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let store = MemoryJobStore::new();
        let mut job = store.create(new_job(None, None, "h")).await.unwrap();
        job.title = "Renamed".to_string();

        let updated = store.update(&job).await.unwrap();
        assert_eq!(updated.title, "Renamed");
        assert!(updated.updated >= job.updated);

        assert!(store.delete(job.id).await.unwrap());
        assert!(!store.delete(job.id).await.unwrap());
        assert!(matches!(
            store.update(&job).await,
            Err(StoreError::NotFound(_))
        ));
    }
}
