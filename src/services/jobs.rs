use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, RwLock};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::AppError;
use crate::store::FileRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
}

impl std::str::FromStr for JobStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "processing" => Ok(JobStatus::Processing),
            "completed" => Ok(JobStatus::Completed),
            other => Err(AppError::BadRequest(format!("Unknown job status '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProcessOutcome {
    Success,
    Failure,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Uuid,
    pub file_ids: Vec<String>,
    pub status: JobStatus,
    /// Outcome per file id, filled in when the job completes.
    #[serde(default)]
    pub results: BTreeMap<String, ProcessOutcome>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, String>,
    #[schema(value_type = String)]
    pub created_at: NaiveDateTime,
    #[schema(value_type = String)]
    pub updated_at: NaiveDateTime,
}

impl Job {
    pub fn succeeded(&self) -> usize {
        self.results.values().filter(|o| **o == ProcessOutcome::Success).count()
    }

    pub fn failed(&self) -> usize {
        self.results.values().filter(|o| **o == ProcessOutcome::Failure).count()
    }
}

/// Completed jobs kept for polling before the oldest are evicted.
pub const DEFAULT_RETAINED_JOBS: usize = 1000;

/// In-memory job registry feeding the worker over a channel.
///
/// Pending and processing jobs are always kept; only the oldest completed
/// jobs beyond the retention limit are dropped.
pub struct JobQueue {
    jobs: RwLock<Vec<Job>>,
    tx: mpsc::UnboundedSender<Uuid>,
    retain_completed: usize,
}

impl JobQueue {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Uuid>) {
        Self::with_retention(DEFAULT_RETAINED_JOBS)
    }

    pub fn with_retention(retain_completed: usize) -> (Self, mpsc::UnboundedReceiver<Uuid>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                jobs: RwLock::new(Vec::new()),
                tx,
                retain_completed: retain_completed.max(1),
            },
            rx,
        )
    }

    /// Record a pending job for `file_ids` and hand it to the worker.
    ///
    /// Duplicate ids are collapsed; every id must name an existing file.
    pub async fn submit(
        &self,
        file_ids: Vec<String>,
        files: &dyn FileRepository,
    ) -> Result<Job, AppError> {
        let mut seen = HashSet::new();
        let file_ids: Vec<String> = file_ids.into_iter().filter(|id| seen.insert(id.clone())).collect();
        if file_ids.is_empty() {
            return Err(AppError::BadRequest("No files selected".to_string()));
        }
        for id in &file_ids {
            if files.get(id).await?.is_none() {
                return Err(AppError::NotFound(format!("File '{}' not found", id)));
            }
        }

        let now = chrono::Utc::now().naive_utc();
        let job = Job {
            id: Uuid::new_v4(),
            file_ids,
            status: JobStatus::Pending,
            results: BTreeMap::new(),
            errors: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        };

        self.jobs.write().await.push(job.clone());
        self.tx
            .send(job.id)
            .map_err(|_| AppError::InternalServerError("Job worker is not running".to_string()))?;
        Ok(job)
    }

    pub async fn get(&self, id: Uuid) -> Result<Job, AppError> {
        self.jobs
            .read()
            .await
            .iter()
            .find(|j| j.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Job not found".to_string()))
    }

    /// Jobs newest first, optionally with one status.
    pub async fn list(&self, status: Option<JobStatus>) -> Vec<Job> {
        self.jobs
            .read()
            .await
            .iter()
            .rev()
            .filter(|j| status.map_or(true, |s| j.status == s))
            .cloned()
            .collect()
    }

    /// Move a pending job to processing and return it.
    pub async fn start(&self, id: Uuid) -> Option<Job> {
        let mut jobs = self.jobs.write().await;
        let job = jobs.iter_mut().find(|j| j.id == id && j.status == JobStatus::Pending)?;
        job.status = JobStatus::Processing;
        job.updated_at = chrono::Utc::now().naive_utc();
        Some(job.clone())
    }

    pub async fn complete(
        &self,
        id: Uuid,
        results: BTreeMap<String, ProcessOutcome>,
        errors: BTreeMap<String, String>,
    ) -> Option<Job> {
        let mut jobs = self.jobs.write().await;
        let job = jobs.iter_mut().find(|j| j.id == id)?;
        job.status = JobStatus::Completed;
        job.results = results;
        job.errors = errors;
        job.updated_at = chrono::Utc::now().naive_utc();
        let done = job.clone();

        evict_completed(&mut jobs, self.retain_completed);
        Some(done)
    }
}

/// Drop the oldest completed jobs so at most `keep` remain.
fn evict_completed(jobs: &mut Vec<Job>, keep: usize) {
    let completed = jobs.iter().filter(|j| j.status == JobStatus::Completed).count();
    let mut excess = completed.saturating_sub(keep);
    if excess == 0 {
        return;
    }
    jobs.retain(|j| {
        if excess > 0 && j.status == JobStatus::Completed {
            excess -= 1;
            false
        } else {
            true
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FileRecord;
    use crate::store::SidecarStore;

    async fn store_with(ids: &[&str]) -> (SidecarStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = SidecarStore::load(dir.path(), "http://localhost:5000").await.unwrap();
        let records = ids
            .iter()
            .map(|id| FileRecord {
                id: id.to_string(),
                name: id.to_string(),
                size: 1,
                mime_type: "application/pdf".into(),
                url: String::new(),
                last_modified: 0,
                project_id: None,
            })
            .collect();
        store.append(records).await.unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn submit_queues_a_pending_job() {
        let (store, _dir) = store_with(&["1-a.pdf", "2-b.pdf"]).await;
        let (queue, mut rx) = JobQueue::new();

        let job = queue
            .submit(vec!["1-a.pdf".into(), "2-b.pdf".into(), "1-a.pdf".into()], &store)
            .await
            .unwrap();

        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.file_ids, vec!["1-a.pdf", "2-b.pdf"]);
        assert_eq!(rx.recv().await, Some(job.id));
        assert_eq!(queue.get(job.id).await.unwrap().id, job.id);
    }

    #[tokio::test]
    async fn submit_validates_ids() {
        let (store, _dir) = store_with(&["1-a.pdf"]).await;
        let (queue, _rx) = JobQueue::new();

        assert!(matches!(queue.submit(vec![], &store).await, Err(AppError::BadRequest(_))));
        assert!(matches!(
            queue.submit(vec!["1-a.pdf".into(), "ghost.pdf".into()], &store).await,
            Err(AppError::NotFound(_))
        ));
        assert!(queue.list(None).await.is_empty());
    }

    #[tokio::test]
    async fn lifecycle_and_listing() {
        let (store, _dir) = store_with(&["1-a.pdf"]).await;
        let (queue, _rx) = JobQueue::new();
        let first = queue.submit(vec!["1-a.pdf".into()], &store).await.unwrap();
        let second = queue.submit(vec!["1-a.pdf".into()], &store).await.unwrap();

        let started = queue.start(first.id).await.unwrap();
        assert_eq!(started.status, JobStatus::Processing);
        assert!(queue.start(first.id).await.is_none());

        let mut results = BTreeMap::new();
        results.insert("1-a.pdf".to_string(), ProcessOutcome::Failure);
        let done = queue.complete(first.id, results, BTreeMap::new()).await.unwrap();
        assert_eq!((done.succeeded(), done.failed()), (0, 1));

        let listed: Vec<Uuid> = queue.list(None).await.iter().map(|j| j.id).collect();
        assert_eq!(listed, vec![second.id, first.id]);
        assert_eq!(queue.list(Some(JobStatus::Pending)).await.len(), 1);
        assert!(matches!(queue.get(Uuid::new_v4()).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn oldest_completed_jobs_are_evicted() {
        let (store, _dir) = store_with(&["1-a.pdf"]).await;
        let (queue, _rx) = JobQueue::with_retention(2);

        let mut ids = Vec::new();
        for _ in 0..4 {
            ids.push(queue.submit(vec!["1-a.pdf".into()], &store).await.unwrap().id);
        }
        for id in &ids[..3] {
            queue.start(*id).await.unwrap();
            queue.complete(*id, BTreeMap::new(), BTreeMap::new()).await.unwrap();
        }

        assert!(matches!(queue.get(ids[0]).await, Err(AppError::NotFound(_))));
        let listed: Vec<Uuid> = queue.list(None).await.iter().map(|j| j.id).collect();
        assert_eq!(listed, vec![ids[3], ids[2], ids[1]]);
        assert_eq!(queue.get(ids[3]).await.unwrap().status, JobStatus::Pending);
    }

    #[test]
    fn status_filter_parses() {
        assert_eq!("processing".parse::<JobStatus>().unwrap(), JobStatus::Processing);
        assert!("failed".parse::<JobStatus>().is_err());
    }
}
