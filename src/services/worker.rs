use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::sleep;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::FileRecord;
use crate::services::jobs::{JobQueue, ProcessOutcome};
use crate::store::FileRepository;

/// Analysis step applied to one stored file.
#[async_trait]
pub trait Processor: Send + Sync {
    async fn process(&self, record: &FileRecord) -> Result<ProcessOutcome, AppError>;
}

/// Stand-in analysis: waits, then succeeds or fails with even odds.
pub struct SimulatedProcessor {
    delay: Duration,
    rng: Mutex<StdRng>,
}

impl SimulatedProcessor {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(delay: Duration, seed: u64) -> Self {
        Self {
            delay,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

#[async_trait]
impl Processor for SimulatedProcessor {
    async fn process(&self, _record: &FileRecord) -> Result<ProcessOutcome, AppError> {
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        let ok = self
            .rng
            .lock()
            .map_err(|_| AppError::InternalServerError("Processor state poisoned".to_string()))?
            .gen_bool(0.5);
        Ok(if ok {
            ProcessOutcome::Success
        } else {
            ProcessOutcome::Failure
        })
    }
}

pub struct Worker {
    queue: Arc<JobQueue>,
    files: Arc<dyn FileRepository>,
    processor: Arc<dyn Processor>,
    rx: mpsc::UnboundedReceiver<Uuid>,
}

impl Worker {
    pub fn new(
        queue: Arc<JobQueue>,
        files: Arc<dyn FileRepository>,
        processor: Arc<dyn Processor>,
        rx: mpsc::UnboundedReceiver<Uuid>,
    ) -> Self {
        Self {
            queue,
            files,
            processor,
            rx,
        }
    }

    /// Take jobs in submission order until every sender is gone.
    pub async fn run(mut self) {
        info!("Worker started");
        while let Some(id) = self.rx.recv().await {
            self.process_job(id).await;
        }
        info!("Worker stopped");
    }

    async fn process_job(&self, id: Uuid) {
        let Some(job) = self.queue.start(id).await else {
            warn!("Worker | job {} is not pending, skipping", id);
            return;
        };

        info!("Worker picked up job {} | files={}", job.id, job.file_ids.len());
        let started = std::time::Instant::now();

        let mut tasks = JoinSet::new();
        for file_id in job.file_ids.clone() {
            let files = self.files.clone();
            let processor = self.processor.clone();
            tasks.spawn(async move {
                let outcome = match files.get(&file_id).await {
                    Ok(Some(record)) => processor.process(&record).await,
                    Ok(None) => Err(AppError::NotFound(format!("File '{}' not found", file_id))),
                    Err(e) => Err(e),
                };
                (file_id, outcome)
            });
        }

        let mut results = BTreeMap::new();
        let mut errors = BTreeMap::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((file_id, Ok(outcome))) => {
                    results.insert(file_id, outcome);
                }
                Ok((file_id, Err(e))) => {
                    warn!("Job {} | file {} failed: {}", job.id, file_id, e);
                    errors.insert(file_id.clone(), e.to_string());
                    results.insert(file_id, ProcessOutcome::Failure);
                }
                Err(e) => error!("Job {} | task join error: {}", job.id, e),
            }
        }

        // Files whose task panicked still get an outcome.
        for file_id in &job.file_ids {
            if !results.contains_key(file_id) {
                errors.insert(file_id.clone(), "Processing task aborted".to_string());
                results.insert(file_id.clone(), ProcessOutcome::Failure);
            }
        }

        if let Some(done) = self.queue.complete(job.id, results, errors).await {
            info!(
                "Job {} completed | success={} failure={} | took {:.2?}",
                done.id,
                done.succeeded(),
                done.failed(),
                started.elapsed()
            );
        }
    }
}
