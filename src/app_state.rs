use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::AppError;
use crate::services::disk::DiskStore;
use crate::services::jobs::JobQueue;
use crate::services::library::FileLibrary;
use crate::services::worker::{Processor, SimulatedProcessor, Worker};
use crate::store::{ProjectRepository, Stores};

/// Shared handles for the request handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub library: Arc<FileLibrary>,
    pub projects: Arc<dyn ProjectRepository>,
    pub jobs: Arc<JobQueue>,
}

impl AppState {
    /// Open storage for `config` and wire up a worker running the simulated processor.
    ///
    /// The worker is returned unstarted; spawn [`Worker::run`] before serving.
    pub async fn build(config: Config) -> Result<(Self, Worker), AppError> {
        let processor = Arc::new(SimulatedProcessor::new(Duration::from_millis(
            config.process_delay_ms,
        )));
        Self::build_with(config, processor).await
    }

    pub async fn build_with(
        config: Config,
        processor: Arc<dyn Processor>,
    ) -> Result<(Self, Worker), AppError> {
        let disk = DiskStore::open(&config.upload_dir, config.public_base_url.clone()).await?;
        let stores = Stores::open(&config).await?;
        let (queue, rx) = JobQueue::new();
        let jobs = Arc::new(queue);

        let worker = Worker::new(jobs.clone(), stores.files.clone(), processor, rx);
        let state = Self {
            config: Arc::new(config),
            library: Arc::new(FileLibrary::new(disk, stores.files)),
            projects: stores.projects,
            jobs,
        };
        Ok((state, worker))
    }
}
