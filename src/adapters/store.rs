use crate::domain::model::{JobFilter, JobRecord, SavedJob, SavedPage, StatusUpdate};
use crate::domain::ports::JobStore;
use crate::utils::error::{AggregatorError, Result};
use chrono::Utc;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, RwLock};

fn next_id(jobs: &[SavedJob]) -> i64 {
    jobs.iter().map(|j| j.id).max().unwrap_or(0) + 1
}

fn insert(jobs: &mut Vec<SavedJob>, job: JobRecord) -> SavedJob {
    let saved = SavedJob {
        id: next_id(jobs),
        job,
        created_at: Utc::now(),
    };
    jobs.push(saved.clone());
    saved
}

fn update(jobs: &mut [SavedJob], id: i64, status: &StatusUpdate) -> Result<SavedJob> {
    let saved = jobs
        .iter_mut()
        .find(|j| j.id == id)
        .ok_or(AggregatorError::NotFound { id })?;
    status.apply(saved);
    Ok(saved.clone())
}

#[derive(Debug, Default)]
pub struct MemoryJobStore {
    jobs: RwLock<Vec<SavedJob>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobStore for MemoryJobStore {
    async fn create(&self, job: JobRecord) -> Result<SavedJob> {
        Ok(insert(&mut *self.jobs.write().await, job))
    }

    async fn query(&self, filter: &JobFilter) -> Result<SavedPage> {
        Ok(filter.paginate(&self.jobs.read().await))
    }

    async fn update_status(&self, id: i64, status: &StatusUpdate) -> Result<SavedJob> {
        update(&mut self.jobs.write().await, id, status)
    }
}

/// Saved jobs kept as one pretty-printed JSON array on disk.
#[derive(Debug)]
pub struct FileJobStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileJobStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<SavedJob>> {
        match tokio::fs::read(&self.path).await {
            Ok(data) if data.is_empty() => Ok(Vec::new()),
            Ok(data) => serde_json::from_slice(&data).map_err(|e| AggregatorError::StorageError {
                message: format!("{} is not a valid job file: {}", self.path.display(), e),
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn persist(&self, jobs: &[SavedJob]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let data = serde_json::to_vec_pretty(jobs)?;
        // The target is only ever replaced whole.
        let staging = self.staging_path();
        tokio::fs::write(&staging, data).await?;
        tokio::fs::rename(&staging, &self.path).await?;
        Ok(())
    }
}

impl JobStore for FileJobStore {
    async fn create(&self, job: JobRecord) -> Result<SavedJob> {
        let _guard = self.lock.lock().await;
        let mut jobs = self.load().await?;
        let saved = insert(&mut jobs, job);
        self.persist(&jobs).await?;
        tracing::debug!("Saved job {} to {}", saved.id, self.path.display());
        Ok(saved)
    }

    async fn query(&self, filter: &JobFilter) -> Result<SavedPage> {
        let _guard = self.lock.lock().await;
        let jobs = self.load().await?;
        Ok(filter.paginate(&jobs))
    }

    async fn update_status(&self, id: i64, status: &StatusUpdate) -> Result<SavedJob> {
        let _guard = self.lock.lock().await;
        let mut jobs = self.load().await?;
        let saved = update(&mut jobs, id, status)?;
        self.persist(&jobs).await?;
        Ok(saved)
    }
}
