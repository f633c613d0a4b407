//! Node file service
//!
//! Upload, download, batch download and delete for owner-scoped files. Every
//! disk access runs as a unit on the storage executor while the calling task
//! waits for it.

use log::{error, info, warn};
use std::path::{Path, PathBuf};

use crate::config::NodeConfig;
use crate::error::{ExecutorError, NodeError, StorageError};
use crate::storage::operations;
use crate::storage::{DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKER_COUNT, FilePath, StorageExecutor, UnitHandle};

type DownloadHandle = UnitHandle<Result<Vec<u8>, StorageError>>;

/// File service for one storage node
pub struct NodeFileService {
    base_path: PathBuf,
    executor: StorageExecutor,
}

impl NodeFileService {
    /// Builds a service with the default pool size.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self::with_pool(base_path, DEFAULT_WORKER_COUNT, DEFAULT_QUEUE_CAPACITY)
    }

    pub fn from_config(config: &NodeConfig) -> Self {
        Self::with_pool(
            config.base_path_buf(),
            config.worker_count,
            config.queue_capacity,
        )
    }

    /// Builds a service storing under `base_path` with a pool of
    /// `worker_count` workers.
    ///
    /// Failing to create the base directory is logged and tolerated; uploads
    /// will fail at the filesystem level instead.
    pub fn with_pool(
        base_path: impl Into<PathBuf>,
        worker_count: usize,
        queue_capacity: usize,
    ) -> Self {
        let base_path = base_path.into();

        match operations::ensure_directory(&base_path) {
            Ok(()) => info!("Base directory ready: {}", base_path.display()),
            Err(e) => warn!("Could not prepare base directory: {}", e),
        }

        Self {
            base_path,
            executor: StorageExecutor::new(worker_count, queue_capacity),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn executor(&self) -> &StorageExecutor {
        &self.executor
    }

    /// Stores `content` under `file_id`, overwriting any previous version.
    ///
    /// Returns `Ok(false)` for a malformed identifier or any I/O failure.
    /// Returns `Err` only when the executor itself could not run the unit,
    /// since the outcome of the write is then unknown.
    pub async fn upload_file(&self, file_id: &str, content: Vec<u8>) -> Result<bool, NodeError> {
        info!("Receiving file {} ({} bytes)", file_id, content.len());

        let target = match FilePath::resolve(&self.base_path, file_id) {
            Ok(target) => target,
            Err(e) => {
                warn!("Rejecting upload: {}", e);
                return Ok(false);
            }
        };

        let outcome = self
            .executor
            .submit(move || operations::write_file(&target, &content))
            .await;
        upload_outcome(file_id, outcome)
    }

    /// Reads the file stored under `file_id`.
    ///
    /// `None` covers a malformed identifier, a missing file, a read failure,
    /// and an executor failure alike.
    pub async fn download_file(&self, file_id: &str) -> Option<Vec<u8>> {
        match self.dispatch_download(file_id).await {
            Ok(Some(handle)) => Self::finish_download(file_id, handle).await,
            Ok(None) => None,
            Err(e) => {
                error!("Download of {} could not be executed: {}", file_id, e);
                None
            }
        }
    }

    /// Reads several files concurrently.
    ///
    /// The result has the same length and order as `file_ids`; each entry
    /// succeeds or fails on its own.
    pub async fn download_files<S: AsRef<str>>(&self, file_ids: &[S]) -> Vec<Option<Vec<u8>>> {
        let mut pending = Vec::with_capacity(file_ids.len());
        for file_id in file_ids {
            let file_id = file_id.as_ref();
            let handle = match self.dispatch_download(file_id).await {
                Ok(handle) => handle,
                Err(e) => {
                    error!("Download of {} could not be executed: {}", file_id, e);
                    None
                }
            };
            pending.push((file_id, handle));
        }

        let mut results = Vec::with_capacity(pending.len());
        for (file_id, handle) in pending {
            let content = match handle {
                Some(handle) => Self::finish_download(file_id, handle).await,
                None => None,
            };
            results.push(content);
        }
        results
    }

    /// Removes the file stored under `file_id`.
    ///
    /// A missing file and a failed removal both report `false`.
    pub async fn delete_file(&self, file_id: &str) -> bool {
        let target = match FilePath::resolve(&self.base_path, file_id) {
            Ok(target) => target,
            Err(e) => {
                warn!("Rejecting delete: {}", e);
                return false;
            }
        };

        match self
            .executor
            .submit(move || operations::remove_file(&target.file))
            .await
        {
            Ok(Ok(())) => true,
            Ok(Err(StorageError::FileNotFound(_))) => false,
            Ok(Err(e)) => {
                error!("Error deleting file {}: {}", file_id, e);
                false
            }
            Err(e) => {
                error!("Delete of {} could not be executed: {}", file_id, e);
                false
            }
        }
    }

    /// Stops the storage executor after draining queued units.
    pub async fn shutdown(&self) {
        self.executor.shutdown().await;
    }

    async fn dispatch_download(&self, file_id: &str) -> Result<Option<DownloadHandle>, ExecutorError> {
        let target = match FilePath::resolve(&self.base_path, file_id) {
            Ok(target) => target,
            Err(e) => {
                warn!("Rejecting download: {}", e);
                return Ok(None);
            }
        };

        let handle = self
            .executor
            .dispatch(move || operations::read_file(&target.file))
            .await?;
        Ok(Some(handle))
    }

    async fn finish_download(file_id: &str, handle: DownloadHandle) -> Option<Vec<u8>> {
        match handle.wait().await {
            Ok(Ok(content)) => Some(content),
            Ok(Err(StorageError::FileNotFound(_))) => None,
            Ok(Err(e)) => {
                error!("Error reading file {}: {}", file_id, e);
                None
            }
            Err(e) => {
                error!("Download of {} could not be executed: {}", file_id, e);
                None
            }
        }
    }
}

fn upload_outcome(
    file_id: &str,
    outcome: Result<Result<(), StorageError>, ExecutorError>,
) -> Result<bool, NodeError> {
    match outcome {
        Ok(Ok(())) => Ok(true),
        Ok(Err(e)) => {
            error!("Error storing file {}: {}", file_id, e);
            Ok(false)
        }
        Err(e) => {
            error!("Upload of {} could not be executed: {}", file_id, e);
            Err(NodeError::Executor(e))
        }
    }
}
