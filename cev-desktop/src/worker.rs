//! Background upload worker
//!
//! Runs an upload off the caller's task and reports exactly one outcome.

use crate::client::ApiClient;
use cev_common::api::UploadResponse;
use std::path::PathBuf;
use tokio::sync::oneshot;
use tracing::{info, warn};

/// Result of one background upload
#[derive(Debug, Clone)]
pub enum UploadOutcome {
    Success(UploadResponse),
    /// User-facing error message
    Failure(String),
}

pub struct UploadWorker;

impl UploadWorker {
    /// Start uploading `path`; the receiver yields a single outcome
    pub fn spawn(client: ApiClient, path: PathBuf) -> oneshot::Receiver<UploadOutcome> {
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let outcome = match client.upload(&path).await {
                Ok(response) => {
                    info!(
                        "Upload {} stored as #{}",
                        path.display(),
                        response.data.id
                    );
                    UploadOutcome::Success(response)
                }
                Err(e) => {
                    warn!("Upload {} failed: {}", path.display(), e);
                    UploadOutcome::Failure(e.to_string())
                }
            };

            // Receiver dropped means nobody is waiting for the result
            let _ = tx.send(outcome);
        });

        rx
    }

    /// Wait for a spawned upload, mapping a lost worker to a failure
    pub async fn wait(rx: oneshot::Receiver<UploadOutcome>) -> UploadOutcome {
        rx.await
            .unwrap_or_else(|_| UploadOutcome::Failure("Error: upload worker stopped".to_string()))
    }
}
