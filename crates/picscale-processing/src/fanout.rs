//! Concurrent fan-out coordinator.
//!
//! One task per resize spec, bounded by a semaphore sized to the runtime's
//! available parallelism. The decoded source raster is shared read-only via
//! `Arc`; each task owns its resized raster and encode buffer. The first
//! task failure cancels a shared token so siblings abort early; the
//! coordinator still waits for every task to settle and returns exactly that
//! first error. All specs must upload for the run to succeed.

use std::sync::Arc;

use image::DynamicImage;
use picscale_core::ResizeSpec;
use picscale_storage::{keys, ObjectStorage, StorageError};
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::codec::{self, CodecError, SourceFormat};
use crate::resize;

#[derive(Debug, Error)]
pub enum FanoutError {
    #[error("failed to produce variant {spec}: {source}")]
    Encode {
        spec: String,
        #[source]
        source: CodecError,
    },

    #[error("failed to upload variant {key}: {source}")]
    Upload {
        key: String,
        #[source]
        source: StorageError,
    },

    #[error("variant task aborted: {0}")]
    Task(String),
}

/// Concurrency limit used when no override is configured.
pub fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Produce and upload every derivative of one decoded image.
///
/// Returns `Ok(())` only when all specs uploaded; otherwise the first task
/// error, with later errors observed and discarded.
pub async fn run(
    image: Arc<DynamicImage>,
    format: SourceFormat,
    specs: &[ResizeSpec],
    storage: Arc<dyn ObjectStorage>,
    destination_bucket: &str,
    original_key: &str,
    max_parallel: usize,
) -> Result<(), FanoutError> {
    let semaphore = Arc::new(Semaphore::new(max_parallel.max(1)));
    let cancel = CancellationToken::new();
    let mut tasks: JoinSet<Result<(), FanoutError>> = JoinSet::new();

    for spec in specs.iter().cloned() {
        let image = Arc::clone(&image);
        let storage = Arc::clone(&storage);
        let semaphore = Arc::clone(&semaphore);
        let cancel = cancel.clone();
        let bucket = destination_bucket.to_string();
        let key = keys::variant_key(original_key, &spec.name);

        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await.expect("semaphore closed");

            if cancel.is_cancelled() {
                tracing::debug!(key = %key, "variant skipped after sibling failure");
                return Ok(());
            }

            let spec_name = spec.name.clone();
            // Resize and encode are CPU-bound; run off the async pool.
            let (data, content_type) = tokio::task::spawn_blocking(move || {
                let resized = resize::apply(&image, &spec);
                codec::encode(&resized, format)
            })
            .await
            .map_err(|e| FanoutError::Task(e.to_string()))?
            .map_err(|source| FanoutError::Encode {
                spec: spec_name,
                source,
            })?;

            if cancel.is_cancelled() {
                tracing::debug!(key = %key, "variant skipped after sibling failure");
                return Ok(());
            }

            storage
                .put(&bucket, &key, data, content_type)
                .await
                .map_err(|source| FanoutError::Upload {
                    key: key.clone(),
                    source,
                })?;

            tracing::info!(key = %key, "variant uploaded");
            Ok(())
        });
    }

    let mut first_error: Option<FanoutError> = None;
    while let Some(joined) = tasks.join_next().await {
        let result = joined.unwrap_or_else(|e| Err(FanoutError::Task(e.to_string())));
        if let Err(e) = result {
            cancel.cancel();
            if first_error.is_none() {
                first_error = Some(e);
            } else {
                tracing::debug!(error = %e, "discarding error from sibling variant task");
            }
        }
    }

    match first_error {
        None => Ok(()),
        Some(e) => Err(e),
    }
}
