//! S3 event handler: validates each record, decodes the source image, runs
//! the resize fan-out, and fires the webhook notification.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use aws_lambda_events::s3::S3Event;
use picscale_core::constants::SUPPORTED_EXTENSIONS;
use picscale_core::{Config, ResizeSpec};
use picscale_infra::{build_payload, WebhookNotifier};
use picscale_processing::{codec, fanout};
use picscale_storage::ObjectStorage;

/// True when the key carries one of the accepted image extensions
/// (case-insensitive).
pub fn has_supported_extension(key: &str) -> bool {
    Path::new(key)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

/// Processes upload events: one derivative fan-out per record, sequentially
/// across records.
pub struct EventProcessor {
    config: Config,
    storage: Arc<dyn ObjectStorage>,
    notifier: WebhookNotifier,
    specs: Vec<ResizeSpec>,
}

impl EventProcessor {
    pub fn new(config: Config, storage: Arc<dyn ObjectStorage>, notifier: WebhookNotifier) -> Self {
        Self {
            config,
            storage,
            notifier,
            specs: ResizeSpec::default_set(),
        }
    }

    /// Handle one event batch. Records are processed in order; the first
    /// failing record fails the whole batch so the platform can redeliver.
    pub async fn handle_event(&self, event: S3Event) -> Result<()> {
        for record in event.records {
            let bucket = record.s3.bucket.name.unwrap_or_default();
            let key = record.s3.object.key.unwrap_or_default();

            if bucket.is_empty() || key.is_empty() {
                tracing::warn!("skipping malformed event record without bucket or key");
                continue;
            }

            if !has_supported_extension(&key) {
                tracing::info!(bucket = %bucket, key = %key, "skipping non-image file");
                continue;
            }

            if let Err(e) = self.process_record(&bucket, &key).await {
                tracing::error!(bucket = %bucket, key = %key, error = %e, "failed to process image");
                return Err(e);
            }
        }

        Ok(())
    }

    /// Process a single record: download, decode, fan out, notify.
    pub async fn process_record(&self, bucket: &str, key: &str) -> Result<()> {
        if bucket == self.config.destination_bucket {
            bail!(
                "source bucket ({}) and destination bucket ({}) cannot be the same to prevent infinite loops",
                bucket,
                self.config.destination_bucket
            );
        }

        let object = self
            .storage
            .get(bucket, key)
            .await
            .context("failed to download source image")?;
        let metadata = object.metadata;

        // Image decode is CPU-bound; run off the async pool.
        let decoded = tokio::task::spawn_blocking(move || codec::decode(&object.data))
            .await
            .context("decode task aborted")?
            .context("failed to decode source image")?;

        let max_parallel = self
            .config
            .max_parallel_resizes
            .unwrap_or_else(fanout::default_parallelism);

        fanout::run(
            Arc::new(decoded.image),
            decoded.format,
            &self.specs,
            Arc::clone(&self.storage),
            &self.config.destination_bucket,
            key,
            max_parallel,
        )
        .await?;

        tracing::info!(
            bucket = %bucket,
            key = %key,
            sizes = self.specs.len(),
            "image processed"
        );

        if self.notifier.is_configured() {
            let payload = build_payload(
                bucket,
                key,
                &self.config.destination_bucket,
                &self.specs,
                &self.config.region,
                &self.config.environment,
                &metadata,
            );

            // Notification is best-effort: log and move on, never fail the
            // record over it.
            if let Err(e) = self.notifier.deliver(&payload).await {
                tracing::error!(key = %key, error = %e, "webhook notification failed");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use image::{DynamicImage, Rgba, RgbaImage};
    use picscale_core::ObjectMetadata;
    use picscale_infra::NotifierConfig;
    use picscale_storage::{StorageError, StorageResult, StoredObject};
    use std::collections::HashMap;
    use std::sync::Mutex;

    struct MemoryStorage {
        sources: HashMap<String, Vec<u8>>,
        uploads: Mutex<HashMap<String, String>>,
    }

    impl MemoryStorage {
        fn with_source(bucket: &str, key: &str, data: Vec<u8>) -> Self {
            let mut sources = HashMap::new();
            sources.insert(format!("{}/{}", bucket, key), data);
            Self {
                sources,
                uploads: Mutex::new(HashMap::new()),
            }
        }

        fn uploaded_keys(&self) -> Vec<String> {
            let mut keys: Vec<String> = self.uploads.lock().unwrap().keys().cloned().collect();
            keys.sort();
            keys
        }
    }

    #[async_trait]
    impl ObjectStorage for MemoryStorage {
        async fn get(&self, bucket: &str, key: &str) -> StorageResult<StoredObject> {
            self.sources
                .get(&format!("{}/{}", bucket, key))
                .map(|data| StoredObject {
                    data: data.clone(),
                    metadata: ObjectMetadata::default(),
                })
                .ok_or_else(|| StorageError::NotFound(key.to_string()))
        }

        async fn put(
            &self,
            bucket: &str,
            key: &str,
            _data: Vec<u8>,
            content_type: &str,
        ) -> StorageResult<()> {
            self.uploads
                .lock()
                .unwrap()
                .insert(format!("{}/{}", bucket, key), content_type.to_string());
            Ok(())
        }
    }

    fn test_config() -> Config {
        Config {
            destination_bucket: "processed".to_string(),
            webhook_url: None,
            webhook_secret: String::new(),
            region: "us-east-1".to_string(),
            environment: "test".to_string(),
            s3_endpoint: None,
            max_parallel_resizes: Some(2),
        }
    }

    fn processor_with(storage: Arc<MemoryStorage>) -> EventProcessor {
        EventProcessor::new(
            test_config(),
            storage as Arc<dyn ObjectStorage>,
            WebhookNotifier::new(NotifierConfig::default()).unwrap(),
        )
    }

    fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([200, 100, 50, 255]),
        ));
        let mut buffer = Vec::new();
        image
            .write_to(
                &mut std::io::Cursor::new(&mut buffer),
                image::ImageFormat::Jpeg,
            )
            .unwrap();
        buffer
    }

    #[test]
    fn test_has_supported_extension() {
        assert!(has_supported_extension("photos/beach.jpg"));
        assert!(has_supported_extension("photos/beach.JPEG"));
        assert!(has_supported_extension("beach.WebP"));
        assert!(!has_supported_extension("report.pdf"));
        assert!(!has_supported_extension("noextension"));
    }

    #[tokio::test]
    async fn test_process_record_creates_all_variants() {
        let storage = Arc::new(MemoryStorage::with_source(
            "uploads",
            "photos/beach.jpg",
            jpeg_bytes(1600, 900),
        ));
        let processor = processor_with(Arc::clone(&storage));

        processor
            .process_record("uploads", "photos/beach.jpg")
            .await
            .unwrap();

        assert_eq!(
            storage.uploaded_keys(),
            vec![
                "processed/photos/beach_large.jpg",
                "processed/photos/beach_medium.jpg",
                "processed/photos/beach_small.jpg",
                "processed/photos/beach_thumbnail.jpg",
            ]
        );
    }

    #[tokio::test]
    async fn test_same_bucket_aborts_before_any_work() {
        let storage = Arc::new(MemoryStorage::with_source(
            "processed",
            "photos/beach.jpg",
            jpeg_bytes(100, 100),
        ));
        let processor = processor_with(Arc::clone(&storage));

        let err = processor
            .process_record("processed", "photos/beach.jpg")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("cannot be the same"));
        assert!(storage.uploaded_keys().is_empty());
    }

    #[tokio::test]
    async fn test_undecodable_source_fails_record() {
        let storage = Arc::new(MemoryStorage::with_source(
            "uploads",
            "photos/broken.jpg",
            b"not an image at all".to_vec(),
        ));
        let processor = processor_with(Arc::clone(&storage));

        let err = processor
            .process_record("uploads", "photos/broken.jpg")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("decode"));
        assert!(storage.uploaded_keys().is_empty());
    }

    #[tokio::test]
    async fn test_handle_event_skips_unsupported_extensions() {
        let storage = Arc::new(MemoryStorage::with_source(
            "uploads",
            "docs/report.pdf",
            b"%PDF-1.4".to_vec(),
        ));
        let processor = processor_with(Arc::clone(&storage));

        let event: S3Event = serde_json::from_str(
            r#"{
                "Records": [
                    {
                        "eventVersion": "2.1",
                        "eventSource": "aws:s3",
                        "awsRegion": "us-east-1",
                        "eventTime": "2025-06-01T12:00:00.000Z",
                        "eventName": "ObjectCreated:Put",
                        "userIdentity": {"principalId": "AWS:EXAMPLE"},
                        "requestParameters": {"sourceIPAddress": "127.0.0.1"},
                        "responseElements": {
                            "x-amz-request-id": "EXAMPLE123456789",
                            "x-amz-id-2": "EXAMPLE123/abcdefghijklmn"
                        },
                        "s3": {
                            "s3SchemaVersion": "1.0",
                            "configurationId": "upload-events",
                            "bucket": {
                                "name": "uploads",
                                "ownerIdentity": {"principalId": "EXAMPLE"},
                                "arn": "arn:aws:s3:::uploads"
                            },
                            "object": {
                                "key": "docs/report.pdf",
                                "size": 8,
                                "eTag": "d41d8cd98f00b204e9800998ecf8427e",
                                "sequencer": "0055AED6DCD90281E5"
                            }
                        }
                    }
                ]
            }"#,
        )
        .unwrap();

        processor.handle_event(event).await.unwrap();
        assert!(storage.uploaded_keys().is_empty());
    }
}
