use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, Attributes, ObjectStore, ObjectStoreExt, PutOptions, PutPayload,
    Result as ObjectResult,
};
use picscale_core::ObjectMetadata;

use crate::traits::{ObjectStorage, StorageError, StorageResult, StoredObject};

/// S3 storage implementation
///
/// Events name the source bucket per record, so stores are built lazily per
/// bucket and cached for the lifetime of the process.
pub struct S3ObjectStorage {
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
    stores: RwLock<HashMap<String, Arc<AmazonS3>>>,
}

impl S3ObjectStorage {
    /// Create a new S3ObjectStorage instance
    ///
    /// # Arguments
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub fn new(region: String, endpoint_url: Option<String>) -> Self {
        S3ObjectStorage {
            region,
            endpoint_url,
            stores: RwLock::new(HashMap::new()),
        }
    }

    fn store_for(&self, bucket: &str) -> StorageResult<Arc<AmazonS3>> {
        if let Some(store) = self
            .stores
            .read()
            .expect("bucket store lock poisoned")
            .get(bucket)
        {
            return Ok(Arc::clone(store));
        }

        let mut builder = AmazonS3Builder::from_env()
            .with_region(self.region.clone())
            .with_bucket_name(bucket.to_string());

        if let Some(ref endpoint) = self.endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = Arc::new(
            builder
                .build()
                .map_err(|e| StorageError::ConfigError(e.to_string()))?,
        );

        self.stores
            .write()
            .expect("bucket store lock poisoned")
            .insert(bucket.to_string(), Arc::clone(&store));

        Ok(store)
    }
}

/// Map the user metadata attributes of a fetched object onto the fields the
/// notifier understands. Key case varies between providers, so matching is
/// case-insensitive.
fn metadata_from_attributes(attributes: &Attributes) -> ObjectMetadata {
    let mut metadata = ObjectMetadata::default();

    for (attribute, value) in attributes.iter() {
        let Attribute::Metadata(name) = attribute else {
            continue;
        };
        let value = (**value).to_string();
        if value.is_empty() {
            continue;
        }

        if name.eq_ignore_ascii_case("brandid") {
            metadata.brand_id = Some(value);
        } else if name.eq_ignore_ascii_case("entitytype") {
            metadata.entity_type = Some(value);
        } else if name.eq_ignore_ascii_case("entityid") {
            metadata.entity_id = Some(value);
        } else if name.eq_ignore_ascii_case("requestedby") {
            metadata.requested_by = Some(value);
        } else if name.eq_ignore_ascii_case("existingfile") {
            metadata.existing_file = Some(value);
        }
    }

    metadata
}

#[async_trait]
impl ObjectStorage for S3ObjectStorage {
    async fn get(&self, bucket: &str, key: &str) -> StorageResult<StoredObject> {
        let store = self.store_for(bucket)?;
        let location = Path::from(key.to_string());
        let start = std::time::Instant::now();

        let result: ObjectResult<_> = store.get(&location).await;

        let result = result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 download failed"
                );
                StorageError::DownloadFailed(other.to_string())
            }
        })?;

        let metadata = metadata_from_attributes(&result.attributes);

        let bytes = result
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        tracing::info!(
            bucket = %bucket,
            key = %key,
            size_bytes = bytes.len() as u64,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 download successful"
        );

        Ok(StoredObject {
            data: bytes.to_vec(),
            metadata,
        })
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<()> {
        let store = self.store_for(bucket)?;
        let location = Path::from(key.to_string());
        let size = data.len() as u64;
        let start = std::time::Instant::now();

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());

        let result: ObjectResult<_> = store
            .put_opts(
                &location,
                PutPayload::from(Bytes::from(data)),
                PutOptions::from(attributes),
            )
            .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %bucket,
            key = %key,
            size_bytes = size,
            content_type = %content_type,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(())
    }
}
