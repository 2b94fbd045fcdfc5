//! Notification payload assembly.
//!
//! Destination keys are derived with the same `variant_key` function the
//! fan-out coordinator uploads under; the notifier reports keys it did not
//! itself write, so the derivation must be shared, never re-implemented.

use chrono::{SecondsFormat, Utc};
use picscale_core::constants::EVENT_TYPE_IMAGE_PROCESSED;
use picscale_core::{NotificationPayload, ObjectMetadata, ResizeSpec, VariantInfo};
use picscale_storage::keys::{object_url, variant_key};

/// Assemble the payload for one fully processed image. The timestamp is
/// captured here, at send time.
#[allow(clippy::too_many_arguments)]
pub fn build_payload(
    source_bucket: &str,
    original_key: &str,
    destination_bucket: &str,
    specs: &[ResizeSpec],
    region: &str,
    environment: &str,
    metadata: &ObjectMetadata,
) -> NotificationPayload {
    let image_sizes: Vec<VariantInfo> = specs
        .iter()
        .map(|spec| {
            let key = variant_key(original_key, &spec.name);
            VariantInfo {
                name: spec.name.clone(),
                url: object_url(destination_bucket, region, &key),
                key,
                width: spec.width,
                height: spec.height,
            }
        })
        .collect();

    NotificationPayload {
        original_file: original_key.to_string(),
        original_url: object_url(source_bucket, region, original_key),
        bucket: source_bucket.to_string(),
        processed_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        environment: environment.to_string(),
        total_sizes: image_sizes.len(),
        image_sizes,
        event_type: EVENT_TYPE_IMAGE_PROCESSED.to_string(),
        brand_id: metadata.brand_id.clone(),
        entity_type: metadata.entity_type.clone(),
        entity_id: metadata.entity_id.clone(),
        requested_by: metadata.requested_by.clone(),
        is_replacement: metadata.is_replacement().then_some(true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_sample() -> NotificationPayload {
        build_payload(
            "uploads",
            "photos/beach.jpg",
            "processed",
            &ResizeSpec::default_set(),
            "us-east-1",
            "production",
            &ObjectMetadata::default(),
        )
    }

    #[test]
    fn test_variant_keys_match_upload_derivation() {
        let payload = build_sample();
        for info in &payload.image_sizes {
            assert_eq!(info.key, variant_key("photos/beach.jpg", &info.name));
        }
    }

    #[test]
    fn test_payload_fields() {
        let payload = build_sample();
        assert_eq!(payload.original_file, "photos/beach.jpg");
        assert_eq!(
            payload.original_url,
            "https://uploads.s3.us-east-1.amazonaws.com/photos/beach.jpg"
        );
        assert_eq!(payload.bucket, "uploads");
        assert_eq!(payload.environment, "production");
        assert_eq!(payload.total_sizes, 4);
        assert_eq!(payload.event_type, "image_processed");

        let keys: Vec<&str> = payload.image_sizes.iter().map(|s| s.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "photos/beach_thumbnail.jpg",
                "photos/beach_small.jpg",
                "photos/beach_medium.jpg",
                "photos/beach_large.jpg",
            ]
        );
        assert_eq!(
            payload.image_sizes[0].url,
            "https://processed.s3.us-east-1.amazonaws.com/photos/beach_thumbnail.jpg"
        );
    }

    #[test]
    fn test_payload_timestamp_is_rfc3339() {
        let payload = build_sample();
        assert!(chrono::DateTime::parse_from_rfc3339(&payload.processed_at).is_ok());
    }

    #[test]
    fn test_metadata_annotations_carried() {
        let metadata = ObjectMetadata {
            brand_id: Some("acme".to_string()),
            entity_type: Some("product".to_string()),
            entity_id: Some("42".to_string()),
            requested_by: Some("uploader".to_string()),
            existing_file: Some("photos/beach.jpg".to_string()),
        };

        let payload = build_payload(
            "uploads",
            "photos/beach.jpg",
            "processed",
            &ResizeSpec::default_set(),
            "us-east-1",
            "staging",
            &metadata,
        );

        assert_eq!(payload.brand_id.as_deref(), Some("acme"));
        assert_eq!(payload.is_replacement, Some(true));
    }
}
