//! Shared constants.

/// File extensions accepted for processing. Keys with any other extension
/// are skipped at the event-record level.
pub const SUPPORTED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "webp", "gif"];

/// Region used for public object URLs when no region is configured.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Event type tag carried in every notification payload.
pub const EVENT_TYPE_IMAGE_PROCESSED: &str = "image_processed";
