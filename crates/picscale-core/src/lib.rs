//! Core types for the picscale image derivative service: configuration,
//! shared constants, and the domain models exchanged between the processing
//! pipeline and the webhook notifier.

pub mod config;
pub mod constants;
pub mod models;

pub use config::Config;
pub use models::metadata::ObjectMetadata;
pub use models::notification::{NotificationPayload, VariantInfo};
pub use models::spec::{FitMode, ResizeSpec};
