pub mod metadata;
pub mod notification;
pub mod spec;

pub use metadata::ObjectMetadata;
pub use notification::{NotificationPayload, VariantInfo};
pub use spec::{FitMode, ResizeSpec};
