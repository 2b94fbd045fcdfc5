//! Webhook notification subsystem: payload assembly and signed delivery
//! with bounded retries.

pub mod notifier;
pub mod payload;

pub use notifier::{NotifierConfig, WebhookNotifier};
pub use payload::build_payload;
