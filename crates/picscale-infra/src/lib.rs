//! Infrastructure concerns: telemetry initialization and signed webhook
//! delivery with bounded retries.

pub mod telemetry;
pub mod webhook;

pub use webhook::{build_payload, NotifierConfig, WebhookNotifier};
