//! Notification payload models.

use serde::{Deserialize, Serialize};

/// One processed derivative in a notification payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VariantInfo {
    pub name: String,
    pub url: String,
    pub key: String,
    pub width: u32,
    pub height: u32,
}

/// Payload POSTed to the webhook endpoint after every fully successful
/// processing run. Constructed fresh per run, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub original_file: String,
    pub original_url: String,
    pub bucket: String,
    pub processed_at: String,
    pub environment: String,
    pub total_sizes: usize,
    pub image_sizes: Vec<VariantInfo>,
    pub event_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_replacement: Option<bool>,
}
