use std::time::Duration;

use anyhow::{Context, Result};
use hmac::{Hmac, Mac};
use picscale_core::{Config, NotificationPayload};
use reqwest::Client;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const USER_AGENT: &str = "picscale-image-processor/1.0";
const SIGNATURE_HEADER: &str = "X-EC-Signature";

/// Configuration for webhook delivery
#[derive(Clone)]
pub struct NotifierConfig {
    /// Destination endpoint; `None` turns delivery into a no-op.
    pub webhook_url: Option<String>,
    /// HMAC signing secret. Empty means payloads go out unsigned (the
    /// signature header is still sent, with an empty value).
    pub webhook_secret: String,
    pub timeout: Duration,
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            webhook_secret: String::new(),
            timeout: Duration::from_secs(30),
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl NotifierConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            webhook_url: config.webhook_url.clone(),
            webhook_secret: config.webhook_secret.clone(),
            ..Self::default()
        }
    }
}

/// Delivers signed processing notifications with bounded retries.
///
/// Delivery is best-effort: callers log a returned error and move on; it
/// must never fail the processing run that produced the payload.
pub struct WebhookNotifier {
    config: NotifierConfig,
    http_client: Client,
}

impl WebhookNotifier {
    pub fn new(config: NotifierConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to create HTTP client for webhooks")?;

        Ok(Self {
            config,
            http_client,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.config.webhook_url.is_some()
    }

    /// Deliver a payload, retrying with exponential backoff on failure.
    ///
    /// Returns immediately with `Ok(())` when no endpoint is configured.
    /// After the final attempt fails, the returned error names the attempt
    /// count and the last failure.
    pub async fn deliver(&self, payload: &NotificationPayload) -> Result<()> {
        let Some(url) = self.config.webhook_url.as_deref() else {
            tracing::debug!("webhook not configured, skipping notification");
            return Ok(());
        };

        // Serialize once: the signature is computed over these exact bytes.
        let body = serde_json::to_vec(payload).context("Failed to serialize webhook payload")?;
        let signature = self.sign(&body);

        let mut last_error = None;

        for attempt in 1..=self.config.max_attempts {
            if attempt > 1 {
                let delay = self.config.base_delay * 2u32.pow(attempt - 2);
                tracing::info!(
                    attempt = attempt,
                    max_attempts = self.config.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "retrying webhook notification"
                );
                tokio::time::sleep(delay).await;
            }

            match self.send_once(url, body.clone(), &signature).await {
                Ok(()) => {
                    tracing::info!(url = %url, attempt = attempt, "webhook notification delivered");
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!(
                        url = %url,
                        attempt = attempt,
                        max_attempts = self.config.max_attempts,
                        error = %e,
                        "webhook notification attempt failed"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(anyhow::anyhow!(
            "webhook delivery failed after {} attempts: {}",
            self.config.max_attempts,
            last_error.expect("at least one attempt was made")
        ))
    }

    async fn send_once(&self, url: &str, body: Vec<u8>, signature: &str) -> Result<()> {
        let response = self
            .http_client
            .post(url)
            .header("Content-Type", "application/json")
            .header("User-Agent", USER_AGENT)
            .header(SIGNATURE_HEADER, signature)
            .body(body)
            .send()
            .await
            .context("Failed to send webhook request")?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(anyhow::anyhow!(
                "Webhook returned non-success status: {}",
                status.as_u16()
            ))
        }
    }

    /// Hex HMAC-SHA256 over the payload bytes in `sha256=<hex>` form. An
    /// empty secret produces an empty signature string.
    fn sign(&self, body: &[u8]) -> String {
        if self.config.webhook_secret.is_empty() {
            return String::new();
        }

        let mut mac = HmacSha256::new_from_slice(self.config.webhook_secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(body);

        format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use picscale_core::{NotificationPayload, VariantInfo};

    fn notifier_with(url: Option<String>, secret: &str) -> WebhookNotifier {
        WebhookNotifier::new(NotifierConfig {
            webhook_url: url,
            webhook_secret: secret.to_string(),
            base_delay: Duration::from_millis(10),
            ..NotifierConfig::default()
        })
        .unwrap()
    }

    fn sample_payload() -> NotificationPayload {
        NotificationPayload {
            original_file: "photos/beach.jpg".to_string(),
            original_url: "https://uploads.s3.us-east-1.amazonaws.com/photos/beach.jpg"
                .to_string(),
            bucket: "uploads".to_string(),
            processed_at: "2025-06-01T12:00:00Z".to_string(),
            environment: "test".to_string(),
            total_sizes: 1,
            image_sizes: vec![VariantInfo {
                name: "thumbnail".to_string(),
                url: "https://processed.s3.us-east-1.amazonaws.com/photos/beach_thumbnail.jpg"
                    .to_string(),
                key: "photos/beach_thumbnail.jpg".to_string(),
                width: 200,
                height: 200,
            }],
            event_type: "image_processed".to_string(),
            brand_id: None,
            entity_type: None,
            entity_id: None,
            requested_by: None,
            is_replacement: None,
        }
    }

    #[test]
    fn test_signature_is_deterministic() {
        let notifier = notifier_with(None, "shared-secret");
        let body = b"{\"event\":\"image_processed\"}";
        let first = notifier.sign(body);
        let second = notifier.sign(body);
        assert_eq!(first, second);
        assert!(first.starts_with("sha256="));
    }

    #[test]
    fn test_signature_changes_with_payload() {
        let notifier = notifier_with(None, "shared-secret");
        let a = notifier.sign(b"{\"total_sizes\":4}");
        let b = notifier.sign(b"{\"total_sizes\":5}");
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_secret_yields_empty_signature() {
        let notifier = notifier_with(None, "");
        assert_eq!(notifier.sign(b"anything"), "");
    }

    #[tokio::test]
    async fn test_deliver_is_noop_without_url() {
        let notifier = notifier_with(None, "secret");
        assert!(!notifier.is_configured());
        notifier.deliver(&sample_payload()).await.unwrap();
    }

    #[tokio::test]
    async fn test_deliver_posts_signed_json() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/hooks/images")
            .match_header("content-type", "application/json")
            .match_header("user-agent", USER_AGENT)
            .match_header(
                "x-ec-signature",
                mockito::Matcher::Regex("^sha256=[0-9a-f]{64}$".to_string()),
            )
            .with_status(200)
            .expect(1)
            .create_async()
            .await;

        let notifier = notifier_with(Some(format!("{}/hooks/images", server.url())), "secret");
        notifier.deliver(&sample_payload()).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_deliver_retries_then_reports_last_failure() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/hooks/images")
            .with_status(500)
            .expect(3)
            .create_async()
            .await;

        let notifier = notifier_with(Some(format!("{}/hooks/images", server.url())), "");
        let err = notifier.deliver(&sample_payload()).await.unwrap_err();

        mock.assert_async().await;
        let message = err.to_string();
        assert!(message.contains("after 3 attempts"), "got: {}", message);
        assert!(message.contains("500"), "got: {}", message);
    }

}
