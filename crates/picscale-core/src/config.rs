//! Configuration module
//!
//! All runtime settings are read once at startup into an explicit `Config`
//! struct and passed by reference into the processor and notifier. Nothing
//! reads the process environment after startup.

use std::env;

/// Application configuration (image derivative processor).
#[derive(Clone, Debug)]
pub struct Config {
    /// Bucket derivatives are written to. Must differ from every source
    /// bucket delivered in events.
    pub destination_bucket: String,
    /// Webhook endpoint for processing notifications. `None` disables
    /// notifications entirely.
    pub webhook_url: Option<String>,
    /// Shared secret for webhook payload signatures. Empty means unsigned.
    pub webhook_secret: String,
    /// AWS region, used for public object URLs.
    pub region: String,
    /// Deployment environment tag carried in notification payloads.
    pub environment: String,
    /// Custom endpoint for S3-compatible providers (MinIO, DigitalOcean
    /// Spaces, etc.)
    pub s3_endpoint: Option<String>,
    /// Overrides the resize fan-out concurrency limit. Defaults to the
    /// runtime's available parallelism when unset.
    pub max_parallel_resizes: Option<usize>,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        Ok(Config {
            destination_bucket: env::var("DESTINATION_BUCKET")
                .map_err(|_| anyhow::anyhow!("DESTINATION_BUCKET must be set"))?,
            webhook_url: env::var("WEBHOOK_URL").ok().filter(|s| !s.trim().is_empty()),
            webhook_secret: env::var("WEBHOOK_SECRET").unwrap_or_default(),
            region: env::var("AWS_REGION")
                .unwrap_or_else(|_| crate::constants::DEFAULT_REGION.to_string()),
            environment,
            s3_endpoint: env::var("S3_ENDPOINT").ok().filter(|s| !s.trim().is_empty()),
            max_parallel_resizes: env::var("MAX_PARALLEL_RESIZES")
                .ok()
                .and_then(|s| s.parse().ok()),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.destination_bucket.trim().is_empty() {
            return Err(anyhow::anyhow!("DESTINATION_BUCKET cannot be empty"));
        }

        if let Some(ref url) = self.webhook_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(anyhow::anyhow!(
                    "WEBHOOK_URL must be an http(s) URL, got: {}",
                    url
                ));
            }
        }

        if let Some(0) = self.max_parallel_resizes {
            return Err(anyhow::anyhow!("MAX_PARALLEL_RESIZES must be at least 1"));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}
