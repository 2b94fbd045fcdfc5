mod handler;

use std::sync::Arc;

use aws_lambda_events::s3::S3Event;
use lambda_runtime::{service_fn, Error, LambdaEvent};
use picscale_core::Config;
use picscale_infra::{telemetry, NotifierConfig, WebhookNotifier};
use picscale_storage::{ObjectStorage, S3ObjectStorage};

use crate::handler::EventProcessor;

#[tokio::main]
async fn main() -> Result<(), Error> {
    telemetry::init_telemetry();

    let config = Config::from_env()?;
    config.validate()?;

    let storage: Arc<dyn ObjectStorage> = Arc::new(S3ObjectStorage::new(
        config.region.clone(),
        config.s3_endpoint.clone(),
    ));
    let notifier = WebhookNotifier::new(NotifierConfig::from_config(&config))?;

    let processor = Arc::new(EventProcessor::new(config, storage, notifier));

    lambda_runtime::run(service_fn(move |event: LambdaEvent<S3Event>| {
        let processor = Arc::clone(&processor);
        async move { processor.handle_event(event.payload).await.map_err(Error::from) }
    }))
    .await
}
