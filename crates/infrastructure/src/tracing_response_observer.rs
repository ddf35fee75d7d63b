use async_trait::async_trait;
use tracing::info;

use surveyrpc_application::{ResponseDeleteEvent, ResponseLifecycleObserver};

/// Observer that records every imminent response deletion in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingResponseObserver;

#[async_trait]
impl ResponseLifecycleObserver for TracingResponseObserver {
    async fn before_response_delete(&self, event: &ResponseDeleteEvent) {
        info!(
            survey_id = %event.survey_id,
            response_id = %event.response_id,
            user_id = %event.user_id,
            "deleting survey response"
        );
    }
}
