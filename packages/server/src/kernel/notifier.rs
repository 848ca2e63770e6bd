use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use super::BaseNotifier;
use crate::domains::scheduling::SchedulingEvent;

/// Notifier that writes each event to the log.
///
/// Stands in for push/email delivery and recognition bookkeeping, which live
/// outside this service.
#[derive(Debug, Default, Clone)]
pub struct LoggingNotifier;

#[async_trait]
impl BaseNotifier for LoggingNotifier {
    async fn publish(&self, event: &SchedulingEvent) -> Result<()> {
        let payload = serde_json::to_string(event)?;
        info!(event = event.name(), %payload, "Scheduling event");
        Ok(())
    }
}
