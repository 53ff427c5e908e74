use std::sync::Arc;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;
use crate::envelope::EventEnvelope;
use crate::response::Response;
use crate::triggers::Trigger;

/// One handled turn, as reported to analytics.
#[derive(Debug, Clone, Serialize)]
pub struct TelemetryRecord {
    pub id:          Uuid,
    pub trigger:     Trigger,
    pub envelope:    EventEnvelope,
    pub response:    Response,
    pub recorded_at: DateTime<Utc>,
}

impl TelemetryRecord {
    pub fn new(trigger: Trigger, envelope: EventEnvelope, response: Response) -> Self {
        Self {
            id: Uuid::new_v4(),
            trigger,
            envelope,
            response,
            recorded_at: Utc::now(),
        }
    }
}

/// Analytics sink. Failures are logged by the caller and never change the
/// response.
#[async_trait]
pub trait Telemetry: Send + Sync {
    async fn record(&self, record: TelemetryRecord) -> Result<(), String>;
}

/// Emits each record as a structured log event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTelemetry;

#[async_trait]
impl Telemetry for TracingTelemetry {
    async fn record(&self, record: TelemetryRecord) -> Result<(), String> {
        tracing::info!(
            target: "dialogsm::telemetry",
            id = %record.id,
            session = %record.envelope.session_id,
            trigger = %record.trigger,
            should_end = record.response.should_end,
            "turn recorded"
        );
        Ok(())
    }
}

/// Fire and forget: the record is delivered on a spawned task.
pub(crate) fn dispatch(telemetry: Arc<dyn Telemetry>, record: TelemetryRecord) {
    tokio::spawn(async move {
        let id = record.id;
        if let Err(error) = telemetry.record(record).await {
            tracing::warn!(id = %id, error = %error, "telemetry record dropped");
        }
    });
}
