use std::sync::Arc;
use crate::attributes::Domain;
use crate::config::SkillConfig;
use crate::envelope::{EventEnvelope, EventKind};
use crate::error::DialogError;
use crate::machine::CompiledMachine;
use crate::pool::SessionPool;
use crate::profile::ProfileStore;
use crate::response::Response;
use crate::session::Session;
use crate::telemetry::{dispatch, Telemetry, TelemetryRecord};

/// Entry point for inbound events: routes each envelope to its pooled
/// session and turns the outcome into a response.
///
/// Requests for different sessions run concurrently; requests for the same
/// session are serialised on that session's lock.
pub struct DialogService<D> {
    config:    SkillConfig,
    pool:      SessionPool<D>,
    profiles:  Option<Arc<dyn ProfileStore>>,
    telemetry: Option<Arc<dyn Telemetry>>,
}

impl<D: Domain> DialogService<D> {
    pub fn new(machine: Arc<CompiledMachine<D>>, config: SkillConfig) -> Result<Self, DialogError> {
        let pool = SessionPool::new(machine, config.pool_capacity)?
            .with_trace_limit(config.trace_limit);
        Ok(Self { config, pool, profiles: None, telemetry: None })
    }

    pub fn with_profiles(mut self, store: Arc<dyn ProfileStore>) -> Self {
        self.profiles = Some(store); self
    }

    pub fn with_telemetry(mut self, telemetry: Arc<dyn Telemetry>) -> Self {
        self.telemetry = Some(telemetry); self
    }

    pub fn config(&self) -> &SkillConfig {
        &self.config
    }

    pub fn pool(&self) -> &SessionPool<D> {
        &self.pool
    }

    /// Handles one inbound event.
    ///
    /// A turn that no transition accepts, or whose prepare operation fails,
    /// is answered with the "not understood" response and leaves the session
    /// where it was, apart from the captured values it merged. Errors are
    /// returned only for events that cannot be handled at all and for
    /// after-operation failures; the latter carry the committed context in
    /// `DialogError::context` for callers that persist attributes.
    pub async fn handle(&self, envelope: EventEnvelope) -> Result<Response, DialogError> {
        let kind = envelope.kind()?;
        tracing::info!(session = %envelope.session_id, kind = %kind, "handling event");

        match kind {
            EventKind::SessionEnd => {
                self.pool.remove(&envelope.session_id);
                Ok(Response::farewell(&self.config))
            }
            EventKind::SessionStart => {
                let shared = self.pool.get(&envelope.session_id);
                let mut session = shared.lock().await;
                self.initialise(&mut session, &envelope).await?;
                session.start()
            }
            EventKind::Turn => {
                let trigger = envelope.trigger.clone().ok_or_else(|| {
                    DialogError::MalformedEvent("turn event carries no trigger".into())
                })?;

                let shared = self.pool.get(&envelope.session_id);
                let response = {
                    let mut session = shared.lock().await;
                    self.initialise(&mut session, &envelope).await?;
                    match session.turn(trigger.clone(), &envelope.captured) {
                        Ok(response) => response,
                        Err(e) if e.is_recoverable() => {
                            tracing::warn!(
                                session = %envelope.session_id,
                                state = %session.attributes().state,
                                error = %e,
                                "turn not understood"
                            );
                            Response::not_understood(&self.config)
                                .with_context(session.persisted()?)
                        }
                        Err(e) => {
                            tracing::error!(session = %envelope.session_id, error = %e, "turn failed");
                            return Err(e);
                        }
                    }
                };

                if let Some(telemetry) = &self.telemetry {
                    let record = TelemetryRecord::new(trigger, envelope, response.clone());
                    dispatch(Arc::clone(telemetry), record);
                }
                Ok(response)
            }
        }
    }

    /// Consults the profile store for a brand-new conversation, then adopts
    /// any attributes the caller echoed back.
    async fn initialise(&self, session: &mut Session<D>, envelope: &EventEnvelope) -> Result<(), DialogError> {
        if session.is_fresh() && envelope.attributes.is_none() {
            if let (Some(store), Some(user_id)) = (&self.profiles, envelope.user_id.as_deref()) {
                match store.get(user_id).await {
                    Ok(profile) => {
                        if profile.is_none() {
                            if let Err(e) = store.register(user_id).await {
                                tracing::warn!(user = %user_id, error = %e, "profile registration failed");
                            }
                        }
                        session.apply_profile(profile.as_ref());
                    }
                    Err(e) => tracing::warn!(user = %user_id, error = %e, "profile lookup failed"),
                }
            }
        }

        if let Some(persisted) = &envelope.attributes {
            session.restore(persisted)?;
        }
        Ok(())
    }
}
