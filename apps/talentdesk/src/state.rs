use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api_client::{HttpCandidateSource, RequestGuard, StaticSession};
use crate::config::Config;
use crate::resume::ResumeIntake;
use crate::roster::RosterHub;

/// Shared application state: one session, one backend client, one hub.
#[derive(Clone)]
pub struct AppState {
    pub hub: Arc<RosterHub>,
    pub intake: ResumeIntake,
    pub session: Arc<StaticSession>,
    pub config: Config,
}

impl AppState {
    pub fn build(config: Config) -> Result<Self> {
        let session = Arc::new(StaticSession::new(config.api_token.clone()));
        let source = HttpCandidateSource::new(
            &config.api_url,
            &config.api_prefix,
            session.clone(),
            config.request_timeout(),
        )
        .context("Failed to build candidate API client")?;

        let guard = RequestGuard::new(session.clone(), config.request_timeout());
        let hub = Arc::new(RosterHub::new(
            Arc::new(source),
            guard,
            config.roster_config(),
        ));
        let intake = hub.intake();

        Ok(AppState {
            hub,
            intake,
            session,
            config,
        })
    }
}
