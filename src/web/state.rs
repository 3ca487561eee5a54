use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Duration;

use crate::{
    config::AppConfig, credentials::CredentialVerifier, sessions::SessionStore,
    supervisor::JobSupervisor,
};

#[derive(Clone)]
pub struct AppState {
    config: Arc<AppConfig>,
    sessions: SessionStore,
    credentials: CredentialVerifier,
    supervisor: JobSupervisor,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self> {
        let credentials = CredentialVerifier::new(&config.passwords)
            .context("failed to prepare credential verifier")?;
        let sessions = SessionStore::new(Duration::hours(config.session_ttl_hours));
        let supervisor = JobSupervisor::new(&config.processing_dir);

        Ok(Self {
            config: Arc::new(config),
            sessions,
            credentials,
            supervisor,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn credentials(&self) -> &CredentialVerifier {
        &self.credentials
    }

    pub fn supervisor(&self) -> &JobSupervisor {
        &self.supervisor
    }
}
