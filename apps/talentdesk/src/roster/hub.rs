use std::sync::{Arc, RwLock};

use tracing::{debug, info, warn};

use crate::api_client::{CandidateSource, RequestGuard};
use crate::errors::Result;
use crate::models::{
    Candidate, CandidateStatus, CandidateUpdate, NewCandidate, ResumeFile, Scope,
};
use crate::resume::ResumeIntake;
use crate::roster::controller::{RosterConfig, RosterController};
use crate::roster::mutations::{require_id, Mutator};

/// Owns every open roster view over one backend.
///
/// Writes go through the hub so the returned record reaches all views: each
/// one replaces it in place, and views whose filter it entered or left are
/// re-fetched.
pub struct RosterHub {
    source: Arc<dyn CandidateSource>,
    guard: RequestGuard,
    config: RosterConfig,
    views: RwLock<Vec<Arc<RosterController>>>,
}

impl RosterHub {
    pub fn new(source: Arc<dyn CandidateSource>, guard: RequestGuard, config: RosterConfig) -> Self {
        Self {
            source,
            guard,
            config,
            views: RwLock::new(Vec::new()),
        }
    }

    /// Opens a named view. A view already registered under `name` is shut
    /// down and replaced.
    pub fn register(&self, name: &str, scope: Scope) -> Arc<RosterController> {
        let view = Arc::new(RosterController::new(
            name,
            scope,
            self.source.clone(),
            self.guard.child(),
            self.config.clone(),
        ));

        let mut views = self.views.write().unwrap_or_else(|p| p.into_inner());
        if let Some(idx) = views.iter().position(|v| v.name() == name) {
            views[idx].shutdown();
            views[idx] = view.clone();
            debug!("Replaced roster view '{name}'");
        } else {
            views.push(view.clone());
            debug!("Registered roster view '{name}' ({})", view.scope());
        }
        view
    }

    pub fn unregister(&self, name: &str) -> bool {
        let mut views = self.views.write().unwrap_or_else(|p| p.into_inner());
        match views.iter().position(|v| v.name() == name) {
            Some(idx) => {
                views.remove(idx).shutdown();
                true
            }
            None => false,
        }
    }

    pub fn view(&self, name: &str) -> Option<Arc<RosterController>> {
        self.views()
            .into_iter()
            .find(|v| v.name() == name)
    }

    pub fn views(&self) -> Vec<Arc<RosterController>> {
        self.views
            .read()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }

    /// Resume upload sharing this hub's session, deadline and shutdown.
    pub fn intake(&self) -> ResumeIntake {
        ResumeIntake::new(self.source.clone(), self.guard.child())
    }

    fn mutator(&self) -> Mutator<'_> {
        Mutator {
            source: self.source.as_ref(),
            guard: &self.guard,
        }
    }

    /// Hands a server-returned record to every view.
    pub async fn propagate(&self, candidate: &Candidate) {
        let stale: Vec<_> = self
            .views()
            .into_iter()
            .filter(|view| view.apply_update(candidate).needs_resync)
            .collect();

        for view in stale {
            if let Err(e) = view.refresh().await {
                warn!("[{}] resync after update failed: {e}", view.name());
            }
        }
    }

    pub async fn update_candidate_status(
        &self,
        candidate_id: &str,
        status: CandidateStatus,
    ) -> Result<Candidate> {
        let updated = self.mutator().status(candidate_id, status).await?;
        self.propagate(&updated).await;
        Ok(updated)
    }

    /// `Ok(None)` when no request was needed.
    pub async fn update_candidate_remarks(
        &self,
        candidate_id: &str,
        remarks: &str,
    ) -> Result<Option<Candidate>> {
        let id = require_id(candidate_id)?;
        let remarks = remarks.trim();
        let held = self.views().iter().find_map(|v| v.find(id));
        if held.map_or(false, |c| c.remarks().trim() == remarks) {
            debug!("Remarks for {id} unchanged");
            return Ok(None);
        }
        let updated = self.mutator().remarks(id, remarks).await?;
        self.propagate(&updated).await;
        Ok(Some(updated))
    }

    pub async fn update_candidate(
        &self,
        candidate_id: &str,
        update: &CandidateUpdate,
    ) -> Result<Candidate> {
        let updated = self.mutator().edit(candidate_id, update).await?;
        self.propagate(&updated).await;
        Ok(updated)
    }

    /// Creates a candidate and reloads page 1 of every view it belongs to.
    pub async fn add_candidate(
        &self,
        new: &NewCandidate,
        resume: Option<&ResumeFile>,
    ) -> Result<Candidate> {
        let created = self.mutator().create(new, resume).await?;
        for view in self.views() {
            if view.accepts_new(&created) {
                if let Err(e) = view.reload_first_page().await {
                    warn!("[{}] reload after create failed: {e}", view.name());
                }
            }
        }
        Ok(created)
    }

    /// Cancels every in-flight request of every view and the intake.
    pub fn shutdown(&self) {
        info!("Shutting down {} roster view(s)", self.views().len());
        self.guard.cancel();
    }
}
