use tracing::info;

use crate::api_client::{CandidateSource, RequestGuard};
use crate::errors::{Result, RosterError};
use crate::models::{Candidate, CandidateStatus, CandidateUpdate, NewCandidate, ResumeFile};

/// Validated single-candidate writes, shared by a lone controller and the hub.
///
/// Nothing here touches roster state: callers decide where the returned record
/// is propagated.
pub(crate) struct Mutator<'a> {
    pub source: &'a dyn CandidateSource,
    pub guard: &'a RequestGuard,
}

pub(crate) fn require_id(candidate_id: &str) -> Result<&str> {
    let id = candidate_id.trim();
    if id.is_empty() {
        return Err(RosterError::validation("candidate id cannot be empty"));
    }
    Ok(id)
}

impl Mutator<'_> {
    pub async fn status(&self, candidate_id: &str, status: CandidateStatus) -> Result<Candidate> {
        let id = require_id(candidate_id)?;
        let updated = self
            .guard
            .run("status update", self.source.update_status(id, status))
            .await?;
        info!("Candidate {id} moved to '{status}'");
        Ok(updated)
    }

    /// `remarks` must already be trimmed.
    pub async fn remarks(&self, candidate_id: &str, remarks: &str) -> Result<Candidate> {
        let id = require_id(candidate_id)?;
        let updated = self
            .guard
            .run("remarks update", self.source.update_remarks(id, remarks))
            .await?;
        info!("Candidate {id} remarks updated");
        Ok(updated)
    }

    pub async fn edit(&self, candidate_id: &str, update: &CandidateUpdate) -> Result<Candidate> {
        let id = require_id(candidate_id)?;
        if update.is_empty() {
            return Err(RosterError::validation("no fields to update"));
        }
        let updated = self
            .guard
            .run("candidate edit", self.source.update_candidate(id, update))
            .await?;
        info!("Candidate {id} edited");
        Ok(updated)
    }

    pub async fn create(
        &self,
        new: &NewCandidate,
        resume: Option<&ResumeFile>,
    ) -> Result<Candidate> {
        new.validate()?;
        if let Some(resume) = resume {
            if resume.is_empty() {
                return Err(RosterError::validation(format!(
                    "resume '{}' is empty",
                    resume.file_name
                )));
            }
        }
        let created = self
            .guard
            .run("candidate create", self.source.create_candidate(new, resume))
            .await?;
        info!("Candidate {} created for '{}'", created.id, new.job_title);
        Ok(created)
    }
}
