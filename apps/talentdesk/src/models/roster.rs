use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, RosterError};
use crate::models::candidate::{Candidate, CandidateStatus};

/// The partition of candidates a roster view displays.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    Job(String),
    Client(String),
    All,
    /// Every candidate currently at the `Offered` stage.
    Offered,
}

impl Scope {
    /// Value of the `scope` query parameter.
    pub fn as_param(&self) -> String {
        match self {
            Scope::Job(id) => format!("job:{id}"),
            Scope::Client(id) => format!("client:{id}"),
            Scope::All => "all".to_string(),
            Scope::Offered => "offered".to_string(),
        }
    }

    /// Status filter the scope imposes regardless of the query.
    pub fn fixed_status(&self) -> Option<CandidateStatus> {
        match self {
            Scope::Offered => Some(CandidateStatus::Offered),
            _ => None,
        }
    }

    /// Whether a record belongs to this partition, ignoring any query filter.
    pub fn contains(&self, candidate: &Candidate) -> bool {
        match self {
            Scope::Job(id) => candidate.job_id() == Some(id.as_str()),
            Scope::Client(id) => candidate.client_id() == Some(id.as_str()),
            Scope::All => true,
            Scope::Offered => candidate.status == CandidateStatus::Offered,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_param())
    }
}

/// Parameters identifying one roster view state.
///
/// Equality is the view-state identity: scope, page, search and status filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RosterQuery {
    pub scope: Scope,
    /// 1-based.
    pub page: u32,
    pub search: String,
    pub status: Option<CandidateStatus>,
}

impl RosterQuery {
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            page: 1,
            search: String::new(),
            status: None,
        }
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    pub fn status(mut self, status: CandidateStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn any_status(mut self) -> Self {
        self.status = None;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.page == 0 {
            return Err(RosterError::validation("page numbers start at 1"));
        }
        Ok(())
    }

    /// Search term as sent to the backend.
    pub fn search_term(&self) -> &str {
        self.search.trim()
    }

    pub fn is_search(&self) -> bool {
        !self.search_term().is_empty()
    }

    /// Status filter actually applied: the scope's fixed filter wins.
    pub fn effective_status(&self) -> Option<CandidateStatus> {
        self.scope.fixed_status().or(self.status)
    }

    /// Whether a record satisfies the scope and status filter. The search term
    /// is the backend's business and is not evaluated here.
    pub fn admits(&self, candidate: &Candidate) -> bool {
        self.scope.contains(candidate)
            && self
                .effective_status()
                .map_or(true, |status| candidate.status == status)
    }

    /// The same query with the search term removed.
    pub fn without_search(&self) -> Self {
        self.clone().search(String::new())
    }

    /// Query-string pairs for `GET /candidates`.
    pub fn to_params(&self, limit: u32) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("scope", self.scope.as_param()),
            ("page", self.page.to_string()),
            ("limit", limit.to_string()),
        ];
        if let Some(status) = self.effective_status() {
            params.push(("status", status.as_str().to_string()));
        }
        if self.is_search() {
            params.push(("q", self.search_term().to_string()));
        }
        params
    }
}

/// One resolved page of a roster, in server order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterPage {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(default = "first_page")]
    pub current_page: u32,
    #[serde(default = "first_page")]
    pub total_pages: u32,
    #[serde(default)]
    pub total_candidates: u64,
}

fn first_page() -> u32 {
    1
}

impl RosterPage {
    pub fn position(&self, candidate_id: &str) -> Option<usize> {
        self.candidates.iter().position(|c| c.id == candidate_id)
    }

    pub fn get(&self, candidate_id: &str) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.id == candidate_id)
    }

    /// Replaces the record with the same id. Returns false when absent.
    pub fn replace(&mut self, candidate: &Candidate) -> bool {
        match self.position(&candidate.id) {
            Some(idx) => {
                self.candidates[idx] = candidate.clone();
                true
            }
            None => false,
        }
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}
