//! In-memory `CandidateSource` for unit tests: a tiny backend with pagination,
//! scope/status/search filtering, per-query latency and failure injection.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Map;

use crate::api_client::CandidateSource;
use crate::errors::{Result, RosterError};
use crate::models::{
    Candidate, CandidateStatus, CandidateUpdate, NewCandidate, Reference, ResumeFile, RosterPage,
    RosterQuery,
};

pub fn candidate(id: &str, name: &str, job_id: &str, status: CandidateStatus) -> Candidate {
    Candidate {
        id: id.to_string(),
        name: name.to_string(),
        email: format!("{}@example.com", id),
        phone: String::new(),
        job_id: Some(Reference::Id(job_id.to_string())),
        client_id: Some(Reference::Id("cl1".to_string())),
        status,
        remarks: None,
        resume_url: None,
        created_at: None,
        profile: Map::new(),
    }
}

/// `count` candidates `c1..=cN` for job `j1`, all at L1.
pub fn roster(count: usize) -> Vec<Candidate> {
    (1..=count)
        .map(|i| {
            candidate(
                &format!("c{i}"),
                &format!("Candidate {i}"),
                "j1",
                CandidateStatus::L1Selected,
            )
        })
        .collect()
}

#[derive(Default)]
struct Inner {
    records: Vec<Candidate>,
    jobs: HashMap<String, String>,
    delays: HashMap<RosterQuery, Duration>,
    fetch_failures: VecDeque<RosterError>,
    mutation_failures: VecDeque<RosterError>,
    upload_failures: VecDeque<RosterError>,
    fetches: Vec<RosterQuery>,
    mutations: usize,
    uploads: usize,
    created: usize,
    extracted_text: String,
}

#[derive(Default)]
pub struct ScriptedSource {
    inner: Mutex<Inner>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<Candidate>) -> Self {
        let source = Self::new();
        source.inner.lock().unwrap().records = records;
        source
    }

    pub fn with_job(self, id: &str, title: &str) -> Self {
        self.inner
            .lock()
            .unwrap()
            .jobs
            .insert(title.to_string(), id.to_string());
        self
    }

    /// Latency of every fetch for exactly this view state.
    pub fn delay(&self, query: RosterQuery, latency: Duration) {
        self.inner.lock().unwrap().delays.insert(query, latency);
    }

    pub fn fail_next_fetch(&self, err: RosterError) {
        self.inner.lock().unwrap().fetch_failures.push_back(err);
    }

    pub fn fail_next_mutation(&self, err: RosterError) {
        self.inner.lock().unwrap().mutation_failures.push_back(err);
    }

    pub fn fail_next_upload(&self, err: RosterError) {
        self.inner.lock().unwrap().upload_failures.push_back(err);
    }

    pub fn set_extracted_text(&self, text: &str) {
        self.inner.lock().unwrap().extracted_text = text.to_string();
    }

    /// Changes a record behind the roster's back, as another user would.
    pub fn set_status(&self, id: &str, status: CandidateStatus) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(c) = inner.records.iter_mut().find(|c| c.id == id) {
            c.status = status;
        }
    }

    pub fn fetches(&self) -> Vec<RosterQuery> {
        self.inner.lock().unwrap().fetches.clone()
    }

    pub fn fetch_calls(&self) -> usize {
        self.inner.lock().unwrap().fetches.len()
    }

    pub fn mutation_calls(&self) -> usize {
        self.inner.lock().unwrap().mutations
    }

    pub fn upload_calls(&self) -> usize {
        self.inner.lock().unwrap().uploads
    }

    fn mutate<F>(&self, id: &str, apply: F) -> Result<Candidate>
    where
        F: FnOnce(&mut Candidate),
    {
        let mut inner = self.inner.lock().unwrap();
        inner.mutations += 1;
        if let Some(err) = inner.mutation_failures.pop_front() {
            return Err(err);
        }
        let record = inner
            .records
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| RosterError::Network(format!("status 404: candidate {id} not found")))?;
        apply(record);
        Ok(record.clone())
    }
}

#[async_trait]
impl CandidateSource for ScriptedSource {
    async fn fetch_page(&self, query: &RosterQuery, limit: u32) -> Result<RosterPage> {
        let (latency, outcome) = {
            let mut inner = self.inner.lock().unwrap();
            inner.fetches.push(query.clone());
            let latency = inner.delays.get(query).copied();
            let outcome = match inner.fetch_failures.pop_front() {
                Some(err) => Err(err),
                None => Ok(paginate(&inner.records, query, limit)),
            };
            (latency, outcome)
        };

        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        outcome
    }

    async fn update_status(&self, candidate_id: &str, status: CandidateStatus) -> Result<Candidate> {
        self.mutate(candidate_id, |c| c.status = status)
    }

    async fn update_remarks(&self, candidate_id: &str, remarks: &str) -> Result<Candidate> {
        self.mutate(candidate_id, |c| c.remarks = Some(remarks.to_string()))
    }

    async fn update_candidate(
        &self,
        candidate_id: &str,
        update: &CandidateUpdate,
    ) -> Result<Candidate> {
        self.mutate(candidate_id, |c| {
            if let Some(name) = &update.name {
                c.name = name.clone();
            }
            if let Some(email) = &update.email {
                c.email = email.clone();
            }
            if let Some(phone) = &update.phone {
                c.phone = phone.clone();
            }
            if let Some(status) = update.status {
                c.status = status;
            }
            if let Some(remarks) = &update.remarks {
                c.remarks = Some(remarks.clone());
            }
        })
    }

    async fn create_candidate(
        &self,
        new: &NewCandidate,
        _resume: Option<&ResumeFile>,
    ) -> Result<Candidate> {
        let mut inner = self.inner.lock().unwrap();
        inner.mutations += 1;
        if let Some(err) = inner.mutation_failures.pop_front() {
            return Err(err);
        }
        inner.created += 1;
        let job_id = inner
            .jobs
            .get(&new.job_title)
            .cloned()
            .unwrap_or_else(|| new.job_title.clone());
        let mut record = candidate(
            &format!("new{}", inner.created),
            format!("{} {}", new.first_name, new.last_name).trim(),
            &job_id,
            new.status.unwrap_or_default(),
        );
        record.email = new.email.clone();
        // Newest first, like the backend's recency ordering.
        inner.records.insert(0, record.clone());
        Ok(record)
    }

    async fn upload_resume(&self, _resume: &ResumeFile) -> Result<String> {
        let mut inner = self.inner.lock().unwrap();
        inner.uploads += 1;
        if let Some(err) = inner.upload_failures.pop_front() {
            return Err(err);
        }
        Ok(inner.extracted_text.clone())
    }
}

fn paginate(records: &[Candidate], query: &RosterQuery, limit: u32) -> RosterPage {
    let term = query.search_term().to_lowercase();
    let matching: Vec<&Candidate> = records
        .iter()
        .filter(|c| query.scope.contains(c))
        .filter(|c| query.effective_status().map_or(true, |s| c.status == s))
        .filter(|c| {
            term.is_empty()
                || c.name.to_lowercase().contains(&term)
                || c.email.to_lowercase().contains(&term)
        })
        .collect();

    let limit = limit.max(1) as usize;
    let total = matching.len();
    let total_pages = total.div_ceil(limit).max(1) as u32;
    let start = (query.page.saturating_sub(1) as usize) * limit;

    RosterPage {
        candidates: matching
            .into_iter()
            .skip(start)
            .take(limit)
            .cloned()
            .collect(),
        current_page: query.page,
        total_pages,
        total_candidates: total as u64,
    }
}
