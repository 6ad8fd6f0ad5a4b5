//! Candidate API client, the single point of entry for backend calls.
//!
//! Roster views and resume intake never build requests themselves; they talk to
//! a `CandidateSource`, and `HttpCandidateSource` is the one that speaks HTTP.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::errors::{Result, RosterError};
use crate::models::{
    Candidate, CandidateStatus, CandidateUpdate, NewCandidate, ResumeFile, RosterPage, RosterQuery,
};

pub mod guard;
pub mod session;

pub use guard::RequestGuard;
pub use session::{SessionProvider, StaticSession};

/// Role prefix used when none is configured.
pub const DEFAULT_API_PREFIX: &str = "/api/hr";

/// Data source behind every roster view.
///
/// Carried as `Arc<dyn CandidateSource>` so views can share one client and tests
/// can swap in an in-memory source.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    async fn fetch_page(&self, query: &RosterQuery, limit: u32) -> Result<RosterPage>;

    async fn update_status(&self, candidate_id: &str, status: CandidateStatus)
        -> Result<Candidate>;

    async fn update_remarks(&self, candidate_id: &str, remarks: &str) -> Result<Candidate>;

    async fn update_candidate(
        &self,
        candidate_id: &str,
        update: &CandidateUpdate,
    ) -> Result<Candidate>;

    async fn create_candidate(
        &self,
        new: &NewCandidate,
        resume: Option<&ResumeFile>,
    ) -> Result<Candidate>;

    /// Uploads a resume and returns the text the backend extracted from it.
    async fn upload_resume(&self, resume: &ResumeFile) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    #[serde(default)]
    extracted_text: Option<String>,
}

/// reqwest-backed `CandidateSource`. Cheap to clone.
#[derive(Clone)]
pub struct HttpCandidateSource {
    client: Client,
    base_url: Url,
    prefix: Vec<String>,
    session: Arc<dyn SessionProvider>,
}

impl HttpCandidateSource {
    pub fn new(
        base_url: &str,
        prefix: &str,
        session: Arc<dyn SessionProvider>,
        timeout: Duration,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| RosterError::validation(format!("invalid API URL '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(RosterError::validation(format!(
                "API URL '{base_url}' cannot carry a path"
            )));
        }
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            prefix: prefix
                .split('/')
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            session,
        })
    }

    /// Absolute URL for `segments` under the role prefix. Segments are
    /// percent-encoded, so opaque ids cannot escape their path position.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .extend(self.prefix.iter().map(String::as_str))
                .extend(segments);
        }
        url
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let token = self
            .session
            .credential()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| RosterError::Auth("no credential available".to_string()))?;

        let response = request.bearer_auth(token).send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            let body = response.text().await.unwrap_or_default();
            return Err(RosterError::Auth(error_message(status, body)));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Candidate API returned {}: {}", status, body);
            return Err(RosterError::Network(error_message(status, body)));
        }

        Ok(response.json::<T>().await?)
    }
}

/// Prefers the backend's `{message}` over the raw body.
fn error_message(status: StatusCode, body: String) -> String {
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .map(|e| e.message)
        .unwrap_or(body);
    if message.trim().is_empty() {
        format!("request failed with status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), message)
    }
}

fn resume_part(resume: &ResumeFile) -> Result<Part> {
    Ok(Part::bytes(resume.bytes.to_vec())
        .file_name(resume.file_name.clone())
        .mime_str(&resume.mime)?)
}

#[async_trait]
impl CandidateSource for HttpCandidateSource {
    async fn fetch_page(&self, query: &RosterQuery, limit: u32) -> Result<RosterPage> {
        let url = self.endpoint(&["candidates"]);
        debug!("GET {} scope={} page={}", url, query.scope, query.page);
        self.send(self.client.get(url).query(&query.to_params(limit)))
            .await
    }

    async fn update_status(
        &self,
        candidate_id: &str,
        status: CandidateStatus,
    ) -> Result<Candidate> {
        let url = self.endpoint(&["candidates", candidate_id, "status"]);
        debug!("PATCH {}", url);
        self.send(self.client.patch(url).json(&json!({ "status": status })))
            .await
    }

    async fn update_remarks(&self, candidate_id: &str, remarks: &str) -> Result<Candidate> {
        let url = self.endpoint(&["candidates", candidate_id, "remarks"]);
        debug!("PUT {}", url);
        self.send(self.client.put(url).json(&json!({ "remarks": remarks })))
            .await
    }

    async fn update_candidate(
        &self,
        candidate_id: &str,
        update: &CandidateUpdate,
    ) -> Result<Candidate> {
        let url = self.endpoint(&["candidates", candidate_id]);
        debug!("PUT {}", url);
        self.send(self.client.put(url).json(update)).await
    }

    async fn create_candidate(
        &self,
        new: &NewCandidate,
        resume: Option<&ResumeFile>,
    ) -> Result<Candidate> {
        let mut form = Form::new();
        for (key, value) in new.form_fields() {
            form = form.text(key, value);
        }
        if let Some(resume) = resume {
            form = form.part("resume", resume_part(resume)?);
        }

        let url = self.endpoint(&["candidates"]);
        debug!("POST {} (resume attached: {})", url, resume.is_some());
        self.send(self.client.post(url).multipart(form)).await
    }

    async fn upload_resume(&self, resume: &ResumeFile) -> Result<String> {
        let form = Form::new().part("resume", resume_part(resume)?);
        let url = self.endpoint(&["upload-resume"]);
        debug!("POST {} ({} bytes)", url, resume.bytes.len());
        let response: UploadResponse = self.send(self.client.post(url).multipart(form)).await?;
        Ok(response.extracted_text.unwrap_or_default())
    }
}
