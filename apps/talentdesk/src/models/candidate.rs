use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{Result, RosterError};

/// Pipeline stage of a candidate. Declaration order is pipeline order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CandidateStatus {
    #[default]
    #[serde(rename = "L1 Selected")]
    L1Selected,
    #[serde(rename = "L2 Selected")]
    L2Selected,
    #[serde(rename = "Final Selected")]
    FinalSelected,
    #[serde(rename = "Documentation")]
    Documentation,
    #[serde(rename = "Offered")]
    Offered,
    #[serde(rename = "Joined")]
    Joined,
    /// The backend spells this stage "Archieve".
    #[serde(rename = "Archieve", alias = "Archive")]
    Archived,
}

impl CandidateStatus {
    pub const ALL: [CandidateStatus; 7] = [
        CandidateStatus::L1Selected,
        CandidateStatus::L2Selected,
        CandidateStatus::FinalSelected,
        CandidateStatus::Documentation,
        CandidateStatus::Offered,
        CandidateStatus::Joined,
        CandidateStatus::Archived,
    ];

    /// Wire spelling, as sent in `status` bodies and query parameters.
    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateStatus::L1Selected => "L1 Selected",
            CandidateStatus::L2Selected => "L2 Selected",
            CandidateStatus::FinalSelected => "Final Selected",
            CandidateStatus::Documentation => "Documentation",
            CandidateStatus::Offered => "Offered",
            CandidateStatus::Joined => "Joined",
            CandidateStatus::Archived => "Archieve",
        }
    }
}

impl fmt::Display for CandidateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CandidateStatus {
    type Err = RosterError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(RosterError::validation("status cannot be empty"));
        }
        if s.eq_ignore_ascii_case("archive") {
            return Ok(CandidateStatus::Archived);
        }
        CandidateStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| RosterError::validation(format!("unknown candidate status '{s}'")))
    }
}

/// A reference to a job or client. The backend sends either the bare id or,
/// when it populates the relation, a small object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reference {
    Id(String),
    Populated {
        #[serde(rename = "_id", alias = "id")]
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
}

impl Reference {
    pub fn id(&self) -> &str {
        match self {
            Reference::Id(id) => id,
            Reference::Populated { id, .. } => id,
        }
    }

    /// Job title or client name when the relation was populated.
    pub fn label(&self) -> Option<&str> {
        match self {
            Reference::Id(_) => None,
            Reference::Populated { title, name, .. } => title.as_deref().or(name.as_deref()),
        }
    }
}

/// A candidate record as returned by the backend.
///
/// Profile fields (experience, compensation, location, ...) are kept as an
/// opaque map: the roster never interprets them, it only hands them back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<Reference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<Reference>,
    #[serde(default)]
    pub status: CandidateStatus,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(rename = "resume_url", alias = "resumeUrl", default)]
    pub resume_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl Candidate {
    pub fn remarks(&self) -> &str {
        self.remarks.as_deref().unwrap_or("")
    }

    pub fn job_id(&self) -> Option<&str> {
        self.job_id.as_ref().map(Reference::id)
    }

    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_ref().map(Reference::id)
    }
}

/// Optional profile fields shared by the create form and the general edit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_experience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevant_experience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_ctc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_ctc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice_period: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl CandidateProfile {
    fn form_fields(&self) -> Vec<(&'static str, &Option<String>)> {
        vec![
            ("total_experience", &self.total_experience),
            ("relevant_experience", &self.relevant_experience),
            ("current_ctc", &self.current_ctc),
            ("expected_ctc", &self.expected_ctc),
            ("current_location", &self.current_location),
            ("preferred_location", &self.preferred_location),
            ("notice_period", &self.notice_period),
            ("current_company", &self.current_company),
            ("source", &self.source),
        ]
    }
}

/// Fields of the "add candidate" form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewCandidate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub job_title: String,
    pub client_id: Option<String>,
    pub status: Option<CandidateStatus>,
    pub remarks: String,
    pub profile: CandidateProfile,
}

impl NewCandidate {
    /// First name, email and job title are required.
    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("firstName", &self.first_name),
            ("email", &self.email),
            ("jobTitle", &self.job_title),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(RosterError::validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )))
        }
    }

    /// Multipart text parts in submission order. Empty values are left out so
    /// the backend applies its own defaults.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let status = self.status.map(|s| s.as_str().to_string());
        let mut fields: Vec<(&'static str, Option<&str>)> = vec![
            ("clientId", self.client_id.as_deref()),
            ("firstName", Some(self.first_name.as_str())),
            ("lastName", Some(self.last_name.as_str())),
            ("email", Some(self.email.as_str())),
            ("phone", Some(self.phone.as_str())),
            ("jobTitle", Some(self.job_title.as_str())),
            ("status", status.as_deref()),
            ("remarks", Some(self.remarks.as_str())),
        ];
        fields.extend(
            self.profile
                .form_fields()
                .into_iter()
                .map(|(k, v)| (k, v.as_deref())),
        );

        fields
            .into_iter()
            .filter_map(|(k, v)| {
                let v = v?.trim();
                (!v.is_empty()).then(|| (k, v.to_string()))
            })
            .collect()
    }
}

/// Body of the general edit (`PUT /candidates/{id}`). Absent fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CandidateUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CandidateStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(flatten)]
    pub profile: CandidateProfile,
}

impl CandidateUpdate {
    pub fn is_empty(&self) -> bool {
        self == &CandidateUpdate::default()
    }
}
