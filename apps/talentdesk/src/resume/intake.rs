use std::sync::Arc;

use tracing::info;

use crate::api_client::{CandidateSource, RequestGuard};
use crate::errors::{Result, RosterError};
use crate::models::resume_file::mime_for;
use crate::models::ResumeFile;
use crate::resume::extractor::{extract_fields, ExtractedFields};

/// Upload-then-extract flow of the add-candidate form.
///
/// The backend turns the file into text; field extraction happens locally.
/// Any failure is returned so the caller can fall back to manual entry.
#[derive(Clone)]
pub struct ResumeIntake {
    source: Arc<dyn CandidateSource>,
    guard: RequestGuard,
}

impl ResumeIntake {
    pub fn new(source: Arc<dyn CandidateSource>, guard: RequestGuard) -> Self {
        Self { source, guard }
    }

    pub async fn upload_and_extract(&self, resume: &ResumeFile) -> Result<ExtractedFields> {
        if resume.is_empty() {
            return Err(RosterError::validation(format!(
                "resume '{}' is empty",
                resume.file_name
            )));
        }
        mime_for(&resume.file_name)?;

        let text = self
            .guard
            .run("resume upload", self.source.upload_resume(resume))
            .await?;
        let fields = extract_fields(&text);
        info!(
            "Extracted resume fields from '{}' ({} chars, empty={})",
            resume.file_name,
            text.len(),
            fields.is_empty()
        );
        Ok(fields)
    }
}
