use std::path::Path;

use bytes::Bytes;

use crate::errors::{Result, RosterError};

/// Extensions the backend's resume parser accepts, with their MIME types.
const ACCEPTED_TYPES: &[(&str, &str)] = &[
    ("pdf", "application/pdf"),
    ("doc", "application/msword"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("rtf", "application/rtf"),
    ("txt", "text/plain"),
];

/// An uploaded resume, held in memory until it is sent.
#[derive(Debug, Clone, PartialEq)]
pub struct ResumeFile {
    pub file_name: String,
    pub mime: String,
    pub bytes: Bytes,
}

impl ResumeFile {
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads a resume from disk, deriving the MIME type from the extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| RosterError::validation(format!("invalid file path {}", path.display())))?
            .to_string();
        let mime = mime_for(&file_name)?;
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            RosterError::validation(format!("cannot read {}: {e}", path.display()))
        })?;

        Ok(Self::new(file_name, mime, bytes))
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// MIME type for an accepted resume file name.
pub fn mime_for(file_name: &str) -> Result<&'static str> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    ACCEPTED_TYPES
        .iter()
        .find(|(accepted, _)| *accepted == ext)
        .map(|(_, mime)| *mime)
        .ok_or_else(|| {
            RosterError::validation(format!(
                "unsupported resume type '{file_name}' (expected pdf, doc, docx, rtf or txt)"
            ))
        })
}
