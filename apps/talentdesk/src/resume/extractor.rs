//! Resume field extractor: best-effort guess of name, email and phone from
//! raw resume text, used to pre-fill the add-candidate form.
//!
//! The result is heuristic: a person always reviews it before submission.
//! `extract_fields` is total; no input makes it fail or panic, the worst case
//! is an all-empty result.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    // Two or three capitalized words; an initial such as "A." counts as a word.
    static ref NAME_RE: Regex =
        Regex::new(r"\b[A-Z](?:[a-zA-Z'-]+|\.)(?:\s[A-Z](?:[a-zA-Z'-]+|\.)){1,2}\b").unwrap();
    static ref EMAIL_RE: Regex =
        Regex::new(r"[a-zA-Z0-9._-]+@[a-zA-Z0-9._-]+\.[a-zA-Z0-9_-]+").unwrap();
    // Optional +91 prefix, then ten digits, possibly split 5+5.
    static ref PHONE_RE: Regex =
        Regex::new(r"(?:\+?91[\s-]?)?([0-9]{10}|[0-9]{5}[\s-][0-9]{5})").unwrap();
}

/// Form pre-fill values. Empty strings mean "not found".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedFields {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

impl ExtractedFields {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_empty()
            && self.last_name.is_empty()
            && self.email.is_empty()
            && self.phone.is_empty()
    }
}

/// Extracts the first plausible name, email and phone number from `text`.
pub fn extract_fields(text: &str) -> ExtractedFields {
    let cleaned = normalize_whitespace(text);

    let (first_name, last_name) = NAME_RE
        .find(&cleaned)
        .map(|m| split_name(m.as_str()))
        .unwrap_or_default();

    let email = EMAIL_RE
        .find(&cleaned)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    let phone = PHONE_RE
        .captures(&cleaned)
        .and_then(|c| c.get(1))
        .map(|m| {
            m.as_str()
                .chars()
                .filter(|c| !c.is_whitespace() && *c != '-')
                .collect()
        })
        .unwrap_or_default();

    ExtractedFields {
        first_name,
        last_name,
        email,
        phone,
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn split_name(name: &str) -> (String, String) {
    let mut parts = name.split(' ');
    let first = parts.next().unwrap_or_default().to_string();
    let rest = parts.collect::<Vec<_>>().join(" ");
    (first, rest)
}
