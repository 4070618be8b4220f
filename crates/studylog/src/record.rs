//! Turning one issue event into a stored session.

use crate::aggregate;
use crate::error::{Result, StudyLogError};
use crate::form::FieldLabels;
use crate::parse::{self, ParsedFields, field};
use crate::types::{Session, StudyDocument, Upsert};
use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};

pub const ENV_BODY: &str = "ISSUE_BODY";
pub const ENV_NUMBER: &str = "ISSUE_NUMBER";
pub const ENV_CREATED_AT: &str = "CREATED_AT";
pub const ENV_URL: &str = "ISSUE_URL";
pub const ENV_TITLE: &str = "ISSUE_TITLE";

/// The issue event that triggered a run.
#[derive(Debug, Clone)]
pub struct IssueInputs {
    pub body: String,
    pub number: i64,
    pub created_at: DateTime<FixedOffset>,
    pub url: String,
    pub title: Option<String>,
}

impl IssueInputs {
    /// Read inputs from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read inputs through `lookup`. Body, number, creation time and URL are
    /// required and must be non-empty.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(StudyLogError::MissingInput(name))
        };
        let body = required(ENV_BODY)?;
        let number = required(ENV_NUMBER)?;
        let created_at = required(ENV_CREATED_AT)?;
        let url = required(ENV_URL)?;

        let number = number
            .trim()
            .parse::<i64>()
            .map_err(|_| StudyLogError::InvalidInput {
                name: ENV_NUMBER,
                value: number.clone(),
            })?;
        let created_at =
            parse_timestamp(&created_at).ok_or_else(|| StudyLogError::InvalidInput {
                name: ENV_CREATED_AT,
                value: created_at.clone(),
            })?;

        Ok(Self {
            body,
            number,
            created_at,
            url,
            title: lookup(ENV_TITLE).filter(|t| !t.is_empty()),
        })
    }
}

/// Parse an ISO-8601 timestamp. A trailing `Z` means UTC, and a timestamp
/// without any offset is taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    let normalized = match value.strip_suffix('Z').or_else(|| value.strip_suffix('z')) {
        Some(stripped) => format!("{stripped}+00:00"),
        None => value.to_string(),
    };
    if let Ok(ts) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(ts);
    }
    NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Build the session record for `inputs` from the parsed fields.
pub fn build_session(inputs: &IssueInputs, fields: &ParsedFields) -> Session {
    let text = |id: &str| fields.text(id).map(str::to_string);
    Session {
        id: inputs.number,
        timestamp: inputs.created_at.to_rfc3339(),
        subject: text(field::SUBJECT),
        goal_id: text(field::GOAL_ID),
        duration: fields.integer(field::DURATION),
        content: text(field::CONTENT),
        tags: fields.list(field::TAGS).to_vec(),
        materials: fields.materials().to_vec(),
        notes: text(field::NOTES),
        difficulty: fields.integer(field::DIFFICULTY),
        satisfaction: fields.integer(field::SATISFACTION),
        issue_url: Some(inputs.url.clone()),
    }
}

/// Parse the issue, upsert its session into `doc` and recompute aggregates.
pub fn apply_issue(
    doc: &mut StudyDocument,
    inputs: &IssueInputs,
    labels: &FieldLabels,
    now: DateTime<Utc>,
) -> Upsert {
    let fields = parse::parse_body(&inputs.body, labels);
    let session = build_session(inputs, &fields);
    log::debug!(
        "Parsed issue #{}: subject={:?} duration={:?}",
        session.id,
        session.subject,
        session.duration
    );
    let outcome = doc.upsert_session(session);
    aggregate::recompute(doc, now);
    outcome
}
