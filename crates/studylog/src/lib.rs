//! Study-log automation for GitHub issue forms.
//!
//! Each study session is submitted as an issue filled in from a form. This
//! crate turns the rendered issue body into a [`Session`], upserts it into the
//! JSON [`StudyDocument`], recomputes the document's totals, and keeps the
//! form's goal dropdown in sync with the document's goals.
//!
//! The two entry points are independent:
//!
//! - [`record::apply_issue`]: parse → upsert → [`aggregate::recompute`]
//! - [`sync::sync_template`]: goals → dropdown options
//!
//! # Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use std::collections::BTreeMap;
//! use studylog::record::{apply_issue, IssueInputs};
//! use studylog::StudyDocument;
//!
//! let labels = BTreeMap::from([
//!     ("subject".to_string(), "Subject".to_string()),
//!     ("duration".to_string(), "Duration".to_string()),
//! ]);
//! let inputs = IssueInputs::from_lookup(|name| match name {
//!     "ISSUE_BODY" => Some("### Subject\n\nMath\n\n### Duration\n\n45".into()),
//!     "ISSUE_NUMBER" => Some("7".into()),
//!     "CREATED_AT" => Some("2026-01-05T09:00:00Z".into()),
//!     "ISSUE_URL" => Some("https://github.com/me/study/issues/7".into()),
//!     _ => None,
//! })?;
//!
//! let now = Utc.with_ymd_and_hms(2026, 1, 7, 12, 0, 0).unwrap();
//! let mut doc = StudyDocument::empty(now);
//! apply_issue(&mut doc, &inputs, &labels, now);
//!
//! assert_eq!(doc.metadata.total_sessions, 1);
//! assert_eq!(doc.metadata.total_minutes, 45);
//! assert_eq!(doc.analytics.weekly_minutes, Some([45, 0, 0, 0, 0, 0, 0]));
//! # Ok::<(), studylog::StudyLogError>(())
//! ```

pub mod aggregate;
pub mod error;
pub mod form;
pub mod parse;
pub mod record;
pub mod store;
pub mod sync;
pub mod types;

pub use error::{Result, StudyLogError};
pub use form::{FieldLabels, IssueForm, load_field_labels};
pub use parse::{FieldValue, ParsedFields, parse_body};
pub use record::{IssueInputs, apply_issue};
pub use sync::{SyncOutcome, goal_options, sync_template};
pub use types::{
    Analytics, Config, Goal, GoalId, Material, Metadata, Session, StudyDocument, Subject, Upsert,
};
