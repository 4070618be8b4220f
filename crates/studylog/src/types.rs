use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Schema version written into freshly created documents.
pub const DOCUMENT_VERSION: &str = "1.0";

/// The whole persisted study log: sessions, goals, subjects and the
/// aggregates derived from them.
///
/// Unknown keys at every level that carries an `extra` map are kept as-is, so
/// a rewrite only touches what this crate owns.
///
/// # JSON shape
///
/// ```json
/// {
///   "version": "1.0",
///   "metadata": { "created": "…", "totalSessions": 1, "totalMinutes": 45 },
///   "subjects": { "Math": { "totalMinutes": 45 } },
///   "goals": [ { "id": "g-1", "title": "Linear Algebra" } ],
///   "sessions": [ { "id": 12, "timestamp": "2026-01-05T09:00:00+00:00", … } ],
///   "config": { "timezone": "Asia/Tokyo" },
///   "achievements": [],
///   "analytics": { "weeklyMinutes": [45, 0, 0, 0, 0, 0, 0] }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyDocument {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub subjects: BTreeMap<String, Subject>,
    #[serde(default)]
    pub goals: Vec<Goal>,
    #[serde(default)]
    pub sessions: Vec<Session>,
    #[serde(default)]
    pub config: Config,
    #[serde(default = "default_achievements")]
    pub achievements: Value,
    #[serde(default)]
    pub analytics: Analytics,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_version() -> String {
    DOCUMENT_VERSION.to_string()
}

fn default_achievements() -> Value {
    Value::Array(Vec::new())
}

/// Reads a derived field. A value of the wrong shape reads as the default;
/// [`crate::aggregate::recompute`] rewrites it anyway.
fn derived<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// Document-level bookkeeping. Counters are derived, see [`crate::aggregate`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(default, deserialize_with = "derived")]
    pub total_sessions: u64,
    #[serde(default, deserialize_with = "derived")]
    pub total_minutes: i64,
    #[serde(
        default,
        deserialize_with = "derived",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_updated: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    #[serde(default, deserialize_with = "derived")]
    pub total_minutes: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A learning objective. Only `id` and `title` are interpreted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Goal {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<GoalId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Goal {
    pub fn new(id: impl Into<GoalId>, title: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            title: Some(title.into()),
            extra: Map::new(),
        }
    }
}

/// A goal id as written in the document. Hand-edited files sometimes use
/// numbers; they are kept as numbers on rewrite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GoalId {
    Text(String),
    Number(Number),
}

impl GoalId {
    pub fn is_empty(&self) -> bool {
        matches!(self, GoalId::Text(s) if s.is_empty())
    }
}

impl fmt::Display for GoalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoalId::Text(s) => f.write_str(s),
            GoalId::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for GoalId {
    fn from(id: &str) -> Self {
        GoalId::Text(id.to_string())
    }
}

impl From<String> for GoalId {
    fn from(id: String) -> Self {
        GoalId::Text(id)
    }
}

/// One study-log entry, keyed by the issue number it came from.
///
/// Every key is always serialized; absent values are written as `null` or an
/// empty list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: i64,
    pub timestamp: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub goal_id: Option<String>,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub difficulty: Option<i64>,
    #[serde(default)]
    pub satisfaction: Option<i64>,
    #[serde(default)]
    pub issue_url: Option<String>,
}

impl Session {
    /// Duration in minutes, with a missing value counted as zero.
    pub fn minutes(&self) -> i64 {
        self.duration.unwrap_or(0)
    }
}

/// A study material line of the form `type:name:detail`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub detail: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// IANA zone name used for the weekly window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    /// Minutes per weekday of the current week, Monday first.
    #[serde(
        default,
        deserialize_with = "derived",
        skip_serializing_if = "Option::is_none"
    )]
    pub weekly_minutes: Option<[i64; 7]>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Whether an upsert added a new session or replaced an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Replaced,
}

impl StudyDocument {
    /// A document with no sessions, goals or subjects, created at `now`.
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            version: default_version(),
            metadata: Metadata {
                created: Some(now.to_rfc3339()),
                ..Metadata::default()
            },
            subjects: BTreeMap::new(),
            goals: Vec::new(),
            sessions: Vec::new(),
            config: Config::default(),
            achievements: default_achievements(),
            analytics: Analytics::default(),
            extra: Map::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Two-space indented JSON with non-ASCII text kept literal.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Insert `session`, replacing any existing session with the same id, then
    /// re-sort the collection by id.
    pub fn upsert_session(&mut self, session: Session) -> Upsert {
        let outcome = match self.sessions.iter_mut().find(|s| s.id == session.id) {
            Some(existing) => {
                *existing = session;
                Upsert::Replaced
            }
            None => {
                self.sessions.push(session);
                Upsert::Inserted
            }
        };
        self.sessions.sort_by_key(|s| s.id);
        outcome
    }

    pub fn session(&self, id: i64) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }
}
