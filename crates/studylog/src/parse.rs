//! Extraction of form fields from a rendered issue body.
//!
//! GitHub renders each issue-form field as a `### <label>` heading followed by
//! the submitted value. A field's value is everything between its heading and
//! the next `###` heading (or the end of the body).

use crate::form::FieldLabels;
use crate::types::Material;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Placeholder GitHub writes for optional fields left blank.
pub const NO_RESPONSE: &str = "_No response_";

/// Field identifiers with special normalization.
pub mod field {
    pub const SUBJECT: &str = "subject";
    pub const GOAL_ID: &str = "goalId";
    pub const DURATION: &str = "duration";
    pub const CONTENT: &str = "content";
    pub const TAGS: &str = "tags";
    pub const MATERIALS: &str = "materials";
    pub const NOTES: &str = "notes";
    pub const DIFFICULTY: &str = "difficulty";
    pub const SATISFACTION: &str = "satisfaction";
}

static GOAL_REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\S+)\)$").expect("valid goal reference regex"));

/// A normalized field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    List(Vec<String>),
    Materials(Vec<Material>),
}

/// Result of parsing an issue body: one entry per field id in the label map,
/// `None` where the field is absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ParsedFields {
    values: BTreeMap<String, Option<FieldValue>>,
}

impl ParsedFields {
    pub fn get(&self, id: &str) -> Option<&FieldValue> {
        self.values.get(id).and_then(Option::as_ref)
    }

    pub fn text(&self, id: &str) -> Option<&str> {
        match self.get(id) {
            Some(FieldValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn integer(&self, id: &str) -> Option<i64> {
        match self.get(id) {
            Some(FieldValue::Integer(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn list(&self, id: &str) -> &[String] {
        match self.get(id) {
            Some(FieldValue::List(items)) => items.as_slice(),
            _ => &[],
        }
    }

    pub fn materials(&self) -> &[Material] {
        match self.get(field::MATERIALS) {
            Some(FieldValue::Materials(items)) => items.as_slice(),
            _ => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Parse `body` using the field id → label mapping from the form definition.
///
/// Never fails: a missing section, the no-response placeholder or a value that
/// does not normalize leaves that field absent.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
/// use studylog::parse::{parse_body, field};
///
/// let labels = BTreeMap::from([
///     ("subject".to_string(), "Subject".to_string()),
///     ("duration".to_string(), "Duration (min)".to_string()),
/// ]);
/// let body = "### Subject\n\nMath\n\n### Duration (min)\n\n45\n";
///
/// let fields = parse_body(body, &labels);
/// assert_eq!(fields.text(field::SUBJECT), Some("Math"));
/// assert_eq!(fields.integer(field::DURATION), Some(45));
/// ```
pub fn parse_body(body: &str, labels: &FieldLabels) -> ParsedFields {
    let values = labels
        .iter()
        .map(|(id, label)| {
            let raw = section_value(body, label);
            (id.clone(), normalize(id, raw))
        })
        .collect();
    ParsedFields { values }
}

/// The trimmed text under the `### <label>` heading, or `None` when the
/// heading is missing or the value is blank or the no-response placeholder.
pub fn section_value<'a>(body: &'a str, label: &str) -> Option<&'a str> {
    let mut lines = lines_with_offsets(body);
    let (offset, heading) = lines.find(|(_, line)| heading_label(line) == Some(label))?;
    let start = offset + heading.len();
    let end = lines
        .find(|(_, line)| line.starts_with("###"))
        .map_or(body.len(), |(at, _)| at);
    let value = body[start..end].trim();
    if value.is_empty() || value == NO_RESPONSE {
        None
    } else {
        Some(value)
    }
}

/// Lines of `body` with their byte offsets, line endings included.
fn lines_with_offsets(body: &str) -> impl Iterator<Item = (usize, &str)> {
    body.split_inclusive('\n').scan(0, |offset, line| {
        let at = *offset;
        *offset += line.len();
        Some((at, line))
    })
}

/// The label of a `### <label>` heading line, without padding or line ending.
fn heading_label(line: &str) -> Option<&str> {
    line.strip_prefix("###")
        .map(|rest| rest.trim_matches([' ', '\t', '\r', '\n']))
}

fn normalize(id: &str, raw: Option<&str>) -> Option<FieldValue> {
    match id {
        field::TAGS => Some(FieldValue::List(raw.map(split_tags).unwrap_or_default())),
        field::MATERIALS => Some(FieldValue::Materials(
            raw.map(parse_materials).unwrap_or_default(),
        )),
        field::GOAL_ID => raw.map(|v| FieldValue::Text(extract_goal_id(v).to_string())),
        field::DURATION => raw.and_then(parse_minutes).map(FieldValue::Integer),
        field::DIFFICULTY | field::SATISFACTION => {
            raw.and_then(parse_rating).map(FieldValue::Integer)
        }
        _ => raw.map(|v| FieldValue::Text(v.to_string())),
    }
}

/// Pull the id out of a `"Title (id)"` dropdown option; any other value is
/// taken as the id itself.
pub fn extract_goal_id(value: &str) -> &str {
    let value = value.trim();
    GOAL_REFERENCE
        .captures(value)
        .and_then(|c| c.get(1))
        .map_or(value, |m| m.as_str())
}

pub fn split_tags(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse `type:name:detail` lines. The detail may itself contain colons;
/// lines with fewer than three parts are dropped.
pub fn parse_materials(value: &str) -> Vec<Material> {
    value
        .lines()
        .filter_map(|line| {
            let mut parts = line.splitn(3, ':');
            let kind = parts.next()?;
            let name = parts.next()?;
            let detail = parts.next()?;
            Some(Material {
                kind: kind.trim().to_string(),
                name: name.trim().to_string(),
                detail: detail.trim().to_string(),
            })
        })
        .collect()
}

fn parse_minutes(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok().filter(|n| *n >= 0)
}

fn parse_rating(value: &str) -> Option<i64> {
    value
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|n| (1..=5).contains(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> FieldLabels {
        [
            ("subject", "学習科目"),
            ("goalId", "関連ゴール"),
            ("duration", "学習時間（分）"),
            ("content", "学習内容"),
            ("tags", "タグ（カンマ区切り）"),
            ("materials", "教材"),
            ("notes", "メモ"),
            ("difficulty", "難易度 (1-5)"),
            ("satisfaction", "満足度 (1-5)"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    const BODY: &str = "### 学習科目\n\n数学\n\n### 関連ゴール\n\nLinear Algebra (g-042)\n\n### 学習時間（分）\n\n90\n\n### 学習内容\n\n固有値と固有ベクトル\n行列の対角化\n\n### タグ（カンマ区切り）\n\n線形代数, 行列 ,, \n\n### 教材\n\nbook:Calculus Vol 1:Chapter 3\nvideo:MIT 18.06\nweb:Notes:https://example.com/a\n\n### メモ\n\n_No response_\n\n### 難易度 (1-5)\n\n4\n\n### 満足度 (1-5)\n\n5";

    #[test]
    fn test_parse_full_body() {
        let fields = parse_body(BODY, &labels());
        assert_eq!(fields.len(), 9);
        assert_eq!(fields.text(field::SUBJECT), Some("数学"));
        assert_eq!(fields.text(field::GOAL_ID), Some("g-042"));
        assert_eq!(fields.integer(field::DURATION), Some(90));
        assert_eq!(
            fields.text(field::CONTENT),
            Some("固有値と固有ベクトル\n行列の対角化")
        );
        assert_eq!(fields.list(field::TAGS), ["線形代数", "行列"]);
        assert_eq!(fields.text(field::NOTES), None);
        assert_eq!(fields.integer(field::DIFFICULTY), Some(4));
        assert_eq!(fields.integer(field::SATISFACTION), Some(5));
    }

    #[test]
    fn test_materials_from_body() {
        let fields = parse_body(BODY, &labels());
        let materials = fields.materials();
        assert_eq!(materials.len(), 2);
        assert_eq!(
            materials[0],
            Material {
                kind: "book".into(),
                name: "Calculus Vol 1".into(),
                detail: "Chapter 3".into(),
            }
        );
        assert_eq!(materials[1].kind, "web");
        assert_eq!(materials[1].detail, "https://example.com/a");
    }

    #[test]
    fn test_label_punctuation_is_literal() {
        let labels: FieldLabels = [("difficulty".to_string(), "Difficulty (1-5)".to_string())]
            .into_iter()
            .collect();
        let body = "### Difficulty 1-5\n\n2\n\n### Difficulty (1-5)\n\n3\n";
        assert_eq!(parse_body(body, &labels).integer("difficulty"), Some(3));
    }

    #[test]
    fn test_label_with_regex_metacharacters() {
        let labels: FieldLabels = [
            ("score".to_string(), "Score [0-5".to_string()),
            ("notes".to_string(), "Notes (*optional*)".to_string()),
        ]
        .into_iter()
        .collect();
        let body = "###Score [0-5  \n\n4\n### Notes (*optional*)\t\r\nfine\n";
        let fields = parse_body(body, &labels);
        assert_eq!(fields.text("score"), Some("4"));
        assert_eq!(fields.text("notes"), Some("fine"));
    }

    #[test]
    fn test_heading_must_be_whole_line() {
        assert_eq!(section_value("### Subject notes\n\nx\n", "Subject"), None);
        assert_eq!(section_value("text ### Subject\n\nx\n", "Subject"), None);
        assert_eq!(section_value("### Subject", "Subject"), None);
    }

    #[test]
    fn test_missing_heading_is_absent() {
        let fields = parse_body("### 学習科目\n\n数学\n", &labels());
        assert_eq!(fields.get(field::DURATION), None);
        assert_eq!(fields.get(field::GOAL_ID), None);
        assert!(fields.list(field::TAGS).is_empty());
        assert!(fields.materials().is_empty());
    }

    #[test]
    fn test_sentinel_and_blank_are_absent() {
        let body = "### 学習科目\n\n_No response_\n\n### 学習内容\n\n   \n\n### 関連ゴール\n\n_No response_\n";
        let fields = parse_body(body, &labels());
        assert_eq!(fields.get(field::SUBJECT), None);
        assert_eq!(fields.get(field::CONTENT), None);
        assert_eq!(fields.get(field::GOAL_ID), None);
        let json = serde_json::to_string(&fields).unwrap();
        assert!(!json.contains(NO_RESPONSE));
    }

    #[test]
    fn test_bad_integers_become_null() {
        let body = "### 学習時間（分）\n\nninety\n\n### 難易度 (1-5)\n\n7\n\n### 満足度 (1-5)\n\n0\n";
        let fields = parse_body(body, &labels());
        assert_eq!(fields.integer(field::DURATION), None);
        assert_eq!(fields.integer(field::DIFFICULTY), None);
        assert_eq!(fields.integer(field::SATISFACTION), None);
        assert_eq!(fields.text(field::SUBJECT), None);
    }

    #[test]
    fn test_crlf_body() {
        let body = "### 学習科目\r\n\r\n英語\r\n\r\n### 学習時間（分）\r\n\r\n30\r\n";
        let fields = parse_body(body, &labels());
        assert_eq!(fields.text(field::SUBJECT), Some("英語"));
        assert_eq!(fields.integer(field::DURATION), Some(30));
    }

    #[test]
    fn test_extract_goal_id() {
        assert_eq!(extract_goal_id("Linear Algebra (g-042)"), "g-042");
        assert_eq!(extract_goal_id("g-042"), "g-042");
        assert_eq!(extract_goal_id("Read (a lot) of books"), "Read (a lot) of books");
        assert_eq!(extract_goal_id("  TOEIC 900 (toeic)  "), "toeic");
    }

    #[test]
    fn test_parse_materials_drops_short_lines() {
        let materials = parse_materials("book:Calculus Vol 1:Chapter 3\nvideo:Lecture 5\n\nplain");
        assert_eq!(materials.len(), 1);
        assert_eq!(materials[0].name, "Calculus Vol 1");
    }

    #[test]
    fn test_split_tags() {
        assert_eq!(split_tags(" a, b ,,c ,"), ["a", "b", "c"]);
        assert!(split_tags(" , ").is_empty());
    }

    #[test]
    fn test_unknown_field_is_text() {
        let labels: FieldLabels = [("mood".to_string(), "Mood".to_string())]
            .into_iter()
            .collect();
        let fields = parse_body("### Mood\n\ngood\n", &labels);
        assert_eq!(fields.text("mood"), Some("good"));
    }
}
