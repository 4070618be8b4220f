use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use studylog::record::{IssueInputs, apply_issue};
use studylog::{Upsert, load_field_labels, store};

pub fn run(data: PathBuf, template: PathBuf) -> Result<()> {
    let inputs = IssueInputs::from_env().context("Invalid issue event")?;
    if let Some(title) = &inputs.title {
        log::info!("Recording issue #{}: {}", inputs.number, title);
    }
    let outcome = record(&inputs, &data, &template, Utc::now())?;
    match outcome {
        Upsert::Inserted => println!(
            "Successfully added log #{} to {}",
            inputs.number,
            data.display()
        ),
        Upsert::Replaced => println!(
            "Successfully updated log #{} in {}",
            inputs.number,
            data.display()
        ),
    }
    Ok(())
}

/// Load, apply and save. The document is only written once both the form and
/// the existing document have been read successfully.
fn record(
    inputs: &IssueInputs,
    data: &Path,
    template: &Path,
    now: DateTime<Utc>,
) -> Result<Upsert> {
    let labels = load_field_labels(template)
        .with_context(|| format!("Failed to load form definition {}", template.display()))?;
    let mut doc = store::load_or_default(data, now)
        .with_context(|| format!("Error reading or parsing {}", data.display()))?;
    let outcome = apply_issue(&mut doc, inputs, &labels, now);
    store::save(data, &doc).with_context(|| format!("Failed to write {}", data.display()))?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use studylog::StudyDocument;
    use tempfile::TempDir;

    const FORM: &str = r#"name: 学習記録
body:
  - type: input
    id: subject
    attributes:
      label: 学習科目
  - type: input
    id: duration
    attributes:
      label: 学習時間（分）
  - type: input
    id: tags
    attributes:
      label: タグ（カンマ区切り）
"#;

    fn inputs(number: i64, minutes: u32) -> IssueInputs {
        IssueInputs::from_lookup(|name| match name {
            "ISSUE_BODY" => Some(format!(
                "### 学習科目\n\n数学\n\n### 学習時間（分）\n\n{minutes}\n\n### タグ（カンマ区切り）\n\n行列, 固有値\n"
            )),
            "ISSUE_NUMBER" => Some(number.to_string()),
            "CREATED_AT" => Some("2026-01-06T01:30:00Z".to_string()),
            "ISSUE_URL" => Some(format!("https://github.com/me/study/issues/{number}")),
            _ => None,
        })
        .unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 7, 12, 0, 0).unwrap()
    }

    fn setup() -> (TempDir, PathBuf, PathBuf) {
        let dir = TempDir::new().unwrap();
        let template = dir.path().join("study_log.yml");
        std::fs::write(&template, FORM).unwrap();
        let data = dir.path().join("data").join("study-data.json");
        (dir, data, template)
    }

    #[test]
    fn test_record_new_document() {
        let (_dir, data, template) = setup();
        assert_eq!(
            record(&inputs(3, 40), &data, &template, now()).unwrap(),
            Upsert::Inserted
        );
        let doc: StudyDocument =
            serde_json::from_str(&std::fs::read_to_string(&data).unwrap()).unwrap();
        assert_eq!(doc.sessions.len(), 1);
        assert_eq!(doc.sessions[0].subject.as_deref(), Some("数学"));
        assert_eq!(doc.sessions[0].tags, ["行列", "固有値"]);
        assert_eq!(doc.metadata.total_minutes, 40);
    }

    #[test]
    fn test_record_replaces_and_sorts() {
        let (_dir, data, template) = setup();
        record(&inputs(9, 10), &data, &template, now()).unwrap();
        record(&inputs(2, 20), &data, &template, now()).unwrap();
        assert_eq!(
            record(&inputs(9, 30), &data, &template, now()).unwrap(),
            Upsert::Replaced
        );
        let doc: StudyDocument =
            serde_json::from_str(&std::fs::read_to_string(&data).unwrap()).unwrap();
        let ids: Vec<i64> = doc.sessions.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2, 9]);
        assert_eq!(doc.metadata.total_minutes, 50);
    }

    #[test]
    fn test_record_missing_template_leaves_data_untouched() {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("study-data.json");
        std::fs::write(&data, "{\"sessions\": []}").unwrap();
        let err = record(&inputs(1, 5), &data, &dir.path().join("nope.yml"), now()).unwrap_err();
        assert!(err.to_string().contains("Failed to load form definition"));
        assert_eq!(std::fs::read_to_string(&data).unwrap(), "{\"sessions\": []}");
    }

    #[test]
    fn test_record_mismatched_document_left_untouched() {
        let (_dir, data, template) = setup();
        std::fs::create_dir_all(data.parent().unwrap()).unwrap();
        let json = r#"{"goals": [{"id": "g-1", "title": "数学"}], "sessions": "none"}"#;
        std::fs::write(&data, json).unwrap();
        let err = record(&inputs(4, 15), &data, &template, now()).unwrap_err();
        assert!(err.to_string().contains("Error reading or parsing"));
        assert_eq!(std::fs::read_to_string(&data).unwrap(), json);
    }
}
