//! Keeps the issue form's goal dropdown in step with the document's goals.

use crate::error::{Result, StudyLogError};
use crate::store;
use crate::types::Goal;
use serde_yaml::{Mapping, Value};
use std::path::Path;

/// Id of the dropdown item whose options mirror the goals.
pub const GOAL_DROPDOWN_ID: &str = "goalId";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Options differed and were replaced.
    Updated,
    UpToDate,
    /// The form has no `goalId` item; nothing was changed.
    DropdownMissing,
}

/// Dropdown options for `goals`: an empty "no goal" entry, then
/// `"{title} ({id})"` for each goal with both fields set, in document order.
pub fn goal_options(goals: &[Goal]) -> Vec<String> {
    let mut options = vec![String::new()];
    options.extend(goals.iter().filter_map(|goal| {
        let title = goal.title.as_deref().filter(|t| !t.is_empty())?;
        let id = goal.id.as_ref().filter(|i| !i.is_empty())?;
        Some(format!("{title} ({id})"))
    }));
    options
}

/// Replace the goal dropdown's options inside a parsed form, leaving every
/// other key where it was.
pub fn apply_options(form: &mut Value, options: &[String]) -> Result<SyncOutcome> {
    let Some(body) = form.get_mut("body") else {
        return Ok(SyncOutcome::DropdownMissing);
    };
    let Some(items) = body.as_sequence_mut() else {
        return Err(invalid("`body` is not a list"));
    };
    let Some(item) = items
        .iter_mut()
        .find(|item| item.get("id").and_then(Value::as_str) == Some(GOAL_DROPDOWN_ID))
    else {
        return Ok(SyncOutcome::DropdownMissing);
    };
    let Some(item) = item.as_mapping_mut() else {
        return Err(invalid("goal dropdown is not a mapping"));
    };

    let wanted = Value::Sequence(options.iter().cloned().map(Value::String).collect());
    let attributes = item
        .entry(Value::String("attributes".into()))
        .or_insert_with(|| Value::Mapping(Mapping::new()));
    let Some(attributes) = attributes.as_mapping_mut() else {
        return Err(invalid("goal dropdown `attributes` is not a mapping"));
    };
    if attributes.get("options") == Some(&wanted) {
        return Ok(SyncOutcome::UpToDate);
    }
    attributes.insert(Value::String("options".into()), wanted);
    Ok(SyncOutcome::Updated)
}

fn invalid(reason: &str) -> StudyLogError {
    StudyLogError::InvalidTemplate {
        path: Default::default(),
        reason: reason.to_string(),
    }
}

/// Sync the form definition at `path` with `goals`. The file is rewritten
/// only when the options changed and `dry_run` is false.
pub fn sync_template(path: &Path, goals: &[Goal], dry_run: bool) -> Result<SyncOutcome> {
    let yaml = match std::fs::read_to_string(path) {
        Ok(yaml) => yaml,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(StudyLogError::TemplateNotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };
    let mut form: Value = serde_yaml::from_str(&yaml).map_err(|e| {
        StudyLogError::InvalidTemplate {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
    })?;

    let options = goal_options(goals);
    let outcome = apply_options(&mut form, &options).map_err(|e| match e {
        StudyLogError::InvalidTemplate { reason, .. } => StudyLogError::InvalidTemplate {
            path: path.to_path_buf(),
            reason,
        },
        other => other,
    })?;

    if outcome == SyncOutcome::Updated {
        if dry_run {
            log::info!("Dry run: not writing {}", path.display());
        } else {
            let yaml = serde_yaml::to_string(&form)?;
            store::write_atomic(path, yaml.as_bytes())?;
            log::debug!("Wrote {} goal options to {}", options.len(), path.display());
        }
    }
    Ok(outcome)
}
