//! Issue form definition (`.github/ISSUE_TEMPLATE/*.yml`) loading.

use crate::error::{Result, StudyLogError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Field id → display label, as declared by the form.
pub type FieldLabels = BTreeMap<String, String>;

/// The subset of a GitHub issue form this crate reads.
#[derive(Debug, Clone, Deserialize)]
pub struct IssueForm {
    #[serde(default)]
    pub name: Option<String>,
    pub body: Vec<FormItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormItem {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub attributes: Option<FormAttributes>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormAttributes {
    #[serde(default)]
    pub label: Option<String>,
}

impl IssueForm {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read and parse a form definition file.
    pub fn load(path: &Path) -> Result<Self> {
        let yaml = match std::fs::read_to_string(path) {
            Ok(yaml) => yaml,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StudyLogError::TemplateNotFound(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        Self::from_yaml(&yaml).map_err(|e| StudyLogError::InvalidTemplate {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Labels of every item that declares both an id and a label.
    pub fn field_labels(&self) -> FieldLabels {
        self.body
            .iter()
            .filter_map(|item| {
                let id = item.id.as_ref()?;
                let label = item.attributes.as_ref()?.label.as_ref()?;
                Some((id.clone(), label.clone()))
            })
            .collect()
    }
}

/// Load the id → label mapping from the form definition at `path`.
pub fn load_field_labels(path: &Path) -> Result<FieldLabels> {
    let form = IssueForm::load(path)?;
    let labels = form.field_labels();
    log::debug!("Loaded {} field labels from {}", labels.len(), path.display());
    Ok(labels)
}
