use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, StudyLogError>;

#[derive(Debug, Error)]
pub enum StudyLogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Form definition not found: {0}")]
    TemplateNotFound(PathBuf),

    #[error("Invalid form definition in file {path}: {reason}")]
    InvalidTemplate { path: PathBuf, reason: String },

    #[error("Missing required input: {0}")]
    MissingInput(&'static str),

    #[error("Invalid value for {name}: {value}")]
    InvalidInput { name: &'static str, value: String },

    #[error("Failed to persist {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
