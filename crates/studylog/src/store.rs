use crate::error::{Result, StudyLogError};
use crate::types::StudyDocument;
use chrono::{DateTime, Utc};
use std::io::Write;
use std::path::Path;

/// Read a study document, failing if it is missing or malformed.
pub fn load(path: &Path) -> Result<StudyDocument> {
    let json = std::fs::read_to_string(path)?;
    Ok(StudyDocument::from_json(&json)?)
}

/// Read a study document, starting over from an empty one when the file is
/// missing or is not JSON at all. JSON that does not fit the document shape is
/// an error, so the caller never overwrites data it could not understand.
pub fn load_or_default(path: &Path, now: DateTime<Utc>) -> Result<StudyDocument> {
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::info!("{} not found, starting a new study document", path.display());
            return Ok(StudyDocument::empty(now));
        }
        // Not UTF-8, so not JSON either.
        Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
            log::warn!("{} is not text: {}; starting a new study document", path.display(), e);
            return Ok(StudyDocument::empty(now));
        }
        Err(e) => return Err(e.into()),
    };
    let value: serde_json::Value = match serde_json::from_str(&json) {
        Ok(value) => value,
        Err(e) => {
            log::warn!(
                "{} is not valid JSON: {}; starting a new study document",
                path.display(),
                e
            );
            return Ok(StudyDocument::empty(now));
        }
    };
    Ok(serde_json::from_value(value)?)
}

/// Pretty-print `doc` to `path`, replacing the previous file in one rename.
pub fn save(path: &Path, doc: &StudyDocument) -> Result<()> {
    let mut json = doc.to_json_pretty()?;
    json.push('\n');
    write_atomic(path, json.as_bytes())
}

/// Write `contents` to a temp file next to `path` and rename it into place.
/// Missing parent directories are created.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| StudyLogError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}
