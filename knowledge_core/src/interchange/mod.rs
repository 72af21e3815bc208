//! Interchange - bulk JSON payloads in and out of the graph.
//!
//! A payload has the shape
//! `{ "metadata": {...}, "nodes": [...], "relationships": [...] }`.
//! Validation is independent of any graph; import is best-effort and
//! reports every element it could not apply.

mod export;
mod import;
mod validate;

pub use export::*;
pub use import::*;
pub use validate::*;

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors reading or writing payload files.
#[derive(Debug, Error)]
pub enum InterchangeError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// Read a JSON payload from a file.
pub fn read_payload(path: impl AsRef<Path>) -> Result<Value, InterchangeError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| InterchangeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}

/// Write a payload to a file as pretty-printed JSON.
pub fn write_payload(path: impl AsRef<Path>, payload: &Value) -> Result<(), InterchangeError> {
    let path = path.as_ref();
    let content = serde_json::to_string_pretty(payload)?;
    fs::write(path, content).map_err(|source| InterchangeError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");
        let payload = json!({"nodes": [{"id": "cpp", "name": "C++"}], "relationships": []});

        write_payload(&path, &payload).unwrap();
        assert_eq!(read_payload(&path).unwrap(), payload);
    }

    #[test]
    fn test_missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");

        let err = read_payload(&path).unwrap_err();
        assert!(matches!(err, InterchangeError::Io { .. }));
        assert!(err.to_string().contains("absent.json"));
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{\"nodes\": [").unwrap();

        assert!(matches!(read_payload(&path), Err(InterchangeError::Json(_))));
    }
}
