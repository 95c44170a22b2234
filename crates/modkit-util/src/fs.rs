use std::path::{Path, PathBuf};

use crate::errors::ModkitError;

/// Read a whole file as UTF-8, labelling failures with `what` so the
/// diagnostic says which input was unreadable.
pub fn read_to_string(path: &Path, what: &str) -> Result<String, ModkitError> {
    std::fs::read_to_string(path).map_err(|e| ModkitError::Generic {
        message: format!("Failed to read {what} {}: {e}", path.display()),
    })
}

/// Read `path` if it exists, returning `None` when it does not.
pub fn read_optional(path: &Path, what: &str) -> Result<Option<String>, ModkitError> {
    if !path.is_file() {
        tracing::debug!("No {what} at {}, using defaults", path.display());
        return Ok(None);
    }
    read_to_string(path, what).map(Some)
}

/// Returns the user's home directory, falling back to the current directory.
pub fn home_dir() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_optional_missing_file_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("absent.toml");
        assert!(read_optional(&path, "config").unwrap().is_none());
    }

    #[test]
    fn read_optional_existing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[resolver]\n").unwrap();
        assert_eq!(
            read_optional(&path, "config").unwrap().as_deref(),
            Some("[resolver]\n")
        );
    }

    #[test]
    fn read_optional_directory_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(read_optional(tmp.path(), "config").unwrap().is_none());
    }

    #[test]
    fn read_to_string_reports_path() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("index.json");
        let err = read_to_string(&path, "registry").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Failed to read registry"));
        assert!(msg.contains("index.json"));
    }
}
