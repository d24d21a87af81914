//! Local storage for received match files.
//!
//! Match files are plain UTF-8 text blobs written by the sync listener and
//! only ever removed by an explicit user action. The watch names every file
//! with a fixed prefix, so listing filters on that prefix and re-reads the
//! directory on every call — there is no cached view to go stale.

use anyhow::{Context, Result};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};

/// File-name prefix the watch uses for every match file it pushes.
pub const MATCH_FILE_PREFIX: &str = "B";

/// Plain-text share payload for a match file.
#[derive(Debug, Clone, PartialEq)]
pub struct SharePayload {
    pub subject: String,
    pub body: String,
}

pub struct MatchStore {
    dir: PathBuf,
}

impl MatchStore {
    /// Open the default store under the platform data directory.
    pub fn new() -> Result<Self> {
        let dir = dirs::data_dir()
            .context("Failed to get data directory")?
            .join("bowlsync")
            .join("matches");
        Self::with_dir(dir)
    }

    /// Open a store rooted at an explicit directory (config override, tests).
    pub fn with_dir(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create match directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// List stored match files, name-ascending. Only files carrying the
    /// match prefix are returned; anything else in the directory is ignored.
    pub fn list(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read match directory {}", self.dir.display()))?
        {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if name.starts_with(MATCH_FILE_PREFIX) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    pub fn read(&self, name: &str) -> Result<String> {
        fs::read_to_string(self.dir.join(name))
            .with_context(|| format!("Failed to read match file {name}"))
    }

    /// Write content verbatim, overwriting any existing file of that name.
    pub fn write(&self, name: &str, content: &str) -> Result<()> {
        fs::write(self.dir.join(name), content)
            .with_context(|| format!("Failed to write match file {name}"))
    }

    pub fn delete(&self, name: &str) -> Result<()> {
        if let Err(e) = fs::remove_file(self.dir.join(name)) {
            // File might not exist, that's ok
            if e.kind() != std::io::ErrorKind::NotFound {
                return Err(anyhow::anyhow!("Failed to delete match file {name}: {e}"));
            }
        }
        Ok(())
    }

    /// Build the plain-text share payload for a match file.
    pub fn share_payload(&self, name: &str) -> Result<SharePayload> {
        Ok(SharePayload {
            subject: format!("Bowls Scorer Match: {name}"),
            body: self.read(name)?,
        })
    }

    /// Copy a match file into the public downloads directory under a
    /// timestamp-derived name. Returns the path written.
    pub fn export_to_downloads(&self, name: &str) -> Result<PathBuf> {
        let downloads = dirs::download_dir().context("Failed to get downloads directory")?;
        self.export_to(name, &downloads)
    }

    fn export_to(&self, name: &str, target_dir: &Path) -> Result<PathBuf> {
        let content = self.read(name)?;
        let exported = format!("bowls_match_{}.txt", Local::now().format("%Y%m%d_%H%M%S"));
        let path = target_dir.join(exported);
        fs::write(&path, content)
            .with_context(|| format!("Failed to export match file to {}", path.display()))?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store() -> (TempDir, MatchStore) {
        let tmp = TempDir::new().unwrap();
        let store = MatchStore::with_dir(tmp.path().join("matches")).unwrap();
        (tmp, store)
    }

    #[test]
    fn test_list_empty() {
        let (_tmp, store) = test_store();
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_list_filters_prefix_and_sorts() {
        let (_tmp, store) = test_store();
        store.write("B2024-03-02", "b").unwrap();
        store.write("notes.txt", "x").unwrap();
        store.write("B2024-01-15", "a").unwrap();
        store.write("B2024-02-01", "c").unwrap();

        let names = store.list().unwrap();
        assert_eq!(names, vec!["B2024-01-15", "B2024-02-01", "B2024-03-02"]);
    }

    #[test]
    fn test_write_overwrites() {
        let (_tmp, store) = test_store();
        store.write("B1", "first").unwrap();
        store.write("B1", "second").unwrap();
        assert_eq!(store.read("B1").unwrap(), "second");
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn test_delete_reflected_in_next_listing() {
        let (_tmp, store) = test_store();
        store.write("B1", "a").unwrap();
        store.write("B2", "b").unwrap();

        store.delete("B1").unwrap();
        assert_eq!(store.list().unwrap(), vec!["B2"]);
    }

    #[test]
    fn test_delete_missing_is_ok() {
        let (_tmp, store) = test_store();
        assert!(store.delete("B-nope").is_ok());
    }

    #[test]
    fn test_share_payload() {
        let (_tmp, store) = test_store();
        store.write("B2024-01-15", "Start Time: 10:00\n").unwrap();

        let payload = store.share_payload("B2024-01-15").unwrap();
        assert_eq!(payload.subject, "Bowls Scorer Match: B2024-01-15");
        assert_eq!(payload.body, "Start Time: 10:00\n");
    }

    #[test]
    fn test_export_writes_copy() {
        let (tmp, store) = test_store();
        store.write("B1", "match text").unwrap();

        let out = store.export_to("B1", tmp.path()).unwrap();
        assert!(out.file_name().unwrap().to_str().unwrap().starts_with("bowls_match_"));
        assert_eq!(fs::read_to_string(out).unwrap(), "match text");
    }

    #[test]
    fn test_read_missing_is_error() {
        let (_tmp, store) = test_store();
        assert!(store.read("B-missing").is_err());
    }
}
