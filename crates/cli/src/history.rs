//! Flat-file analysis history.
//!
//! Entries live in one JSON array. Every read-modify-write happens under an
//! exclusive lock on a sibling `.lock` file, and writes go through a temp
//! file plus rename so a crash never leaves a truncated history behind.

use anyhow::{Context as AnyhowContext, Result};
use flex_protocol::HistoryEntry;
use fs2::FileExt;
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DEFAULT_HISTORY_FILE: &str = "flex_history.json";

/// Upper bound on hints returned for one analysis
const MAX_HINTS: usize = 8;

#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

struct HistoryLock {
    file: File,
}

impl Drop for HistoryLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All stored entries, oldest first. A missing file is an empty history.
    pub fn load(&self) -> Result<Vec<HistoryEntry>> {
        let _lock = self.lock()?;
        self.read_entries()
    }

    /// Labels of earlier analyses that share a token with `code`, then
    /// append the new entry. Returns the hints.
    pub fn record(&self, code: &str, labels: &[String]) -> Result<Vec<String>> {
        let _lock = self.lock()?;
        let mut entries = self.read_entries()?;

        let hints = related_hints(&entries, code);
        entries.push(HistoryEntry {
            code: code.to_string(),
            labels: labels.to_vec(),
            hints: hints.clone(),
        });

        self.write_entries(&entries)?;
        log::debug!(
            "Recorded analysis #{} in {} ({} hints)",
            entries.len(),
            self.path.display(),
            hints.len()
        );
        Ok(hints)
    }

    fn lock(&self) -> Result<HistoryLock> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("create history dir {}", parent.display()))?;
        }
        let lock_path = self.sibling("lock");
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("open history lock {}", lock_path.display()))?;
        file.lock_exclusive()
            .with_context(|| format!("lock history {}", lock_path.display()))?;
        Ok(HistoryLock { file })
    }

    fn read_entries(&self) -> Result<Vec<HistoryEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("read history {}", self.path.display()))?;
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw)
            .with_context(|| format!("parse history json {}", self.path.display()))
    }

    fn write_entries(&self, entries: &[HistoryEntry]) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(entries).context("serialize history")?;
        let tmp = self.sibling(&format!("tmp-{}", std::process::id()));
        {
            let mut file =
                File::create(&tmp).with_context(|| format!("create tmp {}", tmp.display()))?;
            file.write_all(&bytes)
                .with_context(|| format!("write tmp {}", tmp.display()))?;
            file.sync_all()
                .with_context(|| format!("sync tmp {}", tmp.display()))?;
        }
        fs::rename(&tmp, &self.path).with_context(|| {
            format!("rename tmp {} -> {}", tmp.display(), self.path.display())
        })
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let name = self
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or(DEFAULT_HISTORY_FILE);
        self.path.with_file_name(format!(".{name}.{suffix}"))
    }
}

/// Labels of earlier entries with at least one whitespace-separated token
/// occurring anywhere in `code`, most recent entries first, without
/// duplicates.
fn related_hints(entries: &[HistoryEntry], code: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    entries
        .iter()
        .rev()
        .filter(|entry| entry.code.split_whitespace().any(|t| code.contains(t)))
        .flat_map(|entry| entry.labels.iter())
        .filter(|label| seen.insert(label.as_str()))
        .take(MAX_HINTS)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn missing_file_is_empty_history() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("history.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn record_appends_and_returns_related_hints() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("nested").join("history.json"));

        let first = store.record("fact", &labels(&["Call: fact"])).unwrap();
        assert!(first.is_empty());

        let hints = store
            .record("x = 1", &labels(&["Assignment: x = 1"]))
            .unwrap();
        assert!(hints.is_empty(), "{hints:?}");

        // Stored tokens match as substrings of the new code.
        let hints = store
            .record("print(fact(3))", &labels(&["Call: print"]))
            .unwrap();
        assert_eq!(hints, labels(&["Call: fact"]));

        let hints = store
            .record("y = fact(2)", &labels(&["Assignment: y = fact(2)"]))
            .unwrap();
        assert_eq!(hints, labels(&["Assignment: x = 1", "Call: fact"]));

        let stored = store.load().unwrap();
        assert_eq!(stored.len(), 4);
        assert_eq!(stored[3].hints, labels(&["Assignment: x = 1", "Call: fact"]));
    }

    #[test]
    fn hints_are_deduplicated_and_capped() {
        let entries: Vec<HistoryEntry> = (0..20)
            .map(|i| HistoryEntry {
                code: "return value".to_string(),
                labels: labels(&["Return: value", &format!("Label {i}")]),
                hints: Vec::new(),
            })
            .collect();

        let hints = related_hints(&entries, "return other");
        assert_eq!(hints.len(), MAX_HINTS);
        assert_eq!(hints[0], "Return: value");
        assert_eq!(hints[1], "Label 19");
        assert_eq!(
            hints.iter().filter(|h| h.as_str() == "Return: value").count(),
            1
        );
    }

    #[test]
    fn blank_code_has_no_hints() {
        let entries = vec![HistoryEntry {
            code: "x = 1".to_string(),
            labels: labels(&["Assignment: x = 1"]),
            hints: Vec::new(),
        }];
        assert!(related_hints(&entries, "").is_empty());
        assert!(related_hints(&entries, "   \n").is_empty());
    }

    #[test]
    fn corrupt_history_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        fs::write(&path, "not json").unwrap();
        let err = HistoryStore::new(&path).load().unwrap_err();
        assert!(format!("{err:#}").contains("parse history json"));
    }
}
