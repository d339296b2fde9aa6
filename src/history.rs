//! Persisted history journal.
//!
//! A flat, append-only list of turn records in one JSON file, keyed by
//! nothing. Every append reads the whole file, pushes one record, and
//! rewrites the whole file. Last writer wins under concurrent processes;
//! there is no file locking. Accepted limitation for a single-user
//! interactive tool.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{from_reader, to_writer_pretty};
use time::OffsetDateTime;

use crate::error::{Error, Result};
use crate::types::Model;

/// One journal record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryRecord {
    /// When the turn completed.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,

    /// The model that produced the response.
    pub model: String,

    /// The composed prompt for the turn.
    pub prompt: String,

    /// The response text (or substituted error message).
    pub response: String,
}

/// Append-only journal over a single JSON file.
#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    /// Creates a journal over the given path. The file is created on the
    /// first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the journal path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads all records. A missing file is an empty journal.
    pub fn load(&self) -> Result<Vec<HistoryRecord>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::io("failed to open history log", e)),
        };
        let reader = BufReader::new(file);
        from_reader(reader)
            .map_err(|e| Error::serialization("failed to parse history log", Some(Box::new(e))))
    }

    /// Appends one record: full read, push, full rewrite.
    pub fn append(&self, model: &Model, prompt: &str, response: &str) -> Result<()> {
        let mut records = self.load()?;
        records.push(HistoryRecord {
            timestamp: OffsetDateTime::now_utc(),
            model: model.to_string(),
            prompt: prompt.to_string(),
            response: response.to_string(),
        });
        self.write_all(&records)
    }

    fn write_all(&self, records: &[HistoryRecord]) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::io("failed to create history log directory", e))?;
        }
        let file = File::create(&self.path)
            .map_err(|e| Error::io("failed to create history log", e))?;
        let writer = BufWriter::new(file);
        to_writer_pretty(writer, records)
            .map_err(|e| Error::serialization("failed to serialize history log", Some(Box::new(e))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty_journal() {
        let dir = tempfile::tempdir().unwrap();
        let log = HistoryLog::new(dir.path().join("history.json"));
        assert!(log.load().unwrap().is_empty());
    }

    #[test]
    fn append_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let log = HistoryLog::new(dir.path().join("history.json"));
        let model = Model::default_model();

        log.append(&model, "say hi", "hello").unwrap();
        log.append(&model, "say bye", "goodbye").unwrap();

        let records = log.load().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].prompt, "say hi");
        assert_eq!(records[0].response, "hello");
        assert_eq!(records[1].prompt, "say bye");
        assert_eq!(records[1].model, "claude-3-5-sonnet-latest");
    }

    #[test]
    fn append_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let log = HistoryLog::new(dir.path().join("nested/deeper/history.json"));
        log.append(&Model::default_model(), "p", "r").unwrap();
        assert_eq!(log.load().unwrap().len(), 1);
    }

    #[test]
    fn records_round_trip_through_json() {
        let record = HistoryRecord {
            timestamp: OffsetDateTime::UNIX_EPOCH,
            model: "claude-3-5-sonnet-latest".to_string(),
            prompt: "p".to_string(),
            response: "r".to_string(),
        };
        let json = serde_json::to_string(&record).unwrap();
        let back: HistoryRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
