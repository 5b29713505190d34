//! Core data types for both tools.
//!
//! The cleanup tool works with [`CollectionInfo`] rows produced by a
//! [`Catalog`](crate::catalog::Catalog). The viewer works with
//! [`FileRecord`]s grouped in a [`FileBatch`], which is built fresh for every
//! selection and never merged with a previous one.

use std::collections::HashMap;

use serde::Serialize;

/// Shown in place of content for a direct upload that is not valid UTF-8.
pub const BINARY_SENTINEL: &str = "[Binary file - content not displayed]";

/// Shown in place of content for a folder-mode file at or over the size cutoff.
pub const OVERSIZE_SENTINEL: &str = "[File too large to display - skipped]";

/// Prefix of the sentinel for a file that could not be read.
pub const ERROR_SENTINEL_PREFIX: &str = "[Error reading file: ";

/// A collection and its document count at the time of the query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollectionInfo {
    pub name: String,
    /// Approximate under concurrent writers.
    pub count: u64,
}

/// Content of one ingested file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    Text(String),
    Binary,
    Oversize,
    Error(String),
}

impl FileContent {
    /// The string shown to the user: the text itself or a sentinel.
    pub fn display_text(&self) -> String {
        match self {
            FileContent::Text(s) => s.clone(),
            FileContent::Binary => BINARY_SENTINEL.to_string(),
            FileContent::Oversize => OVERSIZE_SENTINEL.to_string(),
            FileContent::Error(detail) => format!("{}{}]", ERROR_SENTINEL_PREFIX, detail),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, FileContent::Text(_))
    }

    /// Short label used in summaries and JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            FileContent::Text(_) => "text",
            FileContent::Binary => "binary",
            FileContent::Oversize => "oversize",
            FileContent::Error(_) => "error",
        }
    }
}

/// One file from an upload or a folder walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// File name for uploads, `/`-separated relative path for folder walks.
    pub id: String,
    pub content: FileContent,
    /// Size on disk (or upload length) in bytes.
    pub size: u64,
}

/// A file received through the browser upload form or named on the command line.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// The records of one ingestion, in insertion order.
///
/// Identifiers are unique: inserting an existing id replaces its record in
/// place, which is what a second upload with the same name does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileBatch {
    records: Vec<FileRecord>,
    /// Position of each id in `records`.
    index: HashMap<String, usize>,
}

impl FileBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: FileRecord) {
        match self.index.get(&record.id) {
            Some(&pos) => self.records[pos] = record,
            None => {
                self.index.insert(record.id.clone(), self.records.len());
                self.records.push(record);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&FileRecord> {
        self.index.get(id).map(|&pos| &self.records[pos])
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Count of records per [`FileContent::kind`], in a fixed order.
    pub fn summary(&self) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for record in &self.records {
            match record.content {
                FileContent::Text(_) => summary.text += 1,
                FileContent::Binary => summary.binary += 1,
                FileContent::Oversize => summary.oversize += 1,
                FileContent::Error(_) => summary.errors += 1,
            }
        }
        summary
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub text: usize,
    pub binary: usize,
    pub oversize: usize,
    pub errors: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(id: &str, body: &str) -> FileRecord {
        FileRecord {
            id: id.to_string(),
            content: FileContent::Text(body.to_string()),
            size: body.len() as u64,
        }
    }

    #[test]
    fn sentinels_are_distinct() {
        let binary = FileContent::Binary.display_text();
        let oversize = FileContent::Oversize.display_text();
        let error = FileContent::Error("permission denied".into()).display_text();
        assert_ne!(binary, oversize);
        assert_ne!(binary, error);
        assert_ne!(oversize, error);
        assert_eq!(error, "[Error reading file: permission denied]");
    }

    #[test]
    fn insert_replaces_same_id_in_place() {
        let mut batch = FileBatch::new();
        batch.insert(text("a.txt", "one"));
        batch.insert(text("b.txt", "two"));
        batch.insert(text("a.txt", "three"));

        let ids: Vec<&str> = batch.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a.txt", "b.txt"]);
        assert_eq!(
            batch.get("a.txt").unwrap().content,
            FileContent::Text("three".into())
        );
    }

    #[test]
    fn lookup_by_id_in_a_large_batch() {
        let mut batch = FileBatch::new();
        for i in 0..5000 {
            batch.insert(text(&format!("dir/{:04}.txt", i), "x"));
        }
        batch.insert(text("dir/2500.txt", "replaced"));

        assert_eq!(batch.len(), 5000);
        assert_eq!(
            batch.get("dir/2500.txt").unwrap().content,
            FileContent::Text("replaced".into())
        );
        assert_eq!(batch.iter().nth(2500).unwrap().id, "dir/2500.txt");
        assert!(batch.get("dir/5000.txt").is_none());
    }

    #[test]
    fn summary_counts_kinds() {
        let mut batch = FileBatch::new();
        batch.insert(text("a.txt", "x"));
        batch.insert(FileRecord {
            id: "b.bin".into(),
            content: FileContent::Oversize,
            size: 12 * 1024 * 1024,
        });
        let s = batch.summary();
        assert_eq!(s.text, 1);
        assert_eq!(s.oversize, 1);
        assert_eq!(s.binary + s.errors, 0);
    }
}
