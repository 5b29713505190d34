//! File ingestion for the viewer.
//!
//! Each entry point builds a fresh [`FileBatch`]:
//!
//! - [`ingest_uploads`] / [`ingest_paths`]: files selected directly (browser
//!   upload or command-line arguments). Each is decoded once as UTF-8;
//!   anything else becomes [`FileContent::Binary`].
//! - [`ingest_folder`]: a recursive walk. Files at or over the size cutoff
//!   become [`FileContent::Oversize`] without being opened. Everything else is
//!   decoded as UTF-8, then as Windows-1252, which accepts any byte sequence.
//!   Read failures become [`FileContent::Error`].
//!
//! Per-file problems never fail the batch. Only an unusable root (missing,
//! not a directory, or unlistable) or an invalid glob pattern does.

use std::path::{Component, Path, PathBuf};

use anyhow::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

use crate::config::ViewerConfig;
use crate::error::TidyError;
use crate::models::{FileBatch, FileContent, FileRecord, Upload};
use crate::progress::{IngestProgressEvent, IngestProgressReporter};

/// Folder-walk settings.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Files of this size or larger are not read.
    pub max_file_bytes: u64,
    pub include_globs: Vec<String>,
    pub exclude_globs: Vec<String>,
    pub follow_symlinks: bool,
}

impl IngestOptions {
    pub fn from_config(viewer: &ViewerConfig) -> Self {
        Self {
            max_file_bytes: viewer.max_file_bytes,
            include_globs: viewer.include_globs.clone(),
            exclude_globs: viewer.exclude_globs.clone(),
            follow_symlinks: viewer.follow_symlinks,
        }
    }
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self::from_config(&ViewerConfig::default())
    }
}

/// Strict UTF-8, else [`FileContent::Binary`].
pub fn decode_upload(bytes: Vec<u8>) -> FileContent {
    match String::from_utf8(bytes) {
        Ok(text) => FileContent::Text(text),
        Err(_) => FileContent::Binary,
    }
}

/// UTF-8, falling back to Windows-1252.
///
/// The fallback never fails, so non-UTF-8 text in other encodings comes
/// back garbled rather than flagged.
pub fn decode_with_fallback(bytes: Vec<u8>) -> FileContent {
    match String::from_utf8(bytes) {
        Ok(text) => FileContent::Text(text),
        Err(e) => {
            let bytes = e.into_bytes();
            let (text, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            FileContent::Text(text.into_owned())
        }
    }
}

pub fn ingest_uploads(uploads: Vec<Upload>, progress: &dyn IngestProgressReporter) -> FileBatch {
    let total = uploads.len() as u64;
    let mut batch = FileBatch::new();

    for (i, upload) in uploads.into_iter().enumerate() {
        let size = upload.bytes.len() as u64;
        let content = decode_upload(upload.bytes);
        if !content.is_text() {
            tracing::debug!(file = %upload.name, "upload is not valid UTF-8");
        }
        batch.insert(FileRecord {
            id: upload.name,
            content,
            size,
        });
        progress.report(IngestProgressEvent::Reading {
            source: "upload".to_string(),
            n: i as u64 + 1,
            total,
        });
    }

    batch
}

/// Direct selection from disk: like [`ingest_uploads`], keyed by file name.
///
/// A file that cannot be read becomes [`FileContent::Error`].
pub fn ingest_paths(paths: &[PathBuf], progress: &dyn IngestProgressReporter) -> FileBatch {
    let total = paths.len() as u64;
    let mut batch = FileBatch::new();

    for (i, path) in paths.iter().enumerate() {
        let id = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let record = match std::fs::read(path) {
            Ok(bytes) => FileRecord {
                id,
                size: bytes.len() as u64,
                content: decode_upload(bytes),
            },
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "read failed");
                FileRecord {
                    id,
                    content: FileContent::Error(e.to_string()),
                    size: 0,
                }
            }
        };
        batch.insert(record);
        progress.report(IngestProgressEvent::Reading {
            source: "selection".to_string(),
            n: i as u64 + 1,
            total,
        });
    }

    batch
}

pub fn ingest_folder(
    root: &Path,
    options: &IngestOptions,
    progress: &dyn IngestProgressReporter,
) -> Result<FileBatch> {
    if !root.is_dir() {
        return Err(TidyError::FolderUnavailable(root.to_path_buf()).into());
    }

    let include_set = build_globset(&options.include_globs)?;

    let mut excludes = vec![
        "**/.git/**".to_string(),
        "**/target/**".to_string(),
        "**/node_modules/**".to_string(),
    ];
    excludes.extend(options.exclude_globs.iter().cloned());
    let exclude_set = build_globset(&excludes)?;

    let source = root.display().to_string();
    progress.report(IngestProgressEvent::Discovering {
        source: source.clone(),
    });

    // Discovery first so the read phase knows its total.
    let mut found: Vec<(String, Discovered)> = Vec::new();
    for entry in WalkDir::new(root).follow_links(options.follow_symlinks) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                if e.depth() == 0 {
                    return Err(TidyError::FolderUnreadable {
                        path: root.to_path_buf(),
                        cause: e
                            .io_error()
                            .map(|io| io.to_string())
                            .unwrap_or_else(|| e.to_string()),
                    }
                    .into());
                }
                let Some(path) = e.path().map(Path::to_path_buf) else {
                    tracing::warn!(error = %e, "skipping unreadable entry");
                    continue;
                };
                let id = relative_id(root, &path);
                if !exclude_set.is_match(&id) {
                    tracing::warn!(path = %path.display(), error = %e, "walk failed");
                    found.push((id, Discovered::Failed(e.to_string())));
                }
                continue;
            }
        };

        let file_type = entry.file_type();
        if file_type.is_dir() {
            continue;
        }

        let id = relative_id(root, entry.path());
        if exclude_set.is_match(&id) || !include_set.is_match(&id) {
            continue;
        }

        // Without link following, a link to a file is still read through
        // its target; links to directories are not descended.
        let metadata = if file_type.is_symlink() {
            std::fs::metadata(entry.path())
        } else {
            entry.metadata().map_err(std::io::Error::from)
        };

        let discovered = match metadata {
            Ok(meta) if meta.is_file() => Discovered::File {
                path: entry.path().to_path_buf(),
                size: meta.len(),
            },
            Ok(meta) if meta.is_dir() => {
                tracing::debug!(path = %entry.path().display(), "not following directory link");
                continue;
            }
            Ok(_) => {
                tracing::debug!(path = %entry.path().display(), "not a regular file, skipped");
                continue;
            }
            Err(e) => {
                tracing::warn!(path = %entry.path().display(), error = %e, "metadata failed");
                Discovered::Failed(e.to_string())
            }
        };
        found.push((id, discovered));
    }

    found.sort_by(|a, b| a.0.cmp(&b.0));

    let total = found.len() as u64;
    let mut batch = FileBatch::new();
    for (i, (id, discovered)) in found.into_iter().enumerate() {
        let record = match discovered {
            Discovered::File { path, size } => FileRecord {
                content: read_folder_file(&path, size, options.max_file_bytes),
                id,
                size,
            },
            Discovered::Failed(detail) => FileRecord {
                id,
                content: FileContent::Error(detail),
                size: 0,
            },
        };
        batch.insert(record);
        progress.report(IngestProgressEvent::Reading {
            source: source.clone(),
            n: i as u64 + 1,
            total,
        });
    }

    let summary = batch.summary();
    tracing::info!(
        root = %source,
        text = summary.text,
        oversize = summary.oversize,
        errors = summary.errors,
        "folder ingested"
    );
    Ok(batch)
}

enum Discovered {
    File { path: PathBuf, size: u64 },
    Failed(String),
}

fn read_folder_file(path: &Path, size: u64, max_file_bytes: u64) -> FileContent {
    read_folder_file_with(path, size, max_file_bytes, |p| std::fs::read(p))
}

/// Size check against `max_file_bytes`, then `read` only for files under it.
fn read_folder_file_with<F>(path: &Path, size: u64, max_file_bytes: u64, read: F) -> FileContent
where
    F: FnOnce(&Path) -> std::io::Result<Vec<u8>>,
{
    if size >= max_file_bytes {
        tracing::debug!(path = %path.display(), size, "over size cutoff, not read");
        return FileContent::Oversize;
    }

    match read(path) {
        Ok(bytes) => decode_with_fallback(bytes),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "read failed");
            FileContent::Error(e.to_string())
        }
    }
}

/// `path` relative to `root`, joined with `/` on every platform.
fn relative_id(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
