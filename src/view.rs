//! `tidy view`: ingest from the command line and emit the combined document.
//!
//! With neither `--out` nor `--html`, the combined text goes to stdout.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::config::Config;
use crate::ingest::{self, IngestOptions};
use crate::models::FileBatch;
use crate::present::{self, PresentOptions};
use crate::progress::ProgressMode;

/// What to read.
#[derive(Debug, Clone)]
pub enum Selection {
    Files(Vec<PathBuf>),
    Folder(PathBuf),
}

/// Where to write.
#[derive(Debug, Clone, Default)]
pub struct ViewOutput {
    pub text: Option<PathBuf>,
    pub html: Option<PathBuf>,
}

pub fn load(config: &Config, selection: &Selection, progress: ProgressMode) -> Result<FileBatch> {
    let reporter = progress.reporter();
    match selection {
        Selection::Files(paths) => {
            if paths.is_empty() {
                bail!("Nothing to view: pass files or --folder <DIR>");
            }
            Ok(ingest::ingest_paths(paths, reporter.as_ref()))
        }
        Selection::Folder(root) => {
            let options = IngestOptions::from_config(&config.viewer);
            ingest::ingest_folder(root, &options, reporter.as_ref())
        }
    }
}

pub fn run_view(
    config: &Config,
    selection: &Selection,
    output: &ViewOutput,
    progress: ProgressMode,
) -> Result<()> {
    let batch = load(config, selection, progress)?;
    let document = present::combine(&batch);

    if let Some(path) = &output.text {
        write_file(path, &document)?;
        eprintln!("Wrote {} file(s) to {}", batch.len(), path.display());
    }

    if let Some(path) = &output.html {
        let page = present::render_html(&batch, &PresentOptions::from_config(&config.viewer));
        write_file(path, &page)?;
        eprintln!("Wrote HTML view to {}", path.display());
    }

    if output.text.is_none() && output.html.is_none() {
        print!("{}", document);
    }

    let summary = batch.summary();
    if summary.binary + summary.oversize + summary.errors > 0 {
        eprintln!(
            "{} text, {} binary, {} too large, {} unreadable",
            summary.text, summary.binary, summary.oversize, summary.errors
        );
    }

    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}
