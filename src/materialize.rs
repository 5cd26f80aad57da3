//! Writing generated files.
//!
//! New files are written. Existing files are replaced only when the file or
//! the run allows it; otherwise the existing content is left alone and a
//! unified diff against the new content is reported instead.

use std::path::{Path, PathBuf};

use similar::TextDiff;
use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::fs::FileSystem;
use crate::pipeline::File;

/// What happened to one generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Written { path: PathBuf },
    Overwritten { path: PathBuf },
    /// The file exists and was kept. `diff` is empty when nothing changed.
    Diffed { path: PathBuf, diff: String },
}

impl FileOutcome {
    pub fn path(&self) -> &Path {
        match self {
            Self::Written { path } | Self::Overwritten { path } | Self::Diffed { path, .. } => path,
        }
    }
}

/// Create the destination directory and write each file in order.
pub async fn write_files<F: FileSystem>(
    config: &Config,
    fs: &F,
    files: &[File],
) -> Result<Vec<FileOutcome>> {
    fs.make_dir_all(&config.dst).await?;

    let mut outcomes = Vec::with_capacity(files.len());
    for file in files {
        outcomes.push(write_file(config, fs, file).await?);
    }
    Ok(outcomes)
}

pub async fn write_file<F: FileSystem>(config: &Config, fs: &F, file: &File) -> Result<FileOutcome> {
    let path = file.path.clone();

    if !fs.exists(&file.path).await? {
        info!(path = %path.display(), "Writing file");
        fs.write(&file.path, &file.content).await?;
        return Ok(FileOutcome::Written { path });
    }

    if file.overwrite || config.overwrite {
        info!(path = %path.display(), "Overwriting file");
        fs.write(&file.path, &file.content).await?;
        return Ok(FileOutcome::Overwritten { path });
    }

    let existing = fs.read(&file.path).await?;
    let diff = diff_file(&file.path, &existing, &file.content);
    if diff.is_empty() {
        info!(path = %path.display(), "File already exists and is up to date");
    } else {
        info!(path = %path.display(), "File already exists, not overwriting\n{diff}");
    }
    Ok(FileOutcome::Diffed { path, diff })
}

/// Unified diff from `old` to `new`, empty when they are identical.
pub fn diff_file(path: &Path, old: &str, new: &str) -> String {
    if old == new {
        return String::new();
    }
    let name = path.display().to_string();
    TextDiff::from_lines(old, new)
        .unified_diff()
        .context_radius(3)
        .header(&name, &name)
        .to_string()
}
