//! The generation pipeline.
//!
//! `program` chains the stages: read source, parse, print (and format), write.
//! Each stage returns `Result`; the first error aborts the run.

use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::config::Config;
use crate::error::{CodegenError, Result};
use crate::fs::FileSystem;
use crate::materialize::{FileOutcome, write_files};
use crate::openapi::{
    Formatter, PARSE_ERRORS_LOG, ParseError, Parser, Printer, SourceFormatter, TypescriptPrinter,
    parser_for, report,
};

/// A file to read or write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    pub path: PathBuf,
    pub content: String,
    /// Replace an existing file even when the run is not configured to.
    pub overwrite: bool,
}

impl File {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<String>, overwrite: bool) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            overwrite,
        }
    }
}

/// Read the configured source document.
pub async fn get_source<F: FileSystem>(config: &Config, fs: &F) -> Result<File> {
    if !fs.exists(&config.src).await? {
        return Err(CodegenError::SourceNotFound(config.src.clone()));
    }
    info!(path = %config.src.display(), "Reading source");
    let content = fs.read(&config.src).await?;
    Ok(File::new(config.src.clone(), content, false))
}

/// Run the pipeline with explicit capabilities.
pub async fn program<F: FileSystem>(
    config: &Config,
    fs: &F,
    parser: &dyn Parser,
    printer: &dyn Printer,
    formatter: &dyn Formatter,
) -> Result<Vec<FileOutcome>> {
    info!("Started reading source");
    let source = get_source(config, fs).await?;
    info!("Finished reading source");

    info!("Started parsing");
    let doc = match parser.parse(config, &source) {
        Ok(doc) => doc,
        Err(ParseError::Failed(err)) => return Err(err),
        Err(ParseError::Invalid(issues)) => {
            let log_file = config
                .src
                .parent()
                .unwrap_or_else(|| Path::new(""))
                .join(PARSE_ERRORS_LOG);
            error!(issues = issues.len(), log_file = %log_file.display(), "Source validation failed");
            fs.write(&log_file, &report(&issues)).await?;
            return Err(CodegenError::Validation {
                log_file: log_file.display().to_string(),
            });
        }
    };
    info!("Finished parsing");

    info!("Started printing");
    let files = printer
        .print(config, &doc)?
        .into_iter()
        .map(|file| -> Result<File> {
            let content = formatter.format(&file.path, &file.content)?;
            Ok(File { content, ..file })
        })
        .collect::<Result<Vec<_>>>()?;
    info!("Finished printing");

    info!("Started writing files");
    let outcomes = write_files(config, fs, &files).await?;
    info!("Finished writing files");

    Ok(outcomes)
}

/// Run the pipeline with the parser chosen by `config.format`, the
/// TypeScript printer and the default formatter.
pub async fn run<F: FileSystem>(config: &Config, fs: &F) -> Result<Vec<FileOutcome>> {
    let parser = parser_for(config.format);
    program(config, fs, parser.as_ref(), &TypescriptPrinter, &SourceFormatter).await
}
