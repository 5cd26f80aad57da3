//! Run configuration.
//!
//! A `Config` is assembled once, from command-line values layered over the
//! `apiCodegen` block of the project manifest (`package.json`), and then
//! passed by reference to every stage.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{CodegenError, Result};
use crate::fs::FileSystem;

/// Default manifest file name, looked up in the working directory.
pub const MANIFEST_FILE: &str = "package.json";

/// Input document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
pub enum SourceFormat {
    /// OpenAPI 3.0.x
    #[default]
    #[serde(rename = "openapi")]
    #[value(name = "openapi")]
    OpenApi,
    /// Swagger 2.0, upgraded before validation
    #[serde(rename = "swagger")]
    #[value(name = "swagger")]
    Swagger,
}

/// Immutable configuration of one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Project name, used as the action-type prefix.
    pub name: Option<String>,
    /// Source document.
    pub src: PathBuf,
    /// Destination directory.
    pub dst: PathBuf,
    /// Overwrite existing files instead of reporting a diff.
    pub overwrite: bool,
    pub format: SourceFormat,
}

impl Config {
    pub fn new(src: impl Into<PathBuf>, dst: impl Into<PathBuf>) -> Self {
        Self {
            name: None,
            src: src.into(),
            dst: dst.into(),
            overwrite: false,
            format: SourceFormat::default(),
        }
    }
}

/// Values given on the command line. Each one, when set, wins over the manifest.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub src: Option<PathBuf>,
    pub dst: Option<PathBuf>,
    pub overwrite: Option<bool>,
    pub format: Option<SourceFormat>,
}

#[derive(Debug, Default, Deserialize)]
struct PackageJson {
    name: Option<String>,
    #[serde(rename = "apiCodegen")]
    api_codegen: Option<ManifestConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct ManifestConfig {
    src: Option<PathBuf>,
    dst: Option<PathBuf>,
    overwrite: Option<bool>,
    format: Option<SourceFormat>,
}

/// Read the manifest (if present) and assemble the run configuration.
///
/// A missing manifest is fine as long as the overrides name both paths.
/// Relative paths from the manifest are resolved against its directory.
pub async fn load_config<F: FileSystem>(
    fs: &F,
    manifest: &Path,
    overrides: ConfigOverrides,
) -> Result<Config> {
    let package = if fs.exists(manifest).await? {
        let content = fs.read(manifest).await?;
        let package: PackageJson =
            serde_json::from_str(&content).map_err(|source| CodegenError::Json {
                path: manifest.to_path_buf(),
                source,
            })?;
        Some(package)
    } else {
        debug!(manifest = %manifest.display(), "No manifest found");
        None
    };

    let base = manifest.parent().unwrap_or_else(|| Path::new(""));
    let config = assemble(package.unwrap_or_default(), base, overrides)?;

    if let Some(name) = &config.name {
        info!("Project name detected: {name}");
    }
    info!("Source file: {}", config.src.display());
    info!("Destination: {}", config.dst.display());
    info!("Overwrite files: {}", config.overwrite);

    Ok(config)
}

fn assemble(package: PackageJson, base: &Path, overrides: ConfigOverrides) -> Result<Config> {
    let manifest = package.api_codegen.unwrap_or_default();

    let src = overrides
        .src
        .or_else(|| manifest.src.map(|p| base.join(p)))
        .ok_or_else(|| CodegenError::Config("Source path is required".into()))?;
    let dst = overrides
        .dst
        .or_else(|| manifest.dst.map(|p| base.join(p)))
        .ok_or_else(|| CodegenError::Config("Destination path is required".into()))?;

    Ok(Config {
        name: package.name.filter(|n| !n.trim().is_empty()),
        src,
        dst,
        overwrite: overrides.overwrite.or(manifest.overwrite).unwrap_or(false),
        format: overrides.format.or(manifest.format).unwrap_or_default(),
    })
}
