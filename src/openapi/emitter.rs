//! TypeScript printer.
//!
//! A thin wrapper around the IR pipeline: the printer asks the IR for the
//! file bodies and lays them out as `File` records under the destination
//! directory. Formatting and writing happen in later stages.

use crate::config::Config;
use crate::error::Result;
use crate::pipeline::File;

use super::ir::generate_sources;
use super::spec::OpenApiDocument;

pub const MODELS_FILE: &str = "models.ts";
pub const CONTROLLERS_FILE: &str = "controllers.ts";
pub const ACTIONS_FILE: &str = "actions.ts";
pub const UTILITIES_FILE: &str = "utilities.ts";
pub const INDEX_FILE: &str = "index.ts";

/// Printing capability.
pub trait Printer: Send + Sync {
    fn print(&self, config: &Config, doc: &OpenApiDocument) -> Result<Vec<File>>;
}

/// Prints the io-ts client: models, controllers, actions, utilities, index.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypescriptPrinter;

impl Printer for TypescriptPrinter {
    fn print(&self, config: &Config, doc: &OpenApiDocument) -> Result<Vec<File>> {
        let sources = generate_sources(doc, config.name.as_deref());
        let file = |name: &str, content: String| File::new(config.dst.join(name), content, false);

        Ok(vec![
            file(MODELS_FILE, sources.models),
            file(INDEX_FILE, sources.index.to_owned()),
            file(CONTROLLERS_FILE, sources.controllers),
            file(ACTIONS_FILE, sources.actions),
            file(UTILITIES_FILE, sources.utilities.to_owned()),
        ])
    }
}
