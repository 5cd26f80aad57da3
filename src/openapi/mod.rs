//! OpenAPI to TypeScript code generator.
//!
//! This module reads OpenAPI 3.0 (or Swagger 2.0) documents and generates an
//! io-ts typed client with:
//! - Type declarations and runtime codecs for component schemas
//! - Request/response declarations and controllers per operation
//! - Redux-style async action bundles

mod emitter;
mod format;
pub mod ir;
mod parser;
pub mod spec;
mod swagger;
mod validate;

pub use emitter::{
    ACTIONS_FILE, CONTROLLERS_FILE, INDEX_FILE, MODELS_FILE, Printer, TypescriptPrinter,
    UTILITIES_FILE,
};
pub use format::{Formatter, SourceFormatter};
pub use parser::{OpenApiParser, ParseError, Parser, SwaggerParser, parser_for};
pub use spec::OpenApiDocument;
pub use swagger::{Converter, Swagger2Converter};
pub use validate::{PARSE_ERRORS_LOG, ValidationIssue, decode, report};
