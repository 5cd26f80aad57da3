//! Source parsers.
//!
//! A parser turns the raw source file into a validated `OpenApiDocument`.
//! Grammar failures come back as `ParseError::Invalid` so the caller can write
//! the full report before failing the run.

use serde_json::Value;
use tracing::info;

use crate::config::{Config, SourceFormat};
use crate::error::CodegenError;
use crate::pipeline::File;

use super::spec::OpenApiDocument;
use super::swagger::{Converter, Swagger2Converter};
use super::validate::{self, ValidationIssue};

/// Why a source could not be turned into a document.
#[derive(Debug)]
pub enum ParseError {
    /// The document decoded as JSON but does not match the OpenAPI grammar.
    Invalid(Vec<ValidationIssue>),
    /// Anything else: bad JSON, failed upgrade.
    Failed(CodegenError),
}

impl From<CodegenError> for ParseError {
    fn from(err: CodegenError) -> Self {
        Self::Failed(err)
    }
}

/// Parsing capability, chosen by `Config::format`.
pub trait Parser: Send + Sync {
    fn parse(&self, config: &Config, source: &File) -> Result<OpenApiDocument, ParseError>;
}

/// Pick the parser for the configured source format.
pub fn parser_for(format: SourceFormat) -> Box<dyn Parser> {
    match format {
        SourceFormat::OpenApi => Box::new(OpenApiParser),
        SourceFormat::Swagger => Box::new(SwaggerParser::default()),
    }
}

fn parse_json(source: &File) -> Result<Value, CodegenError> {
    serde_json::from_str(&source.content).map_err(|err| CodegenError::Json {
        path: source.path.clone(),
        source: err,
    })
}

/// OpenAPI 3.0.x documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenApiParser;

impl Parser for OpenApiParser {
    fn parse(&self, _config: &Config, source: &File) -> Result<OpenApiDocument, ParseError> {
        info!("Parser: OpenAPI 3.0");
        let value = parse_json(source)?;
        validate::decode(value).map_err(ParseError::Invalid)
    }
}

/// Swagger 2.0 documents, upgraded before validation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwaggerParser {
    converter: Swagger2Converter,
}

impl Parser for SwaggerParser {
    fn parse(&self, _config: &Config, source: &File) -> Result<OpenApiDocument, ParseError> {
        info!("Parser: Swagger 2.0");
        let value = parse_json(source)?;
        let upgraded = self.converter.convert(value)?;
        info!("Converted Swagger 2.0 to OpenApi 3.0.2");
        validate::decode(upgraded).map_err(ParseError::Invalid)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn source(content: &str) -> File {
        File::new("api.json", content, false)
    }

    fn config() -> Config {
        Config::new("api.json", "out")
    }

    #[test]
    fn test_openapi_parser() {
        let doc = parser_for(SourceFormat::OpenApi)
            .parse(
                &config(),
                &source(r#"{"openapi":"3.0.2","info":{"title":"Pets","version":"1"},"paths":{}}"#),
            )
            .unwrap();
        assert_eq!(doc.info.title, "Pets");
    }

    #[test]
    fn test_bad_json_fails() {
        let err = OpenApiParser.parse(&config(), &source("{")).unwrap_err();
        assert!(matches!(err, ParseError::Failed(CodegenError::Json { .. })));
    }

    #[test]
    fn test_invalid_document_reports_issues() {
        let err = OpenApiParser
            .parse(&config(), &source(r#"{"openapi":"3.0.2","paths":{}}"#))
            .unwrap_err();
        assert!(matches!(err, ParseError::Invalid(issues) if issues.len() == 1 && issues[0].path == "info"));
    }

    #[test]
    fn test_swagger_parser_upgrades() {
        let doc = parser_for(SourceFormat::Swagger)
            .parse(
                &config(),
                &source(
                    r#"{
                        "swagger": "2.0",
                        "info": { "title": "Pets", "version": "1" },
                        "paths": {},
                        "definitions": { "Pet": { "type": "object" } }
                    }"#,
                ),
            )
            .unwrap();
        assert_eq!(doc.openapi, "3.0.2");
        assert!(doc.components.schemas.contains_key("Pet"));
    }

    #[test]
    fn test_swagger_parser_rejects_openapi() {
        let err = SwaggerParser::default()
            .parse(
                &config(),
                &source(r#"{"openapi":"3.0.2","info":{"title":"Pets","version":"1"},"paths":{}}"#),
            )
            .unwrap_err();
        assert!(matches!(err, ParseError::Failed(CodegenError::Conversion(_))));
    }
}
