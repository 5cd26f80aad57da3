//! Document validation.
//!
//! A raw JSON value is checked in two passes and every problem found is
//! reported. The structural pass checks the required top-level fields. The
//! grammar pass decodes each operation and each component entry on its own,
//! so one broken entry does not hide the next.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::spec::{
    METHODS, OpenApiDocument, Operation, Parameter, ReferenceOr, RequestBody, Response, Schema,
};

/// File the validation report is written to, next to the source document.
pub const PARSE_ERRORS_LOG: &str = "parse-errors.log";

static OPENAPI_VERSION: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^3\.\d+\.\d+(-[0-9A-Za-z.-]+)?$").ok());

/// One validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Dotted JSON path; `.` is the document root.
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid value at {}: {}", self.path, self.message)
    }
}

/// Render issues for the log file, separated by blank lines.
pub fn report(issues: &[ValidationIssue]) -> String {
    let mut out = issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n\n");
    out.push('\n');
    out
}

/// Validate a raw JSON value and decode it into an OpenAPI document.
pub fn decode(value: Value) -> Result<OpenApiDocument, Vec<ValidationIssue>> {
    let mut issues = structural_issues(&value);
    if let Value::Object(root) = &value {
        path_issues(root.get("paths"), &mut issues);
        component_issues(root.get("components"), &mut issues);
    }
    if !issues.is_empty() {
        return Err(issues);
    }

    serde_path_to_error::deserialize(value).map_err(|err| {
        vec![ValidationIssue::new(
            err.path().to_string(),
            err.inner().to_string(),
        )]
    })
}

/// Decode `value` as `T`, recording a failure under `prefix`.
fn check_entry<T: DeserializeOwned>(prefix: &str, value: &Value, issues: &mut Vec<ValidationIssue>) {
    if let Err(err) = serde_path_to_error::deserialize::<_, T>(value) {
        let inner = err.path().to_string();
        let path = match inner.as_str() {
            "." => prefix.to_owned(),
            index if index.starts_with('[') => format!("{prefix}{index}"),
            field => format!("{prefix}.{field}"),
        };
        issues.push(ValidationIssue::new(path, err.inner().to_string()));
    }
}

fn path_issues(paths: Option<&Value>, issues: &mut Vec<ValidationIssue>) {
    let Some(Value::Object(paths)) = paths else {
        return;
    };
    for (key, item) in paths {
        let Value::Object(item) = item else {
            issues.push(ValidationIssue::new(format!("paths.{key}"), "expected an object"));
            continue;
        };
        if let Some(parameters) = item.get("parameters") {
            check_entry::<Vec<ReferenceOr<Parameter>>>(
                &format!("paths.{key}.parameters"),
                parameters,
                issues,
            );
        }
        for method in METHODS {
            if let Some(operation) = item.get(method.as_str()) {
                check_entry::<Operation>(
                    &format!("paths.{key}.{}", method.as_str()),
                    operation,
                    issues,
                );
            }
        }
    }
}

fn component_issues(components: Option<&Value>, issues: &mut Vec<ValidationIssue>) {
    let components = match components {
        None => return,
        Some(Value::Object(components)) => components,
        Some(_) => {
            issues.push(ValidationIssue::new("components", "expected an object"));
            return;
        }
    };

    let tables: [(&str, fn(&str, &Value, &mut Vec<ValidationIssue>)); 4] = [
        ("schemas", check_entry::<ReferenceOr<Schema>>),
        ("responses", check_entry::<Response>),
        ("parameters", check_entry::<Parameter>),
        ("requestBodies", check_entry::<RequestBody>),
    ];
    for (table, check) in tables {
        match components.get(table) {
            None => {}
            Some(Value::Object(entries)) => {
                for (key, entry) in entries {
                    check(&format!("components.{table}.{key}"), entry, issues);
                }
            }
            Some(_) => issues.push(ValidationIssue::new(
                format!("components.{table}"),
                "expected an object",
            )),
        }
    }
}

fn structural_issues(value: &Value) -> Vec<ValidationIssue> {
    let Some(root) = value.as_object() else {
        return vec![ValidationIssue::new(".", "expected a JSON object")];
    };

    let mut issues = Vec::new();

    match root.get("openapi") {
        None => issues.push(ValidationIssue::new("openapi", "missing required field")),
        Some(Value::String(version)) if !is_openapi3(version) => issues.push(ValidationIssue::new(
            "openapi",
            format!("expected an OpenAPI 3.x version, found {version:?}"),
        )),
        Some(Value::String(_)) => {}
        Some(_) => issues.push(ValidationIssue::new("openapi", "expected a string")),
    }

    match root.get("info") {
        None => issues.push(ValidationIssue::new("info", "missing required field")),
        Some(Value::Object(info)) => {
            for field in ["title", "version"] {
                match info.get(field) {
                    None => issues.push(ValidationIssue::new(
                        format!("info.{field}"),
                        "missing required field",
                    )),
                    Some(Value::String(_)) => {}
                    Some(_) => issues.push(ValidationIssue::new(
                        format!("info.{field}"),
                        "expected a string",
                    )),
                }
            }
        }
        Some(_) => issues.push(ValidationIssue::new("info", "expected an object")),
    }

    match root.get("paths") {
        None => issues.push(ValidationIssue::new("paths", "missing required field")),
        Some(Value::Object(_)) => {}
        Some(_) => issues.push(ValidationIssue::new("paths", "expected an object")),
    }

    issues
}

fn is_openapi3(version: &str) -> bool {
    OPENAPI_VERSION
        .as_ref()
        .is_some_and(|re| re.is_match(version))
}
