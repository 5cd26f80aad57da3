//! Normalization from OpenAPI document to API IR.
//!
//! This module handles all the OpenAPI-specific logic:
//! - Schema to `TypeExpr` conversion
//! - Parameter, request body and response resolution
//! - Operation naming and collision handling

use std::collections::HashSet;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, warn};

use crate::openapi::spec::{
    AdditionalProperties, Components, HttpMethod, METHODS, OpenApiDocument, Operation as SpecOperation,
    Parameter, ParameterLocation, PathItem, ReferenceOr, RequestBody, Response, Schema,
};

use super::api::Operation;
use super::resolve::{component_name, parse_ref};
use super::types::{NamedRef, Primitive, Property, TypeExpr};
use super::utils::{model_identifier, sanitize_identifier};

/// Module alias under which controllers import the models file.
pub const MODELS_QUALIFIER: &str = "m";

/// Converts schema nodes into type expressions.
///
/// A qualified builder marks every named reference it produces with the
/// qualifier, so the reference prints as `m.Pet` from another file.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeExprBuilder {
    qualifier: Option<&'static str>,
}

impl TypeExprBuilder {
    pub const fn new() -> Self {
        Self { qualifier: None }
    }

    pub const fn qualified(qualifier: &'static str) -> Self {
        Self {
            qualifier: Some(qualifier),
        }
    }

    pub fn build(&self, node: &ReferenceOr<Schema>) -> TypeExpr {
        match node {
            ReferenceOr::Reference(r) => self.reference(&r.reference),
            ReferenceOr::Item(schema) => self.schema(schema),
        }
    }

    /// A `$ref` to the schema table, or `UnknownValue` when it doesn't resolve.
    pub fn reference(&self, reference: &str) -> TypeExpr {
        let name = model_identifier(&parse_ref(reference));
        if name.is_empty() {
            debug!(reference, "Unresolved reference, using unknown");
            return TypeExpr::UnknownValue;
        }
        let named = NamedRef::new(name);
        TypeExpr::Named(match self.qualifier {
            Some(qualifier) => named.qualified(qualifier),
            None => named,
        })
    }

    pub fn schema(&self, schema: &Schema) -> TypeExpr {
        match schema.schema_type.as_deref() {
            Some("string") => string_type(schema.enum_values.as_deref()),
            Some("number" | "integer") => TypeExpr::Primitive(Primitive::Number),
            Some("boolean") => TypeExpr::Primitive(Primitive::Boolean),
            Some("object") => self.object(schema),
            Some("array") => match &schema.items {
                Some(items) => TypeExpr::Array(Box::new(self.build(items))),
                None => TypeExpr::UnknownArray,
            },
            _ => TypeExpr::UnknownValue,
        }
    }

    fn object(&self, schema: &Schema) -> TypeExpr {
        if let Some(properties) = &schema.properties {
            let required: HashSet<&str> = schema.required.iter().map(String::as_str).collect();
            let props = properties
                .iter()
                .map(|(name, node)| {
                    Property::new(name.clone(), self.build(node), !required.contains(name.as_str()))
                        .with_description(node_description(node))
                })
                .collect();
            return TypeExpr::Object(props);
        }

        match &schema.additional_properties {
            Some(AdditionalProperties::Schema(value)) => TypeExpr::Record {
                key: Box::new(TypeExpr::Primitive(Primitive::String)),
                value: Box::new(self.build(value)),
            },
            Some(AdditionalProperties::Bool(_)) | None => TypeExpr::UnknownRecord,
        }
    }
}

fn node_description(node: &ReferenceOr<Schema>) -> Option<String> {
    match node {
        ReferenceOr::Item(schema) => schema.description.clone(),
        ReferenceOr::Reference(_) => None,
    }
}

/// String schemas: more than one enum member is a keyof, exactly one is a
/// literal, anything else a plain string.
fn string_type(values: Option<&[Value]>) -> TypeExpr {
    let mut literals: Vec<String> = Vec::new();
    for value in values.unwrap_or_default() {
        let literal = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        if !literals.contains(&literal) {
            literals.push(literal);
        }
    }

    match literals.len() {
        0 => TypeExpr::Primitive(Primitive::String),
        1 => TypeExpr::Literal(literals.swap_remove(0)),
        _ => TypeExpr::KeyOf(literals),
    }
}

// =============================================================================
// Operations
// =============================================================================

/// Extract every operation of the document, paths in document order and verbs
/// in `METHODS` order.
///
/// Names are unique across the result: a name already taken gets the first
/// free `_2`, `_3`, ... suffix.
pub fn extract_operations(doc: &OpenApiDocument) -> Vec<Operation> {
    let builder = TypeExprBuilder::qualified(MODELS_QUALIFIER);
    let mut operations = Vec::new();
    let mut names = HashSet::new();

    for (path, item) in &doc.paths {
        for method in METHODS {
            let Some(op) = item.operation(method) else {
                continue;
            };
            let mut operation = extract_operation(&builder, &doc.components, path, method, item, op);
            operation.name = unique_name(&mut names, operation.name);
            operations.push(operation);
        }
    }

    operations
}

fn unique_name(names: &mut HashSet<String>, name: String) -> String {
    if names.insert(name.clone()) {
        return name;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{name}_{n}");
        if names.insert(candidate.clone()) {
            warn!(operation = %name, renamed = %candidate, "Duplicate operation name");
            return candidate;
        }
        n += 1;
    }
}

fn operation_name(path: &str, method: HttpMethod, op: &SpecOperation) -> String {
    let declared = op
        .operation_id
        .as_deref()
        .map(sanitize_identifier)
        .unwrap_or_default();
    if !declared.is_empty() {
        return declared;
    }

    let path = sanitize_identifier(path);
    if path.is_empty() {
        method.as_str().to_string()
    } else {
        format!("{}_{path}", method.as_str())
    }
}

fn extract_operation(
    builder: &TypeExprBuilder,
    components: &Components,
    path: &str,
    method: HttpMethod,
    item: &PathItem,
    op: &SpecOperation,
) -> Operation {
    // Path-level parameters come first; no deduplication by name.
    let parameters: Vec<&Parameter> = item
        .parameters
        .iter()
        .chain(&op.parameters)
        .filter_map(|p| resolve_parameter(p, components))
        .collect();

    Operation {
        name: operation_name(path, method, op),
        method,
        path: path.to_string(),
        description: op.description.clone().or_else(|| op.summary.clone()),
        path_params: parameters_type(builder, &parameters, ParameterLocation::Path),
        query_params: parameters_type(builder, &parameters, ParameterLocation::Query),
        request_body: request_body_type(builder, components, op.request_body.as_ref()),
        response: response_type(builder, components, &op.responses),
    }
}

fn resolve_parameter<'a>(
    param: &'a ReferenceOr<Parameter>,
    components: &'a Components,
) -> Option<&'a Parameter> {
    match param {
        ReferenceOr::Item(p) => Some(p),
        ReferenceOr::Reference(r) => {
            let found = component_name(&r.reference, "parameters")
                .and_then(|name| components.parameters.get(name));
            if found.is_none() {
                debug!(reference = %r.reference, "Unresolved parameter reference, skipping");
            }
            found
        }
    }
}

fn parameters_type(
    builder: &TypeExprBuilder,
    parameters: &[&Parameter],
    location: ParameterLocation,
) -> Option<TypeExpr> {
    let props: Vec<Property> = parameters
        .iter()
        .filter(|p| p.location == location)
        .map(|p| {
            let ty = p
                .schema
                .as_ref()
                .map_or(TypeExpr::Primitive(Primitive::String), |s| builder.build(s));
            Property::new(p.name.clone(), ty, !p.required).with_description(p.description.clone())
        })
        .collect();

    (!props.is_empty()).then_some(TypeExpr::Object(props))
}

fn request_body_type(
    builder: &TypeExprBuilder,
    components: &Components,
    body: Option<&ReferenceOr<RequestBody>>,
) -> Option<TypeExpr> {
    match body? {
        ReferenceOr::Reference(r) => match component_name(&r.reference, "requestBodies") {
            Some(name) => {
                let body = components.request_bodies.get(name);
                if body.is_none() {
                    debug!(reference = %r.reference, "Unresolved request body reference");
                }
                json_body(builder, body?)
            }
            None => Some(builder.reference(&r.reference)),
        },
        ReferenceOr::Item(body) => json_body(builder, body),
    }
}

fn json_body(builder: &TypeExprBuilder, body: &RequestBody) -> Option<TypeExpr> {
    let schema = body.content.get("application/json")?.schema.as_ref()?;
    Some(builder.build(schema))
}

/// First success code in 200..=298, else `default`; JSON content, else `*/*`.
fn response_type(
    builder: &TypeExprBuilder,
    components: &Components,
    responses: &IndexMap<String, ReferenceOr<Response>>,
) -> TypeExpr {
    let chosen = (200..=298)
        .find_map(|code: u16| responses.get(code.to_string().as_str()))
        .or_else(|| responses.get("default"));

    let response = match chosen {
        Some(ReferenceOr::Item(response)) => Some(response),
        Some(ReferenceOr::Reference(r)) => component_name(&r.reference, "responses")
            .and_then(|name| components.responses.get(name)),
        None => None,
    };

    response
        .and_then(|r| {
            r.content
                .get("application/json")
                .or_else(|| r.content.get("*/*"))
        })
        .and_then(|media| media.schema.as_ref())
        .map_or(TypeExpr::UnknownValue, |schema| builder.build(schema))
}
