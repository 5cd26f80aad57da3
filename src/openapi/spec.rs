//! OpenAPI 3.0.2 document structs for serde deserialization.
//!
//! This is the subset of the OpenAPI grammar the generator consumes. Maps use
//! `IndexMap` so that document order survives decoding; generated output
//! follows that order, which keeps diffs between runs stable.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

/// The eight HTTP verbs a path item may carry, in generation order.
pub const METHODS: [HttpMethod; 8] = [
    HttpMethod::Get,
    HttpMethod::Put,
    HttpMethod::Post,
    HttpMethod::Delete,
    HttpMethod::Options,
    HttpMethod::Head,
    HttpMethod::Patch,
    HttpMethod::Trace,
];

/// Root OpenAPI document.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenApiDocument {
    pub openapi: String,
    pub info: Info,
    pub paths: IndexMap<String, PathItem>,
    #[serde(default)]
    pub components: Components,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Info {
    pub title: String,
    pub version: String,
}

/// Reusable component tables. Every table defaults to empty.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    #[serde(default)]
    pub schemas: IndexMap<String, ReferenceOr<Schema>>,
    #[serde(default)]
    pub responses: IndexMap<String, Response>,
    #[serde(default)]
    pub parameters: IndexMap<String, Parameter>,
    #[serde(default)]
    pub request_bodies: IndexMap<String, RequestBody>,
}

/// Either a `$ref` object or an inline value.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ReferenceOr<T> {
    Reference(Reference),
    Item(T),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Reference {
    #[serde(rename = "$ref")]
    pub reference: String,
}

/// HTTP method of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    /// Lowercase verb as it appears in the document and in generated code.
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Patch => "patch",
            HttpMethod::Trace => "trace",
        }
    }
}

/// A path item containing operations for different HTTP methods.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathItem {
    pub get: Option<Operation>,
    pub put: Option<Operation>,
    pub post: Option<Operation>,
    pub delete: Option<Operation>,
    pub options: Option<Operation>,
    pub head: Option<Operation>,
    pub patch: Option<Operation>,
    pub trace: Option<Operation>,
    /// Path-level parameters shared by all operations.
    #[serde(default)]
    pub parameters: Vec<ReferenceOr<Parameter>>,
}

impl PathItem {
    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Trace => self.trace.as_ref(),
        }
    }
}

/// An API operation (endpoint).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Vec<ReferenceOr<Parameter>>,
    pub request_body: Option<ReferenceOr<RequestBody>>,
    pub responses: IndexMap<String, ReferenceOr<Response>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Query,
    Header,
    Path,
    Cookie,
}

/// A parameter (query, path, header or cookie).
#[derive(Debug, Clone, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    pub schema: Option<ReferenceOr<Schema>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestBody {
    pub content: IndexMap<String, MediaType>,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Response {
    pub description: String,
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

/// Media type content (e.g., application/json).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaType {
    pub schema: Option<ReferenceOr<Schema>>,
}

/// JSON Schema definition used in OpenAPI.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// string, number, integer, boolean, object or array.
    #[serde(rename = "type")]
    pub schema_type: Option<String>,

    /// Item schema for array types.
    pub items: Option<Box<ReferenceOr<Schema>>>,

    /// Properties for object types, in document order.
    pub properties: Option<IndexMap<String, ReferenceOr<Schema>>>,

    /// Required property names for object types.
    #[serde(default)]
    pub required: Vec<String>,

    /// Map value schema (or a flag) for dictionary-like objects.
    pub additional_properties: Option<AdditionalProperties>,

    /// Enum values; any JSON value is accepted.
    #[serde(rename = "enum")]
    pub enum_values: Option<Vec<Value>>,

    pub description: Option<String>,
}

/// Additional properties can be a boolean or a schema.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Bool(bool),
    Schema(Box<ReferenceOr<Schema>>),
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_or_prefers_reference() {
        let parsed: ReferenceOr<Schema> =
            serde_json::from_str(r##"{ "$ref": "#/components/schemas/Pet" }"##).unwrap();
        assert!(matches!(
            parsed,
            ReferenceOr::Reference(ref r) if r.reference == "#/components/schemas/Pet"
        ));
    }

    #[test]
    fn test_properties_keep_document_order() {
        let schema: Schema = serde_json::from_str(
            r#"{ "type": "object", "properties": { "z": {}, "a": {}, "m": {} } }"#,
        )
        .unwrap();
        let keys: Vec<_> = schema.properties.unwrap().keys().cloned().collect();
        assert_eq!(keys, ["z", "a", "m"]);
    }

    #[test]
    fn test_additional_properties_bool_or_schema() {
        let flag: Schema =
            serde_json::from_str(r#"{ "type": "object", "additionalProperties": true }"#).unwrap();
        assert!(matches!(
            flag.additional_properties,
            Some(AdditionalProperties::Bool(true))
        ));

        let schema: Schema = serde_json::from_str(
            r#"{ "type": "object", "additionalProperties": { "type": "string" } }"#,
        )
        .unwrap();
        assert!(matches!(
            schema.additional_properties,
            Some(AdditionalProperties::Schema(_))
        ));
    }

    #[test]
    fn test_path_item_operation_lookup() {
        let item: PathItem = serde_json::from_str(
            r#"{ "trace": { "responses": {} }, "get": { "responses": {} } }"#,
        )
        .unwrap();
        let present: Vec<_> = METHODS
            .iter()
            .filter(|m| item.operation(**m).is_some())
            .map(|m| m.as_str())
            .collect();
        assert_eq!(present, ["get", "trace"]);
    }
}
