//! Swagger 2.0 to OpenAPI 3.0.2 conversion.
//!
//! Works on raw JSON so that the result goes through the same validation as
//! a native OpenAPI document. Only the parts of Swagger 2.0 the generator can
//! use are carried over faithfully; unknown keys on operations and schemas are
//! copied as they are.

use std::collections::HashSet;

use serde_json::{Map, Value, json};
use tracing::debug;

use crate::error::{CodegenError, Result};

const DEFAULT_MEDIA_TYPE: &str = "application/json";
const FORM_MEDIA_TYPE: &str = "application/x-www-form-urlencoded";
const MULTIPART_MEDIA_TYPE: &str = "multipart/form-data";

const VERBS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Parameter keys that move into `schema` in OpenAPI 3.
const SCHEMA_KEYS: [&str; 13] = [
    "type",
    "format",
    "items",
    "enum",
    "default",
    "minimum",
    "maximum",
    "minLength",
    "maxLength",
    "pattern",
    "minItems",
    "maxItems",
    "uniqueItems",
];

/// Upgrades a raw API description to OpenAPI 3.
pub trait Converter: Send + Sync {
    fn convert(&self, value: Value) -> Result<Value>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Swagger2Converter;

impl Converter for Swagger2Converter {
    fn convert(&self, value: Value) -> Result<Value> {
        let Value::Object(root) = value else {
            return Err(CodegenError::Conversion("expected a JSON object".into()));
        };
        match root.get("swagger").and_then(Value::as_str) {
            Some("2.0") => {}
            Some(other) => {
                return Err(CodegenError::Conversion(format!(
                    "expected swagger \"2.0\", found \"{other}\""
                )));
            }
            None => return Err(CodegenError::Conversion("missing swagger version".into())),
        }

        let upgrade = Upgrade::new(&root);
        let converted = upgrade.document();
        Ok(rewrite_refs(converted, &upgrade.body_parameters))
    }
}

struct Upgrade<'a> {
    root: &'a Map<String, Value>,
    consumes: Vec<String>,
    produces: Vec<String>,
    body_parameters: HashSet<String>,
}

impl<'a> Upgrade<'a> {
    fn new(root: &'a Map<String, Value>) -> Self {
        Self {
            root,
            consumes: media_types(root.get("consumes")).unwrap_or_default(),
            produces: media_types(root.get("produces")).unwrap_or_default(),
            body_parameters: Self::body_parameter_names(root),
        }
    }

    /// Names of global parameters declared `in: body`; they become request bodies.
    fn body_parameter_names(root: &Map<String, Value>) -> HashSet<String> {
        root.get("parameters")
            .and_then(Value::as_object)
            .map(|params| {
                params
                    .iter()
                    .filter(|(_, p)| p.get("in").and_then(Value::as_str) == Some("body"))
                    .map(|(name, _)| name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn document(&self) -> Value {
        let mut out = Map::new();
        out.insert("openapi".into(), json!("3.0.2"));
        if let Some(info) = self.root.get("info") {
            out.insert("info".into(), info.clone());
        }

        let servers = self.servers();
        if !servers.is_empty() {
            out.insert("servers".into(), Value::Array(servers));
        }

        for key in ["tags", "externalDocs", "security"] {
            if let Some(value) = self.root.get(key) {
                out.insert(key.into(), value.clone());
            }
        }

        let paths = self
            .root
            .get("paths")
            .and_then(Value::as_object)
            .map(|paths| {
                paths
                    .iter()
                    .map(|(path, item)| (path.clone(), self.path_item(item)))
                    .collect::<Map<_, _>>()
            })
            .unwrap_or_default();
        out.insert("paths".into(), Value::Object(paths));

        let components = self.components();
        if !components.is_empty() {
            out.insert("components".into(), Value::Object(components));
        }

        Value::Object(out)
    }

    fn servers(&self) -> Vec<Value> {
        let base_path = self.root.get("basePath").and_then(Value::as_str).unwrap_or("");
        let Some(host) = self.root.get("host").and_then(Value::as_str) else {
            return if base_path.is_empty() {
                Vec::new()
            } else {
                vec![json!({ "url": base_path })]
            };
        };

        let schemes = media_types(self.root.get("schemes")).unwrap_or_else(|| vec!["https".into()]);
        schemes
            .iter()
            .map(|scheme| json!({ "url": format!("{scheme}://{host}{base_path}") }))
            .collect()
    }

    fn components(&self) -> Map<String, Value> {
        let mut components = Map::new();

        if let Some(definitions) = self.root.get("definitions") {
            components.insert("schemas".into(), definitions.clone());
        }

        if let Some(params) = self.root.get("parameters").and_then(Value::as_object) {
            let mut parameters = Map::new();
            let mut request_bodies = Map::new();
            for (name, param) in params {
                if param.get("in").and_then(Value::as_str) == Some("body") {
                    request_bodies.insert(name.clone(), self.body(param, &self.consumes));
                } else {
                    parameters.insert(name.clone(), parameter(param));
                }
            }
            if !parameters.is_empty() {
                components.insert("parameters".into(), Value::Object(parameters));
            }
            if !request_bodies.is_empty() {
                components.insert("requestBodies".into(), Value::Object(request_bodies));
            }
        }

        if let Some(responses) = self.root.get("responses").and_then(Value::as_object) {
            let responses = responses
                .iter()
                .map(|(name, r)| (name.clone(), response(r, &self.produces)))
                .collect();
            components.insert("responses".into(), Value::Object(responses));
        }

        if let Some(schemes) = self.root.get("securityDefinitions") {
            components.insert("securitySchemes".into(), schemes.clone());
        }

        components
    }

    fn path_item(&self, item: &Value) -> Value {
        let Some(item) = item.as_object() else {
            return item.clone();
        };

        let mut out = Map::new();
        for (key, value) in item {
            if VERBS.contains(&key.as_str()) {
                out.insert(key.clone(), self.operation(value));
            } else if key == "parameters" {
                let params = value
                    .as_array()
                    .map(|params| {
                        params
                            .iter()
                            .filter(|p| {
                                !matches!(
                                    p.get("in").and_then(Value::as_str),
                                    Some("body" | "formData")
                                ) && !self.is_body_reference(p)
                            })
                            .map(parameter)
                            .collect()
                    })
                    .unwrap_or_default();
                out.insert(key.clone(), Value::Array(params));
            } else {
                out.insert(key.clone(), value.clone());
            }
        }
        Value::Object(out)
    }

    fn operation(&self, op: &Value) -> Value {
        let Some(op) = op.as_object() else {
            return op.clone();
        };
        let consumes = media_types(op.get("consumes")).unwrap_or_else(|| self.consumes.clone());
        let produces = media_types(op.get("produces")).unwrap_or_else(|| self.produces.clone());

        let mut out = Map::new();
        let mut parameters = Vec::new();
        let mut request_body = None;
        let mut form = Vec::new();

        for param in op.get("parameters").and_then(Value::as_array).into_iter().flatten() {
            if self.is_body_reference(param) {
                request_body = Some(param.clone());
                continue;
            }
            match param.get("in").and_then(Value::as_str) {
                Some("body") => request_body = Some(self.body(param, &consumes)),
                Some("formData") => form.push(param),
                _ => parameters.push(parameter(param)),
            }
        }
        if request_body.is_none() && !form.is_empty() {
            request_body = Some(form_body(&form, &consumes));
        }

        for (key, value) in op {
            match key.as_str() {
                "parameters" | "consumes" | "produces" | "schemes" => {}
                "responses" => {
                    let responses = value
                        .as_object()
                        .map(|responses| {
                            responses
                                .iter()
                                .map(|(code, r)| (code.clone(), response(r, &produces)))
                                .collect()
                        })
                        .unwrap_or_default();
                    out.insert(key.clone(), Value::Object(responses));
                }
                _ => {
                    out.insert(key.clone(), value.clone());
                }
            }
        }
        if !parameters.is_empty() {
            out.insert("parameters".into(), Value::Array(parameters));
        }
        if let Some(body) = request_body {
            out.insert("requestBody".into(), body);
        }
        out.entry("responses").or_insert_with(|| json!({}));

        Value::Object(out)
    }

    fn is_body_reference(&self, param: &Value) -> bool {
        param
            .get("$ref")
            .and_then(Value::as_str)
            .and_then(|r| r.strip_prefix("#/parameters/"))
            .is_some_and(|name| self.body_parameters.contains(name))
    }

    fn body(&self, param: &Value, consumes: &[String]) -> Value {
        let schema = param.get("schema").cloned().unwrap_or_else(|| json!({}));
        let content: Map<String, Value> = content_types(consumes)
            .into_iter()
            .map(|media| (media, json!({ "schema": schema })))
            .collect();

        let mut body = Map::new();
        if let Some(description) = param.get("description") {
            body.insert("description".into(), description.clone());
        }
        body.insert("content".into(), Value::Object(content));
        if let Some(required) = param.get("required") {
            body.insert("required".into(), required.clone());
        }
        Value::Object(body)
    }
}

fn media_types(value: Option<&Value>) -> Option<Vec<String>> {
    let types: Vec<String> = value?
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect();
    (!types.is_empty()).then_some(types)
}

fn content_types(types: &[String]) -> Vec<String> {
    if types.is_empty() {
        vec![DEFAULT_MEDIA_TYPE.to_string()]
    } else {
        types.to_vec()
    }
}

/// Non-body parameter: type keywords move under `schema`.
fn parameter(param: &Value) -> Value {
    let Some(param) = param.as_object() else {
        return param.clone();
    };
    if param.contains_key("$ref") {
        return Value::Object(param.clone());
    }

    let mut out = Map::new();
    let mut schema = Map::new();
    for (key, value) in param {
        if SCHEMA_KEYS.contains(&key.as_str()) {
            schema.insert(key.clone(), value.clone());
        } else if key != "collectionFormat" && key != "allowEmptyValue" {
            out.insert(key.clone(), value.clone());
        }
    }
    if !schema.is_empty() && !out.contains_key("schema") {
        out.insert("schema".into(), Value::Object(schema));
    }
    Value::Object(out)
}

fn form_body(params: &[&Value], consumes: &[String]) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    let mut has_file = false;

    for param in params {
        let Some(name) = param.get("name").and_then(Value::as_str) else {
            debug!("Skipping form parameter without a name");
            continue;
        };
        let mut schema = Map::new();
        for key in SCHEMA_KEYS {
            if let Some(value) = param.get(key) {
                schema.insert(key.into(), value.clone());
            }
        }
        if schema.get("type").and_then(Value::as_str) == Some("file") {
            has_file = true;
            schema.insert("type".into(), json!("string"));
            schema.insert("format".into(), json!("binary"));
        }
        if let Some(description) = param.get("description") {
            schema.insert("description".into(), description.clone());
        }
        if param.get("required").and_then(Value::as_bool) == Some(true) {
            required.push(json!(name));
        }
        properties.insert(name.into(), Value::Object(schema));
    }

    let media = if has_file || consumes.iter().any(|c| c == MULTIPART_MEDIA_TYPE) {
        MULTIPART_MEDIA_TYPE
    } else {
        FORM_MEDIA_TYPE
    };

    let mut schema = Map::new();
    schema.insert("type".into(), json!("object"));
    schema.insert("properties".into(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".into(), Value::Array(required));
    }
    json!({ "content": { media: { "schema": schema } } })
}

fn response(response: &Value, produces: &[String]) -> Value {
    let Some(response) = response.as_object() else {
        return response.clone();
    };
    if response.contains_key("$ref") {
        return Value::Object(response.clone());
    }

    let mut out = Map::new();
    out.insert(
        "description".into(),
        response.get("description").cloned().unwrap_or_else(|| json!("")),
    );
    if let Some(schema) = response.get("schema") {
        let content: Map<String, Value> = content_types(produces)
            .into_iter()
            .map(|media| (media, json!({ "schema": schema })))
            .collect();
        out.insert("content".into(), Value::Object(content));
    }
    if let Some(headers) = response.get("headers") {
        out.insert("headers".into(), headers.clone());
    }
    Value::Object(out)
}

/// Point every `$ref` at its OpenAPI 3 location.
fn rewrite_refs(value: Value, body_parameters: &HashSet<String>) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, value)| match (key.as_str(), value) {
                    ("$ref", Value::String(reference)) => {
                        let rewritten = rewrite_ref(&reference, body_parameters);
                        (key, Value::String(rewritten))
                    }
                    (_, value) => (key, rewrite_refs(value, body_parameters)),
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| rewrite_refs(item, body_parameters))
                .collect(),
        ),
        other => other,
    }
}

fn rewrite_ref(reference: &str, body_parameters: &HashSet<String>) -> String {
    if let Some(name) = reference.strip_prefix("#/definitions/") {
        format!("#/components/schemas/{name}")
    } else if let Some(name) = reference.strip_prefix("#/parameters/") {
        if body_parameters.contains(name) {
            format!("#/components/requestBodies/{name}")
        } else {
            format!("#/components/parameters/{name}")
        }
    } else if let Some(name) = reference.strip_prefix("#/responses/") {
        format!("#/components/responses/{name}")
    } else {
        reference.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn convert(value: Value) -> Value {
        Swagger2Converter.convert(value).unwrap()
    }

    #[test]
    fn test_rejects_non_swagger_documents() {
        let err = Swagger2Converter
            .convert(json!({ "openapi": "3.0.2" }))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Failed to convert Swagger 2.0 to OpenApi 3.0.2: missing swagger version"
        );
        assert!(Swagger2Converter.convert(json!({ "swagger": "1.2" })).is_err());
        assert!(Swagger2Converter.convert(json!([])).is_err());
    }

    #[test]
    fn test_definitions_become_schemas_with_rewritten_refs() {
        let out = convert(json!({
            "swagger": "2.0",
            "info": { "title": "Pets", "version": "1" },
            "paths": {},
            "definitions": {
                "Pet": {
                    "type": "object",
                    "properties": { "owner": { "$ref": "#/definitions/Person" } }
                },
                "Person": { "type": "object" }
            }
        }));
        assert_eq!(out["openapi"], "3.0.2");
        assert_eq!(
            out["components"]["schemas"]["Pet"]["properties"]["owner"]["$ref"],
            "#/components/schemas/Person"
        );
    }

    #[test]
    fn test_servers_from_host_and_base_path() {
        let out = convert(json!({
            "swagger": "2.0",
            "info": { "title": "Pets", "version": "1" },
            "host": "petstore.example.com",
            "basePath": "/v1",
            "schemes": ["https", "http"],
            "paths": {}
        }));
        assert_eq!(
            out["servers"],
            json!([
                { "url": "https://petstore.example.com/v1" },
                { "url": "http://petstore.example.com/v1" }
            ])
        );
    }

    #[test]
    fn test_operation_parameters_body_and_responses() {
        let out = convert(json!({
            "swagger": "2.0",
            "info": { "title": "Pets", "version": "1" },
            "produces": ["application/json"],
            "paths": {
                "/pets/{id}": {
                    "put": {
                        "operationId": "updatePet",
                        "parameters": [
                            { "name": "id", "in": "path", "required": true, "type": "string" },
                            { "name": "body", "in": "body", "required": true, "schema": { "$ref": "#/definitions/Pet" } }
                        ],
                        "responses": {
                            "200": { "description": "ok", "schema": { "$ref": "#/definitions/Pet" } },
                            "404": { "$ref": "#/responses/NotFound" }
                        }
                    }
                }
            }
        }));
        let op = &out["paths"]["/pets/{id}"]["put"];
        assert_eq!(
            op["parameters"],
            json!([{ "name": "id", "in": "path", "required": true, "schema": { "type": "string" } }])
        );
        assert_eq!(
            op["requestBody"]["content"]["application/json"]["schema"]["$ref"],
            "#/components/schemas/Pet"
        );
        assert_eq!(op["requestBody"]["required"], true);
        assert_eq!(
            op["responses"]["200"]["content"]["application/json"]["schema"]["$ref"],
            "#/components/schemas/Pet"
        );
        assert_eq!(op["responses"]["404"]["$ref"], "#/components/responses/NotFound");
    }

    #[test]
    fn test_form_data_becomes_form_body() {
        let out = convert(json!({
            "swagger": "2.0",
            "info": { "title": "Pets", "version": "1" },
            "paths": {
                "/pets/{id}/photo": {
                    "post": {
                        "parameters": [
                            { "name": "caption", "in": "formData", "type": "string", "required": true },
                            { "name": "file", "in": "formData", "type": "file" }
                        ],
                        "responses": { "204": {} }
                    }
                }
            }
        }));
        let op = &out["paths"]["/pets/{id}/photo"]["post"];
        let schema = &op["requestBody"]["content"]["multipart/form-data"]["schema"];
        assert_eq!(schema["required"], json!(["caption"]));
        assert_eq!(schema["properties"]["file"]["format"], "binary");
        assert_eq!(op["responses"]["204"]["description"], "");
    }

    #[test]
    fn test_global_body_parameters_become_request_bodies() {
        let out = convert(json!({
            "swagger": "2.0",
            "info": { "title": "Pets", "version": "1" },
            "parameters": {
                "PetBody": { "name": "pet", "in": "body", "schema": { "$ref": "#/definitions/Pet" } },
                "limit": { "name": "limit", "in": "query", "type": "integer" }
            },
            "paths": {
                "/pets": {
                    "get": {
                        "parameters": [{ "$ref": "#/parameters/limit" }],
                        "responses": {}
                    },
                    "post": {
                        "parameters": [{ "$ref": "#/parameters/PetBody" }],
                        "responses": {}
                    }
                }
            }
        }));
        assert_eq!(
            out["components"]["parameters"]["limit"]["schema"]["type"],
            "integer"
        );
        assert_eq!(
            out["components"]["requestBodies"]["PetBody"]["content"]["application/json"]["schema"]["$ref"],
            "#/components/schemas/Pet"
        );
        assert_eq!(
            out["paths"]["/pets"]["get"]["parameters"][0]["$ref"],
            "#/components/parameters/limit"
        );
        let post = &out["paths"]["/pets"]["post"];
        assert_eq!(post["requestBody"]["$ref"], "#/components/requestBodies/PetBody");
        assert!(post.get("parameters").is_none());
    }
}
