//! API-level IR for normalized operations.
//!
//! An `Operation` is one path × verb pair with every OpenAPI corner case
//! already resolved: parameters are split by location, references are
//! resolved to names, and the response type has been picked.

use crate::openapi::spec::HttpMethod;

use super::types::{Property, TypeExpr};

/// Normalized API operation
#[derive(Debug, Clone)]
pub struct Operation {
    /// Sanitized identifier, unique across the run (e.g. "listPets", "get_pets_id")
    pub name: String,
    pub method: HttpMethod,
    /// Raw path template (e.g. "/pets/{id}")
    pub path: String,
    /// Operation description, else its summary
    pub description: Option<String>,
    pub path_params: Option<TypeExpr>,
    pub query_params: Option<TypeExpr>,
    pub request_body: Option<TypeExpr>,
    pub response: TypeExpr,
}

impl Operation {
    pub fn request_name(&self) -> String {
        format!("{}Request", self.name)
    }

    pub fn response_name(&self) -> String {
        format!("{}Response", self.name)
    }

    pub fn controller_name(&self) -> String {
        format!("{}Controller", self.name)
    }

    pub fn has_request(&self) -> bool {
        self.path_params.is_some() || self.query_params.is_some() || self.request_body.is_some()
    }

    /// The request envelope: `{ path, query, body }`, each part present only
    /// when the operation has it. `None` when the operation takes no input.
    pub fn request_type(&self) -> Option<TypeExpr> {
        let props: Vec<Property> = [
            ("path", &self.path_params),
            ("query", &self.query_params),
            ("body", &self.request_body),
        ]
        .into_iter()
        .filter_map(|(key, ty)| ty.clone().map(|ty| Property::new(key, ty, false)))
        .collect();

        (!props.is_empty()).then_some(TypeExpr::Object(props))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openapi::ir::types::Primitive;

    fn operation() -> Operation {
        Operation {
            name: "getPet".into(),
            method: HttpMethod::Get,
            path: "/pets/{id}".into(),
            description: None,
            path_params: None,
            query_params: None,
            request_body: None,
            response: TypeExpr::UnknownValue,
        }
    }

    #[test]
    fn test_names() {
        let op = operation();
        assert_eq!(op.request_name(), "getPetRequest");
        assert_eq!(op.response_name(), "getPetResponse");
        assert_eq!(op.controller_name(), "getPetController");
    }

    #[test]
    fn test_request_type_absent_without_inputs() {
        let op = operation();
        assert!(!op.has_request());
        assert!(op.request_type().is_none());
    }

    #[test]
    fn test_request_type_keeps_part_order() {
        let mut op = operation();
        op.request_body = Some(TypeExpr::named("Pet"));
        op.path_params = Some(TypeExpr::Object(vec![Property::new(
            "id",
            TypeExpr::Primitive(Primitive::String),
            false,
        )]));

        let Some(TypeExpr::Object(props)) = op.request_type() else {
            unreachable!("request type is an object");
        };
        let keys: Vec<_> = props.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(keys, ["path", "body"]);
        assert!(props.iter().all(|p| !p.optional));
    }
}
