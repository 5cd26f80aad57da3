//! File bodies for the generated client.
//!
//! `generate_sources` runs the whole IR pipeline over a validated document:
//! extract operations, assemble and sort declarations, then print the models,
//! controllers and actions files. The utilities and index files are fixed text.

use std::fmt::Write as _;

use crate::openapi::spec::OpenApiDocument;

use super::api::Operation;
use super::declare::{
    DeclarationModule, SortedDeclaration, operation_declarations, schema_declarations,
    sort_declarations,
};
use super::emit::Emit;
use super::normalize::extract_operations;
use super::utils::{clean_action_name, comment_safe, quote};

pub const UTILITIES_SOURCE: &str = include_str!("../templates/utilities.ts");
pub const INDEX_SOURCE: &str = include_str!("../templates/index.ts");

/// Action-type prefix used when neither the project nor the document names the API.
pub const UNKNOWN_API: &str = "UNKNOWN_API";

const MODELS_IMPORTS: &str = "import * as t from 'io-ts';";

const CONTROLLERS_IMPORTS: &str = "import * as t from 'io-ts';

import * as m from './models';
import * as u from './utilities';";

const ACTIONS_IMPORTS: &str = "import { actionCreatorFactory } from '@nll/dux/lib/Actions';
import { asyncReducersFactory } from '@nll/dux/lib/Reducers';

import * as cs from './controllers';
import * as u from './utilities';";

/// Printed bodies of the generated files, before formatting.
#[derive(Debug, Clone)]
pub struct GeneratedSources {
    pub models: String,
    pub controllers: String,
    pub actions: String,
    pub utilities: &'static str,
    pub index: &'static str,
}

/// Run extraction, assembly, sorting and printing over a validated document.
///
/// `api_name` is the configured project name; the document title is the
/// fallback.
pub fn generate_sources(doc: &OpenApiDocument, api_name: Option<&str>) -> GeneratedSources {
    let operations = extract_operations(doc);

    let mut pool = schema_declarations(doc);
    pool.extend(operation_declarations(&operations));
    let sorted = sort_declarations(pool);

    let api_name = api_name
        .filter(|n| !n.trim().is_empty())
        .or_else(|| Some(doc.info.title.as_str()).filter(|t| !t.trim().is_empty()));

    GeneratedSources {
        models: models_source(&sorted),
        controllers: controllers_source(&sorted, &operations),
        actions: actions_source(&operations, api_name),
        utilities: UTILITIES_SOURCE,
        index: INDEX_SOURCE,
    }
}

fn declarations_in(sorted: &[SortedDeclaration], module: DeclarationModule) -> Vec<String> {
    sorted
        .iter()
        .filter(|s| s.declaration.module == module)
        .map(Emit::emit)
        .collect()
}

/// `models.ts`: every schema declaration in dependency order.
pub fn models_source(sorted: &[SortedDeclaration]) -> String {
    let mut sections = vec![MODELS_IMPORTS.to_string()];
    sections.extend(declarations_in(sorted, DeclarationModule::Models));
    sections.join("\n\n") + "\n"
}

/// `controllers.ts`: request/response declarations, then one controller
/// binding per operation.
pub fn controllers_source(sorted: &[SortedDeclaration], operations: &[Operation]) -> String {
    let mut sections = vec![CONTROLLERS_IMPORTS.to_string()];
    sections.extend(declarations_in(sorted, DeclarationModule::Controllers));
    sections.extend(operations.iter().map(controller_binding));
    sections.join("\n\n") + "\n"
}

fn controller_binding(op: &Operation) -> String {
    let mut out = format!("/* {}", op.name);
    if let Some(description) = op.description.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        let _ = write!(out, ": {}", comment_safe(&description.replace('\n', " ")));
    }
    out.push_str(" */\n");

    let response = op.response_name();
    let method = quote(op.method.as_str());
    let path = quote(&op.path);
    if op.has_request() {
        let _ = write!(
            out,
            "export const {} = u.controllerFactory<{}, {response}>({response}, {method}, {path});",
            op.controller_name(),
            op.request_name(),
        );
    } else {
        let _ = write!(
            out,
            "export const {} = u.requestlessControllerFactory<{response}>({response}, {method}, {path});",
            op.controller_name(),
        );
    }
    out
}

/// `actions.ts`: one async action bundle (creator, reducers, effects) per operation.
pub fn actions_source(operations: &[Operation], api_name: Option<&str>) -> String {
    let prefix = api_name
        .map(clean_action_name)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| UNKNOWN_API.to_string());

    let mut sections = vec![
        ACTIONS_IMPORTS.to_string(),
        format!("const actionCreator = actionCreatorFactory({});", quote(&prefix)),
    ];
    sections.extend(operations.iter().map(action_bundle));
    sections.join("\n\n") + "\n"
}

fn action_bundle(op: &Operation) -> String {
    let action = format!("async{}", op.name);
    let (request, effects) = if op.has_request() {
        (format!("cs.{}", op.request_name()), "u.effects")
    } else {
        ("void".to_string(), "u.reqlessEffects")
    };

    [
        format!(
            "export const {action} = actionCreator.async<{request}, cs.{}, Error>({});",
            op.response_name(),
            quote(&clean_action_name(&op.name)),
        ),
        format!("export const {action}Reducers = asyncReducersFactory({action});"),
        format!(
            "export const {action}Effects = {effects}({action}, cs.{});",
            op.controller_name()
        ),
    ]
    .join("\n")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::openapi::ir::types::{Primitive, Property, TypeExpr};
    use crate::openapi::spec::HttpMethod;

    fn document(json: &str) -> OpenApiDocument {
        serde_json::from_str(json).unwrap()
    }

    const PETSTORE: &str = r##"{
        "openapi": "3.0.2",
        "info": { "title": "Swagger Petstore", "version": "1.0.0" },
        "paths": {
            "/pets/{id}": {
                "get": {
                    "operationId": "getPet",
                    "description": "Find a pet",
                    "parameters": [
                        { "name": "id", "in": "path", "required": true, "schema": { "type": "string" } }
                    ],
                    "responses": {
                        "200": {
                            "description": "ok",
                            "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Pet" } } }
                        }
                    }
                }
            },
            "/health": {
                "get": { "responses": {} }
            }
        },
        "components": {
            "schemas": {
                "Pet": {
                    "type": "object",
                    "required": ["name"],
                    "properties": {
                        "name": { "type": "string" },
                        "status": { "$ref": "#/components/schemas/Status" }
                    }
                },
                "Status": { "type": "string", "enum": ["available", "pending", "sold"] }
            }
        }
    }"##;

    #[test]
    fn test_models_follow_dependency_order() {
        let sources = generate_sources(&document(PETSTORE), None);
        assert!(sources.models.starts_with("import * as t from 'io-ts';\n\n"));
        let status = sources.models.find("export type Status").unwrap();
        let pet = sources.models.find("export interface Pet").unwrap();
        assert!(status < pet);
        assert!(sources.models.contains("  status: Status,"));
        assert!(sources.models.ends_with(";\n"));
    }

    #[test]
    fn test_controllers_file() {
        let sources = generate_sources(&document(PETSTORE), None);
        let controllers = &sources.controllers;
        assert!(controllers.starts_with(CONTROLLERS_IMPORTS));
        assert!(controllers.contains(
            "export interface getPetRequest {\n  path: {\n    id: string;\n  };\n}"
        ));
        assert!(controllers.contains("export type getPetResponse = m.Pet;"));
        assert!(controllers.contains("export const getPetResponse = m.Pet;"));
        assert!(controllers.contains(
            "/* getPet: Find a pet */\nexport const getPetController = u.controllerFactory<getPetRequest, getPetResponse>(getPetResponse, 'get', '/pets/{id}');"
        ));
        assert!(controllers.contains(
            "/* get_health */\nexport const get_healthController = u.requestlessControllerFactory<get_healthResponse>(get_healthResponse, 'get', '/health');"
        ));
        assert!(!controllers.contains("get_healthRequest"));
    }

    #[test]
    fn test_actions_file() {
        let sources = generate_sources(&document(PETSTORE), None);
        let actions = &sources.actions;
        assert!(actions.starts_with(ACTIONS_IMPORTS));
        assert!(actions.contains("const actionCreator = actionCreatorFactory('SWAGGER_PETSTORE');"));
        assert!(actions.contains(
            "export const asyncgetPet = actionCreator.async<cs.getPetRequest, cs.getPetResponse, Error>('GETPET');\nexport const asyncgetPetReducers = asyncReducersFactory(asyncgetPet);\nexport const asyncgetPetEffects = u.effects(asyncgetPet, cs.getPetController);"
        ));
        assert!(actions.contains(
            "export const asyncget_health = actionCreator.async<void, cs.get_healthResponse, Error>('GET_HEALTH');"
        ));
        assert!(actions.contains("u.reqlessEffects(asyncget_health, cs.get_healthController);"));
    }

    #[test]
    fn test_configured_name_wins_over_title() {
        let sources = generate_sources(&document(PETSTORE), Some("my pets"));
        assert!(sources.actions.contains("actionCreatorFactory('MY_PETS')"));
    }

    #[test]
    fn test_unknown_api_name() {
        assert!(actions_source(&[], None).contains("actionCreatorFactory('UNKNOWN_API')"));
        assert!(actions_source(&[], Some("@@@")).contains("actionCreatorFactory('UNKNOWN_API')"));
    }

    #[test]
    fn test_controller_comment_is_escaped() {
        let op = Operation {
            name: "ping".into(),
            method: HttpMethod::Head,
            path: "/ping".into(),
            description: Some("Closes */ early".into()),
            path_params: None,
            query_params: Some(TypeExpr::Object(vec![Property::new(
                "q",
                TypeExpr::Primitive(Primitive::String),
                true,
            )])),
            request_body: None,
            response: TypeExpr::UnknownValue,
        };
        assert_eq!(
            controller_binding(&op),
            "/* ping: Closes * / early */\nexport const pingController = u.controllerFactory<pingRequest, pingResponse>(pingResponse, 'head', '/ping');"
        );
    }

    #[test]
    fn test_boilerplate_is_fixed_text() {
        let sources = generate_sources(&document(PETSTORE), None);
        assert_eq!(sources.utilities, UTILITIES_SOURCE);
        assert!(sources.index.contains("export { actions, controllers, models, utilities };"));
        assert!(UTILITIES_SOURCE.contains("export const controllerFactory"));
        assert!(UTILITIES_SOURCE.contains("export const requestlessControllerFactory"));
    }
}
