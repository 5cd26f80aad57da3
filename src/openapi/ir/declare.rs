//! Declaration assembly and dependency ordering.
//!
//! Schema declarations (the models file) and operation declarations (the
//! controllers file) share one pool so that a single sort orders both. Named
//! references always point at models, so the sort is keyed by module and name.

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::warn;

use crate::openapi::spec::{OpenApiDocument, ReferenceOr};

use super::api::Operation;
use super::normalize::TypeExprBuilder;
use super::types::TypeExpr;
use super::utils::model_identifier;

/// The generated file a declaration is printed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeclarationModule {
    Models,
    Controllers,
}

/// A named, printable type.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub name: String,
    pub module: DeclarationModule,
    pub ty: TypeExpr,
    pub description: Option<String>,
}

impl Declaration {
    /// Names of the model declarations this one references.
    pub fn dependencies(&self) -> BTreeSet<String> {
        self.ty.dependencies()
    }
}

/// A declaration in print order.
#[derive(Debug, Clone)]
pub struct SortedDeclaration {
    pub declaration: Declaration,
    /// References itself, or was emitted before one of its dependencies to
    /// break a cycle. Its runtime value must be built lazily.
    pub recursive: bool,
}

/// One declaration per entry of `components.schemas`, in document order.
pub fn schema_declarations(doc: &OpenApiDocument) -> Vec<Declaration> {
    let builder = TypeExprBuilder::new();
    let mut names = HashSet::new();
    let mut declarations = Vec::new();

    for (key, node) in &doc.components.schemas {
        let name = model_identifier(key);
        if name.is_empty() || !names.insert(name.clone()) {
            warn!(schema = %key, "Skipping schema with an unusable or duplicate name");
            continue;
        }
        let description = match node {
            ReferenceOr::Item(schema) => schema.description.clone(),
            ReferenceOr::Reference(_) => None,
        };
        declarations.push(Declaration {
            name,
            module: DeclarationModule::Models,
            ty: builder.build(node),
            description,
        });
    }

    declarations
}

/// Request (when the operation takes input) and response declarations.
pub fn operation_declarations(operations: &[Operation]) -> Vec<Declaration> {
    let mut declarations = Vec::with_capacity(operations.len() * 2);
    for op in operations {
        if let Some(ty) = op.request_type() {
            declarations.push(Declaration {
                name: op.request_name(),
                module: DeclarationModule::Controllers,
                ty,
                description: None,
            });
        }
        declarations.push(Declaration {
            name: op.response_name(),
            module: DeclarationModule::Controllers,
            ty: op.response.clone(),
            description: None,
        });
    }
    declarations
}

/// Order the pool so that every declaration follows the declarations it
/// depends on.
///
/// Kahn's algorithm; among ready declarations the earliest in the pool goes
/// first. When only cycles remain, the earliest declaration on a cycle is
/// emitted and marked recursive. Terminates on any graph.
pub fn sort_declarations(pool: Vec<Declaration>) -> Vec<SortedDeclaration> {
    let (deps, self_referencing) = dependency_edges(&pool);

    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); pool.len()];
    let mut pending: Vec<usize> = deps.iter().map(Vec::len).collect();
    for (i, edges) in deps.iter().enumerate() {
        for &j in edges {
            dependents[j].push(i);
        }
    }

    let mut ready: BTreeSet<usize> = (0..pool.len()).filter(|&i| pending[i] == 0).collect();
    let mut emitted = vec![false; pool.len()];
    let mut order: Vec<(usize, bool)> = Vec::with_capacity(pool.len());

    while order.len() < pool.len() {
        let (next, cycle_break) = match ready.pop_first() {
            Some(i) => (i, false),
            None => {
                let Some(start) = emitted.iter().position(|done| !done) else {
                    break;
                };
                (cycle_member(start, &deps, &emitted), true)
            }
        };

        emitted[next] = true;
        order.push((next, cycle_break));
        for &d in &dependents[next] {
            if emitted[d] {
                continue;
            }
            pending[d] = pending[d].saturating_sub(1);
            if pending[d] == 0 {
                ready.insert(d);
            }
        }
    }

    let mut slots: Vec<Option<Declaration>> = pool.into_iter().map(Some).collect();
    order
        .into_iter()
        .filter_map(|(i, cycle_break)| {
            slots[i].take().map(|declaration| SortedDeclaration {
                declaration,
                recursive: cycle_break || self_referencing[i],
            })
        })
        .collect()
}

/// Edges from each declaration to the pool entries it depends on, by index.
/// Self references are reported separately instead of as edges.
fn dependency_edges(pool: &[Declaration]) -> (Vec<Vec<usize>>, Vec<bool>) {
    let index: HashMap<(DeclarationModule, &str), usize> = pool
        .iter()
        .enumerate()
        .map(|(i, d)| ((d.module, d.name.as_str()), i))
        .collect();

    let mut self_referencing = vec![false; pool.len()];
    let mut deps = Vec::with_capacity(pool.len());
    for (i, declaration) in pool.iter().enumerate() {
        let mut edges = Vec::new();
        for name in declaration.dependencies() {
            match index.get(&(DeclarationModule::Models, name.as_str())) {
                Some(&j) if j == i => self_referencing[i] = true,
                Some(&j) => edges.push(j),
                None => {}
            }
        }
        deps.push(edges);
    }
    (deps, self_referencing)
}

/// Walk unemitted dependencies from `start` until a node repeats, then return
/// the earliest pool index on the cycle that was found.
fn cycle_member(start: usize, deps: &[Vec<usize>], emitted: &[bool]) -> usize {
    let mut position: HashMap<usize, usize> = HashMap::new();
    let mut path = Vec::new();
    let mut current = start;

    loop {
        if let Some(&at) = position.get(&current) {
            return path[at..].iter().copied().min().unwrap_or(current);
        }
        position.insert(current, path.len());
        path.push(current);

        let next = deps[current].iter().copied().filter(|&d| !emitted[d]).min();
        match next {
            Some(next) => current = next,
            None => return current,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::openapi::ir::types::{NamedRef, Primitive, Property};

    fn model(name: &str, ty: TypeExpr) -> Declaration {
        Declaration {
            name: name.into(),
            module: DeclarationModule::Models,
            ty,
            description: None,
        }
    }

    fn refs(names: &[&str]) -> TypeExpr {
        TypeExpr::Object(
            names
                .iter()
                .map(|n| Property::new(n.to_lowercase(), TypeExpr::named(*n), false))
                .collect(),
        )
    }

    fn order(sorted: &[SortedDeclaration]) -> Vec<&str> {
        sorted.iter().map(|s| s.declaration.name.as_str()).collect()
    }

    fn position(sorted: &[SortedDeclaration], name: &str) -> usize {
        sorted
            .iter()
            .position(|s| s.declaration.name == name)
            .unwrap_or(usize::MAX)
    }

    #[test]
    fn test_dependencies_come_first() {
        let pool = vec![
            model("Order", refs(&["Pet", "Customer"])),
            model("Pet", refs(&["Category", "Tag"])),
            model("Customer", refs(&["Address"])),
            model("Category", TypeExpr::Primitive(Primitive::String)),
            model("Tag", TypeExpr::Primitive(Primitive::String)),
            model("Address", TypeExpr::UnknownRecord),
        ];
        let expected_edges: Vec<(String, BTreeSet<String>)> = pool
            .iter()
            .map(|d| (d.name.clone(), d.dependencies()))
            .collect();

        let sorted = sort_declarations(pool);
        assert_eq!(sorted.len(), 6);
        for (name, deps) in expected_edges {
            for dep in deps {
                assert!(
                    position(&sorted, &dep) < position(&sorted, &name),
                    "{dep} must precede {name}"
                );
            }
        }
        assert!(sorted.iter().all(|s| !s.recursive));
    }

    #[test]
    fn test_independent_declarations_keep_pool_order() {
        let pool = vec![
            model("B", TypeExpr::UnknownValue),
            model("A", TypeExpr::UnknownValue),
            model("C", TypeExpr::UnknownValue),
        ];
        assert_eq!(order(&sort_declarations(pool)), ["B", "A", "C"]);
    }

    #[test]
    fn test_self_reference_is_recursive() {
        let tree = model(
            "Tree",
            TypeExpr::Object(vec![Property::new(
                "children",
                TypeExpr::Array(Box::new(TypeExpr::named("Tree"))),
                true,
            )]),
        );
        let sorted = sort_declarations(vec![tree]);
        assert_eq!(order(&sorted), ["Tree"]);
        assert!(sorted[0].recursive);
    }

    #[test]
    fn test_cycles_terminate_with_total_order() {
        let pool = vec![
            model("Uses", refs(&["A"])),
            model("A", refs(&["B"])),
            model("B", refs(&["A"])),
            model("Leaf", TypeExpr::UnknownValue),
        ];
        let sorted = sort_declarations(pool);
        assert_eq!(order(&sorted), ["Leaf", "A", "Uses", "B"]);

        let recursive: Vec<_> = sorted
            .iter()
            .filter(|s| s.recursive)
            .map(|s| s.declaration.name.as_str())
            .collect();
        assert_eq!(recursive, ["A"]);
    }

    #[test]
    fn test_sort_is_deterministic() {
        let pool = || {
            vec![
                model("A", refs(&["C"])),
                model("B", refs(&["A"])),
                model("C", refs(&["B"])),
                model("D", refs(&["C", "Missing"])),
            ]
        };
        let first: Vec<String> = sort_declarations(pool())
            .into_iter()
            .map(|s| s.declaration.name)
            .collect();
        let second: Vec<String> = sort_declarations(pool())
            .into_iter()
            .map(|s| s.declaration.name)
            .collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
        assert_eq!(first.last().map(String::as_str), Some("D"));
    }

    #[test]
    fn test_controller_declarations_depend_on_models() {
        let response = Declaration {
            name: "getPetResponse".into(),
            module: DeclarationModule::Controllers,
            ty: TypeExpr::Named(NamedRef::new("Pet").qualified("m")),
            description: None,
        };
        let pool = vec![response, model("Pet", TypeExpr::UnknownRecord)];
        assert_eq!(order(&sort_declarations(pool)), ["Pet", "getPetResponse"]);
    }

    #[test]
    fn test_operation_declarations() {
        use crate::openapi::spec::HttpMethod;

        let op = |name: &str, body: Option<TypeExpr>| Operation {
            name: name.into(),
            method: HttpMethod::Post,
            path: "/pets".into(),
            description: None,
            path_params: None,
            query_params: None,
            request_body: body,
            response: TypeExpr::UnknownValue,
        };
        let declarations = operation_declarations(&[
            op("addPet", Some(TypeExpr::named("Pet"))),
            op("ping", None),
        ]);
        let names: Vec<_> = declarations.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["addPetRequest", "addPetResponse", "pingResponse"]);
        assert!(
            declarations
                .iter()
                .all(|d| d.module == DeclarationModule::Controllers)
        );
    }

    #[test]
    fn test_reserved_schema_names_get_a_suffix() {
        let doc: OpenApiDocument = serde_json::from_value(serde_json::json!({
            "openapi": "3.0.2",
            "info": { "title": "Pets", "version": "1" },
            "paths": {},
            "components": {
                "schemas": {
                    "t": { "type": "string" },
                    "default": {
                        "type": "object",
                        "properties": { "kind": { "$ref": "#/components/schemas/t" } }
                    },
                    "default_": { "type": "number" }
                }
            }
        }))
        .unwrap();

        let declarations = schema_declarations(&doc);
        let names: Vec<_> = declarations.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["t_", "default_"]);
        assert_eq!(
            declarations[1].dependencies().into_iter().collect::<Vec<_>>(),
            ["t_"]
        );
    }
}
