//! Type expression IR for code generation.
//!
//! A `TypeExpr` is the generator's algebraic view of a JSON schema node. It
//! carries enough information to print both a static TypeScript type and an
//! io-ts runtime validator; see `emit.rs`.

use std::collections::BTreeSet;

/// Primitive leaf types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    String,
    Number,
    Boolean,
}

/// A generated type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeExpr {
    Primitive(Primitive),
    /// Any value; the fallback for everything the builder cannot interpret.
    UnknownValue,
    /// An object with unconstrained keys and values.
    UnknownRecord,
    /// An array with unconstrained items.
    UnknownArray,
    Array(Box<TypeExpr>),
    Record {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    /// An object with known properties, in document order.
    Object(Vec<Property>),
    /// A finite set of string literals, in document order.
    KeyOf(Vec<String>),
    /// Exactly one string literal.
    Literal(String),
    /// Reference to a declaration by name.
    Named(NamedRef),
}

/// Object property.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub ty: TypeExpr,
    pub optional: bool,
    pub description: Option<String>,
}

/// A reference to a named declaration.
///
/// `dependencies` always contains `name`. `qualifier` only changes how the
/// reference is printed (`m.Pet` instead of `Pet`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedRef {
    pub name: String,
    pub qualifier: Option<String>,
    pub dependencies: BTreeSet<String>,
}

impl NamedRef {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let dependencies = BTreeSet::from([name.clone()]);
        Self {
            name,
            qualifier: None,
            dependencies,
        }
    }

    /// Same reference, printed through a module alias.
    pub fn qualified(mut self, qualifier: impl Into<String>) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }

    /// Printable name, including the qualifier when present.
    pub fn printed(&self) -> String {
        match &self.qualifier {
            Some(q) => format!("{q}.{}", self.name),
            None => self.name.clone(),
        }
    }
}

impl Property {
    pub fn new(name: impl Into<String>, ty: TypeExpr, optional: bool) -> Self {
        Self {
            name: name.into(),
            ty,
            optional,
            description: None,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }
}

impl TypeExpr {
    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Named(NamedRef::new(name))
    }

    /// Union of the dependency sets of every named reference reachable in this type.
    pub fn dependencies(&self) -> BTreeSet<String> {
        let mut deps = BTreeSet::new();
        let mut stack = vec![self];
        while let Some(ty) = stack.pop() {
            match ty {
                TypeExpr::Named(named) => deps.extend(named.dependencies.iter().cloned()),
                TypeExpr::Array(inner) => stack.push(inner),
                TypeExpr::Record { key, value } => {
                    stack.push(key);
                    stack.push(value);
                }
                TypeExpr::Object(props) => stack.extend(props.iter().map(|p| &p.ty)),
                TypeExpr::Primitive(_)
                | TypeExpr::UnknownValue
                | TypeExpr::UnknownRecord
                | TypeExpr::UnknownArray
                | TypeExpr::KeyOf(_)
                | TypeExpr::Literal(_) => {}
            }
        }
        deps
    }
}
