//! TypeScript code emission via the Emit traits.
//!
//! Every `TypeExpr` has two facets: `Emit` prints the static TypeScript type
//! and `EmitRuntime` prints the matching io-ts codec. Declarations combine
//! both into `export type`/`export interface` plus `export const`.

use super::declare::SortedDeclaration;
use super::types::{Primitive, Property, TypeExpr};
use super::utils::{comment_safe, quote, quote_if_needed};

/// Trait for emitting static TypeScript types.
pub trait Emit {
    /// Convert the node to its TypeScript string representation.
    fn emit(&self) -> String;
}

/// Trait for emitting io-ts runtime codecs.
pub trait EmitRuntime {
    fn emit_runtime(&self) -> String;
}

/// Indent every line after the first, for nesting multi-line output.
fn nest(text: &str) -> String {
    text.replace('\n', "\n  ")
}

fn doc_comment(description: Option<&str>) -> Option<String> {
    description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(|d| format!("/** {} */", comment_safe(&d.replace('\n', " "))))
}

// =============================================================================
// Static types
// =============================================================================

impl Emit for Primitive {
    fn emit(&self) -> String {
        match self {
            Primitive::String => "string".to_string(),
            Primitive::Number => "number".to_string(),
            Primitive::Boolean => "boolean".to_string(),
        }
    }
}

impl Emit for TypeExpr {
    fn emit(&self) -> String {
        match self {
            TypeExpr::Primitive(p) => p.emit(),
            TypeExpr::UnknownValue => "unknown".to_string(),
            TypeExpr::UnknownRecord => "Record<string, unknown>".to_string(),
            TypeExpr::UnknownArray => "Array<unknown>".to_string(),
            TypeExpr::Array(inner) => format!("Array<{}>", inner.emit()),
            TypeExpr::Record { key, value } => {
                format!("Record<{}, {}>", key.emit(), value.emit())
            }
            TypeExpr::Object(props) => emit_object_body(props),
            TypeExpr::KeyOf(values) => values.iter().map(|v| quote(v)).collect::<Vec<_>>().join(" | "),
            TypeExpr::Literal(value) => quote(value),
            TypeExpr::Named(named) => named.printed(),
        }
    }
}

impl Emit for Property {
    fn emit(&self) -> String {
        let key = quote_if_needed(&self.name);
        let opt = if self.optional { "?" } else { "" };
        let line = format!("{key}{opt}: {};", self.ty.emit());
        match doc_comment(self.description.as_deref()) {
            Some(comment) => format!("{comment}\n{line}"),
            None => line,
        }
    }
}

fn emit_object_body(props: &[Property]) -> String {
    if props.is_empty() {
        return "{}".to_string();
    }
    let mut out = String::from("{");
    for prop in props {
        out.push_str("\n  ");
        out.push_str(&nest(&prop.emit()));
    }
    out.push_str("\n}");
    out
}

// =============================================================================
// Runtime codecs
// =============================================================================

impl EmitRuntime for Primitive {
    fn emit_runtime(&self) -> String {
        format!("t.{}", self.emit())
    }
}

impl EmitRuntime for TypeExpr {
    fn emit_runtime(&self) -> String {
        match self {
            TypeExpr::Primitive(p) => p.emit_runtime(),
            TypeExpr::UnknownValue => "t.unknown".to_string(),
            TypeExpr::UnknownRecord => "t.UnknownRecord".to_string(),
            TypeExpr::UnknownArray => "t.UnknownArray".to_string(),
            TypeExpr::Array(inner) => format!("t.array({})", inner.emit_runtime()),
            TypeExpr::Record { key, value } => {
                format!("t.record({}, {})", key.emit_runtime(), value.emit_runtime())
            }
            TypeExpr::Object(props) => emit_object_codec(props),
            TypeExpr::KeyOf(values) => {
                let keys: Vec<_> = values
                    .iter()
                    .map(|v| format!("{}: null", quote_if_needed(v)))
                    .collect();
                format!("t.keyof({{ {} }})", keys.join(", "))
            }
            TypeExpr::Literal(value) => format!("t.literal({})", quote(value)),
            TypeExpr::Named(named) => named.printed(),
        }
    }
}

fn emit_props_codec(combinator: &str, props: &[&Property]) -> String {
    if props.is_empty() {
        return format!("{combinator}({{}})");
    }
    let mut out = format!("{combinator}({{");
    for prop in props {
        out.push_str(&format!(
            "\n  {}: {},",
            quote_if_needed(&prop.name),
            nest(&prop.ty.emit_runtime())
        ));
    }
    out.push_str("\n})");
    out
}

/// `t.type` for required properties, `t.partial` for optional ones, an
/// intersection of both when the object mixes them.
fn emit_object_codec(props: &[Property]) -> String {
    let (optional, required): (Vec<&Property>, Vec<&Property>) =
        props.iter().partition(|p| p.optional);

    match (required.is_empty(), optional.is_empty()) {
        (_, true) => emit_props_codec("t.type", &required),
        (true, false) => emit_props_codec("t.partial", &optional),
        (false, false) => format!(
            "t.intersection([\n  {},\n  {},\n])",
            nest(&emit_props_codec("t.type", &required)),
            nest(&emit_props_codec("t.partial", &optional)),
        ),
    }
}

// =============================================================================
// Declarations
// =============================================================================

impl Emit for SortedDeclaration {
    fn emit(&self) -> String {
        let declaration = &self.declaration;
        let name = &declaration.name;
        let mut lines = Vec::new();

        if let Some(comment) = doc_comment(declaration.description.as_deref()) {
            lines.push(comment);
        }

        match &declaration.ty {
            TypeExpr::Object(props) => {
                lines.push(format!("export interface {name} {}", emit_object_body(props)));
            }
            ty => lines.push(format!("export type {name} = {};", ty.emit())),
        }

        lines.push(self.emit_runtime());
        lines.join("\n")
    }
}

impl EmitRuntime for SortedDeclaration {
    fn emit_runtime(&self) -> String {
        let name = &self.declaration.name;
        let codec = self.declaration.ty.emit_runtime();
        if self.recursive {
            format!(
                "export const {name}: t.Type<{name}> = t.recursion({}, () =>\n  {}\n);",
                quote(name),
                nest(&codec)
            )
        } else {
            format!("export const {name} = {codec};")
        }
    }
}
