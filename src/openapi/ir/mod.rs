//! Intermediate Representation for OpenAPI to TypeScript code generation.
//!
//! The pipeline has three layers:
//! 1. Normalization: OpenAPI document -> `TypeExpr`s and `Operation`s, with
//!    every reference and parameter corner case resolved
//! 2. Declarations: named types from schemas and operations, sorted so that
//!    dependencies print first
//! 3. Emission: declarations -> static types and io-ts codecs via the `Emit`
//!    and `EmitRuntime` traits
//!
//! ## Module Structure
//!
//! - `types`: the `TypeExpr` algebra
//! - `api`: normalized operations
//! - `resolve`: `$ref` to name resolution
//! - `normalize`: type expression builder and operation extractor
//! - `declare`: declaration assembly and dependency sort
//! - `emit`: static and runtime printing
//! - `codegen`: whole-file bodies
//! - `utils`: identifier and literal helpers

mod api;
mod codegen;
mod declare;
mod emit;
mod normalize;
mod resolve;
mod types;
pub mod utils;

pub use api::Operation;
pub use codegen::{GeneratedSources, INDEX_SOURCE, UNKNOWN_API, UTILITIES_SOURCE, generate_sources};
pub use declare::{
    Declaration, DeclarationModule, SortedDeclaration, operation_declarations, schema_declarations,
    sort_declarations,
};
pub use emit::{Emit, EmitRuntime};
pub use normalize::{MODELS_QUALIFIER, TypeExprBuilder, extract_operations};
pub use resolve::{component_name, parse_ref};
pub use types::{NamedRef, Primitive, Property, TypeExpr};
