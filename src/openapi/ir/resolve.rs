//! `$ref` resolution.
//!
//! References are resolved to names, never followed: the referenced schema is
//! printed once as its own declaration and referenced by name everywhere else.

/// Resolve `#/components/schemas/<Name>` to `<Name>`.
///
/// Returns an empty string for anything else. Callers treat `""` as an
/// unresolved reference.
pub fn parse_ref(reference: &str) -> String {
    component_name(reference, "schemas")
        .map(str::to_string)
        .unwrap_or_default()
}

/// Resolve `#/components/<section>/<Name>` to `<Name>`.
pub fn component_name<'a>(reference: &'a str, section: &str) -> Option<&'a str> {
    let rest = reference.strip_prefix("#/components/")?;
    let name = rest.strip_prefix(section)?.strip_prefix('/')?;
    (!name.is_empty() && !name.contains('/')).then_some(name)
}
