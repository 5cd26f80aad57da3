//! Common utilities for TypeScript code generation.
//!
//! Shared by the normalizer and the printers: identifier sanitizing, key
//! quoting and string escaping.

/// Check if a property key must be quoted in an object type or literal.
///
/// Returns true if the name is empty, doesn't start with a letter, underscore
/// or dollar sign, or contains anything other than alphanumerics, underscore
/// and dollar sign.
pub fn needs_quoting(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return true;
    };
    !(first.is_ascii_alphabetic() || first == '_' || first == '$')
        || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Escape a string for a single-quoted TypeScript literal.
pub fn escape_single_quoted(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

/// Single-quoted string literal.
pub fn quote(s: &str) -> String {
    format!("'{}'", escape_single_quoted(s))
}

/// Quote a property key if it is not a valid identifier.
pub fn quote_if_needed(name: &str) -> String {
    if needs_quoting(name) {
        quote(name)
    } else {
        name.to_string()
    }
}

/// Sanitize a name into an identifier.
///
/// Every run of characters outside `[A-Za-z0-9_]` becomes a single `_`,
/// leading and trailing `_` are trimmed, and a leading digit gets an `_`
/// prefix. Returns an empty string when nothing usable remains.
pub fn sanitize_identifier(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_run = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push('_');
            in_run = true;
        }
    }
    let trimmed = out.trim_matches('_');
    if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{trimmed}")
    } else {
        trimmed.to_string()
    }
}

/// Words a model declaration cannot be named in `models.ts`: the `t` import
/// alias, JavaScript reserved words and TypeScript's predefined type names.
const RESERVED_NAMES: &[&str] = &[
    "t", "any", "await", "bigint", "boolean", "break", "case", "catch", "class", "const",
    "continue", "debugger", "default", "delete", "do", "else", "enum", "export", "extends",
    "false", "finally", "for", "function", "if", "implements", "import", "in", "instanceof",
    "interface", "let", "never", "new", "null", "number", "object", "package", "private",
    "protected", "public", "return", "static", "string", "super", "switch", "symbol", "this",
    "throw", "true", "try", "typeof", "undefined", "unknown", "var", "void", "while", "with",
    "yield",
];

/// Identifier for a schema name, used both for its declaration and for
/// references to it. Reserved names get a trailing `_`.
pub fn model_identifier(name: &str) -> String {
    let id = sanitize_identifier(name);
    if RESERVED_NAMES.contains(&id.as_str()) {
        format!("{id}_")
    } else {
        id
    }
}

/// Turn a project name into an action-type prefix: whitespace runs become
/// `_`, remaining non-word characters are dropped, and the result is uppercased.
pub fn clean_action_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect::<String>()
        .to_ascii_uppercase()
}

/// Keep a comment body from closing its `/* */` block early.
pub fn comment_safe(text: &str) -> String {
    text.replace("*/", "* /")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_quoting() {
        assert!(!needs_quoting("foo"));
        assert!(!needs_quoting("_foo"));
        assert!(!needs_quoting("$foo"));
        assert!(!needs_quoting("foo123"));

        assert!(needs_quoting(""));
        assert!(needs_quoting("123foo"));
        assert!(needs_quoting("foo-bar"));
        assert!(needs_quoting("foo.bar"));
        assert!(needs_quoting("foo bar"));
    }

    #[test]
    fn test_quote_if_needed() {
        assert_eq!(quote_if_needed("foo"), "foo");
        assert_eq!(quote_if_needed("foo-bar"), "'foo-bar'");
        assert_eq!(quote_if_needed("it's"), r"'it\'s'");
    }

    #[test]
    fn test_escape_single_quoted() {
        assert_eq!(escape_single_quoted("plain"), "plain");
        assert_eq!(escape_single_quoted(r"a\b"), r"a\\b");
        assert_eq!(escape_single_quoted("line\nbreak"), r"line\nbreak");
    }

    #[test]
    fn test_sanitize_identifier() {
        assert_eq!(sanitize_identifier("listPets"), "listPets");
        assert_eq!(sanitize_identifier("/pets/{id}"), "pets_id");
        assert_eq!(sanitize_identifier("get-pet.by id"), "get_pet_by_id");
        assert_eq!(sanitize_identifier("2fa/verify"), "_2fa_verify");
        assert_eq!(sanitize_identifier("{}"), "");
    }

    #[test]
    fn test_model_identifier_avoids_reserved_names() {
        assert_eq!(model_identifier("Pet"), "Pet");
        assert_eq!(model_identifier("t"), "t_");
        assert_eq!(model_identifier("default"), "default_");
        assert_eq!(model_identifier("delete"), "delete_");
        assert_eq!(model_identifier("string"), "string_");
        assert_eq!(model_identifier("deleted"), "deleted");
        assert_eq!(model_identifier("{}"), "");
    }

    #[test]
    fn test_clean_action_name() {
        assert_eq!(clean_action_name("Swagger Petstore"), "SWAGGER_PETSTORE");
        assert_eq!(clean_action_name("  my-api  v2 "), "MYAPI_V2");
        assert_eq!(clean_action_name("@scope/pkg"), "SCOPEPKG");
    }

    #[test]
    fn test_comment_safe() {
        assert_eq!(comment_safe("ends */ early"), "ends * / early");
    }
}
