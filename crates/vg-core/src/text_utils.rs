//! Text helpers shared by the eSQL renderer
//!
//! Indentation and literal escaping live here so every block kind lays out
//! its clauses the same way.

/// Width of one indentation level in rendered eSQL.
pub const INDENT: &str = "    ";

/// Start a new line in `builder` and indent it to `indent_level`.
///
/// # Examples
/// ```
/// use vg_core::text_utils::indent_new_line;
/// let mut s = String::from("SELECT");
/// indent_new_line(&mut s, 2);
/// assert_eq!(s, "SELECT\n        ");
/// ```
pub fn indent_new_line(builder: &mut String, indent_level: usize) {
    builder.push('\n');
    for _ in 0..indent_level {
        builder.push_str(INDENT);
    }
}

/// Escape a string literal value by doubling single quotes.
///
/// This is for use inside single-quoted eSQL string literals, not identifiers.
pub fn escape_string_literal(value: &str) -> String {
    value.replace('\'', "''")
}

/// Quote a qualified type name for use in a constructor or `IS OF` test.
///
/// # Examples
/// ```
/// use vg_core::text_utils::bracket_type_name;
/// assert_eq!(bracket_type_name("Model.Person"), "[Model].[Person]");
/// ```
pub fn bracket_type_name(name: &str) -> String {
    name.split('.')
        .map(|part| format!("[{}]", part.replace(']', "]]")))
        .collect::<Vec<_>>()
        .join(".")
}

/// Check that a name only uses identifier characters (letters, digits, `_`)
/// and does not start with a digit.
pub fn is_simple_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

#[cfg(test)]
#[path = "text_utils_test.rs"]
mod tests;
