//! Go keyword vocabulary (for validating generated identifiers).

/// Reserved keywords in Go.
pub const GO_KEYWORDS: &[&str] = &[
    "break", "case", "chan", "const", "continue", "default", "defer", "else", "fallthrough", "for", "func", "go",
    "goto", "if", "import", "interface", "map", "package", "range", "return", "select", "struct", "switch", "type",
    "var",
];

/// Check whether an identifier is a Go keyword.
pub fn is_keyword(name: &str) -> bool {
    GO_KEYWORDS.contains(&name)
}

/// Check whether `name` can be used as a Go identifier.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first == '_' || first.is_alphabetic()) && chars.all(|c| c == '_' || c.is_alphanumeric()) && !is_keyword(name)
}
