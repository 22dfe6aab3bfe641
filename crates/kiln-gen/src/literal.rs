//! Helpers for spelling values as JavaScript source.

/// Quote `value` as a double-quoted JavaScript string literal.
pub fn string_literal(value: &str) -> String {
    // A JSON string is always a valid JS string literal.
    serde_json::to_string(value).unwrap_or_else(|_| String::from("\"\""))
}

const RESERVED: &[&str] = &[
    "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default",
    "delete", "do", "else", "enum", "export", "extends", "false", "finally", "for", "function",
    "if", "import", "in", "instanceof", "let", "new", "null", "return", "static", "super",
    "switch", "this", "throw", "true", "try", "typeof", "var", "void", "while", "with", "yield",
];

/// Whether `name` can be used as a binding name.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        && !RESERVED.contains(&name)
}

/// Turn an arbitrary name (a file stem, a command name) into a PascalCase
/// identifier: `user-manager` becomes `UserManager`, `2fa` becomes `_2fa`.
pub fn to_identifier(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || c == '_' || c == '$' {
            if upper {
                out.extend(c.to_uppercase());
                upper = false;
            } else {
                out.push(c);
            }
        } else {
            upper = true;
        }
    }

    if out.is_empty() {
        return String::from("_");
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) || !is_identifier(&out) {
        out.insert(0, '_');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_and_escapes() {
        assert_eq!(string_literal("/ping"), r#""/ping""#);
        assert_eq!(string_literal("a\"b\n"), r#""a\"b\n""#);
    }

    #[test]
    fn identifiers() {
        assert!(is_identifier("UserManager"));
        assert!(is_identifier("$store"));
        assert!(!is_identifier("default"));
        assert!(!is_identifier("9lives"));
        assert!(!is_identifier("a-b"));
    }

    #[test]
    fn identifiers_from_file_stems() {
        assert_eq!(to_identifier("user-manager"), "UserManager");
        assert_eq!(to_identifier("db"), "Db");
        assert_eq!(to_identifier("2fa"), "_2fa");
        assert_eq!(to_identifier("..."), "_");
    }
}
