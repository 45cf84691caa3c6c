//! Safe SQL identifier and LIKE-pattern handling.
//!
//! Every identifier that reaches rendered SQL goes through [`Ident`], which always
//! emits the quoted form: the name is wrapped in `"` and any embedded `"` is doubled,
//! so no input can terminate the token early.
//!
//! # Example
//! ```ignore
//! use sqlcraft::Ident;
//!
//! assert_eq!(Ident::new("People").to_sql(), r#""People""#);
//! assert_eq!(Ident::new(r#"id", name"#).to_sql(), r#""id"", name""#);
//! ```

/// A single quoted SQL identifier (table, column, or alias name).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident(String);

impl Ident {
    /// Create an identifier from a raw, unescaped name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The raw, unescaped name.
    pub fn name(&self) -> &str {
        &self.0
    }

    /// Render the identifier as SQL.
    pub fn to_sql(&self) -> String {
        // surrounding quotes (escapes may add more)
        let mut out = String::with_capacity(self.0.len() + 2);
        self.write_sql(&mut out);
        out
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        out.push('"');
        for ch in self.0.chars() {
            if ch == '"' {
                out.push('"');
                out.push('"');
            } else {
                out.push(ch);
            }
        }
        out.push('"');
    }
}

impl From<&str> for Ident {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Ident {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Quote a raw name as a SQL identifier.
pub fn quote_ident(name: &str) -> String {
    Ident::new(name).to_sql()
}

/// Escape the LIKE wildcards `%`, `_` and `[` so they match literally.
///
/// Each wildcard is wrapped in a bracket character class (`%` -> `[%]`).
pub fn escape_like(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '%' | '_' | '[' => {
                out.push('[');
                out.push(ch);
                out.push(']');
            }
            _ => out.push(ch),
        }
    }
    out
}
