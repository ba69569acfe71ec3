//! Schema-qualified identifiers.

use std::fmt;

/// A table (or other object) name, optionally qualified by a schema.
///
/// Parsing splits on the *last* dot, so `a.b.c` becomes schema `a.b` and name
/// `c`. Rendering joins the parts back with a single dot.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    schema: Option<String>,
    name: String,
}

impl Identifier {
    /// Creates an unqualified identifier.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self::parse(name)
    }

    /// Parses `schema.name` or `name`. Surrounding whitespace is ignored.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        match text.rsplit_once('.') {
            Some((schema, name)) if !schema.trim().is_empty() => Self {
                schema: Some(String::from(schema.trim())),
                name: String::from(name.trim()),
            },
            Some((_, name)) => Self {
                schema: None,
                name: String::from(name.trim()),
            },
            None => Self {
                schema: None,
                name: String::from(text),
            },
        }
    }

    /// Qualifies `table` with `schema` when the schema is non-blank.
    ///
    /// A `table` that already carries its own qualification keeps it and the
    /// outer schema is ignored, so `("dw", "stage.orders")` stays
    /// `stage.orders` rather than becoming `dw.stage.orders`.
    #[must_use]
    pub fn qualified(schema: Option<&str>, table: &str) -> Self {
        let parsed = Self::parse(table);
        if parsed.schema.is_some() {
            return parsed;
        }
        let schema = schema.map(str::trim).filter(|s| !s.is_empty());
        Self {
            schema: schema.map(String::from),
            name: parsed.name,
        }
    }

    /// Returns the schema part, if any.
    #[must_use]
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Returns the bare name without any schema.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true when the schema part itself contains a dot, i.e. the
    /// identifier has three or more parts.
    #[must_use]
    pub fn is_multi_level(&self) -> bool {
        self.schema.as_deref().is_some_and(|s| s.contains('.'))
    }

    /// Returns true when the name part is blank.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }

    /// Renders the identifier as SQL text.
    #[must_use]
    pub fn render(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{schema}.{}", self.name),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unqualified() {
        let id = Identifier::parse(" users ");
        assert_eq!(id.schema(), None);
        assert_eq!(id.name(), "users");
        assert_eq!(id.render(), "users");
    }

    #[test]
    fn test_parse_qualified() {
        let id = Identifier::parse("sales.orders");
        assert_eq!(id.schema(), Some("sales"));
        assert_eq!(id.name(), "orders");
        assert!(!id.is_multi_level());
    }

    #[test]
    fn test_parse_three_part_keeps_last_segment_as_name() {
        let id = Identifier::parse("db.sales.orders");
        assert_eq!(id.schema(), Some("db.sales"));
        assert_eq!(id.name(), "orders");
        assert!(id.is_multi_level());
        assert_eq!(id.render(), "db.sales.orders");
    }

    #[test]
    fn test_qualified_with_blank_schema() {
        assert_eq!(Identifier::qualified(Some("  "), "t").render(), "t");
        assert_eq!(Identifier::qualified(None, "t").render(), "t");
        assert_eq!(Identifier::qualified(Some("dw"), "t").render(), "dw.t");
    }

    #[test]
    fn test_qualified_keeps_embedded_schema() {
        let id = Identifier::qualified(Some("dw"), "stage.orders");
        assert_eq!(id.render(), "stage.orders");
    }

    #[test]
    fn test_leading_dot_is_unqualified() {
        assert_eq!(Identifier::parse(".orders").render(), "orders");
    }
}
