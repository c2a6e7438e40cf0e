//! Single-hole code templates
//!
//! A [`TransformTemplate`] wraps an expression in a conversion call, e.g.
//! `%L.toInstant()` applied to `this.getCreatedAt()`. The hole marker is
//! `%L`; a template has at most one of them. A template without a hole
//! ignores its input, which is how `Empty` maps to `Unit`.

use crate::GeneratorError;

/// Substitution marker inside a template
pub const HOLE: &str = "%L";

/// A code template with zero or one substitution point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformTemplate {
    prefix: String,
    suffix: Option<String>,
}

impl TransformTemplate {
    /// Parse a template, rejecting more than one hole
    pub fn parse(template: &str) -> Result<Self, GeneratorError> {
        let mut parts = template.splitn(3, HOLE);
        let prefix = parts.next().unwrap_or_default().to_string();
        let suffix = parts.next().map(str::to_string);

        if parts.next().is_some() {
            return Err(GeneratorError::InvalidTemplate {
                template: template.to_string(),
                reason: "more than one substitution point",
            });
        }

        Ok(Self { prefix, suffix })
    }

    /// Whether the template consumes its input
    pub fn has_hole(&self) -> bool {
        self.suffix.is_some()
    }

    /// Substitute `expr` into the hole
    pub fn apply(&self, expr: &str) -> String {
        match &self.suffix {
            Some(suffix) => format!("{}{}{}", self.prefix, expr, suffix),
            None => self.prefix.clone(),
        }
    }
}
