//! Diagnostic rendering and the fatal-error reporting contract.
//!
//! The front end never recovers from a semantic error: the first one found
//! is fatal, so there is no multi-diagnostic collector to manage — a
//! [`Diagnostic`] is built once, wrapped in a [`CompileError`], and
//! propagated with `?` straight out to the caller.

use tigerc_core::Pos;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Severity {
    #[default]
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub pos: Pos,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}).", self.message, self.pos)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("parse error: {0}")]
    Parse(String),
    #[error("{0}")]
    Semantic(Diagnostic),
}

pub type Result<T> = std::result::Result<T, CompileError>;

/// Builds the single fatal error for a semantic-analysis failure.
pub fn fatal(pos: Pos, message: impl Into<String>) -> CompileError {
    CompileError::Semantic(Diagnostic {
        severity: Severity::Error,
        pos,
        message: message.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_in_the_fatal_error_format() {
        let d = Diagnostic {
            severity: Severity::Error,
            pos: Pos::new(3, 7),
            message: "undefined variable a".to_string(),
        };
        assert_eq!(d.to_string(), "undefined variable a (row: 3, column: 7).");
    }
}
