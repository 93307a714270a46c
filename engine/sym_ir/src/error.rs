//! Error surfaces.
//!
//! Routine failures (missing operand, wrong arity, domain mismatch) are
//! **in-band**: they become [`ExprError`] payloads wrapped in `Error` nodes,
//! the surrounding structure is preserved, and every ancestor's validity is
//! tainted. Only unrecoverable contract violations - deadline expiry,
//! recursion overflow, declaration misuse - raise out-of-band as
//! [`EngineError`].

use crate::Span;
use std::fmt;

/// Result of a fallible engine operation.
pub type EngineResult<T> = Result<T, EngineError>;

/// In-band error kinds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Required operand absent.
    Missing,
    /// Surplus operand to a fixed-arity signature.
    UnexpectedArgument,
    /// Operand domain not compatible with the signature's declared domain.
    IncompatibleDomain,
    /// Head not resolvable during canonicalisation.
    UnexpectedCommand,
    /// Fixed-point loop gave up; the partial result stands.
    IterationLimit,
}

impl ErrorKind {
    /// Stable wire name of the kind.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Missing => "missing",
            ErrorKind::UnexpectedArgument => "unexpected-argument",
            ErrorKind::IncompatibleDomain => "incompatible-domain",
            ErrorKind::UnexpectedCommand => "unexpected-command",
            ErrorKind::IterationLimit => "iteration-limit",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// In-band failure value carried by an `Error` node.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ExprError {
    /// Error kind.
    pub kind: ErrorKind,
    /// Human-readable message.
    pub message: Box<str>,
    /// Source location, when the surface layer provided one.
    pub span: Option<Span>,
}

impl ExprError {
    /// Create an error with no source location.
    pub fn new(kind: ErrorKind, message: impl Into<Box<str>>) -> Self {
        ExprError {
            kind,
            message: message.into(),
            span: None,
        }
    }

    /// Attach a source span.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}

impl fmt::Display for ExprError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

// In-band error factories

/// Required operand absent.
#[cold]
pub fn missing_operand(head: &str) -> ExprError {
    ExprError::new(ErrorKind::Missing, format!("`{head}` is missing an operand"))
}

/// Surplus operand to a fixed-arity signature.
#[cold]
pub fn unexpected_argument(head: &str, index: usize) -> ExprError {
    ExprError::new(
        ErrorKind::UnexpectedArgument,
        format!("`{head}` does not accept an operand at position {index}"),
    )
}

/// Operand domain incompatible with the declared signature.
#[cold]
pub fn incompatible_domain(head: &str, expected: &str, actual: &str) -> ExprError {
    ExprError::new(
        ErrorKind::IncompatibleDomain,
        format!("`{head}` expected {expected}, got {actual}"),
    )
}

/// Head not resolvable during canonicalisation.
#[cold]
pub fn unexpected_command(head: &str) -> ExprError {
    ExprError::new(
        ErrorKind::UnexpectedCommand,
        format!("`{head}` cannot be applied here"),
    )
}

/// Fixed-point loop exhausted its iteration budget.
#[cold]
pub fn iteration_limit(context: &str) -> ExprError {
    ExprError::new(
        ErrorKind::IterationLimit,
        format!("iteration limit reached in {context}"),
    )
}

/// Out-of-band failure raised to the outermost call.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The engine's deadline expired mid-operation.
    #[error("evaluation deadline exceeded")]
    Timeout,
    /// Handler recursion exceeded the scope limit.
    #[error("recursion limit of {limit} exceeded")]
    RecursionLimit {
        /// The limit that was exceeded.
        limit: u32,
    },
    /// Declaration with a name that violates the identifier grammar.
    #[error("`{name}` is not a valid identifier")]
    InvalidIdentifier {
        /// The offending name.
        name: String,
    },
    /// Declaration over an existing non-inferred definition.
    #[error("identifier `{name}` is already declared")]
    AlreadyDeclared {
        /// The offending name.
        name: String,
    },
    /// A scope operation found no scope to act on.
    #[error("no scope available for {context}")]
    MissingScope {
        /// What was being attempted.
        context: &'static str,
    },
    /// A handler raised unexpectedly.
    #[error("internal error: {message}")]
    Internal {
        /// Description of the failure.
        message: String,
    },
}
