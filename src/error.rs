//! Fatal failures. User-facing problems are [`Diagnostic`](crate::diagnostics::Diagnostic)s;
//! these types only cover conditions that stop a phase outright.

use thiserror::Error;

use crate::span::Span;

#[derive(Debug, Error)]
pub enum EmitError {
    /// An IR construct reached the emitter without an emission rule.
    #[error("no emission rule for {construct} at {}:{}", .span.line, .span.column)]
    Unsupported { construct: &'static str, span: Span },
}

#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("invalid compile options: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Options(#[from] OptionsError),
    #[error("failed to serialize compile result: {0}")]
    Serialize(#[from] serde_json::Error),
}
