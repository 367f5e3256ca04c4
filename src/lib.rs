//! # Weft Compiler
//!
//! Compiles the weft dialect (TypeScript plus `component` declarations,
//! `signal`/`memo`/`effect`/`computed` reactive creators and inline markup)
//! into plain JavaScript calling `@weft/runtime`.
//!
//! ## Pipeline
//!
//! 1. **Lex**: [`lexer::tokenize`] with an explicit context stack for markup,
//!    attribute expressions and template literals.
//! 2. **Parse**: [`parse::parse`], recursive descent with statement-level
//!    recovery. Always yields a program.
//! 3. **Analyze**: [`validate::analyze`] builds the symbol table and audits
//!    effect dependency lists. Lint only; codegen never reads it.
//! 4. **Lower**: [`lowering::lower`], one IR node per syntax node.
//! 5. **Transform**: [`transform::transform`] renames creators and classifies
//!    markup children.
//! 6. **Emit**: [`codegen::emit`] prints the module and its runtime imports.
//!
//! ## Unit Isolation
//!
//! Every compilation unit owns its diagnostics, symbol table and name sets.
//! There is no process-wide state, so [`compile_batch`] runs units in parallel.

#[cfg(feature = "napi")]
use napi_derive::napi;

pub mod ast;
pub mod ast_visit;
pub mod codegen;
pub mod compile;
pub mod diagnostics;
pub mod error;
pub mod escape;
pub mod finalize;
pub mod ir;
pub mod lexer;
pub mod lowering;
pub mod options;
pub mod parse;
pub mod reactive;
pub mod renamer;
pub mod scope;
pub mod span;
pub mod token;
pub mod transform;
pub mod validate;
pub mod visitor;

#[cfg(test)]
mod codegen_tests;
#[cfg(test)]
mod expression_tests;
#[cfg(test)]
mod lexer_tests;
#[cfg(test)]
mod lowering_tests;
#[cfg(test)]
mod parse_tests;
#[cfg(test)]
mod safety_tests;
#[cfg(test)]
mod validate_tests;

pub use compile::{compile, compile_batch, compile_json, CompileResult, SourceUnit, UnitContext};
pub use diagnostics::{Diagnostic, DiagnosticBag, Phase, PublicDiagnostic, Severity};
pub use error::{CompileError, EmitError, OptionsError};
pub use options::CompileOptions;

/// Node entry point: options and result cross the boundary as JSON.
#[cfg(feature = "napi")]
#[napi]
pub fn compile_native(source: String, options_json: Option<String>) -> napi::Result<String> {
    compile_json(&source, options_json.as_deref().unwrap_or(""))
        .map_err(|e| napi::Error::from_reason(e.to_string()))
}
