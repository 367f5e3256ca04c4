//! Per-unit pipeline driver.
//!
//! Each call builds its own [`UnitContext`]; nothing survives between calls
//! and nothing is shared between units compiled in parallel.

use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::codegen;
use crate::diagnostics::{Diagnostic, DiagnosticBag, Phase, PublicDiagnostic, EMIT_UNSUPPORTED};
use crate::lexer::tokenize;
use crate::lowering::lower;
use crate::options::CompileOptions;
use crate::parse::parse;
use crate::reactive::ReactiveBindingTable;
use crate::scope::SymbolTable;
use crate::transform::transform;
use crate::validate::analyze;

/// One named source text.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    pub name: String,
    pub source: String,
}

impl SourceUnit {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        SourceUnit {
            name: name.into(),
            source: source.into(),
        }
    }
}

/// State threaded through the phases of one unit.
pub struct UnitContext<'o> {
    pub options: &'o CompileOptions,
    pub diagnostics: DiagnosticBag,
}

impl<'o> UnitContext<'o> {
    pub fn new(options: &'o CompileOptions) -> Self {
        UnitContext {
            options,
            diagnostics: DiagnosticBag::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileResult {
    pub code: String,
    /// Module path → sorted runtime symbols.
    pub imports: BTreeMap<String, Vec<String>>,
    pub diagnostics: Vec<PublicDiagnostic>,
    pub has_errors: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol_table: Option<SymbolTable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reactive_bindings: Option<ReactiveBindingTable>,
    pub runtime_version: String,
    /// Full records, including phase and hints.
    #[serde(skip)]
    pub records: Vec<Diagnostic>,
}

impl CompileResult {
    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.records.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.records.iter().filter(|d| !d.is_error())
    }
}

/// Compiles one unit from scratch.
pub fn compile(source: &str, options: &CompileOptions) -> CompileResult {
    let span = tracing::debug_span!("compile_unit", unit = %options.unit_name);
    let _guard = span.enter();
    let mut ctx = UnitContext::new(options);

    let tokens = tokenize(source);
    if options.debug_enabled("lex") {
        tracing::debug!(phase = "lex", tokens = tokens.len(), "tokenized");
    }

    let parsed = parse(tokens);
    if options.debug_enabled("parse") {
        tracing::debug!(
            phase = "parse",
            statements = parsed.program.body.len(),
            diagnostics = parsed.diagnostics.len(),
            "parsed"
        );
    }
    ctx.diagnostics.extend(parsed.diagnostics);
    let program = parsed.program;

    let analysis = analyze(&program, options);
    ctx.diagnostics.extend(analysis.errors);
    ctx.diagnostics.extend(analysis.warnings);

    let mut module = lower(&program);
    if options.debug_enabled("lower") {
        tracing::debug!(phase = "lower", statements = module.body.len(), "lowered");
    }
    drop(program);

    transform(&mut module, options);

    let (code, imports) = match codegen::emit(module, options) {
        Ok((code, imports)) => (code, imports.to_map()),
        Err(err) => {
            tracing::debug!(phase = "emit", error = %err, "emission aborted");
            let location = match &err {
                crate::error::EmitError::Unsupported { span, .. } => *span,
            };
            ctx.diagnostics
                .push(Diagnostic::error(EMIT_UNSUPPORTED, err.to_string(), location, Phase::Emitter));
            (String::new(), BTreeMap::new())
        }
    };

    let (symbol_table, reactive_bindings) = if options.debug {
        (Some(analysis.symbol_table), Some(analysis.reactive))
    } else {
        (None, None)
    };

    let records = ctx.diagnostics.into_vec();
    CompileResult {
        code,
        imports,
        diagnostics: records.iter().map(PublicDiagnostic::from).collect(),
        has_errors: records.iter().any(Diagnostic::is_error),
        symbol_table,
        reactive_bindings,
        runtime_version: options.runtime_version.clone(),
        records,
    }
}

/// Compiles independent units concurrently; results keep input order.
pub fn compile_batch(units: &[SourceUnit], options: &CompileOptions) -> Vec<CompileResult> {
    units
        .par_iter()
        .map(|unit| {
            let mut unit_options = options.clone();
            unit_options.unit_name = unit.name.clone();
            compile(&unit.source, &unit_options)
        })
        .collect()
}

/// [`compile`] with options and result in their JSON forms.
pub fn compile_json(source: &str, options_json: &str) -> Result<String, crate::error::CompileError> {
    let options = if options_json.trim().is_empty() {
        CompileOptions::default()
    } else {
        CompileOptions::from_json(options_json)?
    };
    Ok(serde_json::to_string(&compile(source, &options))?)
}
