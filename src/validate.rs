//! Semantic analysis: scope resolution, binding lints and the effect
//! dependency audit.
//!
//! The analyzer hoists every declaration of a statement list before visiting
//! it, so references may precede declarations within a scope. It never
//! aborts; everything it finds is a diagnostic.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::HashSet;

use crate::ast::*;
use crate::ast_visit::{walk_arrow, walk_element, walk_expr, walk_params, walk_pattern, walk_stmt, walk_stmts, walk_var_decl, Visit};
use crate::diagnostics::{
    Diagnostic, Phase, SEM_DUPLICATE_DECLARATION, SEM_MISSING_DEPENDENCY, SEM_MISSING_DEPENDENCY_ARRAY,
    SEM_UNDECLARED_COMPONENT, SEM_UNDECLARED_VARIABLE, SEM_UNNECESSARY_DEPENDENCY, SEM_UNUSED_IMPORT,
    SEM_UNUSED_VARIABLE,
};
use crate::options::CompileOptions;
use crate::reactive::{
    creator_bindings, is_runtime_module, BindingLookup, BindingOrigin, BindingShape, CreatorKind, Detector, Evidence,
    ReactiveBinding, ReactiveBindingTable, Role,
};
use crate::scope::{ScopeId, ScopeKind, Symbol, SymbolKind, SymbolTable, GLOBALS, GLOBAL_SCOPE};
use crate::span::Span;

lazy_static! {
    static ref TYPE_IDENT: Regex = Regex::new(r"[A-Za-z_$][A-Za-z0-9_$]*").unwrap();
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub symbol_table: SymbolTable,
    pub reactive: ReactiveBindingTable,
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
}

pub fn analyze(program: &Program, options: &CompileOptions) -> Analysis {
    let mut analyzer = Analyzer::new(options, has_reactive_import(program, options));
    analyzer.visit_program(program);
    analyzer.report_unused();

    let (mut errors, mut warnings): (Vec<Diagnostic>, Vec<Diagnostic>) =
        analyzer.diagnostics.into_iter().partition(Diagnostic::is_error);
    errors.sort_by_key(|d| d.location.start);
    warnings.sort_by_key(|d| d.location.start);

    if options.debug_enabled("analyze") {
        tracing::debug!(
            unit = %options.unit_name,
            scopes = analyzer.table.scopes.len(),
            reactive = analyzer.reactive.entries.len(),
            errors = errors.len(),
            warnings = warnings.len(),
            "semantic analysis complete"
        );
    }

    Analysis {
        symbol_table: analyzer.table,
        reactive: analyzer.reactive,
        errors,
        warnings,
    }
}

/// Whether the unit imports a creator or anything from a runtime module.
pub fn has_reactive_import(program: &Program, options: &CompileOptions) -> bool {
    program.body.iter().any(|stmt| match &stmt.kind {
        StmtKind::Import(decl) => {
            is_runtime_module(&decl.source, options)
                || decl.named.iter().any(|s| CreatorKind::from_callee(&s.imported).is_some())
        }
        _ => false,
    })
}

/// `const x`, `const [a, b]` or anything else.
pub fn pattern_shape(pattern: &Pattern) -> BindingShape {
    let ident = |p: &Pattern| match &p.kind {
        PatternKind::Ident(name) => Some(name.clone()),
        _ => None,
    };
    match &pattern.kind {
        PatternKind::Ident(name) => BindingShape::Single(name.clone()),
        PatternKind::Array { elements, rest: None } if elements.len() <= 2 => BindingShape::Pair(
            elements.first().and_then(|e| e.as_ref()).and_then(ident),
            elements.get(1).and_then(|e| e.as_ref()).and_then(ident),
        ),
        _ => BindingShape::Other,
    }
}

/// Dependency-array entries name a getter as `x` or `x()`.
fn dependency_name(item: &Expr) -> Option<String> {
    match &item.unwrapped().kind {
        ExprKind::Ident(name) => Some(name.clone()),
        ExprKind::Call { callee, args, .. } if args.is_empty() => callee.as_ident().map(str::to_string),
        _ => None,
    }
}

struct Analyzer<'o> {
    table: SymbolTable,
    reactive: ReactiveBindingTable,
    diagnostics: Vec<Diagnostic>,
    current: ScopeId,
    component_depth: usize,
    options: &'o CompileOptions,
    has_reactive_import: bool,
    detector: Detector,
}

/// Detector view of the symbol table from one scope.
struct ScopeView<'t> {
    table: &'t SymbolTable,
    scope: ScopeId,
}

impl BindingLookup for ScopeView<'_> {
    fn origin(&self, name: &str) -> Option<BindingOrigin> {
        self.table.resolve(self.scope, name).map(|(_, s)| s.origin())
    }

    fn type_annotation(&self, name: &str) -> Option<&str> {
        self.table
            .resolve(self.scope, name)
            .and_then(|(_, s)| s.type_annotation.as_deref())
    }

    fn recorded(&self, name: &str) -> Option<(CreatorKind, Role)> {
        self.table.resolve(self.scope, name).and_then(|(_, s)| s.reactive)
    }
}

impl<'o> Analyzer<'o> {
    fn new(options: &'o CompileOptions, has_reactive_import: bool) -> Self {
        Self {
            table: SymbolTable::new(),
            reactive: ReactiveBindingTable::default(),
            diagnostics: Vec::new(),
            current: GLOBAL_SCOPE,
            component_depth: 0,
            options,
            has_reactive_import,
            detector: Detector::new(),
        }
    }

    fn is_global(&self, name: &str) -> bool {
        GLOBALS.contains(name) || self.options.extra_globals.iter().any(|g| g == name)
    }

    fn with_scope(&mut self, name: String, kind: ScopeKind, f: impl FnOnce(&mut Self)) {
        let parent = self.current;
        self.current = self.table.push_scope(parent, name, kind);
        f(self);
        self.current = parent;
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // DECLARATIONS
    // ═══════════════════════════════════════════════════════════════════════════

    fn declare(&mut self, symbol: Symbol) {
        let name = symbol.name.clone();
        let span = symbol.declared_at;
        if let Err(existing) = self.table.declare(self.current, symbol) {
            self.diagnostics.push(
                Diagnostic::error(
                    SEM_DUPLICATE_DECLARATION,
                    format!("`{}` is already declared in this scope", name),
                    span,
                    Phase::Semantic,
                )
                .with_hint(format!(
                    "first declared at line {}, column {}",
                    existing.declared_at.line, existing.declared_at.column
                ))
                .with_suggestion(format!("rename one of the `{}` bindings", name)),
            );
        }
    }

    fn declare_named(&mut self, name: &str, kind: SymbolKind, span: Span, exported: bool) {
        let mut symbol = Symbol::new(name, kind, span);
        symbol.exported = exported;
        self.declare(symbol);
    }

    /// Creator behind `init`, unless the callee name is shadowed by a local.
    fn creator_call<'e>(&self, init: &'e Expr) -> Option<(CreatorKind, &'e [Expr])> {
        let ExprKind::Call { callee, args, .. } = &init.unwrapped().kind else {
            return None;
        };
        let name = callee.as_ident()?;
        let creator = CreatorKind::from_callee(name)?;
        match self.table.resolve(self.current, name) {
            Some((_, symbol)) if symbol.kind != SymbolKind::Import => None,
            _ => Some((creator, args.as_slice())),
        }
    }

    fn declare_var(&mut self, decl: &VarDecl, exported: bool) {
        for declarator in &decl.declarators {
            let reactive: Vec<(String, Role, CreatorKind)> = declarator
                .init
                .as_ref()
                .and_then(|init| self.creator_call(init))
                .map(|(creator, _)| {
                    creator_bindings(&pattern_shape(&declarator.pattern), creator)
                        .into_iter()
                        .map(|(name, role)| (name, role, creator))
                        .collect()
                })
                .unwrap_or_default();

            let single = matches!(declarator.pattern.kind, PatternKind::Ident(_));
            for (name, span) in declarator.pattern.bound_names() {
                let mut symbol = Symbol::new(name.as_str(), SymbolKind::Variable, span);
                symbol.exported = exported;
                if single {
                    symbol.type_annotation = declarator.type_annotation.clone();
                }
                symbol.reactive = reactive
                    .iter()
                    .find(|(n, _, _)| *n == name)
                    .map(|(_, role, creator)| (*creator, *role));
                self.declare(symbol);
            }
        }
    }

    fn declare_params(&mut self, params: &[Param]) {
        for param in params {
            let single = matches!(param.pattern.kind, PatternKind::Ident(_));
            for (name, span) in param.pattern.bound_names() {
                let mut symbol = Symbol::new(name, SymbolKind::Parameter, span);
                if single {
                    symbol.type_annotation = param.type_annotation.clone();
                }
                self.declare(symbol);
            }
        }
    }

    /// Declares everything `stmts` introduces into the current scope.
    /// `var` declarations nested in blocks belong to the nearest function-level scope.
    fn hoist(&mut self, stmts: &[Stmt], function_level: bool) {
        for stmt in stmts {
            self.hoist_stmt(stmt, function_level, false);
        }
        if function_level {
            for stmt in stmts {
                self.hoist_nested_vars(stmt, true);
            }
        }
    }

    fn hoist_stmt(&mut self, stmt: &Stmt, function_level: bool, exported: bool) {
        match &stmt.kind {
            StmtKind::Var(decl) => {
                if decl.kind != VarKind::Var || function_level {
                    self.declare_var(decl, exported);
                }
            }
            StmtKind::Function(function) => {
                if let Some(name) = &function.name {
                    self.declare_named(name, SymbolKind::Function, function.span, exported);
                }
            }
            StmtKind::Component(function) => {
                if let Some(name) = &function.name {
                    self.declare_named(name, SymbolKind::Component, function.span, exported);
                }
            }
            StmtKind::Interface(decl) => self.declare_named(&decl.name, SymbolKind::Interface, stmt.span, exported),
            StmtKind::TypeAlias(decl) => self.declare_named(&decl.name, SymbolKind::TypeAlias, stmt.span, exported),
            StmtKind::Enum(decl) => self.declare_named(&decl.name, SymbolKind::Enum, stmt.span, exported),
            StmtKind::Import(decl) => {
                for binding in decl.local_bindings() {
                    let mut symbol = Symbol::new(binding.name.as_str(), SymbolKind::Import, binding.span);
                    symbol.source = Some(decl.source.clone());
                    self.declare(symbol);
                }
            }
            StmtKind::Export(ExportDecl::Declaration(inner)) => self.hoist_stmt(inner, function_level, true),
            StmtKind::Export(ExportDecl::Default(inner)) => {
                if matches!(inner.kind, StmtKind::Function(_) | StmtKind::Component(_)) {
                    self.hoist_stmt(inner, function_level, true);
                }
            }
            _ => {}
        }
    }

    fn hoist_nested_vars(&mut self, stmt: &Stmt, top: bool) {
        match &stmt.kind {
            StmtKind::Var(decl) if decl.kind == VarKind::Var && !top => self.declare_var(decl, false),
            StmtKind::Block(body) => body.iter().for_each(|s| self.hoist_nested_vars(s, false)),
            StmtKind::If {
                consequent, alternate, ..
            } => {
                self.hoist_nested_vars(consequent, false);
                if let Some(alternate) = alternate {
                    self.hoist_nested_vars(alternate, false);
                }
            }
            StmtKind::For { init, body, .. } => {
                if let Some(ForInit::Var(decl)) = init {
                    if decl.kind == VarKind::Var {
                        self.declare_var(decl, false);
                    }
                }
                self.hoist_nested_vars(body, false);
            }
            StmtKind::ForIn { left, body, .. } | StmtKind::ForOf { left, body, .. } => {
                if let ForHead::Var(VarKind::Var, pattern) = left {
                    for (name, span) in pattern.bound_names() {
                        self.declare_named(&name, SymbolKind::Variable, span, false);
                    }
                }
                self.hoist_nested_vars(body, false);
            }
            StmtKind::While { body, .. } | StmtKind::DoWhile { body, .. } | StmtKind::Labeled { body, .. } => {
                self.hoist_nested_vars(body, false)
            }
            StmtKind::Switch { cases, .. } => {
                for case in cases {
                    case.body.iter().for_each(|s| self.hoist_nested_vars(s, false));
                }
            }
            StmtKind::Try {
                block,
                handler,
                finalizer,
            } => {
                block.iter().for_each(|s| self.hoist_nested_vars(s, false));
                if let Some(handler) = handler {
                    handler.body.iter().for_each(|s| self.hoist_nested_vars(s, false));
                }
                if let Some(finalizer) = finalizer {
                    finalizer.iter().for_each(|s| self.hoist_nested_vars(s, false));
                }
            }
            _ => {}
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // REFERENCES
    // ═══════════════════════════════════════════════════════════════════════════

    fn undeclared(&mut self, name: &str, span: Span) {
        self.diagnostics.push(
            Diagnostic::error(
                SEM_UNDECLARED_VARIABLE,
                format!("`{}` is not declared", name),
                span,
                Phase::Semantic,
            )
            .with_suggestion(format!("declare `{}` or import it", name)),
        );
    }

    fn read(&mut self, name: &str, span: Span) {
        if !self.table.mark_read(self.current, name) && !self.is_global(name) {
            self.undeclared(name, span);
        }
    }

    /// Plain assignment: must resolve, but does not count as a read.
    fn write(&mut self, name: &str, span: Span) {
        if self.table.resolve(self.current, name).is_none() && !self.is_global(name) {
            self.undeclared(name, span);
        }
    }

    fn enter_function(&mut self, function: &Function, kind: ScopeKind, bind_own_name: bool) {
        let name = function.name.clone().unwrap_or_else(|| function.span.key());
        let is_component = kind == ScopeKind::Component;
        self.with_scope(name, kind, |this| {
            if is_component {
                this.component_depth += 1;
            }
            if bind_own_name {
                if let Some(own) = &function.name {
                    this.declare_named(own, SymbolKind::Function, function.span, false);
                }
            }
            this.declare_params(&function.params);
            walk_params(this, &function.params);
            if let Some(ret) = &function.return_type {
                this.visit_type(ret, function.span);
            }
            this.hoist(&function.body, true);
            walk_stmts(this, &function.body);
            if is_component {
                this.component_depth -= 1;
            }
        });
    }

    fn block(&mut self, body: &[Stmt], span: Span) {
        self.with_scope(span.key(), ScopeKind::Block, |this| {
            this.hoist(body, false);
            walk_stmts(this, body);
        });
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // DEPENDENCY AUDIT
    // ═══════════════════════════════════════════════════════════════════════════

    /// Reactive getters called inside `callback`, first occurrence order.
    fn getter_reads(&self, callback: &Expr) -> Vec<String> {
        let mut locals = LocalNames::default();
        locals.visit_expr(callback);
        let mut calls = ZeroArgCalls::default();
        calls.visit_expr(callback);

        let view = ScopeView {
            table: &self.table,
            scope: self.current,
        };
        let evidence = Evidence {
            lookup: &view,
            has_reactive_import: self.has_reactive_import,
            strict: self.options.strict,
        };
        let mut out: Vec<String> = Vec::new();
        for name in calls.names {
            if locals.names.contains(&name) || self.is_global(&name) || out.contains(&name) {
                continue;
            }
            if self.detector.is_getter(&name, &evidence) {
                out.push(name);
            }
        }
        out
    }

    fn audit_effect(&mut self, call_span: Span, args: &[Expr]) {
        let Some(callback) = args.first() else {
            return;
        };
        if !matches!(callback.unwrapped().kind, ExprKind::Arrow(_) | ExprKind::Function(_)) {
            return;
        }
        let reads = self.getter_reads(callback);

        let Some(deps) = args.get(1) else {
            if !reads.is_empty() {
                self.diagnostics.push(
                    Diagnostic::warning(
                        SEM_MISSING_DEPENDENCY_ARRAY,
                        format!(
                            "effect reads {} but declares no dependency array",
                            reads.iter().map(|r| format!("`{}`", r)).collect::<Vec<_>>().join(", ")
                        ),
                        call_span,
                        Phase::Semantic,
                    )
                    .with_suggestion(format!("pass `[{}]` as the second argument", reads.join(", "))),
                );
            }
            return;
        };
        let ExprKind::Array(items) = &deps.unwrapped().kind else {
            return;
        };

        let mut declared: Vec<(String, Span)> = Vec::new();
        for item in items.iter().flatten() {
            if let Some(name) = dependency_name(item) {
                if !declared.iter().any(|(n, _)| *n == name) {
                    declared.push((name, item.span));
                }
            }
        }

        for name in reads.iter().filter(|r| !declared.iter().any(|(n, _)| n == *r)) {
            self.diagnostics.push(
                Diagnostic::warning(
                    SEM_MISSING_DEPENDENCY,
                    format!("effect reads `{}` but it is missing from the dependency array", name),
                    deps.span,
                    Phase::Semantic,
                )
                .with_suggestion(format!("add `{}` to the dependency array", name)),
            );
        }
        for (name, span) in declared.iter().filter(|(n, _)| !reads.contains(n)) {
            self.diagnostics.push(
                Diagnostic::warning(
                    SEM_UNNECESSARY_DEPENDENCY,
                    format!("`{}` is listed as a dependency but the effect never reads it", name),
                    *span,
                    Phase::Semantic,
                )
                .with_suggestion(format!("remove `{}` from the dependency array", name)),
            );
        }
    }

    /// Records creator-produced bindings of `decl` with their dependencies.
    fn record_reactive(&mut self, decl: &VarDecl) {
        for declarator in &decl.declarators {
            let Some((creator, args)) = declarator.init.as_ref().and_then(|init| self.creator_call(init)) else {
                continue;
            };
            let bindings = creator_bindings(&pattern_shape(&declarator.pattern), creator);
            if bindings.is_empty() {
                continue;
            }
            let dependencies = match creator {
                CreatorKind::Signal => Vec::new(),
                CreatorKind::Effect => match args.get(1).map(|d| &d.unwrapped().kind) {
                    Some(ExprKind::Array(items)) => items.iter().flatten().filter_map(dependency_name).collect(),
                    _ => args.first().map(|cb| self.getter_reads(cb)).unwrap_or_default(),
                },
                CreatorKind::Memo | CreatorKind::Computed => {
                    args.first().map(|cb| self.getter_reads(cb)).unwrap_or_default()
                }
            };
            let scope = self.table.scope(self.current).name.clone();
            for (name, role) in bindings {
                self.reactive.record(ReactiveBinding {
                    name,
                    creator,
                    role,
                    scope: scope.clone(),
                    dependencies: dependencies.clone(),
                    declared_at: declarator.span,
                });
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // UNUSED BINDINGS
    // ═══════════════════════════════════════════════════════════════════════════

    fn report_unused(&mut self) {
        let mut found = Vec::new();
        for (_, symbol) in self.table.unread() {
            if symbol.name.starts_with('_') || symbol.exported {
                continue;
            }
            let span = symbol.declared_at;
            match symbol.kind {
                SymbolKind::Variable => found.push(
                    Diagnostic::warning(
                        SEM_UNUSED_VARIABLE,
                        format!("`{}` is declared but never read", symbol.name),
                        span,
                        Phase::Semantic,
                    )
                    .with_suggestion(format!("remove `{}` or prefix it with `_`", symbol.name)),
                ),
                SymbolKind::Parameter if self.options.strict => found.push(
                    Diagnostic::warning(
                        SEM_UNUSED_VARIABLE,
                        format!("parameter `{}` is never read", symbol.name),
                        span,
                        Phase::Semantic,
                    )
                    .with_suggestion(format!("prefix it with `_`: `_{}`", symbol.name)),
                ),
                SymbolKind::Import => found.push(
                    Diagnostic::warning(
                        SEM_UNUSED_IMPORT,
                        format!("`{}` is imported but never used", symbol.name),
                        span,
                        Phase::Semantic,
                    )
                    .with_suggestion(format!("remove the `{}` import", symbol.name)),
                ),
                _ => {}
            }
        }
        self.diagnostics.extend(found);
    }
}

impl Visit for Analyzer<'_> {
    fn visit_program(&mut self, program: &Program) {
        self.hoist(&program.body, true);
        walk_stmts(self, &program.body);
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Component(function) => self.enter_function(function, ScopeKind::Component, false),
            StmtKind::Function(function) => self.enter_function(function, ScopeKind::Function, false),
            StmtKind::Var(decl) => {
                walk_var_decl(self, decl);
                self.record_reactive(decl);
            }
            StmtKind::Block(body) => self.block(body, stmt.span),
            StmtKind::For { init, .. } => {
                self.with_scope(stmt.span.key(), ScopeKind::Block, |this| {
                    if let Some(ForInit::Var(decl)) = init {
                        if decl.kind != VarKind::Var {
                            this.declare_var(decl, false);
                        }
                    }
                    walk_stmt(this, stmt);
                });
            }
            StmtKind::ForIn { left, .. } | StmtKind::ForOf { left, .. } => {
                self.with_scope(stmt.span.key(), ScopeKind::Block, |this| {
                    if let ForHead::Var(kind, pattern) = left {
                        if *kind != VarKind::Var {
                            for (name, span) in pattern.bound_names() {
                                this.declare_named(&name, SymbolKind::Variable, span, false);
                            }
                        }
                    }
                    walk_stmt(this, stmt);
                });
            }
            StmtKind::Switch { discriminant, cases } => {
                self.visit_expr(discriminant);
                self.with_scope(stmt.span.key(), ScopeKind::Block, |this| {
                    for case in cases {
                        this.hoist(&case.body, false);
                    }
                    for case in cases {
                        if let Some(test) = &case.test {
                            this.visit_expr(test);
                        }
                        walk_stmts(this, &case.body);
                    }
                });
            }
            StmtKind::Try {
                block,
                handler,
                finalizer,
            } => {
                self.block(block, stmt.span);
                if let Some(handler) = handler {
                    self.with_scope(handler.span.key(), ScopeKind::Block, |this| {
                        if let Some(param) = &handler.param {
                            for (name, span) in param.bound_names() {
                                this.declare_named(&name, SymbolKind::Parameter, span, false);
                            }
                            this.visit_pattern(param);
                        }
                        this.hoist(&handler.body, false);
                        walk_stmts(this, &handler.body);
                    });
                }
                if let Some(finalizer) = finalizer {
                    let span = finalizer.first().map(|s| s.span).unwrap_or(stmt.span);
                    self.block(finalizer, span);
                }
            }
            _ => walk_stmt(self, stmt),
        }
    }

    fn visit_expr(&mut self, expr: &Expr) {
        match &expr.kind {
            ExprKind::Assign {
                op: AssignOp::Assign,
                target,
                value,
            } => {
                match target {
                    AssignTarget::Simple(simple) => match simple.unwrapped().as_ident() {
                        Some(name) => self.write(name, simple.span),
                        None => self.visit_expr(simple),
                    },
                    AssignTarget::Pattern(pattern) => {
                        for (name, span) in pattern.bound_names() {
                            self.write(&name, span);
                        }
                        walk_pattern(self, pattern);
                    }
                }
                self.visit_expr(value);
            }
            ExprKind::Function(function) => self.enter_function(function, ScopeKind::Function, true),
            ExprKind::Call { callee, args, .. } => {
                if self.component_depth > 0 {
                    if let Some(name) = callee.as_ident() {
                        let shadowed = self
                            .table
                            .resolve(self.current, name)
                            .is_some_and(|(_, s)| s.kind != SymbolKind::Import);
                        if CreatorKind::from_callee(name) == Some(CreatorKind::Effect) && !shadowed {
                            self.audit_effect(expr.span, args);
                        }
                    }
                }
                walk_expr(self, expr);
            }
            _ => walk_expr(self, expr),
        }
    }

    fn visit_function(&mut self, function: &Function) {
        self.enter_function(function, ScopeKind::Function, false);
    }

    fn visit_arrow(&mut self, arrow: &Arrow) {
        self.with_scope(arrow.span.key(), ScopeKind::Function, |this| {
            this.declare_params(&arrow.params);
            if let ArrowBody::Block(body) = &arrow.body {
                this.hoist(body, true);
            }
            walk_arrow(this, arrow);
        });
    }

    fn visit_element(&mut self, element: &Element) {
        if element.is_component() {
            let head = element.name.split('.').next().unwrap_or(&element.name);
            if !self.table.mark_read(self.current, head) && !self.is_global(head) {
                self.diagnostics.push(
                    Diagnostic::error(
                        SEM_UNDECLARED_COMPONENT,
                        format!("component `{}` is not declared or imported", head),
                        element.span,
                        Phase::Semantic,
                    )
                    .with_suggestion(format!("import `{}` or declare `component {}() {{ ... }}`", head, head)),
                );
            }
        }
        walk_element(self, element);
    }

    fn visit_reference(&mut self, name: &str, span: Span) {
        self.read(name, span);
    }

    fn visit_type(&mut self, text: &str, _span: Span) {
        for m in TYPE_IDENT.find_iter(text) {
            self.table.mark_read(self.current, m.as_str());
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CALLBACK COLLECTORS
// ═══════════════════════════════════════════════════════════════════════════════

/// Every name bound anywhere inside a callback, parameters included.
#[derive(Default)]
struct LocalNames {
    names: HashSet<String>,
}

impl Visit for LocalNames {
    fn visit_stmt(&mut self, stmt: &Stmt) {
        if let StmtKind::Function(Function { name: Some(name), .. }) = &stmt.kind {
            self.names.insert(name.clone());
        }
        walk_stmt(self, stmt);
    }

    fn visit_pattern(&mut self, pattern: &Pattern) {
        if let PatternKind::Ident(name) = &pattern.kind {
            self.names.insert(name.clone());
        }
        walk_pattern(self, pattern);
    }
}

/// Callee names of `name()` calls, in source order.
#[derive(Default)]
struct ZeroArgCalls {
    names: Vec<String>,
}

impl Visit for ZeroArgCalls {
    fn visit_expr(&mut self, expr: &Expr) {
        if let ExprKind::Call {
            callee,
            args,
            optional: false,
        } = &expr.kind
        {
            if args.is_empty() {
                if let Some(name) = callee.as_ident() {
                    self.names.push(name.to_string());
                }
            }
        }
        walk_expr(self, expr);
    }
}
