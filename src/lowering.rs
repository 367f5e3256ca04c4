//! Syntax tree → IR lowering.
//!
//! One IR node per syntax node, all the way down: object and array literal
//! contents, defaults, markup attributes and children are lowered before the
//! parent is built. Type-only declarations produce nothing. `enum` becomes a
//! `const` object.

use crate::ast::*;
use crate::escape::normalize_markup_text;
use crate::ir::*;
use crate::span::Span;

pub fn lower(program: &Program) -> IrModule {
    let lowerer = Lowerer;
    IrModule {
        body: lowerer.stmts(&program.body),
        ..Default::default()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// LOWERER
// ═══════════════════════════════════════════════════════════════════════════════

struct Lowerer;

impl Lowerer {
    fn stmts(&self, stmts: &[Stmt]) -> Vec<IrStmt> {
        stmts.iter().filter_map(|s| self.stmt(s)).collect()
    }

    fn boxed(&self, stmt: &Stmt) -> Box<IrStmt> {
        Box::new(self.stmt(stmt).unwrap_or(IrStmt {
            kind: IrStmtKind::Empty,
            span: stmt.span,
        }))
    }

    /// `None` for declarations that only exist at the type level.
    fn stmt(&self, stmt: &Stmt) -> Option<IrStmt> {
        let kind = match &stmt.kind {
            StmtKind::Var(decl) => IrStmtKind::Var(self.var_decl(decl)),
            StmtKind::Function(function) => IrStmtKind::Function(self.function(function, false)),
            StmtKind::Component(function) => IrStmtKind::Function(self.function(function, true)),
            StmtKind::Interface(_) | StmtKind::TypeAlias(_) => return None,
            StmtKind::Enum(decl) => IrStmtKind::Var(self.enum_object(decl, stmt.span)),
            StmtKind::Import(decl) => IrStmtKind::Import(self.import(decl)?),
            StmtKind::Export(export) => IrStmtKind::Export(self.export(export)?),
            StmtKind::Expr(expr) => IrStmtKind::Expr(self.expr(expr)),
            StmtKind::Block(body) => IrStmtKind::Block(self.stmts(body)),
            StmtKind::If {
                test,
                consequent,
                alternate,
            } => IrStmtKind::If {
                test: self.expr(test),
                consequent: self.boxed(consequent),
                alternate: alternate.as_ref().map(|s| self.boxed(s)),
            },
            StmtKind::For {
                init,
                test,
                update,
                body,
            } => IrStmtKind::For {
                init: init.as_ref().map(|init| match init {
                    ForInit::Var(decl) => IrForInit::Var(self.var_decl(decl)),
                    ForInit::Expr(expr) => IrForInit::Expr(self.expr(expr)),
                }),
                test: test.as_ref().map(|e| self.expr(e)),
                update: update.as_ref().map(|e| self.expr(e)),
                body: self.boxed(body),
            },
            StmtKind::ForIn { left, right, body } => IrStmtKind::ForIn {
                left: self.for_head(left),
                right: self.expr(right),
                body: self.boxed(body),
            },
            StmtKind::ForOf {
                left,
                right,
                body,
                is_await,
            } => IrStmtKind::ForOf {
                left: self.for_head(left),
                right: self.expr(right),
                body: self.boxed(body),
                is_await: *is_await,
            },
            StmtKind::While { test, body } => IrStmtKind::While {
                test: self.expr(test),
                body: self.boxed(body),
            },
            StmtKind::DoWhile { body, test } => IrStmtKind::DoWhile {
                body: self.boxed(body),
                test: self.expr(test),
            },
            StmtKind::Switch { discriminant, cases } => IrStmtKind::Switch {
                discriminant: self.expr(discriminant),
                cases: cases
                    .iter()
                    .map(|case| IrSwitchCase {
                        test: case.test.as_ref().map(|e| self.expr(e)),
                        body: self.stmts(&case.body),
                    })
                    .collect(),
            },
            StmtKind::Try {
                block,
                handler,
                finalizer,
            } => IrStmtKind::Try {
                block: self.stmts(block),
                handler: handler.as_ref().map(|h| IrCatch {
                    param: h.param.as_ref().map(|p| self.pattern(p)),
                    body: self.stmts(&h.body),
                }),
                finalizer: finalizer.as_ref().map(|f| self.stmts(f)),
            },
            StmtKind::Throw(expr) => IrStmtKind::Throw(self.expr(expr)),
            StmtKind::Return(arg) => IrStmtKind::Return(arg.as_ref().map(|e| self.expr(e))),
            StmtKind::Break(label) => IrStmtKind::Break(label.clone()),
            StmtKind::Continue(label) => IrStmtKind::Continue(label.clone()),
            StmtKind::Labeled { label, body } => IrStmtKind::Labeled {
                label: label.clone(),
                body: self.boxed(body),
            },
            StmtKind::Debugger => IrStmtKind::Debugger,
            StmtKind::Empty => IrStmtKind::Empty,
        };
        Some(IrStmt { kind, span: stmt.span })
    }

    fn var_decl(&self, decl: &VarDecl) -> IrVarDecl {
        IrVarDecl {
            kind: decl.kind,
            declarators: decl
                .declarators
                .iter()
                .map(|d| IrDeclarator {
                    pattern: self.pattern(&d.pattern),
                    type_annotation: d.type_annotation.clone(),
                    init: d.init.as_ref().map(|e| self.expr(e)),
                })
                .collect(),
        }
    }

    fn for_head(&self, head: &ForHead) -> IrForHead {
        match head {
            ForHead::Var(kind, pattern) => IrForHead::Var(*kind, self.pattern(pattern)),
            ForHead::Target(expr) => IrForHead::Target(self.expr(expr)),
        }
    }

    fn function(&self, function: &Function, is_component: bool) -> IrFunction {
        IrFunction {
            name: function.name.clone(),
            params: self.params(&function.params),
            body: self.stmts(&function.body),
            is_async: function.is_async,
            is_generator: function.is_generator,
            is_component,
            span: function.span,
        }
    }

    fn params(&self, params: &[Param]) -> Vec<IrParam> {
        params
            .iter()
            .map(|p| IrParam {
                pattern: self.pattern(&p.pattern),
                type_annotation: p.type_annotation.clone(),
                rest: p.rest,
            })
            .collect()
    }

    /// Members without an initializer continue numbering from the previous
    /// numeric member, starting at zero.
    fn enum_object(&self, decl: &EnumDecl, span: Span) -> IrVarDecl {
        let mut next: Option<f64> = Some(0.0);
        let mut props = Vec::with_capacity(decl.members.len());
        for member in &decl.members {
            let value = match &member.init {
                Some(init) => {
                    next = numeric_value(init).map(|n| n + 1.0);
                    self.expr(init)
                }
                None => {
                    let n = next.unwrap_or(0.0);
                    next = Some(n + 1.0);
                    IrNode::new(IrKind::Literal(Literal::Number(format_number(n))), member.span)
                }
            };
            let key = if is_identifier_name(&member.name) {
                IrPropKey::Ident(member.name.clone())
            } else {
                IrPropKey::String(member.name.clone())
            };
            props.push(IrProperty {
                kind: IrPropertyKind::KeyValue { key, value },
                span: member.span,
            });
        }
        IrVarDecl {
            kind: VarKind::Const,
            declarators: vec![IrDeclarator {
                pattern: IrPattern {
                    kind: IrPatternKind::Ident(decl.name.clone()),
                    span,
                },
                type_annotation: None,
                init: Some(IrNode::new(IrKind::Object(props), span)),
            }],
        }
    }

    fn import(&self, decl: &ImportDecl) -> Option<IrImport> {
        if decl.type_only {
            return None;
        }
        let named: Vec<IrImportSpecifier> = decl
            .named
            .iter()
            .filter(|s| !s.type_only)
            .map(|s| IrImportSpecifier {
                imported: s.imported.clone(),
                local: s.local.name.clone(),
            })
            .collect();
        let import = IrImport {
            default: decl.default.as_ref().map(|b| b.name.clone()),
            namespace: decl.namespace.as_ref().map(|b| b.name.clone()),
            named,
            source: decl.source.clone(),
        };
        // `import { type A } from "x"` erases entirely; `import "x"` is kept.
        if import.is_empty() && !decl.is_side_effect_only() {
            return None;
        }
        Some(import)
    }

    fn export(&self, export: &ExportDecl) -> Option<IrExport> {
        match export {
            ExportDecl::Named {
                specifiers,
                source,
                type_only,
            } => {
                if *type_only {
                    return None;
                }
                let kept: Vec<(String, String)> = specifiers
                    .iter()
                    .filter(|s| !s.type_only)
                    .map(|s| (s.local.clone(), s.exported.clone()))
                    .collect();
                if kept.is_empty() && !specifiers.is_empty() {
                    return None;
                }
                Some(IrExport::Named {
                    specifiers: kept,
                    source: source.clone(),
                })
            }
            ExportDecl::All { alias, source } => Some(IrExport::All {
                alias: alias.clone(),
                source: source.clone(),
            }),
            ExportDecl::Declaration(inner) => Some(IrExport::Declaration(Box::new(self.stmt(inner)?))),
            ExportDecl::Default(inner) => Some(IrExport::Default(Box::new(self.stmt(inner)?))),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // PATTERNS
    // ═══════════════════════════════════════════════════════════════════════════

    fn pattern(&self, pattern: &Pattern) -> IrPattern {
        let kind = match &pattern.kind {
            PatternKind::Ident(name) => IrPatternKind::Ident(name.clone()),
            PatternKind::Array { elements, rest } => IrPatternKind::Array {
                elements: elements.iter().map(|e| e.as_ref().map(|p| self.pattern(p))).collect(),
                rest: rest.as_ref().map(|r| Box::new(self.pattern(r))),
            },
            PatternKind::Object { props, rest } => IrPatternKind::Object {
                props: props
                    .iter()
                    .map(|p| IrPatternProp {
                        key: self.prop_key(&p.key),
                        value: self.pattern(&p.value),
                        shorthand: p.shorthand,
                    })
                    .collect(),
                rest: rest.as_ref().map(|r| Box::new(self.pattern(r))),
            },
            PatternKind::Assign { target, default } => IrPatternKind::Assign {
                target: Box::new(self.pattern(target)),
                default: Box::new(self.expr(default)),
            },
            PatternKind::Expr(expr) => IrPatternKind::Target(Box::new(self.expr(expr))),
        };
        IrPattern {
            kind,
            span: pattern.span,
        }
    }

    fn prop_key(&self, key: &PropKey) -> IrPropKey {
        match key {
            PropKey::Ident(name) => IrPropKey::Ident(name.clone()),
            PropKey::String(value) => IrPropKey::String(value.clone()),
            PropKey::Number(raw) => IrPropKey::Number(raw.clone()),
            PropKey::Computed(expr) => IrPropKey::Computed(Box::new(self.expr(expr))),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // EXPRESSIONS
    // ═══════════════════════════════════════════════════════════════════════════

    fn boxed_expr(&self, expr: &Expr) -> Box<IrNode> {
        Box::new(self.expr(expr))
    }

    fn exprs(&self, exprs: &[Expr]) -> Vec<IrNode> {
        exprs.iter().map(|e| self.expr(e)).collect()
    }

    fn expr(&self, expr: &Expr) -> IrNode {
        let kind = match &expr.kind {
            ExprKind::Ident(name) => IrKind::Identifier(name.clone()),
            ExprKind::Number(raw) => IrKind::Literal(Literal::Number(raw.clone())),
            ExprKind::String(value) => IrKind::Literal(Literal::String(value.clone())),
            ExprKind::Regex(raw) => IrKind::Literal(Literal::Regex(raw.clone())),
            ExprKind::Bool(value) => IrKind::Literal(Literal::Bool(*value)),
            ExprKind::Null => IrKind::Literal(Literal::Null),
            ExprKind::This => IrKind::This,
            ExprKind::Super => IrKind::Super,
            ExprKind::Template(template) => IrKind::Template {
                quasis: template.quasis.clone(),
                exprs: self.exprs(&template.exprs),
            },
            ExprKind::TaggedTemplate { tag, template } => IrKind::TaggedTemplate {
                tag: self.boxed_expr(tag),
                quasis: template.quasis.clone(),
                exprs: self.exprs(&template.exprs),
            },
            ExprKind::Array(elements) => {
                IrKind::Array(elements.iter().map(|e| e.as_ref().map(|e| self.expr(e))).collect())
            }
            ExprKind::Object(props) => IrKind::Object(props.iter().map(|p| self.property(p)).collect()),
            ExprKind::Function(function) => IrKind::Function(Box::new(self.function(function, false))),
            ExprKind::Arrow(arrow) => IrKind::Arrow(Box::new(IrArrow {
                params: self.params(&arrow.params),
                body: match &arrow.body {
                    ArrowBody::Expr(body) => IrArrowBody::Expr(self.boxed_expr(body)),
                    ArrowBody::Block(body) => IrArrowBody::Block(self.stmts(body)),
                },
                is_async: arrow.is_async,
            })),
            ExprKind::Unary { op, arg } => IrKind::Unary {
                op: *op,
                arg: self.boxed_expr(arg),
            },
            ExprKind::Update { op, prefix, arg } => IrKind::Update {
                op: *op,
                prefix: *prefix,
                arg: self.boxed_expr(arg),
            },
            ExprKind::Binary { op, left, right } => IrKind::Binary {
                op: *op,
                left: self.boxed_expr(left),
                right: self.boxed_expr(right),
            },
            ExprKind::Assign { op, target, value } => IrKind::Assign {
                op: *op,
                target: match target {
                    AssignTarget::Simple(simple) => IrAssignTarget::Simple(self.boxed_expr(simple)),
                    AssignTarget::Pattern(pattern) => IrAssignTarget::Pattern(self.pattern(pattern)),
                },
                value: self.boxed_expr(value),
            },
            ExprKind::Conditional {
                test,
                consequent,
                alternate,
            } => IrKind::Conditional {
                test: self.boxed_expr(test),
                consequent: self.boxed_expr(consequent),
                alternate: self.boxed_expr(alternate),
            },
            ExprKind::Call { callee, args, optional } => IrKind::Call {
                callee: self.boxed_expr(callee),
                args: self.exprs(args),
                optional: *optional,
            },
            ExprKind::New { callee, args } => IrKind::New {
                callee: self.boxed_expr(callee),
                args: self.exprs(args),
            },
            ExprKind::Member {
                object,
                property,
                optional,
            } => IrKind::Member {
                object: self.boxed_expr(object),
                property: match property {
                    MemberProp::Ident(name) => IrMemberProp::Ident(name.clone()),
                    MemberProp::Computed(expr) => IrMemberProp::Computed(self.boxed_expr(expr)),
                },
                optional: *optional,
            },
            ExprKind::Sequence(exprs) => IrKind::Sequence(self.exprs(exprs)),
            ExprKind::Spread(arg) => IrKind::Spread(self.boxed_expr(arg)),
            ExprKind::Await(arg) => IrKind::Await(self.boxed_expr(arg)),
            ExprKind::Yield { arg, delegate } => IrKind::Yield {
                arg: arg.as_ref().map(|a| self.boxed_expr(a)),
                delegate: *delegate,
            },
            // Assertions are erased; the asserted expression takes their place.
            ExprKind::TypeAssertion { expr: inner, .. } => return self.expr(inner),
            ExprKind::Paren(inner) => IrKind::Paren(self.boxed_expr(inner)),
            ExprKind::Element(element) => self.element(element),
            ExprKind::Fragment(fragment) => IrKind::Fragment(Box::new(IrFragment {
                children: self.children(&fragment.children),
            })),
            ExprKind::Invalid => IrKind::Invalid,
        };
        IrNode::new(kind, expr.span)
    }

    fn property(&self, prop: &Property) -> IrProperty {
        let kind = match &prop.kind {
            PropertyKind::KeyValue { key, value } => IrPropertyKind::KeyValue {
                key: self.prop_key(key),
                value: self.expr(value),
            },
            PropertyKind::Shorthand { name, .. } => IrPropertyKind::Shorthand(name.clone()),
            PropertyKind::Method { key, kind, function } => IrPropertyKind::Method {
                key: self.prop_key(key),
                kind: *kind,
                function: self.function(function, false),
            },
            PropertyKind::Spread(arg) => IrPropertyKind::Spread(self.expr(arg)),
        };
        IrProperty { kind, span: prop.span }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // MARKUP
    // ═══════════════════════════════════════════════════════════════════════════

    fn element(&self, element: &Element) -> IrKind {
        let attrs = element.attributes.iter().map(|a| self.attribute(a)).collect();
        let children = self.children(&element.children);
        if element.is_component() {
            IrKind::ComponentCall(Box::new(IrComponentCall {
                callee: element.name.clone(),
                props: attrs,
                children,
            }))
        } else {
            IrKind::Element(Box::new(IrElement {
                tag: element.name.clone(),
                attrs,
                children,
            }))
        }
    }

    fn attribute(&self, attribute: &Attribute) -> IrAttr {
        match attribute {
            Attribute::Named { name, value, span } => IrAttr {
                kind: IrAttrKind::Named {
                    name: name.clone(),
                    value: value.as_ref().map(|v| match v {
                        AttrValue::String(s) => IrNode::new(IrKind::Literal(Literal::String(s.clone())), *span),
                        AttrValue::Expr(expr) => self.expr(expr),
                    }),
                },
                class: Class::Static,
                span: *span,
            },
            Attribute::Spread { expr, span } => IrAttr {
                kind: IrAttrKind::Spread(self.expr(expr)),
                class: Class::Static,
                span: *span,
            },
        }
    }

    /// Whitespace-only text and `{}` children produce nothing.
    fn children(&self, children: &[JsxChild]) -> Vec<IrNode> {
        children
            .iter()
            .filter_map(|child| match &child.kind {
                JsxChildKind::Text(raw) => {
                    normalize_markup_text(raw).map(|text| IrNode::new(IrKind::Text(text), child.span))
                }
                JsxChildKind::Expr(expr) | JsxChildKind::Shorthand(expr) => Some(self.expr(expr)),
                JsxChildKind::Spread(expr) => {
                    Some(IrNode::new(IrKind::Spread(self.boxed_expr(expr)), child.span))
                }
                JsxChildKind::Element(element) => Some(IrNode::new(self.element(element), child.span)),
                JsxChildKind::Fragment(fragment) => Some(IrNode::new(
                    IrKind::Fragment(Box::new(IrFragment {
                        children: self.children(&fragment.children),
                    })),
                    child.span,
                )),
                JsxChildKind::Empty => None,
            })
            .collect()
    }
}

fn numeric_value(expr: &Expr) -> Option<f64> {
    match &expr.unwrapped().kind {
        ExprKind::Number(raw) => parse_number(raw),
        ExprKind::Unary {
            op: UnaryOp::Neg,
            arg,
        } => numeric_value(arg).map(|n| -n),
        _ => None,
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    let clean: String = raw.chars().filter(|c| *c != '_').collect();
    let lower = clean.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        return i64::from_str_radix(hex, 16).ok().map(|n| n as f64);
    }
    if let Some(bin) = lower.strip_prefix("0b") {
        return i64::from_str_radix(bin, 2).ok().map(|n| n as f64);
    }
    if let Some(oct) = lower.strip_prefix("0o") {
        return i64::from_str_radix(oct, 8).ok().map(|n| n as f64);
    }
    lower.parse::<f64>().ok()
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

pub fn is_identifier_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}
