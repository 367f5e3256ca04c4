//! Read-only traversal over the syntax tree.
//!
//! Implementers override `visit_*` methods to add behavior and call the
//! matching `walk_*` function to continue into children. Traversal order is
//! source order.

use crate::ast::*;
use crate::span::Span;

pub trait Visit {
    fn visit_program(&mut self, program: &Program) {
        walk_program(self, program);
    }

    fn visit_stmt(&mut self, stmt: &Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &Expr) {
        walk_expr(self, expr);
    }

    fn visit_pattern(&mut self, pattern: &Pattern) {
        walk_pattern(self, pattern);
    }

    fn visit_function(&mut self, function: &Function) {
        walk_function(self, function);
    }

    fn visit_arrow(&mut self, arrow: &Arrow) {
        walk_arrow(self, arrow);
    }

    fn visit_element(&mut self, element: &Element) {
        walk_element(self, element);
    }

    fn visit_child(&mut self, child: &JsxChild) {
        walk_child(self, child);
    }

    /// An identifier read in expression position, including `{ a }` shorthand.
    fn visit_reference(&mut self, _name: &str, _span: Span) {}

    /// Opaque type text: annotations, interface bodies, alias values.
    fn visit_type(&mut self, _text: &str, _span: Span) {}
}

pub fn walk_program<V: Visit + ?Sized>(visitor: &mut V, program: &Program) {
    for stmt in &program.body {
        visitor.visit_stmt(stmt);
    }
}

pub fn walk_stmts<V: Visit + ?Sized>(visitor: &mut V, stmts: &[Stmt]) {
    for stmt in stmts {
        visitor.visit_stmt(stmt);
    }
}

pub fn walk_var_decl<V: Visit + ?Sized>(visitor: &mut V, decl: &VarDecl) {
    for declarator in &decl.declarators {
        visitor.visit_pattern(&declarator.pattern);
        if let Some(text) = &declarator.type_annotation {
            visitor.visit_type(text, declarator.span);
        }
        if let Some(init) = &declarator.init {
            visitor.visit_expr(init);
        }
    }
}

pub fn walk_stmt<V: Visit + ?Sized>(visitor: &mut V, stmt: &Stmt) {
    match &stmt.kind {
        StmtKind::Var(decl) => walk_var_decl(visitor, decl),
        StmtKind::Function(function) | StmtKind::Component(function) => visitor.visit_function(function),
        StmtKind::Interface(decl) => {
            if let Some(extends) = &decl.extends {
                visitor.visit_type(extends, stmt.span);
            }
            visitor.visit_type(&decl.body, stmt.span);
        }
        StmtKind::TypeAlias(decl) => visitor.visit_type(&decl.value, stmt.span),
        StmtKind::Enum(decl) => {
            for member in &decl.members {
                if let Some(init) = &member.init {
                    visitor.visit_expr(init);
                }
            }
        }
        StmtKind::Import(_) => {}
        StmtKind::Export(export) => match export {
            ExportDecl::Named { specifiers, source, .. } => {
                if source.is_none() {
                    for spec in specifiers.iter().filter(|s| !s.type_only) {
                        visitor.visit_reference(&spec.local, spec.span);
                    }
                }
            }
            ExportDecl::All { .. } => {}
            ExportDecl::Declaration(inner) | ExportDecl::Default(inner) => visitor.visit_stmt(inner),
        },
        StmtKind::Expr(expr) | StmtKind::Throw(expr) => visitor.visit_expr(expr),
        StmtKind::Block(body) => walk_stmts(visitor, body),
        StmtKind::If {
            test,
            consequent,
            alternate,
        } => {
            visitor.visit_expr(test);
            visitor.visit_stmt(consequent);
            if let Some(alternate) = alternate {
                visitor.visit_stmt(alternate);
            }
        }
        StmtKind::For {
            init,
            test,
            update,
            body,
        } => {
            match init {
                Some(ForInit::Var(decl)) => walk_var_decl(visitor, decl),
                Some(ForInit::Expr(expr)) => visitor.visit_expr(expr),
                None => {}
            }
            if let Some(test) = test {
                visitor.visit_expr(test);
            }
            if let Some(update) = update {
                visitor.visit_expr(update);
            }
            visitor.visit_stmt(body);
        }
        StmtKind::ForIn { left, right, body } | StmtKind::ForOf { left, right, body, .. } => {
            match left {
                ForHead::Var(_, pattern) => visitor.visit_pattern(pattern),
                ForHead::Target(expr) => visitor.visit_expr(expr),
            }
            visitor.visit_expr(right);
            visitor.visit_stmt(body);
        }
        StmtKind::While { test, body } | StmtKind::DoWhile { body, test } => {
            visitor.visit_expr(test);
            visitor.visit_stmt(body);
        }
        StmtKind::Switch { discriminant, cases } => {
            visitor.visit_expr(discriminant);
            for case in cases {
                if let Some(test) = &case.test {
                    visitor.visit_expr(test);
                }
                walk_stmts(visitor, &case.body);
            }
        }
        StmtKind::Try {
            block,
            handler,
            finalizer,
        } => {
            walk_stmts(visitor, block);
            if let Some(handler) = handler {
                if let Some(param) = &handler.param {
                    visitor.visit_pattern(param);
                }
                walk_stmts(visitor, &handler.body);
            }
            if let Some(finalizer) = finalizer {
                walk_stmts(visitor, finalizer);
            }
        }
        StmtKind::Return(arg) => {
            if let Some(arg) = arg {
                visitor.visit_expr(arg);
            }
        }
        StmtKind::Labeled { body, .. } => visitor.visit_stmt(body),
        StmtKind::Break(_) | StmtKind::Continue(_) | StmtKind::Debugger | StmtKind::Empty => {}
    }
}

pub fn walk_function<V: Visit + ?Sized>(visitor: &mut V, function: &Function) {
    walk_params(visitor, &function.params);
    if let Some(ret) = &function.return_type {
        visitor.visit_type(ret, function.span);
    }
    walk_stmts(visitor, &function.body);
}

pub fn walk_params<V: Visit + ?Sized>(visitor: &mut V, params: &[Param]) {
    for param in params {
        visitor.visit_pattern(&param.pattern);
        if let Some(text) = &param.type_annotation {
            visitor.visit_type(text, param.span);
        }
    }
}

pub fn walk_arrow<V: Visit + ?Sized>(visitor: &mut V, arrow: &Arrow) {
    walk_params(visitor, &arrow.params);
    match &arrow.body {
        ArrowBody::Expr(expr) => visitor.visit_expr(expr),
        ArrowBody::Block(body) => walk_stmts(visitor, body),
    }
}

pub fn walk_pattern<V: Visit + ?Sized>(visitor: &mut V, pattern: &Pattern) {
    match &pattern.kind {
        PatternKind::Ident(_) => {}
        PatternKind::Array { elements, rest } => {
            for element in elements.iter().flatten() {
                visitor.visit_pattern(element);
            }
            if let Some(rest) = rest {
                visitor.visit_pattern(rest);
            }
        }
        PatternKind::Object { props, rest } => {
            for prop in props {
                if let PropKey::Computed(key) = &prop.key {
                    visitor.visit_expr(key);
                }
                visitor.visit_pattern(&prop.value);
            }
            if let Some(rest) = rest {
                visitor.visit_pattern(rest);
            }
        }
        PatternKind::Assign { target, default } => {
            visitor.visit_pattern(target);
            visitor.visit_expr(default);
        }
        PatternKind::Expr(expr) => visitor.visit_expr(expr),
    }
}

pub fn walk_template<V: Visit + ?Sized>(visitor: &mut V, template: &Template) {
    for expr in &template.exprs {
        visitor.visit_expr(expr);
    }
}

pub fn walk_expr<V: Visit + ?Sized>(visitor: &mut V, expr: &Expr) {
    match &expr.kind {
        ExprKind::Ident(name) => visitor.visit_reference(name, expr.span),
        ExprKind::Number(_)
        | ExprKind::String(_)
        | ExprKind::Regex(_)
        | ExprKind::Bool(_)
        | ExprKind::Null
        | ExprKind::This
        | ExprKind::Super
        | ExprKind::Invalid => {}
        ExprKind::Template(template) => walk_template(visitor, template),
        ExprKind::TaggedTemplate { tag, template } => {
            visitor.visit_expr(tag);
            walk_template(visitor, template);
        }
        ExprKind::Array(elements) => {
            for element in elements.iter().flatten() {
                visitor.visit_expr(element);
            }
        }
        ExprKind::Object(props) => {
            for prop in props {
                match &prop.kind {
                    PropertyKind::KeyValue { key, value } => {
                        if let PropKey::Computed(key) = key {
                            visitor.visit_expr(key);
                        }
                        visitor.visit_expr(value);
                    }
                    PropertyKind::Shorthand { name, default } => {
                        visitor.visit_reference(name, prop.span);
                        if let Some(default) = default {
                            visitor.visit_expr(default);
                        }
                    }
                    PropertyKind::Method { key, function, .. } => {
                        if let PropKey::Computed(key) = key {
                            visitor.visit_expr(key);
                        }
                        visitor.visit_function(function);
                    }
                    PropertyKind::Spread(arg) => visitor.visit_expr(arg),
                }
            }
        }
        ExprKind::Function(function) => visitor.visit_function(function),
        ExprKind::Arrow(arrow) => visitor.visit_arrow(arrow),
        ExprKind::Unary { arg, .. }
        | ExprKind::Update { arg, .. }
        | ExprKind::Spread(arg)
        | ExprKind::Await(arg)
        | ExprKind::Paren(arg) => visitor.visit_expr(arg),
        ExprKind::TypeAssertion { expr: inner, type_text } => {
            visitor.visit_expr(inner);
            visitor.visit_type(type_text, expr.span);
        }
        ExprKind::Binary { left, right, .. } => {
            visitor.visit_expr(left);
            visitor.visit_expr(right);
        }
        ExprKind::Assign { target, value, .. } => {
            match target {
                AssignTarget::Simple(simple) => visitor.visit_expr(simple),
                AssignTarget::Pattern(pattern) => visitor.visit_pattern(pattern),
            }
            visitor.visit_expr(value);
        }
        ExprKind::Conditional {
            test,
            consequent,
            alternate,
        } => {
            visitor.visit_expr(test);
            visitor.visit_expr(consequent);
            visitor.visit_expr(alternate);
        }
        ExprKind::Call { callee, args, .. } | ExprKind::New { callee, args } => {
            visitor.visit_expr(callee);
            for arg in args {
                visitor.visit_expr(arg);
            }
        }
        ExprKind::Member { object, property, .. } => {
            visitor.visit_expr(object);
            if let MemberProp::Computed(property) = property {
                visitor.visit_expr(property);
            }
        }
        ExprKind::Sequence(exprs) => {
            for expr in exprs {
                visitor.visit_expr(expr);
            }
        }
        ExprKind::Yield { arg, .. } => {
            if let Some(arg) = arg {
                visitor.visit_expr(arg);
            }
        }
        ExprKind::Element(element) => visitor.visit_element(element),
        ExprKind::Fragment(fragment) => {
            for child in &fragment.children {
                visitor.visit_child(child);
            }
        }
    }
}

pub fn walk_element<V: Visit + ?Sized>(visitor: &mut V, element: &Element) {
    for attribute in &element.attributes {
        match attribute {
            Attribute::Named {
                value: Some(AttrValue::Expr(expr)),
                ..
            } => visitor.visit_expr(expr),
            Attribute::Named { .. } => {}
            Attribute::Spread { expr, .. } => visitor.visit_expr(expr),
        }
    }
    for child in &element.children {
        visitor.visit_child(child);
    }
}

pub fn walk_child<V: Visit + ?Sized>(visitor: &mut V, child: &JsxChild) {
    match &child.kind {
        JsxChildKind::Text(_) | JsxChildKind::Empty => {}
        JsxChildKind::Expr(expr) | JsxChildKind::Shorthand(expr) | JsxChildKind::Spread(expr) => {
            visitor.visit_expr(expr)
        }
        JsxChildKind::Element(element) => visitor.visit_element(element),
        JsxChildKind::Fragment(fragment) => {
            for child in &fragment.children {
                visitor.visit_child(child);
            }
        }
    }
}
