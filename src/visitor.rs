use crate::ir::*;

/// A lexical region the traversal is about to enter.
pub enum ScopeEntry<'a> {
    Module(&'a [IrStmt]),
    Function {
        params: &'a [IrParam],
        body: &'a [IrStmt],
    },
    /// An expression-bodied arrow has no statements.
    Arrow {
        params: &'a [IrParam],
        body: Option<&'a [IrStmt]>,
    },
    Block(&'a [IrStmt]),
    Catch {
        param: Option<&'a IrPattern>,
        body: &'a [IrStmt],
    },
    /// `for (let i ...)` and `for (const x of ...)` heads.
    LoopHead(Vec<String>),
}

/// The IrVisitor trait defines the single authoritative traversal mechanism for the IR.
///
/// Rules:
/// 1. Traversal order is source order and fixed.
/// 2. Implementers override `visit_*` methods to add behavior.
/// 3. Implementers MUST call `walk_*` functions to continue traversal unless pruning is intended.
/// 4. Every `enter_scope` is matched by one `exit_scope`.
pub trait IrVisitor {
    fn visit_module(&mut self, module: &mut IrModule) {
        walk_module(self, module);
    }

    fn visit_stmt(&mut self, stmt: &mut IrStmt) {
        walk_stmt(self, stmt);
    }

    fn visit_node(&mut self, node: &mut IrNode) {
        walk_node(self, node);
    }

    fn visit_pattern(&mut self, pattern: &mut IrPattern) {
        walk_pattern(self, pattern);
    }

    fn visit_function(&mut self, function: &mut IrFunction) {
        walk_function(self, function);
    }

    fn visit_arrow(&mut self, arrow: &mut IrArrow) {
        walk_arrow(self, arrow);
    }

    fn visit_element(&mut self, element: &mut IrElement) {
        walk_element(self, element);
    }

    fn visit_component_call(&mut self, call: &mut IrComponentCall) {
        walk_component_call(self, call);
    }

    fn visit_fragment(&mut self, fragment: &mut IrFragment) {
        walk_children(self, &mut fragment.children);
    }

    fn visit_import(&mut self, _import: &mut IrImport) {
        // Leaf, nothing to walk by default
    }

    fn enter_scope(&mut self, _entry: ScopeEntry<'_>) {}

    fn exit_scope(&mut self) {}
}

pub fn walk_module<V: IrVisitor + ?Sized>(visitor: &mut V, module: &mut IrModule) {
    visitor.enter_scope(ScopeEntry::Module(&module.body));
    walk_stmts(visitor, &mut module.body);
    visitor.exit_scope();
}

pub fn walk_stmts<V: IrVisitor + ?Sized>(visitor: &mut V, stmts: &mut [IrStmt]) {
    for stmt in stmts {
        visitor.visit_stmt(stmt);
    }
}

pub fn walk_block<V: IrVisitor + ?Sized>(visitor: &mut V, stmts: &mut [IrStmt]) {
    visitor.enter_scope(ScopeEntry::Block(stmts));
    walk_stmts(visitor, stmts);
    visitor.exit_scope();
}

pub fn walk_var_decl<V: IrVisitor + ?Sized>(visitor: &mut V, decl: &mut IrVarDecl) {
    for declarator in &mut decl.declarators {
        visitor.visit_pattern(&mut declarator.pattern);
        if let Some(init) = &mut declarator.init {
            visitor.visit_node(init);
        }
    }
}

fn loop_head_names(head: &IrForHead) -> Vec<String> {
    match head {
        IrForHead::Var(kind, pattern) if *kind != crate::ast::VarKind::Var => pattern.bound_names(),
        _ => Vec::new(),
    }
}

pub fn walk_stmt<V: IrVisitor + ?Sized>(visitor: &mut V, stmt: &mut IrStmt) {
    match &mut stmt.kind {
        IrStmtKind::Var(decl) => walk_var_decl(visitor, decl),
        IrStmtKind::Function(function) => visitor.visit_function(function),
        IrStmtKind::Import(import) => visitor.visit_import(import),
        IrStmtKind::Export(export) => match export {
            IrExport::Declaration(inner) | IrExport::Default(inner) => visitor.visit_stmt(inner),
            IrExport::Named { .. } | IrExport::All { .. } => {}
        },
        IrStmtKind::Expr(node) | IrStmtKind::Throw(node) => visitor.visit_node(node),
        IrStmtKind::Block(body) => walk_block(visitor, body),
        IrStmtKind::If {
            test,
            consequent,
            alternate,
        } => {
            visitor.visit_node(test);
            visitor.visit_stmt(consequent);
            if let Some(alternate) = alternate {
                visitor.visit_stmt(alternate);
            }
        }
        IrStmtKind::For {
            init,
            test,
            update,
            body,
        } => {
            let names = match init {
                Some(IrForInit::Var(decl)) if decl.kind != crate::ast::VarKind::Var => decl
                    .declarators
                    .iter()
                    .flat_map(|d| d.pattern.bound_names())
                    .collect(),
                _ => Vec::new(),
            };
            visitor.enter_scope(ScopeEntry::LoopHead(names));
            match init {
                Some(IrForInit::Var(decl)) => walk_var_decl(visitor, decl),
                Some(IrForInit::Expr(node)) => visitor.visit_node(node),
                None => {}
            }
            if let Some(test) = test {
                visitor.visit_node(test);
            }
            if let Some(update) = update {
                visitor.visit_node(update);
            }
            visitor.visit_stmt(body);
            visitor.exit_scope();
        }
        IrStmtKind::ForIn { left, right, body } | IrStmtKind::ForOf { left, right, body, .. } => {
            visitor.visit_node(right);
            visitor.enter_scope(ScopeEntry::LoopHead(loop_head_names(left)));
            match left {
                IrForHead::Var(_, pattern) => visitor.visit_pattern(pattern),
                IrForHead::Target(node) => visitor.visit_node(node),
            }
            visitor.visit_stmt(body);
            visitor.exit_scope();
        }
        IrStmtKind::While { test, body } | IrStmtKind::DoWhile { body, test } => {
            visitor.visit_node(test);
            visitor.visit_stmt(body);
        }
        IrStmtKind::Switch { discriminant, cases } => {
            visitor.visit_node(discriminant);
            for case in cases {
                if let Some(test) = &mut case.test {
                    visitor.visit_node(test);
                }
                walk_block(visitor, &mut case.body);
            }
        }
        IrStmtKind::Try {
            block,
            handler,
            finalizer,
        } => {
            walk_block(visitor, block);
            if let Some(handler) = handler {
                visitor.enter_scope(ScopeEntry::Catch {
                    param: handler.param.as_ref(),
                    body: &handler.body,
                });
                if let Some(param) = &mut handler.param {
                    visitor.visit_pattern(param);
                }
                walk_stmts(visitor, &mut handler.body);
                visitor.exit_scope();
            }
            if let Some(finalizer) = finalizer {
                walk_block(visitor, finalizer);
            }
        }
        IrStmtKind::Return(arg) => {
            if let Some(arg) = arg {
                visitor.visit_node(arg);
            }
        }
        IrStmtKind::Labeled { body, .. } => visitor.visit_stmt(body),
        IrStmtKind::Break(_) | IrStmtKind::Continue(_) | IrStmtKind::Debugger | IrStmtKind::Empty => {}
    }
}

pub fn walk_params<V: IrVisitor + ?Sized>(visitor: &mut V, params: &mut [IrParam]) {
    for param in params {
        visitor.visit_pattern(&mut param.pattern);
    }
}

pub fn walk_function<V: IrVisitor + ?Sized>(visitor: &mut V, function: &mut IrFunction) {
    visitor.enter_scope(ScopeEntry::Function {
        params: &function.params,
        body: &function.body,
    });
    walk_params(visitor, &mut function.params);
    walk_stmts(visitor, &mut function.body);
    visitor.exit_scope();
}

pub fn walk_arrow<V: IrVisitor + ?Sized>(visitor: &mut V, arrow: &mut IrArrow) {
    let body = match &arrow.body {
        IrArrowBody::Block(body) => Some(body.as_slice()),
        IrArrowBody::Expr(_) => None,
    };
    visitor.enter_scope(ScopeEntry::Arrow {
        params: &arrow.params,
        body,
    });
    walk_params(visitor, &mut arrow.params);
    match &mut arrow.body {
        IrArrowBody::Expr(node) => visitor.visit_node(node),
        IrArrowBody::Block(body) => walk_stmts(visitor, body),
    }
    visitor.exit_scope();
}

pub fn walk_pattern<V: IrVisitor + ?Sized>(visitor: &mut V, pattern: &mut IrPattern) {
    match &mut pattern.kind {
        IrPatternKind::Ident(_) => {}
        IrPatternKind::Array { elements, rest } => {
            for element in elements.iter_mut().flatten() {
                visitor.visit_pattern(element);
            }
            if let Some(rest) = rest {
                visitor.visit_pattern(rest);
            }
        }
        IrPatternKind::Object { props, rest } => {
            for prop in props {
                if let IrPropKey::Computed(key) = &mut prop.key {
                    visitor.visit_node(key);
                }
                visitor.visit_pattern(&mut prop.value);
            }
            if let Some(rest) = rest {
                visitor.visit_pattern(rest);
            }
        }
        IrPatternKind::Assign { target, default } => {
            visitor.visit_pattern(target);
            visitor.visit_node(default);
        }
        IrPatternKind::Target(node) => visitor.visit_node(node),
    }
}

pub fn walk_children<V: IrVisitor + ?Sized>(visitor: &mut V, children: &mut [IrNode]) {
    for child in children {
        visitor.visit_node(child);
    }
}

pub fn walk_node<V: IrVisitor + ?Sized>(visitor: &mut V, node: &mut IrNode) {
    match &mut node.kind {
        IrKind::Literal(_) | IrKind::Identifier(_) | IrKind::This | IrKind::Super | IrKind::Text(_) | IrKind::Invalid => {}
        IrKind::Template { exprs, .. } => walk_children(visitor, exprs),
        IrKind::TaggedTemplate { tag, exprs, .. } => {
            visitor.visit_node(tag);
            walk_children(visitor, exprs);
        }
        IrKind::Array(elements) => {
            for element in elements.iter_mut().flatten() {
                visitor.visit_node(element);
            }
        }
        IrKind::Object(props) => {
            for prop in props {
                match &mut prop.kind {
                    IrPropertyKind::KeyValue { key, value } => {
                        if let IrPropKey::Computed(key) = key {
                            visitor.visit_node(key);
                        }
                        visitor.visit_node(value);
                    }
                    IrPropertyKind::Method { key, function, .. } => {
                        if let IrPropKey::Computed(key) = key {
                            visitor.visit_node(key);
                        }
                        visitor.visit_function(function);
                    }
                    IrPropertyKind::Spread(arg) => visitor.visit_node(arg),
                    IrPropertyKind::Shorthand(_) => {}
                }
            }
        }
        IrKind::Unary { arg, .. }
        | IrKind::Update { arg, .. }
        | IrKind::Spread(arg)
        | IrKind::Await(arg)
        | IrKind::Paren(arg) => visitor.visit_node(arg),
        IrKind::Binary { left, right, .. } => {
            visitor.visit_node(left);
            visitor.visit_node(right);
        }
        IrKind::Assign { target, value, .. } => {
            match target {
                IrAssignTarget::Simple(target) => visitor.visit_node(target),
                IrAssignTarget::Pattern(pattern) => visitor.visit_pattern(pattern),
            }
            visitor.visit_node(value);
        }
        IrKind::Conditional {
            test,
            consequent,
            alternate,
        } => {
            visitor.visit_node(test);
            visitor.visit_node(consequent);
            visitor.visit_node(alternate);
        }
        IrKind::Call { callee, args, .. } | IrKind::New { callee, args } => {
            visitor.visit_node(callee);
            walk_children(visitor, args);
        }
        IrKind::Member { object, property, .. } => {
            visitor.visit_node(object);
            if let IrMemberProp::Computed(property) = property {
                visitor.visit_node(property);
            }
        }
        IrKind::Sequence(exprs) => walk_children(visitor, exprs),
        IrKind::Yield { arg, .. } => {
            if let Some(arg) = arg {
                visitor.visit_node(arg);
            }
        }
        IrKind::Arrow(arrow) => visitor.visit_arrow(arrow),
        IrKind::Function(function) => visitor.visit_function(function),
        IrKind::Element(element) => visitor.visit_element(element),
        IrKind::ComponentCall(call) => visitor.visit_component_call(call),
        IrKind::Fragment(fragment) => visitor.visit_fragment(fragment),
    }
}

pub fn walk_attrs<V: IrVisitor + ?Sized>(visitor: &mut V, attrs: &mut [IrAttr]) {
    for attr in attrs {
        match &mut attr.kind {
            IrAttrKind::Named { value: Some(value), .. } => visitor.visit_node(value),
            IrAttrKind::Named { value: None, .. } => {}
            IrAttrKind::Spread(value) => visitor.visit_node(value),
        }
    }
}

pub fn walk_element<V: IrVisitor + ?Sized>(visitor: &mut V, element: &mut IrElement) {
    walk_attrs(visitor, &mut element.attrs);
    walk_children(visitor, &mut element.children);
}

pub fn walk_component_call<V: IrVisitor + ?Sized>(visitor: &mut V, call: &mut IrComponentCall) {
    walk_attrs(visitor, &mut call.props);
    walk_children(visitor, &mut call.children);
}
