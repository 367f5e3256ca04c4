//! Emitter: transformed IR → output text.
//!
//! Consumes the module by value. Type information is already gone; markup is
//! rendered as runtime calls according to the classes the transformer
//! assigned. Runtime symbols are collected as they are emitted.

use crate::error::EmitError;
use crate::escape::quote;
use crate::finalize::{assemble, DefaultResolver, ImportSet, ModuleResolver};
use crate::ir::*;
use crate::lowering::is_identifier_name;
use crate::options::CompileOptions;

const INDENT: &str = "  ";

type EmitResult = Result<String, EmitError>;

/// Renders `module` and returns the complete output with its import set.
pub fn emit(module: IrModule, options: &CompileOptions) -> Result<(String, ImportSet), EmitError> {
    let resolver = DefaultResolver::new(options);
    let mut emitter = Emitter {
        options,
        resolver: &resolver,
        imports: ImportSet::new(),
        next_element: 0,
    };
    for symbol in &module.runtime_symbols {
        emitter.use_symbol(symbol);
    }
    for (path, specifier) in &module.runtime_imports {
        emitter.imports.add(path.as_str(), specifier.as_str());
    }
    let body = emitter.stmts(module.body, 0)?;
    let code = assemble(&body, &emitter.imports, &options.runtime_version);

    if options.debug_enabled("emit") {
        tracing::debug!(
            unit = %options.unit_name,
            phase = "emit",
            bytes = code.len(),
            elements = emitter.next_element,
            "emitted unit"
        );
    }
    Ok((code, emitter.imports))
}

fn pad(level: usize) -> String {
    INDENT.repeat(level)
}

struct Emitter<'a> {
    options: &'a CompileOptions,
    resolver: &'a dyn ModuleResolver,
    imports: ImportSet,
    /// Suffix of the next `_el$N` temporary.
    next_element: usize,
}

impl Emitter<'_> {
    fn use_symbol(&mut self, symbol: &str) {
        self.imports.add_resolved(self.resolver, symbol);
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // STATEMENTS
    // ═══════════════════════════════════════════════════════════════════════════

    fn stmts(&mut self, stmts: Vec<IrStmt>, level: usize) -> EmitResult {
        let lines = stmts
            .into_iter()
            .map(|stmt| self.stmt(stmt, level))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(lines.join("\n"))
    }

    fn block(&mut self, stmts: Vec<IrStmt>, level: usize) -> EmitResult {
        if stmts.is_empty() {
            return Ok("{}".to_string());
        }
        Ok(format!("{{\n{}\n{}}}", self.stmts(stmts, level + 1)?, pad(level)))
    }

    /// Statement bodies of control flow are always braced.
    fn body(&mut self, stmt: IrStmt, level: usize) -> EmitResult {
        match stmt.kind {
            IrStmtKind::Block(stmts) => self.block(stmts, level),
            _ => self.block(vec![stmt], level),
        }
    }

    fn stmt(&mut self, stmt: IrStmt, level: usize) -> EmitResult {
        let text = match stmt.kind {
            IrStmtKind::Var(decl) => format!("{};", self.var_decl(decl, level)?),
            IrStmtKind::Function(function) => self.function(function, level)?,
            IrStmtKind::Import(import) => import_text(&import),
            IrStmtKind::Export(export) => self.export(export, level)?,
            IrStmtKind::Expr(node) => {
                let text = self.expr(node, level)?;
                if text.starts_with('{') || text.starts_with("function") || text.starts_with("class ") {
                    format!("({});", text)
                } else {
                    format!("{};", text)
                }
            }
            IrStmtKind::Block(stmts) => self.block(stmts, level)?,
            IrStmtKind::If {
                test,
                consequent,
                alternate,
            } => {
                let mut text = format!("if ({}) {}", self.expr(test, level)?, self.body(*consequent, level)?);
                if let Some(alternate) = alternate {
                    let rest = match alternate.kind {
                        IrStmtKind::If { .. } => self.stmt(*alternate, level)?.trim_start().to_string(),
                        _ => self.body(*alternate, level)?,
                    };
                    text.push_str(" else ");
                    text.push_str(&rest);
                }
                text
            }
            IrStmtKind::For {
                init,
                test,
                update,
                body,
            } => {
                let init = match init {
                    Some(IrForInit::Var(decl)) => self.var_decl(decl, level)?,
                    Some(IrForInit::Expr(node)) => self.expr(node, level)?,
                    None => String::new(),
                };
                let test = self.optional_expr(test, level)?;
                let update = self.optional_expr(update, level)?;
                format!(
                    "for ({};{};{}) {}",
                    init,
                    spaced(&test),
                    spaced(&update),
                    self.body(*body, level)?
                )
            }
            IrStmtKind::ForIn { left, right, body } => format!(
                "for ({} in {}) {}",
                self.for_head(left, level)?,
                self.expr(right, level)?,
                self.body(*body, level)?
            ),
            IrStmtKind::ForOf {
                left,
                right,
                body,
                is_await,
            } => format!(
                "for {}({} of {}) {}",
                if is_await { "await " } else { "" },
                self.for_head(left, level)?,
                self.expr(right, level)?,
                self.body(*body, level)?
            ),
            IrStmtKind::While { test, body } => {
                format!("while ({}) {}", self.expr(test, level)?, self.body(*body, level)?)
            }
            IrStmtKind::DoWhile { body, test } => {
                format!("do {} while ({});", self.body(*body, level)?, self.expr(test, level)?)
            }
            IrStmtKind::Switch { discriminant, cases } => {
                let mut text = format!("switch ({}) {{", self.expr(discriminant, level)?);
                for case in cases {
                    text.push('\n');
                    text.push_str(&pad(level + 1));
                    match case.test {
                        Some(test) => text.push_str(&format!("case {}:", self.expr(test, level + 1)?)),
                        None => text.push_str("default:"),
                    }
                    if !case.body.is_empty() {
                        text.push('\n');
                        text.push_str(&self.stmts(case.body, level + 2)?);
                    }
                }
                text.push('\n');
                text.push_str(&pad(level));
                text.push('}');
                text
            }
            IrStmtKind::Try {
                block,
                handler,
                finalizer,
            } => {
                let mut text = format!("try {}", self.block(block, level)?);
                if let Some(handler) = handler {
                    match handler.param {
                        Some(param) => text.push_str(&format!(" catch ({}) ", self.pattern(param, level)?)),
                        None => text.push_str(" catch "),
                    }
                    text.push_str(&self.block(handler.body, level)?);
                }
                if let Some(finalizer) = finalizer {
                    text.push_str(" finally ");
                    text.push_str(&self.block(finalizer, level)?);
                }
                text
            }
            IrStmtKind::Throw(node) => format!("throw {};", self.expr(node, level)?),
            IrStmtKind::Return(None) => "return;".to_string(),
            IrStmtKind::Return(Some(node)) => format!("return {};", self.expr(node, level)?),
            IrStmtKind::Break(label) => labeled("break", label),
            IrStmtKind::Continue(label) => labeled("continue", label),
            IrStmtKind::Labeled { label, body } => {
                format!("{}: {}", label, self.stmt(*body, level)?.trim_start())
            }
            IrStmtKind::Debugger => "debugger;".to_string(),
            IrStmtKind::Empty => ";".to_string(),
        };
        Ok(format!("{}{}", pad(level), text))
    }

    fn optional_expr(&mut self, node: Option<IrNode>, level: usize) -> EmitResult {
        match node {
            Some(node) => self.expr(node, level),
            None => Ok(String::new()),
        }
    }

    fn var_decl(&mut self, decl: IrVarDecl, level: usize) -> EmitResult {
        let declarators = decl
            .declarators
            .into_iter()
            .map(|d| {
                let target = self.pattern(d.pattern, level)?;
                match d.init {
                    Some(init) => Ok(format!("{} = {}", target, self.expr(init, level)?)),
                    None => Ok(target),
                }
            })
            .collect::<Result<Vec<_>, EmitError>>()?;
        Ok(format!("{} {}", decl.kind.as_str(), declarators.join(", ")))
    }

    fn for_head(&mut self, head: IrForHead, level: usize) -> EmitResult {
        match head {
            IrForHead::Var(kind, pattern) => Ok(format!("{} {}", kind.as_str(), self.pattern(pattern, level)?)),
            IrForHead::Target(node) => self.expr(node, level),
        }
    }

    fn export(&mut self, export: IrExport, level: usize) -> EmitResult {
        Ok(match export {
            IrExport::Named { specifiers, source } => {
                let list: Vec<String> = specifiers
                    .iter()
                    .map(|(local, exported)| {
                        if local == exported {
                            local.clone()
                        } else {
                            format!("{} as {}", local, exported)
                        }
                    })
                    .collect();
                let list = if list.is_empty() {
                    "{}".to_string()
                } else {
                    format!("{{ {} }}", list.join(", "))
                };
                match source {
                    Some(source) => format!("export {} from {};", list, quote(&source)),
                    None => format!("export {};", list),
                }
            }
            IrExport::All { alias, source } => match alias {
                Some(alias) => format!("export * as {} from {};", alias, quote(&source)),
                None => format!("export * from {};", quote(&source)),
            },
            IrExport::Declaration(inner) => format!("export {}", self.stmt(*inner, level)?.trim_start()),
            IrExport::Default(inner) => match inner.kind {
                IrStmtKind::Expr(node) => format!("export default {};", self.expr(node, level)?),
                _ => format!("export default {}", self.stmt(*inner, level)?.trim_start()),
            },
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // FUNCTIONS & PATTERNS
    // ═══════════════════════════════════════════════════════════════════════════

    fn params(&mut self, params: Vec<IrParam>, level: usize) -> EmitResult {
        let list = params
            .into_iter()
            .map(|p| {
                let text = self.pattern(p.pattern, level)?;
                Ok(if p.rest { format!("...{}", text) } else { text })
            })
            .collect::<Result<Vec<_>, EmitError>>()?;
        Ok(list.join(", "))
    }

    fn function(&mut self, function: IrFunction, level: usize) -> EmitResult {
        let mut head = String::new();
        if function.is_async {
            head.push_str("async ");
        }
        head.push_str("function");
        if function.is_generator {
            head.push('*');
        }
        if let Some(name) = &function.name {
            head.push(' ');
            head.push_str(name);
        }
        let params = self.params(function.params, level)?;

        let body = match (&function.name, function.is_component && self.options.registry_scoping) {
            (Some(name), true) => self.registry_scoped(name, function.body, level)?,
            _ => self.block(function.body, level)?,
        };
        Ok(format!("{}({}) {}", head, params, body))
    }

    /// `{ return $REGISTRY.execute("unit:Name", () => { body }); }`
    fn registry_scoped(&mut self, name: &str, body: Vec<IrStmt>, level: usize) -> EmitResult {
        self.use_symbol("$REGISTRY");
        let key = format!("{}:{}", self.options.unit_name, name);
        let inner = self.block(body, level + 1)?;
        Ok(format!(
            "{{\n{}return $REGISTRY.execute({}, () => {});\n{}}}",
            pad(level + 1),
            quote(&key),
            inner,
            pad(level)
        ))
    }

    fn arrow(&mut self, arrow: IrArrow, level: usize) -> EmitResult {
        let params = self.params(arrow.params, level)?;
        let body = match arrow.body {
            IrArrowBody::Expr(node) => self.thunk_body(*node, level)?,
            IrArrowBody::Block(stmts) => self.block(stmts, level)?,
        };
        Ok(format!(
            "{}({}) => {}",
            if arrow.is_async { "async " } else { "" },
            params,
            body
        ))
    }

    /// Expression body of an arrow; object literals and sequences need parentheses.
    fn thunk_body(&mut self, node: IrNode, level: usize) -> EmitResult {
        let wrap = matches!(node.kind, IrKind::Object(_) | IrKind::Sequence(_));
        let text = self.expr(node, level)?;
        Ok(if wrap { format!("({})", text) } else { text })
    }

    fn pattern(&mut self, pattern: IrPattern, level: usize) -> EmitResult {
        match pattern.kind {
            IrPatternKind::Ident(name) => Ok(name),
            IrPatternKind::Array { elements, rest } => {
                let mut items = elements
                    .into_iter()
                    .map(|e| match e {
                        Some(p) => self.pattern(p, level),
                        None => Ok(String::new()),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                if let Some(rest) = rest {
                    items.push(format!("...{}", self.pattern(*rest, level)?));
                }
                Ok(format!("[{}]", items.join(", ")))
            }
            IrPatternKind::Object { props, rest } => {
                let mut items = Vec::new();
                for prop in props {
                    if prop.shorthand {
                        items.push(self.pattern(prop.value, level)?);
                    } else {
                        let key = self.prop_key(prop.key, level)?;
                        items.push(format!("{}: {}", key, self.pattern(prop.value, level)?));
                    }
                }
                if let Some(rest) = rest {
                    items.push(format!("...{}", self.pattern(*rest, level)?));
                }
                if items.is_empty() {
                    Ok("{}".to_string())
                } else {
                    Ok(format!("{{ {} }}", items.join(", ")))
                }
            }
            IrPatternKind::Assign { target, default } => Ok(format!(
                "{} = {}",
                self.pattern(*target, level)?,
                self.expr(*default, level)?
            )),
            IrPatternKind::Target(node) => self.expr(*node, level),
        }
    }

    fn prop_key(&mut self, key: IrPropKey, level: usize) -> EmitResult {
        match key {
            IrPropKey::Ident(name) | IrPropKey::Number(name) => Ok(name),
            IrPropKey::String(value) => Ok(quote(&value)),
            IrPropKey::Computed(node) => Ok(format!("[{}]", self.expr(*node, level)?)),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // EXPRESSIONS
    // ═══════════════════════════════════════════════════════════════════════════

    fn exprs(&mut self, nodes: Vec<IrNode>, level: usize) -> Result<Vec<String>, EmitError> {
        nodes.into_iter().map(|n| self.expr(n, level)).collect()
    }

    fn expr(&mut self, node: IrNode, level: usize) -> EmitResult {
        let span = node.span;
        Ok(match node.kind {
            IrKind::Literal(literal) => match literal {
                Literal::Number(raw) | Literal::Regex(raw) => raw,
                Literal::String(value) => quote(&value),
                Literal::Bool(value) => value.to_string(),
                Literal::Null => "null".to_string(),
            },
            IrKind::Template { quasis, exprs } => self.template(quasis, exprs, level)?,
            IrKind::TaggedTemplate { tag, quasis, exprs } => {
                format!("{}{}", self.expr(*tag, level)?, self.template(quasis, exprs, level)?)
            }
            IrKind::Identifier(name) => name,
            IrKind::This => "this".to_string(),
            IrKind::Super => "super".to_string(),
            IrKind::Array(elements) => {
                let trailing_hole = matches!(elements.last(), Some(None));
                let items = elements
                    .into_iter()
                    .map(|e| match e {
                        Some(node) => self.expr(node, level),
                        None => Ok(String::new()),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                format!("[{}{}]", items.join(", "), if trailing_hole { "," } else { "" })
            }
            IrKind::Object(props) => {
                let items = props
                    .into_iter()
                    .map(|p| self.property(p, level))
                    .collect::<Result<Vec<_>, _>>()?;
                if items.is_empty() {
                    "{}".to_string()
                } else {
                    format!("{{ {} }}", items.join(", "))
                }
            }
            IrKind::Unary { op, arg } => {
                let arg = self.expr(*arg, level)?;
                let symbol = op.as_str();
                if op.is_keyword() {
                    format!("{} {}", symbol, arg)
                } else if arg.starts_with(symbol) && (symbol == "-" || symbol == "+") {
                    format!("{} {}", symbol, arg)
                } else {
                    format!("{}{}", symbol, arg)
                }
            }
            IrKind::Update { op, prefix, arg } => {
                let arg = self.expr(*arg, level)?;
                if prefix {
                    format!("{}{}", op.as_str(), arg)
                } else {
                    format!("{}{}", arg, op.as_str())
                }
            }
            IrKind::Binary { op, left, right } => format!(
                "{} {} {}",
                self.expr(*left, level)?,
                op.as_str(),
                self.expr(*right, level)?
            ),
            IrKind::Assign { op, target, value } => {
                let target = match target {
                    IrAssignTarget::Simple(node) => self.expr(*node, level)?,
                    IrAssignTarget::Pattern(pattern) => self.pattern(pattern, level)?,
                };
                format!("{} {} {}", target, op.as_str(), self.expr(*value, level)?)
            }
            IrKind::Conditional {
                test,
                consequent,
                alternate,
            } => format!(
                "{} ? {} : {}",
                self.expr(*test, level)?,
                self.expr(*consequent, level)?,
                self.expr(*alternate, level)?
            ),
            IrKind::Call { callee, args, optional } => format!(
                "{}{}({})",
                self.expr(*callee, level)?,
                if optional { "?." } else { "" },
                self.exprs(args, level)?.join(", ")
            ),
            IrKind::New { callee, args } => format!(
                "new {}({})",
                self.expr(*callee, level)?,
                self.exprs(args, level)?.join(", ")
            ),
            IrKind::Member {
                object,
                property,
                optional,
            } => {
                let object = self.expr(*object, level)?;
                match property {
                    IrMemberProp::Ident(name) => {
                        format!("{}{}{}", object, if optional { "?." } else { "." }, name)
                    }
                    IrMemberProp::Computed(node) => format!(
                        "{}{}[{}]",
                        object,
                        if optional { "?." } else { "" },
                        self.expr(*node, level)?
                    ),
                }
            }
            IrKind::Sequence(nodes) => self.exprs(nodes, level)?.join(", "),
            IrKind::Spread(arg) => format!("...{}", self.expr(*arg, level)?),
            IrKind::Await(arg) => format!("await {}", self.expr(*arg, level)?),
            IrKind::Yield { arg, delegate } => {
                let mut text = String::from(if delegate { "yield*" } else { "yield" });
                if let Some(arg) = arg {
                    text.push(' ');
                    text.push_str(&self.expr(*arg, level)?);
                }
                text
            }
            IrKind::Paren(inner) => format!("({})", self.expr(*inner, level)?),
            IrKind::Arrow(arrow) => self.arrow(*arrow, level)?,
            IrKind::Function(function) => self.function(*function, level)?,
            IrKind::Element(element) => self.element(*element, level)?,
            IrKind::ComponentCall(call) => self.component_call(*call, level)?,
            IrKind::Fragment(fragment) => self.fragment(*fragment, level)?,
            IrKind::Text(_) => {
                return Err(EmitError::Unsupported {
                    construct: "markup text outside markup",
                    span,
                })
            }
            IrKind::Invalid => "undefined".to_string(),
        })
    }

    fn template(&mut self, quasis: Vec<String>, exprs: Vec<IrNode>, level: usize) -> EmitResult {
        let mut out = String::from("`");
        let mut exprs = exprs.into_iter();
        for (i, quasi) in quasis.into_iter().enumerate() {
            if i > 0 {
                if let Some(node) = exprs.next() {
                    out.push_str("${");
                    out.push_str(&self.expr(node, level)?);
                    out.push('}');
                }
            }
            out.push_str(&quasi);
        }
        out.push('`');
        Ok(out)
    }

    fn property(&mut self, prop: IrProperty, level: usize) -> EmitResult {
        match prop.kind {
            IrPropertyKind::KeyValue { key, value } => {
                Ok(format!("{}: {}", self.prop_key(key, level)?, self.expr(value, level)?))
            }
            IrPropertyKind::Shorthand(name) => Ok(name),
            IrPropertyKind::Method { key, kind, function } => {
                let mut head = String::new();
                match kind {
                    crate::ast::MethodKind::Get => head.push_str("get "),
                    crate::ast::MethodKind::Set => head.push_str("set "),
                    crate::ast::MethodKind::Method => {}
                }
                if function.is_async {
                    head.push_str("async ");
                }
                if function.is_generator {
                    head.push('*');
                }
                head.push_str(&self.prop_key(key, level)?);
                let params = self.params(function.params, level)?;
                Ok(format!("{}({}) {}", head, params, self.block(function.body, level)?))
            }
            IrPropertyKind::Spread(arg) => Ok(format!("...{}", self.expr(arg, level)?)),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // MARKUP
    // ═══════════════════════════════════════════════════════════════════════════

    fn element(&mut self, element: IrElement, level: usize) -> EmitResult {
        self.use_symbol("t_element");
        let needs_wrapper = element.attrs.iter().any(|a| match a.class {
            Class::Dynamic => true,
            Class::Event => a.value().is_some(),
            _ => false,
        }) || element.children.iter().any(needs_wire);

        let inner = if needs_wrapper { level + 1 } else { level };
        let var = needs_wrapper.then(|| self.element_var());

        let mut attrs = Vec::new();
        let mut mutations = Vec::new();
        for attr in element.attrs {
            let class = attr.class;
            match attr.kind {
                IrAttrKind::Named { name, value } => match (class, value, var.as_deref()) {
                    (Class::Event, Some(handler), Some(var)) => {
                        let event = event_name(&name, &element.tag);
                        let handler = self.expr(handler, inner)?;
                        mutations.push(format!("{}.addEventListener({}, {});", var, quote(&event), handler));
                    }
                    (Class::Event, None, _) => {}
                    (Class::Dynamic, Some(value), Some(var)) => {
                        self.use_symbol("$wireAttr");
                        let thunk = self.thunk_body(value, inner)?;
                        mutations.push(format!("$wireAttr({}, {}, () => {});", var, quote(&name), thunk));
                    }
                    (_, value, _) => {
                        let value = match value {
                            Some(value) => self.expr(value, inner)?,
                            None => "true".to_string(),
                        };
                        attrs.push(format!("{}: {}", attr_key(&name), value));
                    }
                },
                IrAttrKind::Spread(value) => attrs.push(format!("...{}", self.expr(value, inner)?)),
            }
        }

        let (children, wires) = self.markup_children(element.children, var.as_deref(), inner)?;
        mutations.extend(wires);

        let attrs = if attrs.is_empty() {
            "{}".to_string()
        } else {
            format!("{{ {} }}", attrs.join(", "))
        };
        let construct = format!("t_element({}, {}, [{}])", quote(&element.tag), attrs, children.join(", "));
        match var {
            Some(var) => Ok(wrap_mutations(&var, &construct, &mutations, level)),
            None => Ok(construct),
        }
    }

    fn fragment(&mut self, fragment: IrFragment, level: usize) -> EmitResult {
        self.use_symbol("t_fragment");
        let needs_wrapper = fragment.children.iter().any(needs_wire);
        let inner = if needs_wrapper { level + 1 } else { level };
        let var = needs_wrapper.then(|| self.element_var());
        let (children, wires) = self.markup_children(fragment.children, var.as_deref(), inner)?;
        let construct = format!("t_fragment([{}])", children.join(", "));
        match var {
            Some(var) => Ok(wrap_mutations(&var, &construct, &wires, level)),
            None => Ok(construct),
        }
    }

    fn component_call(&mut self, call: IrComponentCall, level: usize) -> EmitResult {
        let mut props = Vec::new();
        for attr in call.props {
            let class = attr.class;
            match attr.kind {
                IrAttrKind::Named { name, value: Some(value) } if class == Class::Dynamic => {
                    let key = attr_key(&name);
                    props.push(format!("get {}() {{ return {}; }}", key, self.expr(value, level)?));
                }
                IrAttrKind::Named { name, value } => {
                    let value = match value {
                        Some(value) => self.expr(value, level)?,
                        None => "true".to_string(),
                    };
                    props.push(format!("{}: {}", attr_key(&name), value));
                }
                IrAttrKind::Spread(value) => props.push(format!("...{}", self.expr(value, level)?)),
            }
        }
        if !call.children.is_empty() {
            let children = call
                .children
                .into_iter()
                .map(|child| {
                    if needs_wire(&child) {
                        Ok(format!("() => {}", self.thunk_body(child, level)?))
                    } else {
                        self.static_child(child, level)
                    }
                })
                .collect::<Result<Vec<_>, EmitError>>()?;
            props.push(format!("children: [{}]", children.join(", ")));
        }
        if props.is_empty() {
            Ok(format!("{}({{}})", call.callee))
        } else {
            Ok(format!("{}({{ {} }})", call.callee, props.join(", ")))
        }
    }

    /// Static children array entries and the `$wire` calls for the rest.
    /// A wire's index is the child's position in the lowered children list.
    fn markup_children(
        &mut self,
        children: Vec<IrNode>,
        var: Option<&str>,
        level: usize,
    ) -> Result<(Vec<String>, Vec<String>), EmitError> {
        let mut statics = Vec::new();
        let mut wires = Vec::new();
        for (index, child) in children.into_iter().enumerate() {
            match var {
                Some(var) if needs_wire(&child) => {
                    self.use_symbol("$wire");
                    let thunk = self.thunk_body(child, level)?;
                    wires.push(format!("$wire({}, () => {}, {});", var, thunk, index));
                }
                _ => statics.push(self.static_child(child, level)?),
            }
        }
        Ok((statics, wires))
    }

    fn static_child(&mut self, child: IrNode, level: usize) -> EmitResult {
        if child.inline {
            if let Some(getter) = child.deps.first() {
                return Ok(getter.clone());
            }
        }
        match child.kind {
            IrKind::Text(text) => Ok(quote(&text)),
            _ => self.expr(child, level),
        }
    }

    fn element_var(&mut self) -> String {
        let var = format!("_el${}", self.next_element);
        self.next_element += 1;
        var
    }
}

fn needs_wire(child: &IrNode) -> bool {
    child.class.is_reactive() && !child.inline
}

/// `(() => { const v = construct; mutations; return v; })()`
fn wrap_mutations(var: &str, construct: &str, mutations: &[String], level: usize) -> String {
    let inner = pad(level + 1);
    let mut out = format!("(() => {{\n{}const {} = {};\n", inner, var, construct);
    for mutation in mutations {
        out.push_str(&inner);
        out.push_str(mutation);
        out.push('\n');
    }
    out.push_str(&format!("{}return {};\n{}}})()", inner, var, pad(level)));
    out
}

/// `onClick` → `click`; text-entry elements report edits through `input`.
fn event_name(attr: &str, tag: &str) -> String {
    let event = attr.get(2..).unwrap_or_default().to_ascii_lowercase();
    if event == "change" && matches!(tag, "input" | "textarea") {
        "input".to_string()
    } else {
        event
    }
}

fn attr_key(name: &str) -> String {
    if is_identifier_name(name) {
        name.to_string()
    } else {
        quote(name)
    }
}

fn spaced(text: &str) -> String {
    if text.is_empty() {
        String::new()
    } else {
        format!(" {}", text)
    }
}

fn labeled(keyword: &str, label: Option<String>) -> String {
    match label {
        Some(label) => format!("{} {};", keyword, label),
        None => format!("{};", keyword),
    }
}

fn import_text(import: &IrImport) -> String {
    let source = quote(&import.source);
    let mut clauses = Vec::new();
    if let Some(default) = &import.default {
        clauses.push(default.clone());
    }
    if let Some(namespace) = &import.namespace {
        clauses.push(format!("* as {}", namespace));
    }
    if !import.named.is_empty() {
        let named: Vec<String> = import
            .named
            .iter()
            .map(|s| {
                if s.imported == s.local {
                    s.local.clone()
                } else {
                    format!("{} as {}", s.imported, s.local)
                }
            })
            .collect();
        clauses.push(format!("{{ {} }}", named.join(", ")));
    }
    if clauses.is_empty() {
        format!("import {};", source)
    } else {
        format!("import {} from {};", clauses.join(", "), source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lowering::lower;
    use crate::parse::parse_source;
    use crate::span::Span;
    use pretty_assertions::assert_eq;

    fn emit_plain(source: &str) -> String {
        let module = lower(&parse_source(source).program);
        let (code, _) = emit(module, &CompileOptions::default()).unwrap();
        code
    }

    #[test]
    fn test_statements_print_braced_and_indented() {
        assert_eq!(
            emit_plain("if (a) b(); else if (c) { d(); }"),
            "if (a) {\n  b();\n} else if (c) {\n  d();\n}\n"
        );
        assert_eq!(emit_plain("for (let i = 0; i < n; i++) {}"), "for (let i = 0; i < n; i++) {}\n");
        assert_eq!(emit_plain("for (;;) break;"), "for (;;) {\n  break;\n}\n");
    }

    #[test]
    fn test_types_are_erased() {
        assert_eq!(
            emit_plain("const x: number = (y as number) + 1;\ninterface P { a: string }\ntype Q = P;"),
            "const x = (y) + 1;\n"
        );
        assert_eq!(
            emit_plain("function f(a: string, b?: number): void { return; }"),
            "function f(a, b) {\n  return;\n}\n"
        );
    }

    #[test]
    fn test_enum_becomes_object() {
        assert_eq!(
            emit_plain("enum Dir { Up, Down = 5, Left }"),
            "const Dir = { Up: 0, Down: 5, Left: 6 };\n"
        );
    }

    #[test]
    fn test_unary_minus_does_not_merge() {
        assert_eq!(emit_plain("a = - -b;"), "a = - -b;\n");
    }

    #[test]
    fn test_object_expression_statement_gets_parens() {
        assert_eq!(emit_plain("({ a } = b);"), "({ a } = b);\n");
    }

    #[test]
    fn test_stray_text_is_unsupported() {
        let module = IrModule {
            body: vec![IrStmt {
                kind: IrStmtKind::Expr(IrNode::new(IrKind::Text("x".into()), Span::default())),
                span: Span::default(),
            }],
            ..Default::default()
        };
        let result = emit(module, &CompileOptions::default());
        assert!(matches!(result, Err(EmitError::Unsupported { .. })));
    }

    #[test]
    fn test_event_name_mapping() {
        assert_eq!(event_name("onClick", "button"), "click");
        assert_eq!(event_name("onChange", "input"), "input");
        assert_eq!(event_name("onChange", "select"), "change");
        assert_eq!(event_name("onKeyDown", "textarea"), "keydown");
    }
}
