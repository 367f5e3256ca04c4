//! Typed intermediate representation between lowering and emission.
//!
//! Every [`IrNode`] stems from exactly one syntax node. Lowering fills in the
//! shape; the transformer annotates it in place (`class`, `reactive`, `deps`,
//! `inline`); the emitter consumes the module by value.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::ast::{AssignOp, BinaryOp, MethodKind, UnaryOp, UpdateOp, VarKind};
use crate::span::Span;

#[derive(Debug, Clone, Default)]
pub struct IrModule {
    pub body: Vec<IrStmt>,
    /// Runtime symbols the transformer introduced by renaming.
    pub runtime_symbols: BTreeSet<String>,
    /// `(module, specifier)` pairs lifted out of user imports of runtime
    /// modules, emitted in the same statement as the auto-imports.
    pub runtime_imports: Vec<(String, String)>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// STATEMENTS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct IrStmt {
    pub kind: IrStmtKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum IrStmtKind {
    Var(IrVarDecl),
    /// Plain functions and components alike; see [`IrFunction::is_component`].
    Function(IrFunction),
    Import(IrImport),
    Export(IrExport),
    Expr(IrNode),
    Block(Vec<IrStmt>),
    If {
        test: IrNode,
        consequent: Box<IrStmt>,
        alternate: Option<Box<IrStmt>>,
    },
    For {
        init: Option<IrForInit>,
        test: Option<IrNode>,
        update: Option<IrNode>,
        body: Box<IrStmt>,
    },
    ForIn {
        left: IrForHead,
        right: IrNode,
        body: Box<IrStmt>,
    },
    ForOf {
        left: IrForHead,
        right: IrNode,
        body: Box<IrStmt>,
        is_await: bool,
    },
    While {
        test: IrNode,
        body: Box<IrStmt>,
    },
    DoWhile {
        body: Box<IrStmt>,
        test: IrNode,
    },
    Switch {
        discriminant: IrNode,
        cases: Vec<IrSwitchCase>,
    },
    Try {
        block: Vec<IrStmt>,
        handler: Option<IrCatch>,
        finalizer: Option<Vec<IrStmt>>,
    },
    Throw(IrNode),
    Return(Option<IrNode>),
    Break(Option<String>),
    Continue(Option<String>),
    Labeled {
        label: String,
        body: Box<IrStmt>,
    },
    Debugger,
    Empty,
}

#[derive(Debug, Clone)]
pub struct IrVarDecl {
    pub kind: VarKind,
    pub declarators: Vec<IrDeclarator>,
}

#[derive(Debug, Clone)]
pub struct IrDeclarator {
    pub pattern: IrPattern,
    /// Kept for reactive detection; never emitted.
    pub type_annotation: Option<String>,
    pub init: Option<IrNode>,
}

#[derive(Debug, Clone)]
pub enum IrForInit {
    Var(IrVarDecl),
    Expr(IrNode),
}

#[derive(Debug, Clone)]
pub enum IrForHead {
    Var(VarKind, IrPattern),
    Target(IrNode),
}

#[derive(Debug, Clone)]
pub struct IrSwitchCase {
    pub test: Option<IrNode>,
    pub body: Vec<IrStmt>,
}

#[derive(Debug, Clone)]
pub struct IrCatch {
    pub param: Option<IrPattern>,
    pub body: Vec<IrStmt>,
}

#[derive(Debug, Clone)]
pub struct IrFunction {
    pub name: Option<String>,
    pub params: Vec<IrParam>,
    pub body: Vec<IrStmt>,
    pub is_async: bool,
    pub is_generator: bool,
    pub is_component: bool,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct IrParam {
    pub pattern: IrPattern,
    pub type_annotation: Option<String>,
    pub rest: bool,
}

#[derive(Debug, Clone)]
pub struct IrImport {
    pub default: Option<String>,
    pub namespace: Option<String>,
    pub named: Vec<IrImportSpecifier>,
    pub source: String,
}

impl IrImport {
    pub fn is_empty(&self) -> bool {
        self.default.is_none() && self.namespace.is_none() && self.named.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct IrImportSpecifier {
    pub imported: String,
    pub local: String,
}

#[derive(Debug, Clone)]
pub enum IrExport {
    Named {
        /// `(local, exported)` pairs.
        specifiers: Vec<(String, String)>,
        source: Option<String>,
    },
    All {
        alias: Option<String>,
        source: String,
    },
    Declaration(Box<IrStmt>),
    Default(Box<IrStmt>),
}

// ═══════════════════════════════════════════════════════════════════════════════
// PATTERNS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct IrPattern {
    pub kind: IrPatternKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum IrPatternKind {
    Ident(String),
    Array {
        elements: Vec<Option<IrPattern>>,
        rest: Option<Box<IrPattern>>,
    },
    Object {
        props: Vec<IrPatternProp>,
        rest: Option<Box<IrPattern>>,
    },
    Assign {
        target: Box<IrPattern>,
        default: Box<IrNode>,
    },
    /// Member target inside an assignment pattern.
    Target(Box<IrNode>),
}

#[derive(Debug, Clone)]
pub struct IrPatternProp {
    pub key: IrPropKey,
    pub value: IrPattern,
    pub shorthand: bool,
}

impl IrPattern {
    pub fn bound_names(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_names(&mut out);
        out
    }

    fn collect_names(&self, out: &mut Vec<String>) {
        match &self.kind {
            IrPatternKind::Ident(name) => out.push(name.clone()),
            IrPatternKind::Array { elements, rest } => {
                for element in elements.iter().flatten() {
                    element.collect_names(out);
                }
                if let Some(rest) = rest {
                    rest.collect_names(out);
                }
            }
            IrPatternKind::Object { props, rest } => {
                for prop in props {
                    prop.value.collect_names(out);
                }
                if let Some(rest) = rest {
                    rest.collect_names(out);
                }
            }
            IrPatternKind::Assign { target, .. } => target.collect_names(out),
            IrPatternKind::Target(_) => {}
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// NODES
// ═══════════════════════════════════════════════════════════════════════════════

/// How the emitter treats a node in markup position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Class {
    #[default]
    Static,
    Dynamic,
    Event,
    Conditional,
    Loop,
    Fragment,
    Child,
}

impl Class {
    /// Needs a wire registration unless emitted inline.
    pub fn is_reactive(self) -> bool {
        matches!(self, Class::Dynamic | Class::Conditional | Class::Loop)
    }
}

#[derive(Debug, Clone)]
pub struct IrNode {
    pub kind: IrKind,
    pub span: Span,
    pub class: Class,
    /// Reads reactive state outside any nested function boundary.
    pub reactive: bool,
    /// Getter names read, first occurrence order.
    pub deps: Vec<String>,
    /// A bare getter call that may be emitted as the getter reference itself.
    pub inline: bool,
}

impl IrNode {
    pub fn new(kind: IrKind, span: Span) -> Self {
        Self {
            kind,
            span,
            class: Class::Static,
            reactive: false,
            deps: Vec::new(),
            inline: false,
        }
    }

    pub fn as_ident(&self) -> Option<&str> {
        match &self.kind {
            IrKind::Identifier(name) => Some(name),
            _ => None,
        }
    }

    /// Strips parentheses.
    pub fn unparen(&self) -> &IrNode {
        match &self.kind {
            IrKind::Paren(inner) => inner.unparen(),
            _ => self,
        }
    }

    /// Callee name of a zero-argument, non-optional `name()` call.
    pub fn bare_call_name(&self) -> Option<&str> {
        match &self.kind {
            IrKind::Call {
                callee,
                args,
                optional: false,
            } if args.is_empty() => callee.as_ident(),
            _ => None,
        }
    }

    /// Direct child nodes in evaluation order, not descending into patterns.
    pub fn children(&self) -> Vec<&IrNode> {
        let mut out: Vec<&IrNode> = Vec::new();
        match &self.kind {
            IrKind::Literal(_) | IrKind::Identifier(_) | IrKind::This | IrKind::Super | IrKind::Text(_) | IrKind::Invalid => {}
            IrKind::Template { exprs, .. } => out.extend(exprs.iter()),
            IrKind::TaggedTemplate { tag, exprs, .. } => {
                out.push(tag);
                out.extend(exprs.iter());
            }
            IrKind::Array(elements) => out.extend(elements.iter().flatten()),
            IrKind::Object(props) => {
                for prop in props {
                    match &prop.kind {
                        IrPropertyKind::KeyValue { key, value } => {
                            if let IrPropKey::Computed(key) = key {
                                out.push(key);
                            }
                            out.push(value);
                        }
                        IrPropertyKind::Method { key, .. } => {
                            if let IrPropKey::Computed(key) = key {
                                out.push(key);
                            }
                        }
                        IrPropertyKind::Spread(arg) => out.push(arg),
                        IrPropertyKind::Shorthand(_) => {}
                    }
                }
            }
            IrKind::Unary { arg, .. }
            | IrKind::Update { arg, .. }
            | IrKind::Spread(arg)
            | IrKind::Await(arg)
            | IrKind::Paren(arg) => out.push(arg),
            IrKind::Binary { left, right, .. } => {
                out.push(left);
                out.push(right);
            }
            IrKind::Assign { target, value, .. } => {
                if let IrAssignTarget::Simple(target) = target {
                    out.push(target);
                }
                out.push(value);
            }
            IrKind::Conditional {
                test,
                consequent,
                alternate,
            } => {
                out.push(test);
                out.push(consequent);
                out.push(alternate);
            }
            IrKind::Call { callee, args, .. } | IrKind::New { callee, args } => {
                out.push(callee);
                out.extend(args.iter());
            }
            IrKind::Member { object, property, .. } => {
                out.push(object);
                if let IrMemberProp::Computed(property) = property {
                    out.push(property);
                }
            }
            IrKind::Sequence(exprs) => out.extend(exprs.iter()),
            IrKind::Yield { arg, .. } => out.extend(arg.as_deref()),
            // Function and markup boundaries own their contents.
            IrKind::Arrow(_)
            | IrKind::Function(_)
            | IrKind::Element(_)
            | IrKind::ComponentCall(_)
            | IrKind::Fragment(_) => {}
        }
        out
    }
}

#[derive(Debug, Clone)]
pub enum IrKind {
    Literal(Literal),
    /// Raw quasis; always `exprs.len() + 1` entries.
    Template {
        quasis: Vec<String>,
        exprs: Vec<IrNode>,
    },
    TaggedTemplate {
        tag: Box<IrNode>,
        quasis: Vec<String>,
        exprs: Vec<IrNode>,
    },
    Identifier(String),
    This,
    Super,
    Array(Vec<Option<IrNode>>),
    Object(Vec<IrProperty>),
    Unary {
        op: UnaryOp,
        arg: Box<IrNode>,
    },
    Update {
        op: UpdateOp,
        prefix: bool,
        arg: Box<IrNode>,
    },
    Binary {
        op: BinaryOp,
        left: Box<IrNode>,
        right: Box<IrNode>,
    },
    Assign {
        op: AssignOp,
        target: IrAssignTarget,
        value: Box<IrNode>,
    },
    Conditional {
        test: Box<IrNode>,
        consequent: Box<IrNode>,
        alternate: Box<IrNode>,
    },
    Call {
        callee: Box<IrNode>,
        args: Vec<IrNode>,
        optional: bool,
    },
    New {
        callee: Box<IrNode>,
        args: Vec<IrNode>,
    },
    Member {
        object: Box<IrNode>,
        property: IrMemberProp,
        optional: bool,
    },
    Sequence(Vec<IrNode>),
    Spread(Box<IrNode>),
    Await(Box<IrNode>),
    Yield {
        arg: Option<Box<IrNode>>,
        delegate: bool,
    },
    Paren(Box<IrNode>),
    Arrow(Box<IrArrow>),
    Function(Box<IrFunction>),
    Element(Box<IrElement>),
    ComponentCall(Box<IrComponentCall>),
    Fragment(Box<IrFragment>),
    /// Markup text child, whitespace-normalized and entity-decoded.
    Text(String),
    /// Operand the lexer reported as malformed.
    Invalid,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(String),
    String(String),
    Bool(bool),
    Null,
    Regex(String),
}

#[derive(Debug, Clone)]
pub enum IrAssignTarget {
    Simple(Box<IrNode>),
    Pattern(IrPattern),
}

#[derive(Debug, Clone)]
pub enum IrMemberProp {
    Ident(String),
    Computed(Box<IrNode>),
}

#[derive(Debug, Clone)]
pub struct IrProperty {
    pub kind: IrPropertyKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum IrPropertyKind {
    KeyValue { key: IrPropKey, value: IrNode },
    Shorthand(String),
    Method {
        key: IrPropKey,
        kind: MethodKind,
        function: IrFunction,
    },
    Spread(IrNode),
}

#[derive(Debug, Clone)]
pub enum IrPropKey {
    Ident(String),
    String(String),
    Number(String),
    Computed(Box<IrNode>),
}

#[derive(Debug, Clone)]
pub struct IrArrow {
    pub params: Vec<IrParam>,
    pub body: IrArrowBody,
    pub is_async: bool,
}

#[derive(Debug, Clone)]
pub enum IrArrowBody {
    Expr(Box<IrNode>),
    Block(Vec<IrStmt>),
}

// ═══════════════════════════════════════════════════════════════════════════════
// MARKUP
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct IrElement {
    pub tag: String,
    pub attrs: Vec<IrAttr>,
    pub children: Vec<IrNode>,
}

#[derive(Debug, Clone)]
pub struct IrComponentCall {
    /// Tag text used as the callee, e.g. `Card.Header`.
    pub callee: String,
    pub props: Vec<IrAttr>,
    pub children: Vec<IrNode>,
}

#[derive(Debug, Clone)]
pub struct IrFragment {
    pub children: Vec<IrNode>,
}

#[derive(Debug, Clone)]
pub struct IrAttr {
    pub kind: IrAttrKind,
    pub class: Class,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum IrAttrKind {
    /// `value` is `None` for a bare boolean attribute.
    Named { name: String, value: Option<IrNode> },
    Spread(IrNode),
}

impl IrAttr {
    pub fn value(&self) -> Option<&IrNode> {
        match &self.kind {
            IrAttrKind::Named { value, .. } => value.as_ref(),
            IrAttrKind::Spread(value) => Some(value),
        }
    }
}

/// `onClick`-style names: `on` followed by an uppercase letter.
pub fn is_event_name(name: &str) -> bool {
    name.strip_prefix("on")
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names() {
        assert!(is_event_name("onClick"));
        assert!(is_event_name("onChange"));
        assert!(!is_event_name("one"));
        assert!(!is_event_name("on"));
        assert!(!is_event_name("class"));
    }

    #[test]
    fn test_children_stop_at_function_boundaries() {
        let span = Span::default();
        let getter = IrNode::new(
            IrKind::Call {
                callee: Box::new(IrNode::new(IrKind::Identifier("count".into()), span)),
                args: vec![],
                optional: false,
            },
            span,
        );
        assert_eq!(getter.bare_call_name(), Some("count"));
        assert_eq!(getter.children().len(), 1);

        let arrow = IrNode::new(
            IrKind::Arrow(Box::new(IrArrow {
                params: vec![],
                body: IrArrowBody::Expr(Box::new(getter)),
                is_async: false,
            })),
            span,
        );
        assert!(arrow.children().is_empty());
    }
}
