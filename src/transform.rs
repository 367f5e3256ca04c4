//! Reactive transformer: creator renaming and markup classification.
//!
//! Runs in place over the lowered module, in three passes:
//! 1. Creator specifiers are stripped from runtime imports (the renamed
//!    runtime symbol is auto-imported by the emitter instead).
//! 2. Unshadowed creator references are renamed (see [`crate::renamer`]).
//! 3. Every node is annotated with `reactive`/`deps`, and every markup child
//!    and attribute receives its [`Class`].

use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

use crate::ir::*;
use crate::options::CompileOptions;
use crate::reactive::{
    creator_bindings, is_runtime_module, BindingLookup, BindingOrigin, BindingShape, CreatorKind, Detector,
    Evidence, Role,
};
use crate::renamer::Renamer;
use crate::scope::GLOBALS;
use crate::visitor::{walk_component_call, walk_element, walk_node, IrVisitor, ScopeEntry};

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformReport {
    pub has_reactive_import: bool,
    /// Creator specifiers removed from runtime imports, by local name.
    pub stripped_specifiers: Vec<String>,
    pub renamed: usize,
    pub runtime_symbols: BTreeSet<String>,
    /// Markup children and attributes needing a wire or a getter property.
    pub dynamic_sites: usize,
    pub inline_sites: usize,
}

pub fn transform(module: &mut IrModule, options: &CompileOptions) -> TransformReport {
    let mut report = TransformReport {
        has_reactive_import: has_reactive_import(module, options),
        ..Default::default()
    };

    let aliases = strip_creator_imports(module, options, &mut report.stripped_specifiers);

    let mut renamer = Renamer::new(aliases);
    renamer.visit_module(module);
    report.renamed = renamer.renamed;
    report.runtime_symbols = renamer.runtime_symbols;
    module.runtime_symbols.extend(report.runtime_symbols.iter().cloned());

    let detector = Detector::new();
    let mut classifier = Classifier {
        scopes: ScopeTracker::default(),
        detector: &detector,
        has_reactive_import: report.has_reactive_import,
        strict: options.strict,
        dynamic_sites: 0,
        inline_sites: 0,
    };
    classifier.visit_module(module);
    report.dynamic_sites = classifier.dynamic_sites;
    report.inline_sites = classifier.inline_sites;

    if options.debug_enabled("transform") {
        tracing::debug!(
            unit = %options.unit_name,
            phase = "transform",
            renamed = report.renamed,
            dynamic = report.dynamic_sites,
            inline = report.inline_sites,
            "reactive transform complete"
        );
    }
    report
}

fn has_reactive_import(module: &IrModule, options: &CompileOptions) -> bool {
    module.body.iter().any(|stmt| match &stmt.kind {
        IrStmtKind::Import(import) => {
            is_runtime_module(&import.source, options)
                || import.named.iter().any(|s| CreatorKind::from_callee(&s.imported).is_some())
        }
        _ => false,
    })
}

/// Removes creator specifiers from runtime-module imports and returns the
/// local names they bound. Remaining named-only specifiers move into
/// `runtime_imports` so each runtime module gets a single import statement.
/// An import left without bindings is dropped.
fn strip_creator_imports(
    module: &mut IrModule,
    options: &CompileOptions,
    stripped: &mut Vec<String>,
) -> HashMap<String, CreatorKind> {
    let mut aliases = HashMap::new();
    let mut lifted = Vec::new();
    module.body.retain_mut(|stmt| {
        let IrStmtKind::Import(import) = &mut stmt.kind else {
            return true;
        };
        if !is_runtime_module(&import.source, options) || import.named.is_empty() {
            return true;
        }
        import.named.retain(|spec| match CreatorKind::from_callee(&spec.imported) {
            Some(creator) => {
                aliases.insert(spec.local.clone(), creator);
                stripped.push(spec.local.clone());
                false
            }
            None => true,
        });
        if import.default.is_none() && import.namespace.is_none() {
            for spec in import.named.drain(..) {
                let text = if spec.imported == spec.local {
                    spec.local
                } else {
                    format!("{} as {}", spec.imported, spec.local)
                };
                lifted.push((import.source.clone(), text));
            }
        }
        !import.is_empty()
    });
    module.runtime_imports.extend(lifted);
    aliases
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCOPE TRACKING
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
struct TrackedBinding {
    origin: BindingOrigin,
    annotation: Option<String>,
    reactive: Option<(CreatorKind, Role)>,
}

/// Lexical bindings visible at the current point of an IR traversal.
///
/// Frames are pushed by `enter_scope`; each frame's declarations are hoisted
/// up front so forward references resolve like they do at runtime.
#[derive(Debug, Default)]
pub(crate) struct ScopeTracker {
    frames: Vec<HashMap<String, TrackedBinding>>,
}

impl ScopeTracker {
    pub(crate) fn enter(&mut self, entry: ScopeEntry<'_>) {
        let mut frame = HashMap::new();
        match entry {
            ScopeEntry::Module(body) | ScopeEntry::Block(body) => self.hoist(&mut frame, body),
            ScopeEntry::Function { params, body } => {
                declare_params(&mut frame, params);
                self.hoist(&mut frame, body);
            }
            ScopeEntry::Arrow { params, body } => {
                declare_params(&mut frame, params);
                if let Some(body) = body {
                    self.hoist(&mut frame, body);
                }
            }
            ScopeEntry::Catch { param, body } => {
                if let Some(param) = param {
                    for name in param.bound_names() {
                        frame.insert(name, plain(BindingOrigin::Parameter));
                    }
                }
                self.hoist(&mut frame, body);
            }
            ScopeEntry::LoopHead(names) => {
                for name in names {
                    frame.insert(name, plain(BindingOrigin::Local));
                }
            }
        }
        self.frames.push(frame);
    }

    pub(crate) fn exit(&mut self) {
        self.frames.pop();
    }

    pub(crate) fn is_bound(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    fn lookup(&self, name: &str) -> Option<&TrackedBinding> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    fn hoist(&self, frame: &mut HashMap<String, TrackedBinding>, body: &[IrStmt]) {
        for stmt in body {
            self.hoist_stmt(frame, stmt);
        }
    }

    fn hoist_stmt(&self, frame: &mut HashMap<String, TrackedBinding>, stmt: &IrStmt) {
        match &stmt.kind {
            IrStmtKind::Var(decl) => {
                for declarator in &decl.declarators {
                    self.hoist_declarator(frame, declarator);
                }
            }
            IrStmtKind::Function(function) => {
                if let Some(name) = &function.name {
                    frame.insert(name.clone(), plain(BindingOrigin::Function));
                }
            }
            IrStmtKind::Import(import) => {
                let locals = import
                    .default
                    .iter()
                    .chain(import.namespace.iter())
                    .chain(import.named.iter().map(|s| &s.local));
                for local in locals {
                    frame.insert(local.clone(), plain(BindingOrigin::Import));
                }
            }
            IrStmtKind::Export(IrExport::Declaration(inner) | IrExport::Default(inner)) => {
                self.hoist_stmt(frame, inner)
            }
            _ => {}
        }
    }

    fn hoist_declarator(&self, frame: &mut HashMap<String, TrackedBinding>, declarator: &IrDeclarator) {
        let creator = declarator.init.as_ref().and_then(|init| self.creator_of(frame, init));
        let mut reactive: HashMap<String, Role> = HashMap::new();
        if let Some(creator) = creator {
            reactive.extend(creator_bindings(&pattern_shape(&declarator.pattern), creator));
        }
        let single = matches!(declarator.pattern.kind, IrPatternKind::Ident(_));
        for name in declarator.pattern.bound_names() {
            let role = reactive.get(&name).copied();
            frame.insert(
                name,
                TrackedBinding {
                    origin: BindingOrigin::Local,
                    annotation: if single { declarator.type_annotation.clone() } else { None },
                    reactive: creator.zip(role),
                },
            );
        }
    }

    /// A creator call whose callee is not shadowed by a local binding.
    fn creator_of(&self, frame: &HashMap<String, TrackedBinding>, init: &IrNode) -> Option<CreatorKind> {
        let IrKind::Call { callee, .. } = &init.unparen().kind else {
            return None;
        };
        let name = callee.as_ident()?;
        let creator = CreatorKind::from_callee(name)?;
        match frame.get(name).or_else(|| self.lookup(name)) {
            Some(binding) if binding.origin != BindingOrigin::Import => None,
            _ => Some(creator),
        }
    }
}

impl BindingLookup for ScopeTracker {
    fn origin(&self, name: &str) -> Option<BindingOrigin> {
        self.lookup(name).map(|b| b.origin)
    }

    fn type_annotation(&self, name: &str) -> Option<&str> {
        self.lookup(name).and_then(|b| b.annotation.as_deref())
    }

    fn recorded(&self, name: &str) -> Option<(CreatorKind, Role)> {
        self.lookup(name).and_then(|b| b.reactive)
    }
}

fn plain(origin: BindingOrigin) -> TrackedBinding {
    TrackedBinding {
        origin,
        annotation: None,
        reactive: None,
    }
}

fn declare_params(frame: &mut HashMap<String, TrackedBinding>, params: &[IrParam]) {
    for param in params {
        let single = matches!(param.pattern.kind, IrPatternKind::Ident(_));
        for name in param.pattern.bound_names() {
            frame.insert(
                name,
                TrackedBinding {
                    origin: BindingOrigin::Parameter,
                    annotation: if single { param.type_annotation.clone() } else { None },
                    reactive: None,
                },
            );
        }
    }
}

fn pattern_shape(pattern: &IrPattern) -> BindingShape {
    let ident = |p: &IrPattern| match &p.kind {
        IrPatternKind::Ident(name) => Some(name.clone()),
        _ => None,
    };
    match &pattern.kind {
        IrPatternKind::Ident(name) => BindingShape::Single(name.clone()),
        IrPatternKind::Array { elements, rest: None } if elements.len() <= 2 => BindingShape::Pair(
            elements.first().and_then(|e| e.as_ref()).and_then(ident),
            elements.get(1).and_then(|e| e.as_ref()).and_then(ident),
        ),
        _ => BindingShape::Other,
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CLASSIFICATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Emission class of a markup child. Expects `reactive` to be annotated.
pub fn classify(node: &IrNode) -> Class {
    match &node.kind {
        IrKind::Text(_) => Class::Static,
        IrKind::Element(_) | IrKind::ComponentCall(_) => Class::Child,
        IrKind::Fragment(_) => Class::Fragment,
        _ if !node.reactive => Class::Static,
        _ => match &node.unparen().kind {
            IrKind::Conditional { .. } => Class::Conditional,
            IrKind::Binary { op, .. } if op.is_logical() => Class::Conditional,
            IrKind::Call { callee, .. } if is_map_call(callee) => Class::Loop,
            _ => Class::Dynamic,
        },
    }
}

/// A dynamic child that is nothing but one getter call.
pub fn is_inline(node: &IrNode) -> bool {
    node.class == Class::Dynamic && node.deps.len() == 1 && node.bare_call_name() == node.deps.first().map(String::as_str)
}

fn is_map_call(callee: &IrNode) -> bool {
    matches!(
        &callee.kind,
        IrKind::Member { property: IrMemberProp::Ident(name), .. } if name == "map"
    )
}

fn classify_attr(attr: &IrAttr, on_element: bool) -> Class {
    match &attr.kind {
        IrAttrKind::Named { name, .. } if on_element && is_event_name(name) => Class::Event,
        IrAttrKind::Named { value: Some(value), .. } if value.reactive => Class::Dynamic,
        _ => Class::Static,
    }
}

struct Classifier<'d> {
    scopes: ScopeTracker,
    detector: &'d Detector,
    has_reactive_import: bool,
    strict: bool,
    dynamic_sites: usize,
    inline_sites: usize,
}

impl Classifier<'_> {
    fn is_getter(&self, name: &str) -> bool {
        if !self.scopes.is_bound(name) && GLOBALS.contains(name) {
            return false;
        }
        let evidence = Evidence {
            lookup: &self.scopes,
            has_reactive_import: self.has_reactive_import,
            strict: self.strict,
        };
        self.detector.is_getter(name, &evidence)
    }

    fn annotate(&self, node: &mut IrNode) {
        let getter = node
            .bare_call_name()
            .filter(|name| self.is_getter(name))
            .map(str::to_string);
        if let Some(name) = getter {
            node.reactive = true;
            node.deps = vec![name];
            return;
        }
        let mut deps: Vec<String> = Vec::new();
        let mut reactive = false;
        for child in node.children() {
            reactive |= child.reactive;
            for dep in &child.deps {
                if !deps.contains(dep) {
                    deps.push(dep.clone());
                }
            }
        }
        node.reactive = reactive;
        node.deps = deps;
    }

    fn classify_children(&mut self, children: &mut [IrNode]) {
        for child in children {
            child.class = classify(child);
            child.inline = is_inline(child);
            if child.inline {
                self.inline_sites += 1;
            } else if child.class.is_reactive() {
                self.dynamic_sites += 1;
            }
        }
    }

    fn classify_attrs(&mut self, attrs: &mut [IrAttr], on_element: bool) {
        for attr in attrs {
            attr.class = classify_attr(attr, on_element);
            if attr.class == Class::Dynamic {
                self.dynamic_sites += 1;
            }
        }
    }
}

impl IrVisitor for Classifier<'_> {
    fn visit_node(&mut self, node: &mut IrNode) {
        walk_node(self, node);
        self.annotate(node);
    }

    fn visit_element(&mut self, element: &mut IrElement) {
        walk_element(self, element);
        self.classify_attrs(&mut element.attrs, true);
        self.classify_children(&mut element.children);
    }

    fn visit_component_call(&mut self, call: &mut IrComponentCall) {
        walk_component_call(self, call);
        self.classify_attrs(&mut call.props, false);
        self.classify_children(&mut call.children);
    }

    fn visit_fragment(&mut self, fragment: &mut IrFragment) {
        crate::visitor::walk_children(self, &mut fragment.children);
        self.classify_children(&mut fragment.children);
    }

    fn enter_scope(&mut self, entry: ScopeEntry<'_>) {
        self.scopes.enter(entry);
    }

    fn exit_scope(&mut self) {
        self.scopes.exit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lowering::lower;
    use crate::parse::parse_source;

    fn transformed(source: &str) -> (IrModule, TransformReport) {
        let mut module = lower(&parse_source(source).program);
        let report = transform(&mut module, &CompileOptions::default());
        (module, report)
    }

    fn first_element_children(module: &IrModule) -> Vec<(Class, bool)> {
        fn find(stmts: &[IrStmt]) -> Option<&IrElement> {
            stmts.iter().find_map(|stmt| match &stmt.kind {
                IrStmtKind::Function(f) => find(&f.body),
                IrStmtKind::Return(Some(node)) => match &node.unparen().kind {
                    IrKind::Element(element) => Some(element.as_ref()),
                    _ => None,
                },
                _ => None,
            })
        }
        find(&module.body)
            .map(|element| element.children.iter().map(|c| (c.class, c.inline)).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_bare_getter_child_is_inline() {
        let (module, report) = transformed(
            "component Counter() {\n  const [count, setCount] = signal(0);\n  return <p>{count()}</p>;\n}",
        );
        assert_eq!(first_element_children(&module), vec![(Class::Dynamic, true)]);
        assert!(report.runtime_symbols.contains("createSignal"));
        assert_eq!(report.inline_sites, 1);
    }

    #[test]
    fn test_child_classes() {
        let (module, _) = transformed(
            "component List() {\n  const [items, setItems] = signal([]);\n  const [open, setOpen] = signal(false);\n  \
             return <div>hello {items().length + 1}{open() ? \"y\" : \"n\"}{items().map(i => i)}<span /></div>;\n}",
        );
        assert_eq!(
            first_element_children(&module),
            vec![
                (Class::Static, false),
                (Class::Dynamic, false),
                (Class::Conditional, false),
                (Class::Loop, false),
                (Class::Child, false),
            ]
        );
    }

    #[test]
    fn test_getter_inside_arrow_does_not_leak() {
        let (module, _) = transformed(
            "component A() {\n  const [count, setCount] = signal(0);\n  return <button onClick={() => setCount(count() + 1)}>+</button>;\n}",
        );
        fn attr_classes(stmts: &[IrStmt]) -> Vec<Class> {
            stmts
                .iter()
                .flat_map(|stmt| match &stmt.kind {
                    IrStmtKind::Function(f) => attr_classes(&f.body),
                    IrStmtKind::Return(Some(node)) => match &node.kind {
                        IrKind::Element(element) => element.attrs.iter().map(|a| a.class).collect(),
                        _ => vec![],
                    },
                    _ => vec![],
                })
                .collect()
        }
        assert_eq!(attr_classes(&module.body), vec![Class::Event]);
    }

    fn imports(module: &IrModule) -> Vec<&IrImport> {
        module
            .body
            .iter()
            .filter_map(|s| match &s.kind {
                IrStmtKind::Import(i) => Some(i),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_creator_specifiers_stripped_from_runtime_imports() {
        let (module, report) = transformed(
            "import { signal, onMount } from \"@weft/runtime\";\nimport { memo as m, onCleanup as cleanup } from \"@weft/runtime\";\nconst d = m(() => 1);",
        );
        assert!(imports(&module).is_empty());
        assert_eq!(
            module.runtime_imports,
            vec![
                ("@weft/runtime".to_string(), "onMount".to_string()),
                ("@weft/runtime".to_string(), "onCleanup as cleanup".to_string()),
            ]
        );
        assert_eq!(report.stripped_specifiers, vec!["signal".to_string(), "m".to_string()]);
        assert!(report.runtime_symbols.contains("createMemo"));
        assert!(report.has_reactive_import);
    }

    #[test]
    fn test_namespace_runtime_import_stays_in_place() {
        let (module, _) = transformed("import * as rt from \"@weft/runtime\";\nrt.onMount(() => 1);");
        assert_eq!(imports(&module).len(), 1);
        assert!(module.runtime_imports.is_empty());
    }

    #[test]
    fn test_heuristic_requires_reactive_import() {
        // `value` is only a getter by name; no runtime import means no evidence.
        let (module, _) = transformed("function View(value) {\n  return <p>{value()}</p>;\n}");
        fn child_class(stmts: &[IrStmt]) -> Option<Class> {
            stmts.iter().find_map(|stmt| match &stmt.kind {
                IrStmtKind::Function(f) => child_class(&f.body),
                IrStmtKind::Return(Some(node)) => match &node.kind {
                    IrKind::Element(element) => element.children.first().map(|c| c.class),
                    _ => None,
                },
                _ => None,
            })
        }
        assert_eq!(child_class(&module.body), Some(Class::Static));
    }
}
