//! Reactive-primitive identification.
//!
//! Deciding whether `name()` reads reactive state is an ordered list of
//! independent [`DetectionStrategy`] values evaluated short-circuit. The
//! first strategy with an opinion decides. Both the semantic analyzer and
//! the transformer run the same [`Detector`], each over its own scope
//! bookkeeping exposed through [`BindingLookup`].

use lazy_static::lazy_static;
use serde::Serialize;
use std::collections::HashSet;

use crate::options::CompileOptions;
use crate::span::Span;

pub const RUNTIME_PACKAGE: &str = "@weft/runtime";

/// `@weft/runtime`, one of its subpaths, or a module the options route runtime symbols to.
pub fn is_runtime_module(path: &str, options: &CompileOptions) -> bool {
    path == RUNTIME_PACKAGE
        || path
            .strip_prefix(RUNTIME_PACKAGE)
            .is_some_and(|rest| rest.starts_with('/'))
        || options.runtime_modules.values().any(|m| m == path)
}

// ═══════════════════════════════════════════════════════════════════════════════
// CREATORS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CreatorKind {
    Signal,
    Memo,
    Effect,
    Computed,
}

impl CreatorKind {
    /// Recognizes a creator by callee name, in source or runtime spelling.
    pub fn from_callee(name: &str) -> Option<Self> {
        match name {
            "signal" | "createSignal" => Some(CreatorKind::Signal),
            "memo" | "createMemo" => Some(CreatorKind::Memo),
            "effect" | "createEffect" => Some(CreatorKind::Effect),
            "computed" | "createComputed" => Some(CreatorKind::Computed),
            _ => None,
        }
    }

    pub fn source_name(self) -> &'static str {
        match self {
            CreatorKind::Signal => "signal",
            CreatorKind::Memo => "memo",
            CreatorKind::Effect => "effect",
            CreatorKind::Computed => "computed",
        }
    }

    pub fn runtime_name(self) -> &'static str {
        match self {
            CreatorKind::Signal => "createSignal",
            CreatorKind::Memo => "createMemo",
            CreatorKind::Effect => "createEffect",
            CreatorKind::Computed => "createComputed",
        }
    }
}

/// What a binding produced by a creator call is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Getter,
    Setter,
    /// Return value of `effect(...)` kept in a binding.
    Handle,
}

/// Shape of a declaration target, as far as creator patterns care.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingShape {
    /// `const name = ...`
    Single(String),
    /// `const [first, second] = ...`; holes are `None`.
    Pair(Option<String>, Option<String>),
    Other,
}

/// Bindings introduced by `shape = creator(...)`.
pub fn creator_bindings(shape: &BindingShape, creator: CreatorKind) -> Vec<(String, Role)> {
    match (creator, shape) {
        (CreatorKind::Signal, BindingShape::Pair(getter, setter)) => {
            let mut out = Vec::new();
            if let Some(getter) = getter {
                out.push((getter.clone(), Role::Getter));
            }
            if let Some(setter) = setter {
                out.push((setter.clone(), Role::Setter));
            }
            out
        }
        (CreatorKind::Memo | CreatorKind::Computed, BindingShape::Single(name)) => {
            vec![(name.clone(), Role::Getter)]
        }
        (CreatorKind::Effect, BindingShape::Single(name)) => vec![(name.clone(), Role::Handle)],
        _ => Vec::new(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVIDENCE
// ═══════════════════════════════════════════════════════════════════════════════

/// Where the nearest binding of a name came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingOrigin {
    Parameter,
    Import,
    Function,
    Local,
}

/// Scope bookkeeping a strategy may consult.
pub trait BindingLookup {
    fn origin(&self, name: &str) -> Option<BindingOrigin>;
    fn type_annotation(&self, name: &str) -> Option<&str>;
    fn recorded(&self, name: &str) -> Option<(CreatorKind, Role)>;
}

pub struct Evidence<'a> {
    pub lookup: &'a dyn BindingLookup,
    /// The unit imports a creator or anything from a runtime module.
    pub has_reactive_import: bool,
    pub strict: bool,
}

pub trait DetectionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Some(true)` for a reactive getter, `Some(false)` for known non-reactive,
    /// `None` to defer to the next strategy.
    fn detect(&self, name: &str, evidence: &Evidence<'_>) -> Option<bool>;
}

lazy_static! {
    static ref REACTIVE_TYPE_HEADS: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert("Signal");
        s.insert("Accessor");
        s.insert("Memo");
        s.insert("Computed");
        s.insert("ReadonlySignal");
        s
    };

    static ref GETTER_LIKE_NAMES: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert("count");
        s.insert("value");
        s.insert("state");
        s.insert("data");
        s.insert("items");
        s.insert("list");
        s.insert("todos");
        s.insert("loading");
        s.insert("error");
        s.insert("visible");
        s.insert("open");
        s.insert("selected");
        s.insert("active");
        s.insert("checked");
        s.insert("enabled");
        s.insert("disabled");
        s.insert("text");
        s.insert("title");
        s.insert("total");
        s.insert("status");
        s.insert("user");
        s.insert("query");
        s.insert("filter");
        s.insert("theme");
        s
    };
}

/// Tier 1: a reactive type annotation confirms a getter. Any other
/// annotation defers, so creator evidence still applies.
pub struct TypeAnnotationStrategy;

impl DetectionStrategy for TypeAnnotationStrategy {
    fn name(&self) -> &'static str {
        "type-annotation"
    }

    fn detect(&self, name: &str, evidence: &Evidence<'_>) -> Option<bool> {
        let text = evidence.lookup.type_annotation(name)?;
        let head: String = text
            .trim_start()
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '$')
            .collect();
        REACTIVE_TYPE_HEADS.contains(head.as_str()).then_some(true)
    }
}

/// Tier 2: `const [a, b] = signal()` and `const m = memo()` recorded per scope.
pub struct ScopePatternStrategy;

impl DetectionStrategy for ScopePatternStrategy {
    fn name(&self) -> &'static str {
        "scope-pattern"
    }

    fn detect(&self, name: &str, evidence: &Evidence<'_>) -> Option<bool> {
        if let Some((_, role)) = evidence.lookup.recorded(name) {
            return Some(role == Role::Getter);
        }
        match evidence.lookup.origin(name) {
            Some(BindingOrigin::Local | BindingOrigin::Function) => Some(false),
            _ => None,
        }
    }
}

/// Tier 3: getter-like names of parameters, imports and unresolved bindings,
/// only in units that use the reactive system at all.
pub struct NameHeuristicStrategy;

impl DetectionStrategy for NameHeuristicStrategy {
    fn name(&self) -> &'static str {
        "name-heuristic"
    }

    fn detect(&self, name: &str, evidence: &Evidence<'_>) -> Option<bool> {
        if evidence.strict || !evidence.has_reactive_import {
            return None;
        }
        GETTER_LIKE_NAMES.contains(name).then_some(true)
    }
}

pub struct Detector {
    strategies: Vec<Box<dyn DetectionStrategy>>,
}

impl Default for Detector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector {
    pub fn new() -> Self {
        Self::with_strategies(vec![
            Box::new(TypeAnnotationStrategy),
            Box::new(ScopePatternStrategy),
            Box::new(NameHeuristicStrategy),
        ])
    }

    pub fn with_strategies(strategies: Vec<Box<dyn DetectionStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn is_getter(&self, name: &str, evidence: &Evidence<'_>) -> bool {
        self.decide(name, evidence).is_some_and(|(_, verdict)| verdict)
    }

    /// The deciding strategy and its verdict.
    pub fn decide(&self, name: &str, evidence: &Evidence<'_>) -> Option<(&'static str, bool)> {
        self.strategies
            .iter()
            .find_map(|s| s.detect(name, evidence).map(|verdict| (s.name(), verdict)))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// BINDING TABLE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactiveBinding {
    pub name: String,
    pub creator: CreatorKind,
    pub role: Role,
    /// Name of the declaring scope.
    pub scope: String,
    pub dependencies: Vec<String>,
    pub declared_at: Span,
}

/// Per-unit record of every creator-produced binding.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReactiveBindingTable {
    pub entries: Vec<ReactiveBinding>,
}

impl ReactiveBindingTable {
    pub fn record(&mut self, binding: ReactiveBinding) {
        self.entries.push(binding);
    }

    pub fn get(&self, scope: &str, name: &str) -> Option<&ReactiveBinding> {
        self.entries.iter().find(|b| b.scope == scope && b.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct FakeScope {
        origins: HashMap<&'static str, BindingOrigin>,
        annotations: HashMap<&'static str, &'static str>,
        recorded: HashMap<&'static str, (CreatorKind, Role)>,
    }

    impl BindingLookup for FakeScope {
        fn origin(&self, name: &str) -> Option<BindingOrigin> {
            self.origins.get(name).copied()
        }
        fn type_annotation(&self, name: &str) -> Option<&str> {
            self.annotations.get(name).copied()
        }
        fn recorded(&self, name: &str) -> Option<(CreatorKind, Role)> {
            self.recorded.get(name).copied()
        }
    }

    fn evidence(lookup: &FakeScope, has_reactive_import: bool, strict: bool) -> Evidence<'_> {
        Evidence {
            lookup,
            has_reactive_import,
            strict,
        }
    }

    #[test]
    fn test_type_annotation_decides_first() {
        let mut scope = FakeScope::default();
        scope.annotations.insert("label", "Accessor<string>");
        let ev = evidence(&scope, true, false);
        assert_eq!(Detector::new().decide("label", &ev), Some(("type-annotation", true)));
    }

    #[test]
    fn test_plain_annotation_does_not_veto_creator_evidence() {
        let mut scope = FakeScope::default();
        scope.annotations.insert("doubled", "() => number");
        scope.recorded.insert("doubled", (CreatorKind::Memo, Role::Getter));
        scope.annotations.insert("limit", "number");
        scope.origins.insert("limit", BindingOrigin::Local);
        let ev = evidence(&scope, false, true);
        let detector = Detector::new();
        assert_eq!(detector.decide("doubled", &ev), Some(("scope-pattern", true)));
        assert_eq!(detector.decide("limit", &ev), Some(("scope-pattern", false)));
    }

    #[test]
    fn test_scope_pattern_roles() {
        let mut scope = FakeScope::default();
        scope.recorded.insert("count", (CreatorKind::Signal, Role::Getter));
        scope.recorded.insert("setCount", (CreatorKind::Signal, Role::Setter));
        scope.origins.insert("helper", BindingOrigin::Function);
        let ev = evidence(&scope, false, true);
        let detector = Detector::new();
        assert!(detector.is_getter("count", &ev));
        assert!(!detector.is_getter("setCount", &ev));
        assert_eq!(detector.decide("helper", &ev), Some(("scope-pattern", false)));
    }

    #[test]
    fn test_name_heuristic_needs_import_and_lenient_mode() {
        let mut scope = FakeScope::default();
        scope.origins.insert("value", BindingOrigin::Parameter);
        let detector = Detector::new();
        assert!(detector.is_getter("value", &evidence(&scope, true, false)));
        assert!(!detector.is_getter("value", &evidence(&scope, false, false)));
        assert!(!detector.is_getter("value", &evidence(&scope, true, true)));
        assert!(!detector.is_getter("compute", &evidence(&scope, true, false)));
    }

    #[test]
    fn test_creator_bindings_by_shape() {
        let pair = BindingShape::Pair(Some("count".into()), Some("setCount".into()));
        assert_eq!(
            creator_bindings(&pair, CreatorKind::Signal),
            vec![("count".to_string(), Role::Getter), ("setCount".to_string(), Role::Setter)]
        );
        let single = BindingShape::Single("doubled".into());
        assert_eq!(creator_bindings(&single, CreatorKind::Memo), vec![("doubled".to_string(), Role::Getter)]);
        assert!(creator_bindings(&single, CreatorKind::Signal).is_empty());
    }
}
