//! Scoped symbol table built by the semantic analyzer.
//!
//! Scopes form a tree rooted at the global scope and are stored flat, indexed
//! by [`ScopeId`]. Function and component bodies get a child scope named after
//! the declaration; anonymous ones are named by their start position.

use serde::Serialize;
use std::collections::HashSet;

use crate::reactive::{BindingOrigin, CreatorKind, Role};
use crate::span::Span;

lazy_static::lazy_static! {
    /// Identifiers that resolve without a declaration in the unit.
    pub static ref GLOBALS: HashSet<&'static str> = {
        let mut s = HashSet::new();
        // Reactive creators, before and after renaming
        s.insert("signal");
        s.insert("memo");
        s.insert("computed");
        s.insert("effect");
        s.insert("createSignal");
        s.insert("createMemo");
        s.insert("createComputed");
        s.insert("createEffect");

        // Standard JS globals
        s.insert("Math");
        s.insert("console");
        s.insert("JSON");
        s.insert("Date");
        s.insert("String");
        s.insert("Number");
        s.insert("Boolean");
        s.insert("Array");
        s.insert("Object");
        s.insert("Promise");
        s.insert("Map");
        s.insert("Set");
        s.insert("WeakMap");
        s.insert("WeakSet");
        s.insert("Symbol");
        s.insert("BigInt");
        s.insert("Error");
        s.insert("TypeError");
        s.insert("RangeError");
        s.insert("SyntaxError");
        s.insert("RegExp");
        s.insert("Intl");
        s.insert("Reflect");
        s.insert("Proxy");
        s.insert("undefined");
        s.insert("NaN");
        s.insert("Infinity");
        s.insert("globalThis");
        s.insert("arguments");
        s.insert("import");
        s.insert("parseInt");
        s.insert("parseFloat");
        s.insert("isNaN");
        s.insert("isFinite");
        s.insert("encodeURIComponent");
        s.insert("decodeURIComponent");
        s.insert("encodeURI");
        s.insert("decodeURI");
        s.insert("structuredClone");
        s.insert("queueMicrotask");
        s.insert("setTimeout");
        s.insert("clearTimeout");
        s.insert("setInterval");
        s.insert("clearInterval");

        // Browser environment
        s.insert("window");
        s.insert("document");
        s.insert("navigator");
        s.insert("location");
        s.insert("history");
        s.insert("localStorage");
        s.insert("sessionStorage");
        s.insert("performance");
        s.insert("fetch");
        s.insert("alert");
        s.insert("confirm");
        s.insert("prompt");
        s.insert("requestAnimationFrame");
        s.insert("cancelAnimationFrame");
        s.insert("crypto");
        s.insert("atob");
        s.insert("btoa");
        s.insert("URL");
        s.insert("URLSearchParams");
        s.insert("FormData");
        s.insert("Headers");
        s.insert("Request");
        s.insert("Response");
        s.insert("AbortController");
        s.insert("Blob");
        s.insert("File");
        s.insert("FileReader");
        s.insert("TextEncoder");
        s.insert("TextDecoder");
        s.insert("Event");
        s.insert("CustomEvent");
        s.insert("Node");
        s.insert("Element");
        s.insert("HTMLElement");
        s.insert("HTMLInputElement");
        s
    };
}

pub type ScopeId = usize;

pub const GLOBAL_SCOPE: ScopeId = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolKind {
    Variable,
    Import,
    Component,
    Interface,
    Parameter,
    Function,
    Enum,
    #[serde(rename = "typeAlias")]
    TypeAlias,
}

impl SymbolKind {
    fn origin(self) -> BindingOrigin {
        match self {
            SymbolKind::Parameter => BindingOrigin::Parameter,
            SymbolKind::Import => BindingOrigin::Import,
            SymbolKind::Function | SymbolKind::Component => BindingOrigin::Function,
            _ => BindingOrigin::Local,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub declared_at: Span,
    pub read_count: u32,
    pub exported: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_annotation: Option<String>,
    /// Creator evidence recorded from `const [a, b] = signal()` style patterns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reactive: Option<(CreatorKind, Role)>,
    /// Module an import binding came from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Symbol {
    pub fn new(name: impl Into<String>, kind: SymbolKind, declared_at: Span) -> Self {
        Self {
            name: name.into(),
            kind,
            declared_at,
            read_count: 0,
            exported: false,
            type_annotation: None,
            reactive: None,
            source: None,
        }
    }

    pub fn origin(&self) -> BindingOrigin {
        self.kind.origin()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    Global,
    Function,
    Component,
    Block,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scope {
    pub id: ScopeId,
    pub name: String,
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    /// Declaration order is preserved.
    pub symbols: Vec<Symbol>,
    pub children: Vec<ScopeId>,
}

impl Scope {
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.name == name)
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut Symbol> {
        self.symbols.iter_mut().find(|s| s.name == name)
    }
}

/// The scope tree of one unit. Owned by the analysis result; never shared.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolTable {
    pub scopes: Vec<Scope>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope {
                id: GLOBAL_SCOPE,
                name: "global".to_string(),
                kind: ScopeKind::Global,
                parent: None,
                symbols: Vec::new(),
                children: Vec::new(),
            }],
        }
    }

    pub fn push_scope(&mut self, parent: ScopeId, name: impl Into<String>, kind: ScopeKind) -> ScopeId {
        let id = self.scopes.len();
        self.scopes.push(Scope {
            id,
            name: name.into(),
            kind,
            parent: Some(parent),
            symbols: Vec::new(),
            children: Vec::new(),
        });
        if let Some(parent) = self.scopes.get_mut(parent) {
            parent.children.push(id);
        }
        id
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id]
    }

    /// Adds `symbol` to `scope`. On a name clash the table is left unchanged
    /// and the existing entry is returned.
    pub fn declare(&mut self, scope: ScopeId, symbol: Symbol) -> Result<(), Symbol> {
        let target = &mut self.scopes[scope];
        if let Some(existing) = target.get(&symbol.name) {
            return Err(existing.clone());
        }
        target.symbols.push(symbol);
        Ok(())
    }

    /// Nearest enclosing declaration of `name`, walking towards the root.
    pub fn resolve(&self, from: ScopeId, name: &str) -> Option<(ScopeId, &Symbol)> {
        let mut current = Some(from);
        while let Some(id) = current {
            let scope = &self.scopes[id];
            if let Some(symbol) = scope.get(name) {
                return Some((id, symbol));
            }
            current = scope.parent;
        }
        None
    }

    /// Marks the nearest `name` as read. Returns `false` when nothing resolves.
    pub fn mark_read(&mut self, from: ScopeId, name: &str) -> bool {
        let Some((id, _)) = self.resolve(from, name) else {
            return false;
        };
        if let Some(symbol) = self.scopes[id].get_mut(name) {
            symbol.read_count += 1;
        }
        true
    }

    /// Symbols never read by the end of analysis, scope by scope in creation order.
    pub fn unread(&self) -> impl Iterator<Item = (&Scope, &Symbol)> {
        self.scopes
            .iter()
            .flat_map(|scope| scope.symbols.iter().filter(|s| s.read_count == 0).map(move |s| (scope, s)))
    }

    pub fn find_scope(&self, name: &str) -> Option<&Scope> {
        self.scopes.iter().find(|s| s.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_rejects_same_scope_duplicates_only() {
        let mut table = SymbolTable::new();
        assert!(table.declare(GLOBAL_SCOPE, Symbol::new("a", SymbolKind::Variable, Span::default())).is_ok());
        let inner = table.push_scope(GLOBAL_SCOPE, "Counter", ScopeKind::Component);
        assert!(table.declare(inner, Symbol::new("a", SymbolKind::Parameter, Span::default())).is_ok());
        let clash = table.declare(GLOBAL_SCOPE, Symbol::new("a", SymbolKind::Function, Span::default()));
        assert_eq!(clash.unwrap_err().kind, SymbolKind::Variable);
    }

    #[test]
    fn test_resolution_prefers_nearest_scope() {
        let mut table = SymbolTable::new();
        table.declare(GLOBAL_SCOPE, Symbol::new("x", SymbolKind::Variable, Span::default())).unwrap();
        let inner = table.push_scope(GLOBAL_SCOPE, "L3C1", ScopeKind::Function);
        table.declare(inner, Symbol::new("x", SymbolKind::Parameter, Span::default())).unwrap();

        assert!(table.mark_read(inner, "x"));
        assert_eq!(table.scope(inner).get("x").unwrap().read_count, 1);
        assert_eq!(table.scope(GLOBAL_SCOPE).get("x").unwrap().read_count, 0);
        assert!(!table.mark_read(inner, "missing"));
        assert_eq!(table.unread().count(), 1);
    }

    #[test]
    fn test_globals_cover_runtime_and_browser() {
        assert!(GLOBALS.contains("signal"));
        assert!(GLOBALS.contains("console"));
        assert!(GLOBALS.contains("document"));
        assert!(!GLOBALS.contains("count"));
    }
}
