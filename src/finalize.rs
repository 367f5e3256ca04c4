//! Import collection and final output assembly.
//!
//! Every runtime symbol the emitter or transformer introduces is attributed
//! to a module path through a [`ModuleResolver`]. The set is de-duplicated by
//! (symbol, module) and rendered as one `import` statement per module ahead
//! of the body.

use lazy_static::lazy_static;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::escape::quote;
use crate::options::CompileOptions;
use crate::reactive::RUNTIME_PACKAGE;

lazy_static! {
    static ref DEFAULT_MODULES: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("createSignal", RUNTIME_PACKAGE);
        m.insert("createMemo", RUNTIME_PACKAGE);
        m.insert("createComputed", RUNTIME_PACKAGE);
        m.insert("createEffect", RUNTIME_PACKAGE);
        m.insert("t_element", "@weft/runtime/dom");
        m.insert("t_fragment", "@weft/runtime/dom");
        m.insert("$wire", "@weft/runtime/dom");
        m.insert("$wireAttr", "@weft/runtime/dom");
        m.insert("$REGISTRY", "@weft/runtime/registry");
        m
    };
}

/// Attributes an auto-injected symbol to the module providing it.
pub trait ModuleResolver {
    fn resolve(&self, symbol: &str) -> String;
}

/// The built-in table, overlaid with `runtimeModules` overrides.
pub struct DefaultResolver<'a> {
    overrides: &'a HashMap<String, String>,
}

impl<'a> DefaultResolver<'a> {
    pub fn new(options: &'a CompileOptions) -> Self {
        DefaultResolver {
            overrides: &options.runtime_modules,
        }
    }
}

impl ModuleResolver for DefaultResolver<'_> {
    fn resolve(&self, symbol: &str) -> String {
        if let Some(module) = self.overrides.get(symbol) {
            return module.clone();
        }
        DEFAULT_MODULES
            .get(symbol)
            .copied()
            .unwrap_or(RUNTIME_PACKAGE)
            .to_string()
    }
}

/// Runtime imports of one output unit; module path → symbols, both sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSet {
    modules: BTreeMap<String, BTreeSet<String>>,
}

impl ImportSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, module: impl Into<String>, symbol: impl Into<String>) {
        self.modules.entry(module.into()).or_default().insert(symbol.into());
    }

    pub fn add_resolved(&mut self, resolver: &dyn ModuleResolver, symbol: &str) {
        self.add(resolver.resolve(symbol), symbol);
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn contains(&self, module: &str, symbol: &str) -> bool {
        self.modules.get(module).is_some_and(|s| s.contains(symbol))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.modules.iter()
    }

    /// Serialized form: module path → sorted symbol list.
    pub fn to_map(&self) -> BTreeMap<String, Vec<String>> {
        self.modules
            .iter()
            .map(|(module, symbols)| (module.clone(), symbols.iter().cloned().collect()))
            .collect()
    }

    pub fn render(&self) -> String {
        self.modules
            .iter()
            .map(|(module, symbols)| {
                let list: Vec<&str> = symbols.iter().map(String::as_str).collect();
                format!("import {{ {} }} from {};", list.join(", "), quote(module))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Banner, import block and body, separated by blank lines.
pub fn assemble(body: &str, imports: &ImportSet, runtime_version: &str) -> String {
    let mut out = String::new();
    if !runtime_version.is_empty() {
        out.push_str(&format!("// {} {}\n", RUNTIME_PACKAGE, runtime_version));
    }
    if !imports.is_empty() {
        out.push_str(&imports.render());
        out.push_str("\n\n");
    }
    out.push_str(body);
    if !out.ends_with('\n') {
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_imports_grouped_sorted_and_deduplicated() {
        let options = CompileOptions::default();
        let resolver = DefaultResolver::new(&options);
        let mut imports = ImportSet::new();
        for symbol in ["t_element", "createSignal", "$wire", "t_element", "createEffect"] {
            imports.add_resolved(&resolver, symbol);
        }
        assert_eq!(
            imports.render(),
            "import { createEffect, createSignal } from \"@weft/runtime\";\n\
             import { $wire, t_element } from \"@weft/runtime/dom\";"
        );
    }

    #[test]
    fn test_overrides_take_precedence() {
        let mut options = CompileOptions::default();
        options.runtime_modules.insert("t_element".into(), "./shim.js".into());
        let resolver = DefaultResolver::new(&options);
        assert_eq!(resolver.resolve("t_element"), "./shim.js");
        assert_eq!(resolver.resolve("$REGISTRY"), "@weft/runtime/registry");
    }

    #[test]
    fn test_assemble_with_banner() {
        let mut imports = ImportSet::new();
        imports.add("@weft/runtime", "createSignal");
        let out = assemble("const a = 1;", &imports, "1.2.0");
        assert_eq!(
            out,
            "// @weft/runtime 1.2.0\nimport { createSignal } from \"@weft/runtime\";\n\nconst a = 1;\n"
        );
        assert_eq!(assemble("", &ImportSet::new(), ""), "\n");
    }
}
