use std::collections::{BTreeSet, HashMap};

use crate::ir::{IrKind, IrNode, IrPropKey, IrProperty, IrPropertyKind};
use crate::reactive::CreatorKind;
use crate::transform::ScopeTracker;
use crate::visitor::{walk_node, IrVisitor, ScopeEntry};

/// Rewrites creator references to their runtime names.
///
/// A reference is renamed only while no lexical binding of that name is in
/// scope, so a user's own `signal` helper is left alone.
pub struct Renamer {
    renames: HashMap<String, CreatorKind>,
    scopes: ScopeTracker,
    pub renamed: usize,
    pub runtime_symbols: BTreeSet<String>,
}

impl Renamer {
    /// `aliases` are local names of creator specifiers stripped from runtime
    /// imports; both creator spellings are always renamed.
    pub fn new(aliases: HashMap<String, CreatorKind>) -> Self {
        let mut renames = HashMap::new();
        for creator in [
            CreatorKind::Signal,
            CreatorKind::Memo,
            CreatorKind::Effect,
            CreatorKind::Computed,
        ] {
            renames.insert(creator.source_name().to_string(), creator);
            renames.insert(creator.runtime_name().to_string(), creator);
        }
        renames.extend(aliases);
        Renamer {
            renames,
            scopes: ScopeTracker::default(),
            renamed: 0,
            runtime_symbols: BTreeSet::new(),
        }
    }

    fn target(&mut self, name: &str) -> Option<&'static str> {
        if self.scopes.is_bound(name) {
            return None;
        }
        let runtime = self.renames.get(name)?.runtime_name();
        self.runtime_symbols.insert(runtime.to_string());
        if runtime != name {
            self.renamed += 1;
        }
        Some(runtime)
    }
}

impl IrVisitor for Renamer {
    fn visit_node(&mut self, node: &mut IrNode) {
        match &mut node.kind {
            IrKind::Identifier(name) => {
                if let Some(runtime) = self.target(name) {
                    *name = runtime.to_string();
                }
            }
            IrKind::Object(props) => {
                for prop in props.iter_mut() {
                    rename_shorthand(self, prop);
                }
                walk_node(self, node);
            }
            _ => walk_node(self, node),
        }
    }

    fn enter_scope(&mut self, entry: ScopeEntry<'_>) {
        self.scopes.enter(entry);
    }

    fn exit_scope(&mut self) {
        self.scopes.exit();
    }
}

/// `{ signal }` keeps its key and points at the runtime name.
fn rename_shorthand(renamer: &mut Renamer, prop: &mut IrProperty) {
    let IrPropertyKind::Shorthand(name) = &prop.kind else {
        return;
    };
    let Some(runtime) = renamer.target(name) else {
        return;
    };
    if runtime == name.as_str() {
        return;
    }
    let key = name.clone();
    prop.kind = IrPropertyKind::KeyValue {
        key: IrPropKey::Ident(key),
        value: IrNode::new(IrKind::Identifier(runtime.to_string()), prop.span),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{IrModule, IrStmtKind};
    use crate::lowering::lower;
    use crate::parse::parse_source;

    fn renamed(source: &str) -> (IrModule, Renamer) {
        let mut module = lower(&parse_source(source).program);
        let mut renamer = Renamer::new(HashMap::new());
        renamer.visit_module(&mut module);
        (module, renamer)
    }

    fn first_init_callee(module: &IrModule) -> Option<String> {
        module.body.iter().find_map(|stmt| match &stmt.kind {
            IrStmtKind::Var(decl) => decl.declarators[0].init.as_ref().and_then(|init| match &init.kind {
                IrKind::Call { callee, .. } => callee.as_ident().map(str::to_string),
                _ => None,
            }),
            _ => None,
        })
    }

    #[test]
    fn test_creator_calls_renamed() {
        let (module, renamer) = renamed("const [a, setA] = signal(0);\nconst b = memo(() => a() * 2);");
        assert_eq!(first_init_callee(&module).as_deref(), Some("createSignal"));
        assert_eq!(renamer.renamed, 2);
        assert_eq!(
            renamer.runtime_symbols.iter().cloned().collect::<Vec<_>>(),
            vec!["createMemo".to_string(), "createSignal".to_string()]
        );
    }

    #[test]
    fn test_shadowed_creator_left_alone() {
        let (module, renamer) = renamed("function signal(v) { return v; }\nconst x = signal(1);");
        assert_eq!(first_init_callee(&module).as_deref(), Some("signal"));
        assert!(renamer.runtime_symbols.is_empty());
    }

    #[test]
    fn test_runtime_spelling_is_recorded_not_counted() {
        let (_, renamer) = renamed("const [a, setA] = createSignal(0);");
        assert_eq!(renamer.renamed, 0);
        assert!(renamer.runtime_symbols.contains("createSignal"));
    }
}
