#[cfg(test)]
mod tests {
    use crate::diagnostics::*;
    use crate::options::CompileOptions;
    use crate::parse::parse_source;
    use crate::reactive::{CreatorKind, Role};
    use crate::scope::{ScopeKind, SymbolKind, GLOBAL_SCOPE};
    use crate::validate::{analyze, Analysis};

    fn analyzed_with(source: &str, options: &CompileOptions) -> Analysis {
        let parsed = parse_source(source);
        assert!(parsed.diagnostics.is_empty(), "unexpected diagnostics: {:?}", parsed.diagnostics);
        analyze(&parsed.program, options)
    }

    fn analyzed(source: &str) -> Analysis {
        analyzed_with(source, &CompileOptions::default())
    }

    fn with_code<'a>(analysis: &'a Analysis, code: &str) -> Vec<&'a Diagnostic> {
        analysis
            .errors
            .iter()
            .chain(analysis.warnings.iter())
            .filter(|d| d.code == code)
            .collect()
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // DECLARATIONS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_duplicate_reported_once_per_clash() {
        let analysis = analyzed("let a = 1;\nfunction a() {}\nconsole.log(a);");
        let dups = with_code(&analysis, SEM_DUPLICATE_DECLARATION);
        assert_eq!(dups.len(), 1);
        assert!(dups[0].message.contains("`a`"));
        assert!(dups[0].is_error());
    }

    #[test]
    fn test_shadowing_in_inner_scope_is_not_a_duplicate() {
        let analysis = analyzed("const a = 1;\nfunction f(a) { return a; }\nf(a);");
        assert!(with_code(&analysis, SEM_DUPLICATE_DECLARATION).is_empty());
    }

    #[test]
    fn test_hoisted_function_may_be_called_before_declaration() {
        let analysis = analyzed("run();\nfunction run() {}");
        assert!(analysis.errors.is_empty(), "{:?}", analysis.errors);
    }

    #[test]
    fn test_undeclared_reads_and_writes() {
        let analysis = analyzed("const a = missing + 1;\ny = a;\nconsole.log(Math.max(1, 2));");
        let undeclared: Vec<&str> = with_code(&analysis, SEM_UNDECLARED_VARIABLE)
            .iter()
            .map(|d| d.message.as_str())
            .collect();
        assert_eq!(undeclared, vec!["`missing` is not declared", "`y` is not declared"]);
    }

    #[test]
    fn test_block_bindings_do_not_escape() {
        let analysis = analyzed("{ let inner = 1; console.log(inner); }\nconsole.log(inner);");
        assert_eq!(with_code(&analysis, SEM_UNDECLARED_VARIABLE).len(), 1);
    }

    #[test]
    fn test_extra_globals_are_resolved() {
        let options = CompileOptions {
            extra_globals: vec!["__APP__".to_string()],
            ..Default::default()
        };
        let analysis = analyzed_with("console.log(__APP__);", &options);
        assert!(analysis.errors.is_empty());
    }

    #[test]
    fn test_reexport_binds_nothing_locally() {
        let analysis = analyzed("export { foo as bar } from \"./utils\";");
        assert!(analysis.errors.is_empty());
        assert!(analysis.warnings.is_empty());
        let global = analysis.symbol_table.scope(GLOBAL_SCOPE);
        assert!(global.get("foo").is_none());
        assert!(global.get("bar").is_none());
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // UNUSED BINDINGS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_unused_variable_and_import() {
        let analysis = analyzed(
            "import { helper, used } from \"./h\";\n\
             const unused = 1;\n\
             const _ignored = 2;\n\
             export const shared = 3;\n\
             console.log(used);",
        );
        let vars = with_code(&analysis, SEM_UNUSED_VARIABLE);
        assert_eq!(vars.len(), 1);
        assert!(vars[0].message.contains("`unused`"));
        assert!(!vars[0].is_error());
        let imports = with_code(&analysis, SEM_UNUSED_IMPORT);
        assert_eq!(imports.len(), 1);
        assert!(imports[0].message.contains("`helper`"));
    }

    #[test]
    fn test_type_references_count_as_use() {
        let analysis = analyzed("import { Props } from \"./p\";\nexport function f(p: Props) { return p; }");
        assert!(with_code(&analysis, SEM_UNUSED_IMPORT).is_empty());
    }

    #[test]
    fn test_unused_parameters_only_in_strict_mode() {
        let source = "export function f(a, b) { return a; }";
        assert!(with_code(&analyzed(source), SEM_UNUSED_VARIABLE).is_empty());

        let strict = CompileOptions {
            strict: true,
            ..Default::default()
        };
        let params = with_code(&analyzed_with(source, &strict), SEM_UNUSED_VARIABLE)
            .into_iter()
            .map(|d| d.message.clone())
            .collect::<Vec<_>>();
        assert_eq!(params, vec!["parameter `b` is never read".to_string()]);
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // COMPONENTS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_undeclared_component_tag() {
        let analysis = analyzed("export const v = <section><Missing /></section>;");
        let found = with_code(&analysis, SEM_UNDECLARED_COMPONENT);
        assert_eq!(found.len(), 1);
        assert!(found[0].message.contains("`Missing`"));
    }

    #[test]
    fn test_member_tag_resolves_through_its_head() {
        let analysis = analyzed("import { Card } from \"./card\";\nexport const v = <Card.Header />;");
        assert!(with_code(&analysis, SEM_UNDECLARED_COMPONENT).is_empty());
        assert!(with_code(&analysis, SEM_UNUSED_IMPORT).is_empty());
    }

    #[test]
    fn test_component_scope_and_reactive_table() {
        let analysis = analyzed(
            "export component Counter() {\n\
               const [count, setCount] = signal(0);\n\
               const doubled = memo(() => count() * 2);\n\
               return <button onClick={() => setCount(count() + 1)}>{doubled()}</button>;\n\
             }",
        );
        assert!(analysis.errors.is_empty(), "{:?}", analysis.errors);

        let scope = analysis.symbol_table.find_scope("Counter").expect("component scope");
        assert_eq!(scope.kind, ScopeKind::Component);
        let names: Vec<&str> = scope.symbols.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["count", "setCount", "doubled"]);
        assert!(scope.symbols.iter().all(|s| s.kind == SymbolKind::Variable));

        let count = analysis.reactive.get("Counter", "count").expect("count binding");
        assert_eq!((count.creator, count.role), (CreatorKind::Signal, Role::Getter));
        let setter = analysis.reactive.get("Counter", "setCount").expect("setter binding");
        assert_eq!(setter.role, Role::Setter);
        let doubled = analysis.reactive.get("Counter", "doubled").expect("memo binding");
        assert_eq!(doubled.dependencies, vec!["count".to_string()]);
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // EFFECT DEPENDENCIES
    // ═══════════════════════════════════════════════════════════════════════════════

    fn effect_unit(effect: &str) -> String {
        format!(
            "export component C() {{\n\
               const [a, setA] = signal(0);\n\
               const [b, setB] = signal(1);\n\
               {}\n\
               return <p onClick={{() => {{ setA(1); setB(2); }}}}>x</p>;\n\
             }}",
            effect
        )
    }

    #[test]
    fn test_missing_dependency_names_the_read() {
        let analysis = analyzed(&effect_unit("effect(() => { console.log(a(), b()); }, [a]);"));
        let missing = with_code(&analysis, SEM_MISSING_DEPENDENCY);
        assert_eq!(missing.len(), 1);
        assert!(missing[0].message.contains("`b`"));
        assert!(with_code(&analysis, SEM_UNNECESSARY_DEPENDENCY).is_empty());
    }

    #[test]
    fn test_unnecessary_dependency_names_the_extra() {
        let analysis = analyzed(&effect_unit("effect(() => console.log(a()), [a, b()]);"));
        let extra = with_code(&analysis, SEM_UNNECESSARY_DEPENDENCY);
        assert_eq!(extra.len(), 1);
        assert!(extra[0].message.contains("`b`"));
        assert!(with_code(&analysis, SEM_MISSING_DEPENDENCY).is_empty());
    }

    #[test]
    fn test_missing_dependency_array() {
        let analysis = analyzed(&effect_unit("effect(() => console.log(a()));"));
        let found = with_code(&analysis, SEM_MISSING_DEPENDENCY_ARRAY);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].suggestion.as_deref(), Some("pass `[a]` as the second argument"));
    }

    #[test]
    fn test_annotated_memo_is_still_a_getter() {
        let analysis = analyzed(
            "export component C() {\n\
               const [n, setN] = signal(0);\n\
               const d: () => number = memo(() => n() * 2);\n\
               effect(() => { console.log(d()); }, [d]);\n\
               return <p onClick={() => setN(1)}>{d()}</p>;\n\
             }",
        );
        assert!(with_code(&analysis, SEM_UNNECESSARY_DEPENDENCY).is_empty());
        assert!(with_code(&analysis, SEM_MISSING_DEPENDENCY).is_empty());
        let d = analysis.reactive.get("C", "d").expect("memo binding");
        assert_eq!(d.role, Role::Getter);
    }

    #[test]
    fn test_callback_locals_are_not_dependencies() {
        let analysis = analyzed(&effect_unit(
            "effect(() => { const a = () => 1; console.log(a(), b()); }, [b]);",
        ));
        assert!(with_code(&analysis, SEM_MISSING_DEPENDENCY).is_empty());
        assert!(with_code(&analysis, SEM_UNNECESSARY_DEPENDENCY).is_empty());
    }

    #[test]
    fn test_effects_outside_components_are_not_audited() {
        let analysis = analyzed("const [a, setA] = signal(0);\neffect(() => console.log(a()));\nsetA(1);");
        assert!(with_code(&analysis, SEM_MISSING_DEPENDENCY_ARRAY).is_empty());
    }
}
