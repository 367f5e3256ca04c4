#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::diagnostics::{PARSE_INVALID_TARGET, PARSE_MISMATCHED_TAG};
    use crate::parse::parse_source;

    fn body(source: &str) -> Vec<Stmt> {
        let result = parse_source(source);
        assert!(result.diagnostics.is_empty(), "unexpected diagnostics: {:?}", result.diagnostics);
        result.program.body
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // RESILIENCE
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_one_malformed_statement_among_valid_ones() {
        let source = "const a = 1;\nconst b = 2;\nconst = ;\nconst d = 4;\nfunction e() {}";
        let result = parse_source(source);
        assert_eq!(result.program.body.len(), 4);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].code, PARSE_INVALID_TARGET);
        assert_eq!(result.diagnostics[0].location.line, 3);
    }

    #[test]
    fn test_unclosed_delimiters_recover_at_next_line() {
        for broken in ["foo(1, ;", "const b = [1, 2;", "if (a {\n  run();\n}"] {
            let source = format!("const a = 1;\n{}\nconst c = 3;\nconst d = 4;", broken);
            let result = parse_source(&source);
            assert_eq!(result.diagnostics.len(), 1, "{}: {:?}", broken, result.diagnostics);
            assert_eq!(result.diagnostics[0].location.line, 2, "{}", broken);
            assert_eq!(result.program.body.len(), 3, "{}", broken);
        }
    }

    #[test]
    fn test_semicolon_after_multiline_unclosed_call_ends_recovery() {
        let result = parse_source("foo(1,\n  2 ;\nbar();");
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.program.body.len(), 1);
        assert!(matches!(result.program.body[0].kind, StmtKind::Expr(_)));
    }

    #[test]
    fn test_unclosed_paren_does_not_swallow_enclosing_brace() {
        let result = parse_source("function f() {\n  foo(1,\n}\nconst z = 1;");
        assert_eq!(result.diagnostics.len(), 1, "{:?}", result.diagnostics);
        assert_eq!(result.program.body.len(), 2);
        assert!(matches!(result.program.body[0].kind, StmtKind::Function(_)));
    }

    #[test]
    fn test_error_inside_block_keeps_enclosing_function() {
        let source = "function f() {\n  let x = ;\n  return 1;\n}\nconst y = 2;";
        let result = parse_source(source);
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.program.body.len(), 2);
        let StmtKind::Function(function) = &result.program.body[0].kind else {
            panic!("expected a function");
        };
        assert!(matches!(function.body.last().map(|s| &s.kind), Some(StmtKind::Return(Some(_)))));
    }

    #[test]
    fn test_mismatched_closing_tag() {
        let result = parse_source("const v = <div><span></div></span>;");
        assert!(result.diagnostics.iter().any(|d| d.code == PARSE_MISMATCHED_TAG));
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // DECLARATIONS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_destructuring_with_annotation() {
        let stmts = body("const [count, setCount]: [number, Setter] = signal(0);\nlet { a, b: c = 1, ...rest } = obj;");
        let StmtKind::Var(decl) = &stmts[0].kind else {
            panic!("expected var");
        };
        let names: Vec<String> = decl.declarators[0].pattern.bound_names().into_iter().map(|n| n.0).collect();
        assert_eq!(names, vec!["count", "setCount"]);
        assert_eq!(decl.declarators[0].type_annotation.as_deref(), Some("[number, Setter]"));

        let StmtKind::Var(decl) = &stmts[1].kind else {
            panic!("expected var");
        };
        let names: Vec<String> = decl.declarators[0].pattern.bound_names().into_iter().map(|n| n.0).collect();
        assert_eq!(names, vec!["a", "c", "rest"]);
    }

    #[test]
    fn test_component_and_typescript_declarations() {
        let stmts = body(
            "interface Props extends Base { title: string }\n\
             type Id = string | number;\n\
             enum Mode { A, B }\n\
             export default component Card(props: Props) { return <div />; }",
        );
        assert!(matches!(stmts[0].kind, StmtKind::Interface(_)));
        assert!(matches!(stmts[1].kind, StmtKind::TypeAlias(_)));
        assert!(matches!(stmts[2].kind, StmtKind::Enum(_)));
        let StmtKind::Export(ExportDecl::Default(inner)) = &stmts[3].kind else {
            panic!("expected default export");
        };
        let StmtKind::Component(component) = &inner.kind else {
            panic!("expected component");
        };
        assert_eq!(component.name.as_deref(), Some("Card"));
    }

    #[test]
    fn test_async_generator_function() {
        let stmts = body("async function* gen(a: number, ...rest: string[]): AsyncGenerator<number> { yield a; }");
        let StmtKind::Function(function) = &stmts[0].kind else {
            panic!("expected function");
        };
        assert!(function.is_async && function.is_generator);
        assert_eq!(function.params.len(), 2);
        assert!(function.params[1].rest);
    }

    #[test]
    fn test_import_forms() {
        let stmts = body(
            "import \"./styles.css\";\n\
             import D, { a, b as c } from \"./m\";\n\
             import * as ns from \"./n\";\n\
             import type { T } from \"./t\";",
        );
        let imports: Vec<&ImportDecl> = stmts
            .iter()
            .filter_map(|s| match &s.kind {
                StmtKind::Import(i) => Some(i),
                _ => None,
            })
            .collect();
        assert_eq!(imports.len(), 4);
        assert!(imports[0].is_side_effect_only());
        assert_eq!(imports[1].default.as_ref().map(|b| b.name.as_str()), Some("D"));
        assert_eq!(imports[1].named[1].imported, "b");
        assert_eq!(imports[1].named[1].local.name, "c");
        assert_eq!(imports[2].namespace.as_ref().map(|b| b.name.as_str()), Some("ns"));
        assert!(imports[3].type_only);
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // EXPORTS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_export_named_list() {
        let stmts = body("const foo = 1, bar = 2;\nexport { foo, bar };");
        let StmtKind::Export(ExportDecl::Named { specifiers, source, .. }) = &stmts[1].kind else {
            panic!("expected named export");
        };
        assert!(source.is_none());
        let pairs: Vec<(&str, &str)> = specifiers.iter().map(|s| (s.local.as_str(), s.exported.as_str())).collect();
        assert_eq!(pairs, vec![("foo", "foo"), ("bar", "bar")]);
    }

    #[test]
    fn test_reexport_keeps_alias_and_source() {
        let stmts = body("export { foo as bar } from \"./utils\";\nexport * as helpers from \"./helpers\";");
        let StmtKind::Export(ExportDecl::Named { specifiers, source, .. }) = &stmts[0].kind else {
            panic!("expected named export");
        };
        assert_eq!(source.as_deref(), Some("./utils"));
        assert_eq!(specifiers[0].local, "foo");
        assert_eq!(specifiers[0].exported, "bar");
        assert!(matches!(
            &stmts[1].kind,
            StmtKind::Export(ExportDecl::All { alias: Some(alias), source }) if alias == "helpers" && source == "./helpers"
        ));
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // CONTROL FLOW
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_control_flow_surface() {
        let stmts = body(
            "for (const k in obj) {}\n\
             for (const v of list) {}\n\
             for (let i = 0; i < 3; i++) continue;\n\
             while (x) break;\n\
             do { x--; } while (x > 0);\n\
             switch (k) { case 1: case 2: f(); break; default: g(); }\n\
             try { risky(); } catch (e) { log(e); } finally { done(); }\n\
             label: for (;;) { break label; }",
        );
        assert!(matches!(stmts[0].kind, StmtKind::ForIn { .. }));
        assert!(matches!(stmts[1].kind, StmtKind::ForOf { .. }));
        assert!(matches!(stmts[2].kind, StmtKind::For { .. }));
        assert!(matches!(stmts[3].kind, StmtKind::While { .. }));
        assert!(matches!(stmts[4].kind, StmtKind::DoWhile { .. }));
        let StmtKind::Switch { cases, .. } = &stmts[5].kind else {
            panic!("expected switch");
        };
        assert_eq!(cases.len(), 3);
        assert!(cases[0].body.is_empty());
        assert!(cases[2].test.is_none());
        assert!(matches!(stmts[6].kind, StmtKind::Try { handler: Some(_), finalizer: Some(_), .. }));
        assert!(matches!(stmts[7].kind, StmtKind::Labeled { .. }));
    }

    #[test]
    fn test_optional_semicolons() {
        let stmts = body("const a = 1\nconst b = a\n  + 2\nreturn");
        assert_eq!(stmts.len(), 3);
    }
}
