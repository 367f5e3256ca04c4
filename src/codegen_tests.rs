#[cfg(test)]
mod tests {
    use crate::compile::{compile, CompileResult};
    use crate::diagnostics::SEM_UNDECLARED_VARIABLE;
    use crate::escape::unescape;
    use crate::options::CompileOptions;
    use pretty_assertions::assert_eq;

    fn compiled(source: &str) -> CompileResult {
        compile(source, &CompileOptions::default())
    }

    fn symbols(result: &CompileResult, module: &str) -> Vec<String> {
        result.imports.get(module).cloned().unwrap_or_default()
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // REACTIVE CHILDREN
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_bare_getter_child_is_passed_inline() {
        let result = compiled(
            "import { signal } from \"@weft/runtime\";\n\
             export component Counter() {\n\
               const [count, setCount] = signal(0);\n\
               return <p>{count()}</p>;\n\
             }",
        );
        assert!(!result.has_errors);
        assert_eq!(
            result.code,
            "import { createSignal } from \"@weft/runtime\";\n\
             import { t_element } from \"@weft/runtime/dom\";\n\
             \n\
             export function Counter() {\n  \
               const [count, setCount] = createSignal(0);\n  \
               return t_element(\"p\", {}, [count]);\n\
             }\n"
        );
        assert_eq!(symbols(&result, "@weft/runtime"), vec!["createSignal"]);
        assert_eq!(symbols(&result, "@weft/runtime/dom"), vec!["t_element"]);
    }

    #[test]
    fn test_derived_child_is_wired_at_its_index() {
        let result = compiled(
            "export component Counter() {\n\
               const [count, setCount] = signal(0);\n\
               return <p>Total: {count() + 1}</p>;\n\
             }",
        );
        assert_eq!(
            result.code,
            "import { createSignal } from \"@weft/runtime\";\n\
             import { $wire, t_element } from \"@weft/runtime/dom\";\n\
             \n\
             export function Counter() {\n  \
               const [count, setCount] = createSignal(0);\n  \
               return (() => {\n    \
                 const _el$0 = t_element(\"p\", {}, [\"Total: \"]);\n    \
                 $wire(_el$0, () => count() + 1, 1);\n    \
                 return _el$0;\n  \
               })();\n\
             }\n"
        );
    }

    #[test]
    fn test_type_annotated_memo_stays_reactive() {
        let result = compiled(
            "export component Doubler() {\n\
               const [n, setN] = signal(0);\n\
               const d: () => number = memo(() => n() * 2);\n\
               return <p>{d()} {d() + 1}</p>;\n\
             }",
        );
        assert_eq!(
            result.code,
            "import { createMemo, createSignal } from \"@weft/runtime\";\n\
             import { $wire, t_element } from \"@weft/runtime/dom\";\n\
             \n\
             export function Doubler() {\n  \
               const [n, setN] = createSignal(0);\n  \
               const d = createMemo(() => n() * 2);\n  \
               return (() => {\n    \
                 const _el$0 = t_element(\"p\", {}, [d, \" \"]);\n    \
                 $wire(_el$0, () => d() + 1, 2);\n    \
                 return _el$0;\n  \
               })();\n\
             }\n"
        );
    }

    #[test]
    fn test_fragment_with_reactive_child() {
        let result = compiled(
            "export component Twice() {\n\
               const [n, setN] = signal(1);\n\
               return <>{n() * 2}</>;\n\
             }",
        );
        assert!(result.code.contains("const _el$0 = t_fragment([]);"));
        assert!(result.code.contains("$wire(_el$0, () => n() * 2, 0);"));
        assert_eq!(symbols(&result, "@weft/runtime/dom"), vec!["$wire", "t_fragment"]);
    }

    #[test]
    fn test_static_markup_needs_no_wrapper() {
        let result = compiled("export const v = <ul class=\"menu\"><li>one</li><li>two</li></ul>;");
        assert_eq!(
            result.code,
            "import { t_element } from \"@weft/runtime/dom\";\n\
             \n\
             export const v = t_element(\"ul\", { class: \"menu\" }, [t_element(\"li\", {}, [\"one\"]), t_element(\"li\", {}, [\"two\"])]);\n"
        );
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // ATTRIBUTES
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_dynamic_attribute_and_event_listener() {
        let result = compiled(
            "export component Field() {\n\
               const [text, setText] = signal(\"\");\n\
               return <input value={text()} onChange={(e) => setText(e.target.value)} />;\n\
             }",
        );
        assert_eq!(
            result.code,
            "import { createSignal } from \"@weft/runtime\";\n\
             import { $wireAttr, t_element } from \"@weft/runtime/dom\";\n\
             \n\
             export function Field() {\n  \
               const [text, setText] = createSignal(\"\");\n  \
               return (() => {\n    \
                 const _el$0 = t_element(\"input\", {}, []);\n    \
                 $wireAttr(_el$0, \"value\", () => text());\n    \
                 _el$0.addEventListener(\"input\", (e) => setText(e.target.value));\n    \
                 return _el$0;\n  \
               })();\n\
             }\n"
        );
    }

    #[test]
    fn test_non_identifier_attribute_keys_are_quoted() {
        let result = compiled("export const v = <div data-id=\"7\" aria-hidden />;");
        assert!(result
            .code
            .contains("t_element(\"div\", { \"data-id\": \"7\", \"aria-hidden\": true }, [])"));
    }

    #[test]
    fn test_component_props_use_getters_for_reactive_values() {
        let result = compiled(
            "import { Badge } from \"./badge\";\n\
             export component Panel() {\n\
               const [count, setCount] = signal(0);\n\
               return <Badge label=\"n\" value={count()} onPick={setCount}>{count()}</Badge>;\n\
             }",
        );
        assert_eq!(
            result.code,
            "import { createSignal } from \"@weft/runtime\";\n\
             \n\
             import { Badge } from \"./badge\";\n\
             export function Panel() {\n  \
               const [count, setCount] = createSignal(0);\n  \
               return Badge({ label: \"n\", get value() { return count(); }, onPick: setCount, children: [count] });\n\
             }\n"
        );
    }

    #[test]
    fn test_component_without_props() {
        let result = compiled("import { Icon } from \"./icon\";\nexport const v = <Icon />;");
        assert!(result.code.ends_with("export const v = Icon({});\n"));
        assert!(result.imports.is_empty());
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // MODULE SHAPE
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_registry_scoping_wraps_component_bodies() {
        let options = CompileOptions {
            unit_name: "Counter.weft".to_string(),
            registry_scoping: true,
            ..Default::default()
        };
        let result = compile("component Hello() {\n  return <p>hi</p>;\n}", &options);
        assert_eq!(
            result.code,
            "import { t_element } from \"@weft/runtime/dom\";\n\
             import { $REGISTRY } from \"@weft/runtime/registry\";\n\
             \n\
             function Hello() {\n  \
               return $REGISTRY.execute(\"Counter.weft:Hello\", () => {\n    \
                 return t_element(\"p\", {}, [\"hi\"]);\n  \
               });\n\
             }\n"
        );
    }

    #[test]
    fn test_plain_functions_are_never_registry_scoped() {
        let options = CompileOptions {
            registry_scoping: true,
            ..Default::default()
        };
        let result = compile("export function add(a, b) { return a + b; }", &options);
        assert_eq!(result.code, "export function add(a, b) {\n  return a + b;\n}\n");
    }

    #[test]
    fn test_runtime_version_banner() {
        let options = CompileOptions {
            runtime_version: "0.3.1".to_string(),
            ..Default::default()
        };
        let result = compile("export const a = 1;", &options);
        assert_eq!(result.code, "// @weft/runtime 0.3.1\nexport const a = 1;\n");
        assert_eq!(result.runtime_version, "0.3.1");
    }

    #[test]
    fn test_exports_round_trip() {
        let result = compiled("const foo = 1, bar = 2;\nexport { foo, bar };\nexport { foo as baz } from \"./utils\";");
        assert_eq!(
            result.code,
            "const foo = 1, bar = 2;\nexport { foo, bar };\nexport { foo as baz } from \"./utils\";\n"
        );
        assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    }

    #[test]
    fn test_creator_from_foreign_module_is_left_alone() {
        let result = compiled(
            "import { signal } from \"./my-signals\";\nconst [a, setA] = signal(0);\nexport { a, setA };",
        );
        assert!(result.code.contains("= signal(0);"));
        assert!(result.imports.is_empty());
    }

    #[test]
    fn test_other_runtime_specifiers_survive() {
        let result = compiled(
            "import { signal, onMount } from \"@weft/runtime\";\nconst [a, setA] = signal(0);\nonMount(() => setA(a() + 1));",
        );
        assert!(result.code.starts_with("import { createSignal, onMount } from \"@weft/runtime\";\n\n"));
        assert_eq!(result.code.matches("from \"@weft/runtime\"").count(), 1);
        assert!(result.code.contains("const [a, setA] = createSignal(0);"));
        assert_eq!(symbols(&result, "@weft/runtime"), vec!["createSignal", "onMount"]);
    }

    #[test]
    fn test_string_literals_escape_non_ascii() {
        let result = compiled("export const s = \"h\u{e9}llo \u{1F600}\";");
        assert_eq!(result.code, "export const s = \"h\\u00E9llo \\uD83D\\uDE00\";\n");
        assert_eq!(unescape("h\\u00E9llo \\uD83D\\uDE00"), "h\u{e9}llo \u{1F600}");
    }

    #[test]
    fn test_errors_do_not_suppress_output() {
        let result = compiled("export const v = missing + 1;");
        assert!(result.has_errors);
        assert_eq!(result.errors().next().map(|d| d.code.as_str()), Some(SEM_UNDECLARED_VARIABLE));
        assert_eq!(result.code, "export const v = missing + 1;\n");
    }
}
