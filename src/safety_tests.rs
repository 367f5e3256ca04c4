#[cfg(test)]
mod tests {
    use crate::compile::{compile, compile_batch, compile_json, SourceUnit};
    use crate::diagnostics::{SEM_UNDECLARED_VARIABLE, SEM_UNUSED_VARIABLE};
    use crate::options::CompileOptions;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    fn units() -> Vec<SourceUnit> {
        vec![
            SourceUnit::new(
                "Counter.weft",
                "export component Counter() {\n  const [count, setCount] = signal(0);\n  \
                 return <button onClick={() => setCount(count() + 1)}>{count()}</button>;\n}",
            ),
            SourceUnit::new("broken.weft", "const a = ;\nexport const b = missing;"),
            SourceUnit::new("plain.ts", "export function add(a: number, b: number): number { return a + b; }"),
            SourceUnit::new(
                "List.weft",
                "export component List() {\n  const [items, setItems] = signal([]);\n  \
                 return <ul>{items().map((i) => <li>{i}</li>)}</ul>;\n}",
            ),
        ]
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // UNIT ISOLATION
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_declarations_do_not_leak_between_units() {
        let options = CompileOptions::default();
        let first = compile("export const shared = 1;", &options);
        assert!(!first.has_errors);

        let second = compile("export const v = shared;", &options);
        let codes: Vec<&str> = second.errors().map(|d| d.code.as_str()).collect();
        assert_eq!(codes, vec![SEM_UNDECLARED_VARIABLE]);
    }

    #[test]
    fn test_diagnostics_do_not_accumulate() {
        let options = CompileOptions::default();
        let noisy = compile("const unused = 1;", &options);
        assert_eq!(noisy.warnings().filter(|d| d.code == SEM_UNUSED_VARIABLE).count(), 1);

        let clean = compile("export const used = 1;", &options);
        assert!(clean.diagnostics.is_empty());
    }

    #[test]
    fn test_element_temporaries_restart_per_unit() {
        let source = "export component A() {\n  const [n, setN] = signal(0);\n  return <p>{n() + 1}</p>;\n}";
        let options = CompileOptions::default();
        let first = compile(source, &options);
        let second = compile(source, &options);
        assert!(first.code.contains("_el$0"));
        assert_eq!(first.code, second.code);
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // BATCH
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_batch_matches_sequential_compilation() {
        let options = CompileOptions {
            registry_scoping: true,
            ..Default::default()
        };
        let units = units();
        let batch = compile_batch(&units, &options);
        assert_eq!(batch.len(), units.len());

        for (unit, result) in units.iter().zip(&batch) {
            let mut unit_options = options.clone();
            unit_options.unit_name = unit.name.clone();
            let sequential = compile(&unit.source, &unit_options);
            assert_eq!(result.code, sequential.code, "unit {}", unit.name);
            assert_eq!(result.records, sequential.records, "unit {}", unit.name);
            assert_eq!(result.imports, sequential.imports, "unit {}", unit.name);
        }
    }

    #[test]
    fn test_batch_keys_registry_by_unit_name() {
        let options = CompileOptions {
            registry_scoping: true,
            ..Default::default()
        };
        let batch = compile_batch(&units(), &options);
        assert!(batch[0].code.contains("$REGISTRY.execute(\"Counter.weft:Counter\""));
        assert!(batch[3].code.contains("$REGISTRY.execute(\"List.weft:List\""));
    }

    #[test]
    fn test_broken_unit_does_not_affect_neighbours() {
        let batch = compile_batch(&units(), &CompileOptions::default());
        assert!(batch[1].has_errors);
        assert!(!batch[0].has_errors);
        assert!(!batch[2].has_errors);
        assert!(!batch[3].has_errors);
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // JSON BOUNDARY
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_json_result_shape() {
        let json = compile_json("const a = ;", "").unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["hasErrors"], Value::Bool(true));
        assert!(value["code"].is_string());
        assert!(value.get("symbolTable").is_none());
        let first = &value["diagnostics"][0];
        assert_eq!(first["code"], "PARSE001");
        assert_eq!(first["line"], 1);
    }

    #[test]
    fn test_json_debug_exposes_tables() {
        let json = compile_json(
            "export component C() {\n  const [a, setA] = signal(0);\n  return <p onClick={() => setA(1)}>{a()}</p>;\n}",
            r#"{"debug": true, "debugPhases": ["emit"]}"#,
        )
        .unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert!(value["symbolTable"]["scopes"].is_array());
        let entries = value["reactiveBindings"]["entries"].as_array().unwrap();
        assert_eq!(entries[0]["name"], "a");
        assert_eq!(entries[0]["role"], "getter");
    }

    #[test]
    fn test_json_rejects_malformed_options() {
        assert!(compile_json("const a = 1;", "{not json").is_err());
    }
}
