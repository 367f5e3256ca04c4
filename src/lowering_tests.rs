#[cfg(test)]
mod tests {
    use crate::ir::*;
    use crate::lowering::lower;
    use crate::parse::parse_source;

    fn lowered(source: &str) -> IrModule {
        let parsed = parse_source(source);
        assert!(parsed.diagnostics.is_empty(), "unexpected diagnostics: {:?}", parsed.diagnostics);
        lower(&parsed.program)
    }

    fn first_init(module: &IrModule) -> &IrNode {
        match &module.body[0].kind {
            IrStmtKind::Var(decl) => decl.declarators[0].init.as_ref().expect("initializer"),
            other => panic!("expected var, got {:?}", other),
        }
    }

    /// Depth-first count of every node reachable through `children()`.
    fn count_nodes(node: &IrNode) -> usize {
        1 + node.children().into_iter().map(count_nodes).sum::<usize>()
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // DEEP LOWERING
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_nested_literals_are_lowered_recursively() {
        let module = lowered("const v = { a: [1, { b: c + 1 }], ...rest };");
        let IrKind::Object(props) = &first_init(&module).kind else {
            panic!("expected object");
        };
        let IrPropertyKind::KeyValue { value, .. } = &props[0].kind else {
            panic!("expected key/value");
        };
        let IrKind::Array(items) = &value.kind else {
            panic!("expected array");
        };
        let Some(IrNode {
            kind: IrKind::Object(inner),
            ..
        }) = &items[1]
        else {
            panic!("expected nested object");
        };
        let IrPropertyKind::KeyValue { value, .. } = &inner[0].kind else {
            panic!("expected nested key/value");
        };
        assert!(matches!(value.kind, IrKind::Binary { .. }));
        assert!(matches!(props[1].kind, IrPropertyKind::Spread(_)));
    }

    #[test]
    fn test_every_expression_node_has_a_counterpart() {
        // object, array, 1, inner object, binary, c, 1, rest
        let module = lowered("const v = { a: [1, { b: c + 1 }], ...rest };");
        assert_eq!(count_nodes(first_init(&module)), 8);
    }

    #[test]
    fn test_markup_attributes_and_children_are_lowered() {
        let module = lowered("const v = <ul class={cls()}>{items().map((i) => <li>{i}</li>)}<Item n={1} /></ul>;");
        let IrKind::Element(ul) = &first_init(&module).kind else {
            panic!("expected element");
        };
        assert_eq!(ul.tag, "ul");
        assert!(matches!(ul.attrs[0].value().map(|v| &v.kind), Some(IrKind::Call { .. })));
        assert_eq!(ul.children.len(), 2);
        assert!(matches!(ul.children[0].kind, IrKind::Call { .. }));
        let IrKind::ComponentCall(item) = &ul.children[1].kind else {
            panic!("expected component call");
        };
        assert_eq!(item.callee, "Item");
        assert!(matches!(
            item.props[0].value().map(|v| &v.kind),
            Some(IrKind::Literal(Literal::Number(n))) if n == "1"
        ));
    }

    #[test]
    fn test_markup_text_is_normalized() {
        let module = lowered("const v = <p>\n    Hello,\n    world &amp; all\n  {x}   </p>;");
        let IrKind::Element(p) = &first_init(&module).kind else {
            panic!("expected element");
        };
        assert_eq!(p.children.len(), 3);
        assert!(matches!(&p.children[0].kind, IrKind::Text(t) if t == "Hello, world & all"));
        assert!(matches!(&p.children[2].kind, IrKind::Text(t) if t == "   "));
    }

    #[test]
    fn test_single_line_space_between_children_is_kept() {
        let module = lowered("const v = <p>Total: {x()} <Child /></p>;");
        let IrKind::Element(p) = &first_init(&module).kind else {
            panic!("expected element");
        };
        assert_eq!(p.children.len(), 4);
        assert!(matches!(&p.children[0].kind, IrKind::Text(t) if t == "Total: "));
        assert!(matches!(&p.children[2].kind, IrKind::Text(t) if t == " "));
        assert!(matches!(p.children[3].kind, IrKind::ComponentCall(_)));
    }

    #[test]
    fn test_empty_expression_children_vanish() {
        let module = lowered("const v = <div>{/* note */}{}</div>;");
        let IrKind::Element(div) = &first_init(&module).kind else {
            panic!("expected element");
        };
        assert!(div.children.is_empty());
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // DECLARATIONS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_type_only_declarations_disappear() {
        let module = lowered(
            "interface A { x: number }\n\
             type B = A;\n\
             import type { C } from \"./c\";\n\
             import { type D } from \"./d\";\n\
             export type { A };\n\
             const e = 1;",
        );
        assert_eq!(module.body.len(), 1);
        assert!(matches!(module.body[0].kind, IrStmtKind::Var(_)));
    }

    #[test]
    fn test_side_effect_import_survives() {
        let module = lowered("import \"./reset.css\";");
        let IrStmtKind::Import(import) = &module.body[0].kind else {
            panic!("expected import");
        };
        assert!(import.is_empty());
        assert_eq!(import.source, "./reset.css");
    }

    #[test]
    fn test_component_flag_and_type_annotations() {
        let module = lowered("component Counter(props: Props) { const n: Signal<number> = signal(0); }");
        let IrStmtKind::Function(function) = &module.body[0].kind else {
            panic!("expected function");
        };
        assert!(function.is_component);
        assert_eq!(function.params[0].type_annotation.as_deref(), Some("Props"));
        let IrStmtKind::Var(decl) = &function.body[0].kind else {
            panic!("expected var");
        };
        assert_eq!(decl.declarators[0].type_annotation.as_deref(), Some("Signal<number>"));
    }

    #[test]
    fn test_enum_members_number_from_last_value() {
        let module = lowered("enum E { A = 2, B, C = \"c\", D = -1, F }");
        let IrKind::Object(props) = &first_init(&module).kind else {
            panic!("expected object");
        };
        let values: Vec<String> = props
            .iter()
            .map(|p| match &p.kind {
                IrPropertyKind::KeyValue { value, .. } => match &value.kind {
                    IrKind::Literal(Literal::Number(n)) => n.clone(),
                    IrKind::Literal(Literal::String(s)) => format!("{:?}", s),
                    IrKind::Unary { .. } => "unary".to_string(),
                    other => format!("{:?}", other),
                },
                other => format!("{:?}", other),
            })
            .collect();
        assert_eq!(values, vec!["2", "3", "\"c\"", "unary", "0"]);
    }

    #[test]
    fn test_assertions_are_erased_in_place() {
        let module = lowered("const v = (x as number)!;");
        let IrKind::Paren(inner) = &first_init(&module).kind else {
            panic!("expected parens");
        };
        assert_eq!(inner.as_ident(), Some("x"));
    }
}
