#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::codegen::emit;
    use crate::lowering::lower;
    use crate::options::CompileOptions;
    use crate::parse::parse_source;
    use pretty_assertions::assert_eq;

    fn expr(source: &str) -> Expr {
        let result = parse_source(source);
        assert!(result.diagnostics.is_empty(), "unexpected diagnostics: {:?}", result.diagnostics);
        match result.program.body.into_iter().next().map(|s| s.kind) {
            Some(StmtKind::Expr(expr)) => expr,
            other => panic!("expected an expression statement, got {:?}", other),
        }
    }

    fn print(source: &str) -> String {
        let module = lower(&parse_source(source).program);
        emit(module, &CompileOptions::default()).unwrap().0
    }

    fn binary(expr: &Expr) -> (BinaryOp, &Expr, &Expr) {
        match &expr.kind {
            ExprKind::Binary { op, left, right } => (*op, left, right),
            other => panic!("expected binary, got {:?}", other),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // PRECEDENCE
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_multiplication_binds_tighter() {
        let e = expr("a + b * c;");
        let (op, left, right) = binary(&e);
        assert_eq!(op, BinaryOp::Add);
        assert_eq!(left.as_ident(), Some("a"));
        assert_eq!(binary(right).0, BinaryOp::Mul);
    }

    #[test]
    fn test_exponent_is_right_associative() {
        let e = expr("a ** b ** c;");
        let (op, left, right) = binary(&e);
        assert_eq!(op, BinaryOp::Exp);
        assert_eq!(left.as_ident(), Some("a"));
        assert_eq!(binary(right).0, BinaryOp::Exp);
    }

    #[test]
    fn test_logical_and_nullish_levels() {
        let e = expr("a || b && c;");
        let (op, _, right) = binary(&e);
        assert_eq!(op, BinaryOp::Or);
        assert_eq!(binary(right).0, BinaryOp::And);

        let e = expr("x ?? y === z;");
        let (op, _, right) = binary(&e);
        assert_eq!(op, BinaryOp::Nullish);
        assert_eq!(binary(right).0, BinaryOp::StrictEq);
    }

    #[test]
    fn test_conditional_and_assignment_nest_right() {
        let e = expr("a = b ? c : d ? e : f;");
        let ExprKind::Assign { op, value, .. } = &e.kind else {
            panic!("expected assignment");
        };
        assert_eq!(*op, AssignOp::Assign);
        let ExprKind::Conditional { alternate, .. } = &value.kind else {
            panic!("expected conditional");
        };
        assert!(matches!(alternate.kind, ExprKind::Conditional { .. }));
    }

    #[test]
    fn test_type_assertion_wraps_left_operand() {
        let e = expr("value as number + 1;");
        let (op, left, _) = binary(&e);
        assert_eq!(op, BinaryOp::Add);
        assert!(matches!(&left.kind, ExprKind::TypeAssertion { type_text, .. } if type_text == "number"));
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // ARROWS & CALLS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_arrow_forms() {
        let e = expr("(a: number, { b }, ...rest) => a;");
        let ExprKind::Arrow(arrow) = &e.kind else {
            panic!("expected arrow");
        };
        assert_eq!(arrow.params.len(), 3);
        assert_eq!(arrow.params[0].type_annotation.as_deref(), Some("number"));
        assert!(arrow.params[2].rest);

        assert_eq!(print("x => x * 2;"), "(x) => x * 2;\n");
        assert_eq!(print("async (a) => { await a; };"), "async (a) => {\n  await a;\n};\n");
        assert_eq!(print("const f = () => ({ a: 1 });"), "const f = () => ({ a: 1 });\n");
    }

    #[test]
    fn test_parenthesized_expression_is_not_an_arrow() {
        let e = expr("(a, b);");
        let ExprKind::Paren(inner) = &e.kind else {
            panic!("expected parens");
        };
        assert!(matches!(inner.kind, ExprKind::Sequence(ref items) if items.len() == 2));
    }

    #[test]
    fn test_member_chains_print_verbatim() {
        assert_eq!(print("a?.b[c]?.(d).e;"), "a?.b[c]?.(d).e;\n");
        assert_eq!(print("new Map([[1, 2]]).get(1);"), "new Map([[1, 2]]).get(1);\n");
        assert_eq!(print("user!.name;"), "user.name;\n");
    }

    #[test]
    fn test_update_and_unary_operators() {
        assert_eq!(print("i++;\n--j;"), "i++;\n--j;\n");
        assert_eq!(print("typeof x === \"string\" && !y;"), "typeof x === \"string\" && !y;\n");
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // LITERALS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_template_literal_keeps_raw_quasis() {
        let e = expr("`a ${b} c ${d + 1}`;");
        let ExprKind::Template(template) = &e.kind else {
            panic!("expected template");
        };
        assert_eq!(template.quasis, vec!["a ", " c ", ""]);
        assert_eq!(template.exprs.len(), 2);
        assert_eq!(print("tag`x\\n${y}`;"), "tag`x\\n${y}`;\n");
    }

    #[test]
    fn test_single_quoted_string_is_requoted() {
        assert_eq!(print("const s = 'it\\'s';"), "const s = \"it's\";\n");
    }

    #[test]
    fn test_object_literal_members() {
        assert_eq!(
            print("const o = { a, b: 1, [k]: 2, \"x-y\": 3, get v() { return 1; }, ...rest };"),
            "const o = { a, b: 1, [k]: 2, \"x-y\": 3, get v() {\n  return 1;\n}, ...rest };\n"
        );
    }

    #[test]
    fn test_array_holes() {
        assert_eq!(print("const a = [1, , 3, ,];"), "const a = [1, , 3, ,];\n");
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // MARKUP
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_markup_in_expression_position() {
        let e = expr("cond ? <A /> : <b>{x}</b>;");
        let ExprKind::Conditional {
            consequent, alternate, ..
        } = &e.kind
        else {
            panic!("expected conditional");
        };
        let ExprKind::Element(a) = &consequent.kind else {
            panic!("expected element");
        };
        assert!(a.is_component() && a.self_closing);
        let ExprKind::Element(b) = &alternate.kind else {
            panic!("expected element");
        };
        assert_eq!(b.name, "b");
        assert!(matches!(b.children[0].kind, JsxChildKind::Expr(_)));
    }

    #[test]
    fn test_markup_attributes_and_children() {
        let e = expr("<div class=\"a &amp; b\" hidden {...rest} data-id={id}>hi @{count} <></></div>;");
        let ExprKind::Element(el) = &e.kind else {
            panic!("expected element");
        };
        assert_eq!(el.attributes.len(), 4);
        assert!(matches!(
            &el.attributes[0],
            Attribute::Named { name, value: Some(AttrValue::String(v)), .. } if name == "class" && v == "a & b"
        ));
        assert!(matches!(&el.attributes[1], Attribute::Named { value: None, .. }));
        assert!(matches!(&el.attributes[2], Attribute::Spread { .. }));
        let shorthand = el.children.iter().find_map(|c| match &c.kind {
            JsxChildKind::Shorthand(e) => Some(e),
            _ => None,
        });
        let Some(Expr {
            kind: ExprKind::Call { callee, args, .. },
            ..
        }) = shorthand
        else {
            panic!("expected shorthand getter call");
        };
        assert_eq!(callee.as_ident(), Some("count"));
        assert!(args.is_empty());
        assert!(el.children.iter().any(|c| matches!(c.kind, JsxChildKind::Fragment(_))));
    }

    #[test]
    fn test_member_and_namespaced_tags() {
        let e = expr("<Card.Header><svg:rect /></Card.Header>;");
        let ExprKind::Element(el) = &e.kind else {
            panic!("expected element");
        };
        assert_eq!(el.name, "Card.Header");
        assert!(el.is_component());
        let JsxChildKind::Element(inner) = &el.children[0].kind else {
            panic!("expected nested element");
        };
        assert_eq!(inner.name, "svg:rect");
        assert!(!inner.is_component());
    }
}
