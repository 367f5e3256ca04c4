#[cfg(test)]
mod tests {
    use crate::diagnostics::{LEX_ITERATION_CAP, LEX_UNTERMINATED_STRING, LEX_UNTERMINATED_TEMPLATE};
    use crate::lexer::{tokenize, Lexer};
    use crate::token::{Token, TokenKind};
    use proptest::prelude::*;

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    fn significant(text: &str) -> String {
        text.chars().filter(|c| !c.is_whitespace()).collect()
    }

    fn joined(tokens: &[Token]) -> String {
        tokens.iter().map(|t| t.lexeme.as_str()).collect()
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // ROUND TRIP
    // ═══════════════════════════════════════════════════════════════════════════════

    fn fragment() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-z][a-zA-Z0-9_]{0,6}".prop_map(|s| s),
            "[0-9]{1,4}".prop_map(|s| s),
            Just("+".to_string()),
            Just("=".to_string()),
            Just("===".to_string()),
            Just("(".to_string()),
            Just(")".to_string()),
            Just(";".to_string()),
            Just(",".to_string()),
            Just("\"str\"".to_string()),
            Just("`t ${x} u`".to_string()),
            Just("<p>hi {v}</p>".to_string()),
            Just("<input value={a} />".to_string()),
        ]
    }

    proptest! {
        #[test]
        fn prop_lexemes_reproduce_significant_source(parts in prop::collection::vec(fragment(), 1..24)) {
            let source = parts.join(" ");
            let tokens = tokenize(&source);
            prop_assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
            prop_assert_eq!(significant(&joined(&tokens)), significant(&source));
        }
    }

    #[test]
    fn test_round_trip_of_component() {
        let source = "component Counter() {\n  const [count, setCount] = signal(0);\n  \
                      return <button class=\"btn\" onClick={() => setCount(count() + 1)}>Clicks: @{count}</button>;\n}";
        let tokens = tokenize(source);
        assert!(tokens.iter().all(|t| t.kind != TokenKind::Error));
        assert_eq!(significant(&joined(&tokens)), significant(source));
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // CONTEXTS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_nested_template_inside_interpolation() {
        let tokens = tokenize("`a ${`b ${c}`} d`");
        assert_eq!(
            kinds(&tokens),
            vec![
                TokenKind::TemplateStart,
                TokenKind::TemplateChunk,
                TokenKind::TemplateExprStart,
                TokenKind::TemplateStart,
                TokenKind::TemplateChunk,
                TokenKind::TemplateExprStart,
                TokenKind::Identifier,
                TokenKind::RBrace,
                TokenKind::TemplateEnd,
                TokenKind::RBrace,
                TokenKind::TemplateChunk,
                TokenKind::TemplateEnd,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_escaped_backtick_stays_in_template() {
        let tokens = tokenize(r"`a \` b \\`");
        assert_eq!(
            kinds(&tokens),
            vec![TokenKind::TemplateStart, TokenKind::TemplateChunk, TokenKind::TemplateEnd, TokenKind::Eof]
        );
        assert_eq!(tokens[1].lexeme, r"a \` b \\");
    }

    #[test]
    fn test_template_inside_attribute_inside_element() {
        let tokens = tokenize("<div title={`n: ${n + 1}`}>x</div>");
        assert!(tokens.iter().all(|t| t.kind != TokenKind::Error));
        let chunk = tokens.iter().find(|t| t.kind == TokenKind::TemplateChunk).map(|t| t.lexeme.as_str());
        assert_eq!(chunk, Some("n: "));
        let text = tokens.iter().find(|t| t.kind == TokenKind::JsxText).map(|t| t.lexeme.as_str());
        assert_eq!(text, Some("x"));
    }

    #[test]
    fn test_shorthand_only_in_markup() {
        let markup = tokenize("<p>@{count}</p>");
        assert!(markup.iter().any(|t| t.kind == TokenKind::ShorthandOpen));

        let template = tokenize("`@{count} ${total}`");
        assert!(!template.iter().any(|t| t.kind == TokenKind::ShorthandOpen));
        assert_eq!(template[1].lexeme, "@{count} ");
        assert_eq!(template[2].kind, TokenKind::TemplateExprStart);
    }

    #[test]
    fn test_less_than_after_value_is_relational() {
        let tokens = tokenize("a < b");
        assert_eq!(
            kinds(&tokens),
            vec![TokenKind::Identifier, TokenKind::Lt, TokenKind::Identifier, TokenKind::Eof]
        );
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // RECOVERY
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_unterminated_template_reports_and_ends() {
        let tokens = tokenize("const s = `abc ${x");
        let codes: Vec<&str> = tokens
            .iter()
            .filter_map(|t| t.diagnostic.as_ref())
            .map(|d| d.code.as_str())
            .collect();
        assert!(codes.contains(&LEX_UNTERMINATED_TEMPLATE));
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
    }

    #[test]
    fn test_unterminated_string_resynchronizes() {
        let tokens = tokenize("const a = \"oops\nconst b = 2;");
        assert!(tokens
            .iter()
            .any(|t| t.diagnostic.as_ref().is_some_and(|d| d.code == LEX_UNTERMINATED_STRING)));
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Number && t.lexeme == "2"));
    }

    #[test]
    fn test_iteration_cap_bounds_stream() {
        let tokens = Lexer::new("let a = 1; let b = 2; let c = 3;").with_iteration_cap(3).tokenize();
        assert!(tokens
            .iter()
            .any(|t| t.diagnostic.as_ref().is_some_and(|d| d.code == LEX_ITERATION_CAP)));
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
        assert!(tokens.len() < 10);
    }
}
