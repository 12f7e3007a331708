#[cfg(test)]
mod scanner_tests {
    use mython::error::MythonError;
    use mython::scanner::*;
    use mython::token::*;

    fn kinds(source: &str) -> Vec<&'static str> {
        Scanner::new(source)
            .filter_map(Result::ok)
            .map(|t| t.kind())
            .collect()
    }

    fn assert_token_sequence(source: &str, expected: &[(TokenType, &str)]) {
        let scanner = Scanner::new(source);
        let tokens: Vec<_> = scanner.filter_map(Result::ok).collect();

        assert_eq!(tokens.len(), expected.len());

        for (actual, (expected_type, expected_lexeme)) in tokens.iter().zip(expected.iter()) {
            assert_eq!(actual.token_type, *expected_type);
            assert_eq!(actual.lexeme, *expected_lexeme);
        }
    }

    #[test]
    fn test_scanner_01_assignment() {
        assert_token_sequence(
            "x = 4\n",
            &[
                (TokenType::IDENTIFIER, "x"),
                (TokenType::EQUAL, "="),
                (TokenType::NUMBER(4), "4"),
                (TokenType::NEWLINE, ""),
                (TokenType::EOF, ""),
            ],
        );
    }

    #[test]
    fn test_scanner_02_operators() {
        assert_eq!(
            kinds("a == b != c <= d >= e < f > g = h + i - j * k / l (m, n.o):\n"),
            vec![
                "IDENTIFIER",
                "EQUAL_EQUAL",
                "IDENTIFIER",
                "BANG_EQUAL",
                "IDENTIFIER",
                "LESS_EQUAL",
                "IDENTIFIER",
                "GREATER_EQUAL",
                "IDENTIFIER",
                "LESS",
                "IDENTIFIER",
                "GREATER",
                "IDENTIFIER",
                "EQUAL",
                "IDENTIFIER",
                "PLUS",
                "IDENTIFIER",
                "MINUS",
                "IDENTIFIER",
                "STAR",
                "IDENTIFIER",
                "SLASH",
                "IDENTIFIER",
                "LEFT_PAREN",
                "IDENTIFIER",
                "COMMA",
                "IDENTIFIER",
                "DOT",
                "IDENTIFIER",
                "RIGHT_PAREN",
                "COLON",
                "NEWLINE",
                "EOF",
            ]
        );
    }

    #[test]
    fn test_scanner_03_keywords() {
        assert_eq!(
            kinds("class def return if else print and or not None True False none self\n"),
            vec![
                "CLASS",
                "DEF",
                "RETURN",
                "IF",
                "ELSE",
                "PRINT",
                "AND",
                "OR",
                "NOT",
                "NONE",
                "TRUE",
                "FALSE",
                "IDENTIFIER",
                "IDENTIFIER",
                "NEWLINE",
                "EOF",
            ]
        );
    }

    #[test]
    fn test_indent_and_dedent() {
        let source = "class A:\n  def f():\n    return 1\nprint 2\n";

        assert_eq!(
            kinds(source),
            vec![
                "CLASS",
                "IDENTIFIER",
                "COLON",
                "NEWLINE",
                "INDENT",
                "DEF",
                "IDENTIFIER",
                "LEFT_PAREN",
                "RIGHT_PAREN",
                "COLON",
                "NEWLINE",
                "INDENT",
                "RETURN",
                "NUMBER",
                "NEWLINE",
                "DEDENT",
                "DEDENT",
                "PRINT",
                "NUMBER",
                "NEWLINE",
                "EOF",
            ]
        );
    }

    #[test]
    fn test_missing_final_newline_closes_blocks() {
        assert_eq!(kinds("print 1"), vec!["PRINT", "NUMBER", "NEWLINE", "EOF"]);

        assert_eq!(
            kinds("if True:\n  x = 1"),
            vec![
                "IF",
                "TRUE",
                "COLON",
                "NEWLINE",
                "INDENT",
                "IDENTIFIER",
                "EQUAL",
                "NUMBER",
                "NEWLINE",
                "DEDENT",
                "EOF",
            ]
        );
    }

    #[test]
    fn test_blank_and_comment_lines_are_invisible() {
        let source = "x = 1\n\n   \n# comment\n     # indented comment\ny = 2 # trailing\n";

        assert_eq!(
            kinds(source),
            vec![
                "IDENTIFIER",
                "EQUAL",
                "NUMBER",
                "NEWLINE",
                "IDENTIFIER",
                "EQUAL",
                "NUMBER",
                "NEWLINE",
                "EOF",
            ]
        );
    }

    #[test]
    fn test_carriage_returns() {
        assert_eq!(
            kinds("x = 1\r\n\r\ny = 2\r\n"),
            vec![
                "IDENTIFIER",
                "EQUAL",
                "NUMBER",
                "NEWLINE",
                "IDENTIFIER",
                "EQUAL",
                "NUMBER",
                "NEWLINE",
                "EOF",
            ]
        );

        // A lone '\r' before code is whitespace, not the end of the line.
        assert_eq!(kinds("\rprint 1"), vec!["PRINT", "NUMBER", "NEWLINE", "EOF"]);
        assert_eq!(
            kinds("if True:\n  \rprint 1\n"),
            vec![
                "IF", "TRUE", "COLON", "NEWLINE", "INDENT", "PRINT", "NUMBER", "NEWLINE", "DEDENT",
                "EOF",
            ]
        );
        assert_eq!(kinds("x\n  \r# note\n"), vec!["IDENTIFIER", "NEWLINE", "EOF"]);
    }

    #[test]
    fn test_empty_source_yields_only_eof() {
        assert_eq!(kinds(""), vec!["EOF"]);
        assert_eq!(kinds("\n\n# nothing here\n"), vec!["EOF"]);
    }

    #[test]
    fn test_string_literals_and_escapes() {
        let source = r#"print 'hello', "wo\"rld", 'a\nb', 'it\'s', "tab\there""#;
        let strings: Vec<String> = Scanner::new(source)
            .filter_map(Result::ok)
            .filter_map(|t| match t.token_type {
                TokenType::STRING(s) => Some(s),
                _ => None,
            })
            .collect();

        assert_eq!(
            strings,
            vec!["hello", "wo\"rld", "a\nb", "it's", "tab\there"]
        );
    }

    #[test]
    fn test_number_payload() {
        let tokens: Vec<_> = Scanner::new("12345").filter_map(Result::ok).collect();

        assert!(matches!(tokens[0].token_type, TokenType::NUMBER(12345)));
        assert_eq!(tokens[0].to_string(), "NUMBER 12345 12345");
    }

    #[test]
    fn test_unterminated_string_is_an_error() {
        let results: Vec<_> = Scanner::new("x = 'abc\ny = 1\n").collect();

        assert!(results
            .iter()
            .any(|r| matches!(r, Err(MythonError::Lex { line: 1, .. }))));
    }

    #[test]
    fn test_odd_indentation_is_an_error() {
        let results: Vec<_> = Scanner::new("if True:\n   x = 1\n").collect();

        assert!(results
            .iter()
            .any(|r| matches!(r, Err(MythonError::Lex { line: 2, .. }))));
    }

    #[test]
    fn test_unexpected_chars_token_sequence() {
        let results: Vec<_> = Scanner::new("x ! y $").collect();

        assert!(matches!(results[0], Ok(ref t) if t.token_type == TokenType::IDENTIFIER));
        assert!(matches!(results[1], Err(MythonError::Lex { .. })));
        assert!(matches!(results[2], Ok(ref t) if t.lexeme == "y"));
        assert!(matches!(results[3], Err(MythonError::Lex { .. })));
        assert!(matches!(results[4], Ok(ref t) if t.token_type == TokenType::NEWLINE));
        assert!(matches!(results[5], Ok(ref t) if t.token_type == TokenType::EOF));
        assert_eq!(results.len(), 6);
    }

    #[test]
    fn test_line_numbers() {
        let tokens: Vec<_> = Scanner::new("a\n\nb\n").filter_map(Result::ok).collect();

        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[1].line, 1); // NEWLINE closing line 1
        assert_eq!(tokens[2].lexeme, "b");
        assert_eq!(tokens[2].line, 3);
    }
}
