#[cfg(test)]
mod parser_tests {
    use mython::ast::Statement;
    use mython::ast_printer::AstPrinter;
    use mython::error::{MythonError, Result};
    use mython::parser::Parser;
    use mython::scanner::Scanner;
    use mython::token::Token;

    fn parse(source: &str) -> Result<Statement> {
        let tokens: Vec<Token<'_>> = Scanner::new(source).collect::<Result<_>>()?;
        Parser::new(&tokens).parse()
    }

    fn sexpr(source: &str) -> String {
        let program = parse(source).expect("program should parse");
        AstPrinter.print(&program)
    }

    fn parse_error_line(source: &str) -> usize {
        match parse(source) {
            Err(MythonError::Parse { line, .. }) => line,
            other => panic!("expected a parse error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_arithmetic_precedence() {
        assert_eq!(sexpr("x = 1 + 2 * 3\n"), "(block (= x (+ 1 (* 2 3))))");
        assert_eq!(sexpr("x = (1 + 2) * 3\n"), "(block (= x (* (+ 1 2) 3)))");
        assert_eq!(sexpr("x = 36 / 4 / 3\n"), "(block (= x (/ (/ 36 4) 3)))");
        assert_eq!(sexpr("x = 1 - 2 - 3\n"), "(block (= x (- (- 1 2) 3)))");
    }

    #[test]
    fn test_print_forms() {
        assert_eq!(sexpr("print 1, 'a', None\n"), r#"(block (print 1 "a" None))"#);
        assert_eq!(sexpr("print\n"), "(block (print))");
        assert_eq!(sexpr("print True, False\n"), "(block (print True False))");
    }

    #[test]
    fn test_unary_minus() {
        assert_eq!(sexpr("print -8, -x\n"), "(block (print -8 (- 0 x)))");
    }

    #[test]
    fn test_logical_and_comparison_precedence() {
        assert_eq!(
            sexpr("x = a <= b and not c == d or e\n"),
            "(block (= x (or (and (<= a b) (not (== c d))) e)))"
        );
    }

    #[test]
    fn test_classes_and_calls() {
        let source = r"class A:
  def __init__(v):
    self.v = v

class B(A):
  def get():
    return self.v

b = B(1)
print b.get(), str(b.v)
";

        assert_eq!(
            sexpr(source),
            "(block \
             (class A (def __init__ (v) (block (= self.v v)))) \
             (class B (A) (def get () (block (return self.v)))) \
             (= b (new B 1)) \
             (print (call b.get) (str b.v)))"
        );
    }

    #[test]
    fn test_method_bodies_can_instantiate_their_class() {
        let source = r"class P:
  def twin():
    return P()
";

        assert_eq!(
            sexpr(source),
            "(block (class P (def twin () (block (return (new P))))))"
        );
    }

    #[test]
    fn test_if_else() {
        let source = r"if x > 1:
  print 1
else:
  print 2
";

        assert_eq!(
            sexpr(source),
            "(block (if (> x 1) (block (print 1)) (block (print 2))))"
        );

        assert_eq!(
            sexpr("if x:\n  print 1\nprint 2\n"),
            "(block (if x (block (print 1))) (print 2))"
        );
    }

    #[test]
    fn test_chained_method_calls_and_field_assignment() {
        assert_eq!(
            sexpr("x.a.b.m(1).n()\n"),
            "(block (call (call x.a.b.m 1).n))"
        );
        assert_eq!(sexpr("a.next.v = 3\n"), "(block (= a.next.v 3))");
    }

    #[test]
    fn test_bare_return() {
        let source = "class A:\n  def f():\n    return\n";

        assert_eq!(
            sexpr(source),
            "(block (class A (def f () (block (return None)))))"
        );
    }

    #[test]
    fn test_unknown_class_is_rejected() {
        assert_eq!(parse_error_line("x = 1\ny = Foo()\n"), 2);
    }

    #[test]
    fn test_unknown_parent_class_is_rejected() {
        assert_eq!(parse_error_line("class B(A):\n  def f():\n    return 1\n"), 1);
    }

    #[test]
    fn test_invalid_assignment_target() {
        assert_eq!(parse_error_line("1 = 2\n"), 1);
        assert_eq!(parse_error_line("x.f() = 2\n"), 1);
    }

    #[test]
    fn test_unbalanced_parenthesis() {
        assert_eq!(parse_error_line("print (1\n"), 1);
    }

    #[test]
    fn test_empty_program() {
        assert_eq!(sexpr(""), "(block)");
        assert_eq!(AstPrinter.print(&Parser::new(&[]).parse().unwrap()), "(block)");
    }
}
