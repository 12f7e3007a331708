/*!
Recursive‑descent parser turning a Mython token stream into a [`Statement`]
tree rooted at a `Compound`.

Time is Θ(n) in the number of tokens: each token is consumed once via
`advance()` and no production rescans input.  Call‑stack depth grows with
syntactic nesting.

### Logging Policy

| Location                     | Level  | Purpose                                   |
|------------------------------|--------|-------------------------------------------|
| `Parser::new`, `parse`       | `info` | Lifecycle milestones.                     |
| `statement`, class bodies    | `debug`| High‑level descent into grammar branches. |

--------------------------------------------------------------------------------
Grammar (EBNF)
--------------------------------------------------------------------------------

```text
program     → statement* EOF ;
statement   → classDef | ifElse | simple NEWLINE ;
classDef    → "class" IDENT ( "(" IDENT ")" )? ":" NEWLINE INDENT methodDef+ DEDENT ;
methodDef   → "def" IDENT "(" params? ")" ":" suite ;
ifElse      → "if" expression ":" suite ( "else" ":" suite )? ;
suite       → NEWLINE INDENT statement+ DEDENT ;
simple      → "print" ( expression ( "," expression )* )?
            | "return" expression?
            | dotted "=" expression
            | expression ;
expression  → or ;
or          → and ( "or" and )* ;
and         → not ( "and" not )* ;
not         → "not" not | comparison ;
comparison  → additive ( ( "==" | "!=" | "<" | ">" | "<=" | ">=" ) additive )? ;
additive    → term ( ( "+" | "-" ) term )* ;
term        → unary ( ( "*" | "/" ) unary )* ;
unary       → "-" unary | primary ;
primary     → NUMBER | STRING | "True" | "False" | "None"
            | "(" expression ")" postfix
            | "str" "(" expression ")" postfix
            | CLASSNAME "(" arguments? ")" postfix
            | IDENT ( "." IDENT )* ( "(" arguments? ")" postfix )? ;
postfix     → ( "." IDENT "(" arguments? ")" )* ;
```

Class names are known statically: the parser records every `class`
statement so that `Name(…)` becomes an instantiation and `class B(A)` can
resolve its parent.
*/

use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::{Comparator, LiteralValue, Statement};
use crate::error::{MythonError, Result};
use crate::token::{Token, TokenType};
use crate::value::{Class, Method};

use log::{debug, info};

/// Name of the built‑in that converts its argument to a String.
const STRINGIFY: &str = "str";

/// Top‑level parser over an immutable slice of tokens.
pub struct Parser<'a> {
    tokens: &'a [Token<'a>],
    current: usize,
    classes: HashMap<String, Rc<Class>>,
}

impl<'a> Parser<'a> {
    /// Construct a new parser.  `tokens` must end with `EOF`, as produced by
    /// the scanner.
    pub fn new(tokens: &'a [Token<'a>]) -> Self {
        info!("Parser created with {} tokens", tokens.len());

        Self {
            tokens,
            current: 0,
            classes: HashMap::new(),
        }
    }

    // ───────────────────────── public API ─────────────────────────

    /// Parse an entire program into a `Compound` root.
    pub fn parse(&mut self) -> Result<Statement> {
        info!("Beginning parse phase");

        let mut statements: Vec<Statement> = Vec::new();

        if self.tokens.is_empty() {
            return Ok(Statement::Compound(statements));
        }

        while !self.is_at_end() {
            statements.push(self.statement()?);
        }

        info!("Parsed {} top-level statement(s)", statements.len());

        Ok(Statement::Compound(statements))
    }

    // ───────────────────────── statement rules ────────────────────

    fn statement(&mut self) -> Result<Statement> {
        debug!("Entering statement at line {}", self.peek().line);

        if self.matches(TokenType::CLASS) {
            self.class_definition()
        } else if self.matches(TokenType::IF) {
            self.if_else()
        } else {
            let statement = self.simple_statement()?;
            self.consume(TokenType::NEWLINE, "Expected end of line after statement")?;
            Ok(statement)
        }
    }

    fn class_definition(&mut self) -> Result<Statement> {
        let name: &str = self.consume(TokenType::IDENTIFIER, "Expected class name")?.lexeme;

        let parent: Option<Rc<Class>> = if self.matches(TokenType::LEFT_PAREN) {
            let parent = self.consume(TokenType::IDENTIFIER, "Expected parent class name")?;
            self.consume(TokenType::RIGHT_PAREN, "Expected ')' after parent class name")?;

            let class = self.classes.get(parent.lexeme).cloned().ok_or_else(|| {
                MythonError::parse(parent.line, format!("Unknown parent class '{}'", parent.lexeme))
            })?;

            Some(class)
        } else {
            None
        };

        self.consume(TokenType::COLON, "Expected ':' after class name")?;
        self.consume(TokenType::NEWLINE, "Expected end of line after class header")?;
        self.consume(TokenType::INDENT, "Expected indented class body")?;

        // Registered before the body so methods can instantiate their own class.
        let class = Rc::new(Class::declare(name, parent));
        self.classes.insert(name.to_string(), Rc::clone(&class));

        let mut methods: Vec<Method> = Vec::new();

        while !self.check(TokenType::DEDENT) && !self.is_at_end() {
            self.consume(TokenType::DEF, "Expected 'def' in class body")?;
            methods.push(self.method()?);
        }

        self.consume(TokenType::DEDENT, "Expected end of class body")?;

        debug!("Class {} parsed with {} method(s)", name, methods.len());

        class.define_methods(methods)?;

        Ok(Statement::ClassDefinition(class))
    }

    fn method(&mut self) -> Result<Method> {
        let name: &Token<'_> = self.consume(TokenType::IDENTIFIER, "Expected method name")?;

        self.consume(TokenType::LEFT_PAREN, "Expected '(' after method name")?;

        let mut params: Vec<String> = Vec::new();

        if !self.check(TokenType::RIGHT_PAREN) {
            loop {
                let param = self.consume(TokenType::IDENTIFIER, "Expected parameter name")?;
                params.push(param.lexeme.to_string());

                if !self.matches(TokenType::COMMA) {
                    break;
                }
            }
        }

        self.consume(TokenType::RIGHT_PAREN, "Expected ')' after parameters")?;
        self.consume(TokenType::COLON, "Expected ':' after method signature")?;

        let body: Statement = self.suite()?;

        Ok(Method::new(name.lexeme, params, body))
    }

    fn if_else(&mut self) -> Result<Statement> {
        let condition: Statement = self.expression()?;

        self.consume(TokenType::COLON, "Expected ':' after condition")?;

        let if_body: Statement = self.suite()?;

        let else_body: Option<Statement> = if self.matches(TokenType::ELSE) {
            self.consume(TokenType::COLON, "Expected ':' after 'else'")?;
            Some(self.suite()?)
        } else {
            None
        };

        Ok(Statement::if_else(condition, if_body, else_body))
    }

    /// An indented block of statements.
    fn suite(&mut self) -> Result<Statement> {
        self.consume(TokenType::NEWLINE, "Expected end of line before block")?;
        self.consume(TokenType::INDENT, "Expected indented block")?;

        let mut statements: Vec<Statement> = Vec::new();

        while !self.check(TokenType::DEDENT) && !self.is_at_end() {
            statements.push(self.statement()?);
        }

        self.consume(TokenType::DEDENT, "Expected end of block")?;

        Ok(Statement::Compound(statements))
    }

    fn simple_statement(&mut self) -> Result<Statement> {
        if self.matches(TokenType::PRINT) {
            let mut args: Vec<Statement> = Vec::new();

            if !self.check(TokenType::NEWLINE) {
                loop {
                    args.push(self.expression()?);

                    if !self.matches(TokenType::COMMA) {
                        break;
                    }
                }
            }

            return Ok(Statement::Print(args));
        }

        if self.matches(TokenType::RETURN) {
            let value: Statement = if self.check(TokenType::NEWLINE) {
                Statement::none()
            } else {
                self.expression()?
            };

            return Ok(Statement::ret(value));
        }

        let expr: Statement = self.expression()?;

        if self.matches(TokenType::EQUAL) {
            let equals: &Token<'_> = self.previous();
            let value: Box<Statement> = Box::new(self.expression()?);

            let Statement::VariableValue(mut path) = expr else {
                return Err(MythonError::parse(equals.line, "Invalid assignment target"));
            };

            let Some(field) = path.pop() else {
                return Err(MythonError::parse(equals.line, "Invalid assignment target"));
            };

            if path.is_empty() {
                return Ok(Statement::Assignment { name: field, value });
            }

            return Ok(Statement::FieldAssignment {
                object: Box::new(Statement::VariableValue(path)),
                field,
                value,
            });
        }

        Ok(expr)
    }

    // ─────────────────────── expression rules ─────────────────────

    fn expression(&mut self) -> Result<Statement> {
        self.logical_or()
    }

    fn logical_or(&mut self) -> Result<Statement> {
        let mut expr: Statement = self.logical_and()?;

        while self.matches(TokenType::OR) {
            let right: Statement = self.logical_and()?;
            expr = Statement::Or(Box::new(expr), Box::new(right));
        }

        Ok(expr)
    }

    fn logical_and(&mut self) -> Result<Statement> {
        let mut expr: Statement = self.logical_not()?;

        while self.matches(TokenType::AND) {
            let right: Statement = self.logical_not()?;
            expr = Statement::And(Box::new(expr), Box::new(right));
        }

        Ok(expr)
    }

    fn logical_not(&mut self) -> Result<Statement> {
        if self.matches(TokenType::NOT) {
            let operand: Statement = self.logical_not()?;
            return Ok(Statement::Not(Box::new(operand)));
        }

        self.comparison()
    }

    fn comparison(&mut self) -> Result<Statement> {
        let expr: Statement = self.additive()?;

        let comparator: Comparator = match self.peek().token_type {
            TokenType::EQUAL_EQUAL => Comparator::Equal,
            TokenType::BANG_EQUAL => Comparator::NotEqual,
            TokenType::LESS => Comparator::Less,
            TokenType::GREATER => Comparator::Greater,
            TokenType::LESS_EQUAL => Comparator::LessOrEqual,
            TokenType::GREATER_EQUAL => Comparator::GreaterOrEqual,
            _ => return Ok(expr),
        };

        self.advance();

        let right: Statement = self.additive()?;

        Ok(Statement::compare(comparator, expr, right))
    }

    fn additive(&mut self) -> Result<Statement> {
        let mut expr: Statement = self.term()?;

        loop {
            if self.matches(TokenType::PLUS) {
                let right: Statement = self.term()?;
                expr = Statement::Add(Box::new(expr), Box::new(right));
            } else if self.matches(TokenType::MINUS) {
                let right: Statement = self.term()?;
                expr = Statement::Sub(Box::new(expr), Box::new(right));
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn term(&mut self) -> Result<Statement> {
        let mut expr: Statement = self.unary()?;

        loop {
            if self.matches(TokenType::STAR) {
                let right: Statement = self.unary()?;
                expr = Statement::Mult(Box::new(expr), Box::new(right));
            } else if self.matches(TokenType::SLASH) {
                let right: Statement = self.unary()?;
                expr = Statement::Div(Box::new(expr), Box::new(right));
            } else {
                break;
            }
        }

        Ok(expr)
    }

    fn unary(&mut self) -> Result<Statement> {
        if self.matches(TokenType::MINUS) {
            let operand: Statement = self.unary()?;

            return Ok(match operand {
                Statement::Literal(LiteralValue::Number(n)) => Statement::number(n.wrapping_neg()),
                other => Statement::Sub(Box::new(Statement::number(0)), Box::new(other)),
            });
        }

        self.primary()
    }

    fn primary(&mut self) -> Result<Statement> {
        if let TokenType::NUMBER(n) = self.peek().token_type {
            self.advance();
            return Ok(Statement::number(n));
        }

        if let TokenType::STRING(ref s) = self.peek().token_type {
            let s: String = s.clone();
            self.advance();
            return Ok(Statement::string(s));
        }

        if self.matches(TokenType::TRUE) {
            return Ok(Statement::boolean(true));
        }
        if self.matches(TokenType::FALSE) {
            return Ok(Statement::boolean(false));
        }
        if self.matches(TokenType::NONE) {
            return Ok(Statement::none());
        }

        if self.matches(TokenType::LEFT_PAREN) {
            let expr: Statement = self.expression()?;

            self.consume(TokenType::RIGHT_PAREN, "Expected ')' after expression")?;

            return self.postfix(expr);
        }

        if self.matches(TokenType::IDENTIFIER) {
            let name: &Token<'a> = self.previous();

            if self.matches(TokenType::LEFT_PAREN) {
                let expr: Statement = self.call(name)?;
                return self.postfix(expr);
            }

            let mut path: Vec<String> = vec![name.lexeme.to_string()];

            while self.matches(TokenType::DOT) {
                let segment: &str =
                    self.consume(TokenType::IDENTIFIER, "Expected name after '.'")?.lexeme;

                if self.matches(TokenType::LEFT_PAREN) {
                    let args: Vec<Statement> = self.arguments()?;
                    let expr = Statement::method_call(Statement::VariableValue(path), segment, args);
                    return self.postfix(expr);
                }

                path.push(segment.to_string());
            }

            return Ok(Statement::VariableValue(path));
        }

        Err(MythonError::parse(self.peek().line, "Expected expression"))
    }

    /// `name(…)` with the opening parenthesis already consumed: either the
    /// `str` built‑in or the instantiation of a declared class.
    fn call(&mut self, name: &Token<'a>) -> Result<Statement> {
        if name.lexeme == STRINGIFY {
            let arg: Statement = self.expression()?;
            self.consume(TokenType::RIGHT_PAREN, "Expected ')' after argument")?;
            return Ok(Statement::Stringify(Box::new(arg)));
        }

        let class: Rc<Class> = self.classes.get(name.lexeme).cloned().ok_or_else(|| {
            MythonError::parse(name.line, format!("Unknown class '{}'", name.lexeme))
        })?;

        let args: Vec<Statement> = self.arguments()?;

        Ok(Statement::new_instance(&class, args))
    }

    /// Method calls chained onto a call or parenthesised expression.
    fn postfix(&mut self, mut expr: Statement) -> Result<Statement> {
        while self.matches(TokenType::DOT) {
            let method: &str =
                self.consume(TokenType::IDENTIFIER, "Expected method name after '.'")?.lexeme;

            self.consume(
                TokenType::LEFT_PAREN,
                "Expected '(' after method name; fields of a call result cannot be read",
            )?;

            let args: Vec<Statement> = self.arguments()?;
            expr = Statement::method_call(expr, method, args);
        }

        Ok(expr)
    }

    /// Argument list with the opening parenthesis already consumed.
    fn arguments(&mut self) -> Result<Vec<Statement>> {
        let mut arguments: Vec<Statement> = Vec::new();

        if !self.check(TokenType::RIGHT_PAREN) {
            loop {
                arguments.push(self.expression()?);

                if !self.matches(TokenType::COMMA) {
                    break;
                }
            }
        }

        self.consume(TokenType::RIGHT_PAREN, "Expected ')' after arguments")?;

        Ok(arguments)
    }

    // ────────────────────── utility helpers ───────────────────────

    #[inline(always)]
    fn matches(&mut self, ttype: TokenType) -> bool {
        if self.check(ttype) {
            self.advance();

            return true;
        }

        false
    }

    #[inline(always)]
    fn consume(&mut self, ttype: TokenType, message: &str) -> Result<&'a Token<'a>> {
        if self.check(ttype) {
            return Ok(self.advance());
        }

        debug!("Parse failure at {}: {}", self.peek(), message);

        Err(MythonError::parse(self.peek().line, message))
    }

    #[inline(always)]
    fn check(&self, ttype: TokenType) -> bool {
        if self.is_at_end() {
            return false;
        }

        self.peek().token_type == ttype
    }

    #[inline(always)]
    fn advance(&mut self) -> &'a Token<'a> {
        if !self.is_at_end() {
            self.current += 1;
        }

        self.previous()
    }

    #[inline(always)]
    fn is_at_end(&self) -> bool {
        matches!(self.peek().token_type, TokenType::EOF)
    }

    #[inline(always)]
    fn peek(&self) -> &'a Token<'a> {
        &self.tokens[self.current]
    }

    #[inline(always)]
    fn previous(&self) -> &'a Token<'a> {
        &self.tokens[self.current - 1]
    }
}
