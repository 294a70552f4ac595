//! Recursive-descent parser over the lexer's token stream.
//!
//! There is no error recovery: the first grammar violation aborts parsing and
//! is reported as a single `ParseError` tagged with the offending token's span.
//! Top-level statements finished before the error remain available through
//! [`parse_partial`].

use std::rc::Rc;

use thiserror::Error;

use crate::ast::{
    AssignTarget, ClassDecl, ElifBranch, Expression, ExpressionKind, FieldDecl, FunctionDecl,
    Parameter, Program, Statement, StatementKind, TypeTag,
};
use crate::token::{Span, Token, TokenKind};

mod expressions;

#[derive(Debug, Error, Clone, PartialEq)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

pub struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    position: usize,
}

impl<'a> Parser<'a> {
    pub fn new(mut tokens: Vec<Token<'a>>) -> Self {
        if !matches!(tokens.last(), Some(token) if token.kind == TokenKind::EOF) {
            let end = tokens.last().map(|token| token.span).unwrap_or_default();
            tokens.push(Token::new(
                TokenKind::EOF,
                Span::new(end.end, end.end, end.line.max(1), end.column),
            ));
        }
        Self {
            tokens,
            position: 0,
        }
    }

    pub fn parse_program(mut self) -> ParseResult<Program> {
        let mut statements = Vec::new();
        self.parse_into(&mut statements)?;
        Ok(Program { statements })
    }

    fn parse_into(&mut self, statements: &mut Vec<Statement>) -> ParseResult<()> {
        while !self.check(&TokenKind::EOF) {
            statements.push(self.parse_statement()?);
        }
        Ok(())
    }

    fn parse_statement(&mut self) -> ParseResult<Statement> {
        let start = self.current().span;
        let kind = match self.current().kind {
            TokenKind::Set => {
                let declaration = self.parse_declaration()?;
                self.expect(&TokenKind::Semicolon, "';' after declaration")?;
                return Ok(self.finish(declaration, start));
            }
            TokenKind::Print => {
                self.advance();
                let value = self.parse_expression()?;
                self.expect(&TokenKind::Semicolon, "';' after print statement")?;
                StatementKind::Print(value)
            }
            TokenKind::If => self.parse_if()?,
            TokenKind::While => self.parse_while()?,
            TokenKind::For => self.parse_for()?,
            TokenKind::Func => StatementKind::FunctionDef(Rc::new(self.parse_function()?)),
            TokenKind::Class => StatementKind::ClassDef(Rc::new(self.parse_class()?)),
            TokenKind::Break => {
                self.advance();
                self.expect(&TokenKind::Semicolon, "';' after 'break'")?;
                StatementKind::Break
            }
            TokenKind::Skip => {
                self.advance();
                self.expect(&TokenKind::Semicolon, "';' after 'skip'")?;
                StatementKind::Skip
            }
            TokenKind::Return => {
                self.advance();
                let value = if self.check(&TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                self.expect(&TokenKind::Semicolon, "';' after return statement")?;
                StatementKind::Return(value)
            }
            _ => {
                let statement = self.parse_simple_statement()?;
                self.expect(&TokenKind::Semicolon, "';' after statement")?;
                return Ok(self.finish(statement, start));
            }
        };
        Ok(Statement::new(kind, start.to(self.previous_span())))
    }

    /// Declaration, assignment or bare expression, without the trailing `;`.
    /// `for` clauses reuse this.
    fn parse_simple_statement(&mut self) -> ParseResult<Statement> {
        let start = self.current().span;
        if self.check(&TokenKind::Set) {
            return self.parse_declaration();
        }

        let expression = self.parse_expression()?;
        if !self.check(&TokenKind::Equal) {
            let span = expression.span;
            return Ok(Statement::new(StatementKind::Expr(expression), span));
        }

        self.advance(); // Consume '='
        let target = Self::assignment_target(expression)?;
        let value = self.parse_expression()?;
        Ok(Statement::new(
            StatementKind::Assign { target, value },
            start.to(self.previous_span()),
        ))
    }

    fn assignment_target(expression: Expression) -> ParseResult<AssignTarget> {
        match expression.kind {
            ExpressionKind::Identifier(name) => Ok(AssignTarget::Name {
                name,
                span: expression.span,
            }),
            ExpressionKind::Index { target, index } => Ok(AssignTarget::Index {
                target: *target,
                index: *index,
            }),
            ExpressionKind::FieldAccess { object, name } => Ok(AssignTarget::Field {
                object: *object,
                name,
            }),
            _ => Err(ParseError::new(
                "Invalid assignment target: expected a variable, index or field",
                expression.span,
            )),
        }
    }

    fn parse_declaration(&mut self) -> ParseResult<Statement> {
        let start = self.expect(&TokenKind::Set, "'set'")?;
        let is_const = self.eat(&TokenKind::Const);
        let type_tag = self.parse_type(false)?;
        let name = self.expect_identifier("variable name")?;
        let initializer = if self.eat(&TokenKind::Equal) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        Ok(Statement::new(
            StatementKind::VariableDeclaration {
                is_const,
                type_tag,
                name,
                initializer,
            },
            start.to(self.previous_span()),
        ))
    }

    fn parse_if(&mut self) -> ParseResult<StatementKind> {
        self.expect(&TokenKind::If, "'if'")?;
        let condition = self.parse_expression()?;
        self.expect(&TokenKind::Then, "'then' after if condition")?;
        let then_body =
            self.parse_block(&[TokenKind::Elif, TokenKind::Else, TokenKind::EndIf], "'endif'")?;

        let mut elif_branches = Vec::new();
        while self.eat(&TokenKind::Elif) {
            let condition = self.parse_expression()?;
            self.expect(&TokenKind::Then, "'then' after elif condition")?;
            let body = self
                .parse_block(&[TokenKind::Elif, TokenKind::Else, TokenKind::EndIf], "'endif'")?;
            elif_branches.push(ElifBranch { condition, body });
        }

        let else_body = if self.eat(&TokenKind::Else) {
            Some(self.parse_block(&[TokenKind::EndIf], "'endif'")?)
        } else {
            None
        };
        self.expect(&TokenKind::EndIf, "'endif'")?;

        Ok(StatementKind::If {
            condition,
            then_body,
            elif_branches,
            else_body,
        })
    }

    fn parse_while(&mut self) -> ParseResult<StatementKind> {
        self.expect(&TokenKind::While, "'while'")?;
        let condition = self.parse_expression()?;
        self.expect(&TokenKind::Do, "'do' after while condition")?;
        let body = self.parse_block(&[TokenKind::EndWhile], "'endwhile'")?;
        self.expect(&TokenKind::EndWhile, "'endwhile'")?;
        Ok(StatementKind::While { condition, body })
    }

    fn parse_for(&mut self) -> ParseResult<StatementKind> {
        self.expect(&TokenKind::For, "'for'")?;
        self.expect(&TokenKind::LParen, "'(' after 'for'")?;

        let init = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(Box::new(self.parse_simple_statement()?))
        };
        self.expect(&TokenKind::Semicolon, "';' after for initializer")?;

        let condition = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(&TokenKind::Semicolon, "';' after for condition")?;

        let increment = if self.check(&TokenKind::RParen) {
            None
        } else {
            Some(Box::new(self.parse_simple_statement()?))
        };
        self.expect(&TokenKind::RParen, "')' after for clauses")?;
        self.expect(&TokenKind::Do, "'do' after for clauses")?;

        let body = self.parse_block(&[TokenKind::EndFor], "'endfor'")?;
        self.expect(&TokenKind::EndFor, "'endfor'")?;
        Ok(StatementKind::For {
            init,
            condition,
            increment,
            body,
        })
    }

    fn parse_function(&mut self) -> ParseResult<FunctionDecl> {
        let start = self.expect(&TokenKind::Func, "'func'")?;
        let return_type = self.parse_type(true)?;
        let name = self.expect_identifier("function name")?;

        self.expect(&TokenKind::LParen, "'(' after function name")?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                let param_start = self.current().span;
                let type_tag = self.parse_type(false)?;
                let param_name = self.expect_identifier("parameter name")?;
                params.push(Parameter {
                    name: param_name,
                    type_tag,
                    span: param_start.to(self.previous_span()),
                });
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen, "')' after parameters")?;
        self.expect(&TokenKind::Do, "'do' before function body")?;

        let body = self.parse_block(&[TokenKind::EndFunc], "'endfunc'")?;
        self.expect(&TokenKind::EndFunc, "'endfunc'")?;
        Ok(FunctionDecl {
            name,
            params,
            return_type,
            body,
            span: start.to(self.previous_span()),
        })
    }

    fn parse_class(&mut self) -> ParseResult<ClassDecl> {
        let start = self.expect(&TokenKind::Class, "'class'")?;
        let name = self.expect_identifier("class name")?;
        self.eat(&TokenKind::Do);

        let mut fields = Vec::new();
        let mut methods = Vec::new();
        loop {
            match self.current().kind {
                TokenKind::EndClass => break,
                TokenKind::Set => fields.push(self.parse_field()?),
                TokenKind::Func => methods.push(Rc::new(self.parse_function()?)),
                _ => return Err(self.expected("field declaration, method or 'endclass'")),
            }
        }
        self.expect(&TokenKind::EndClass, "'endclass'")?;

        Ok(ClassDecl {
            name,
            fields,
            methods,
            span: start.to(self.previous_span()),
        })
    }

    fn parse_field(&mut self) -> ParseResult<FieldDecl> {
        let start = self.expect(&TokenKind::Set, "'set'")?;
        let type_tag = self.parse_type(false)?;
        let name = self.expect_identifier("field name")?;
        if self.check(&TokenKind::Equal) {
            return Err(ParseError::new(
                format!("Field '{name}' cannot have an initializer; assign it in 'init'"),
                self.current().span,
            ));
        }
        self.expect(&TokenKind::Semicolon, "';' after field declaration")?;
        Ok(FieldDecl {
            name,
            type_tag,
            span: start.to(self.previous_span()),
        })
    }

    fn parse_type(&mut self, allow_void: bool) -> ParseResult<TypeTag> {
        let token = self.current().clone();
        let type_tag = match token.kind {
            TokenKind::NumberType => TypeTag::Number,
            TokenKind::StringType => TypeTag::String,
            TokenKind::BooleanType => TypeTag::Boolean,
            TokenKind::ListType => TypeTag::List,
            TokenKind::DictType => TypeTag::Dict,
            TokenKind::VoidType if allow_void => TypeTag::Void,
            TokenKind::VoidType => {
                return Err(ParseError::new(
                    "'void' is only valid as a function return type",
                    token.span,
                ));
            }
            TokenKind::Identifier(name) => TypeTag::from_identifier(name),
            _ => return Err(self.expected("type name")),
        };
        self.advance();
        Ok(type_tag)
    }

    /// Reads statements until one of `terminators` is current. The
    /// terminator itself is left for the caller.
    fn parse_block(
        &mut self,
        terminators: &[TokenKind<'static>],
        closing: &str,
    ) -> ParseResult<Vec<Statement>> {
        let mut body = Vec::new();
        while !terminators.iter().any(|kind| self.check(kind)) {
            if self.check(&TokenKind::EOF) {
                return Err(self.expected(closing));
            }
            body.push(self.parse_statement()?);
        }
        Ok(body)
    }

    fn finish(&self, mut statement: Statement, start: Span) -> Statement {
        statement.span = start.to(self.previous_span());
        statement
    }

    fn current(&self) -> &Token<'a> {
        let index = self.position.min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    fn previous_span(&self) -> Span {
        if self.position == 0 {
            return self.current().span;
        }
        self.tokens[(self.position - 1).min(self.tokens.len() - 1)].span
    }

    fn advance(&mut self) -> Token<'a> {
        let token = self.current().clone();
        if self.position < self.tokens.len() {
            self.position += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind<'_>) -> bool {
        &self.current().kind == kind
    }

    fn eat(&mut self, kind: &TokenKind<'_>) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind<'_>, expected: &str) -> ParseResult<Span> {
        if self.check(kind) {
            Ok(self.advance().span)
        } else {
            Err(self.expected(expected))
        }
    }

    fn expect_identifier(&mut self, expected: &str) -> ParseResult<String> {
        if let TokenKind::Identifier(name) = self.current().kind {
            let name = name.to_string();
            self.advance();
            Ok(name)
        } else {
            Err(self.expected(expected))
        }
    }

    fn expected(&self, expected: &str) -> ParseError {
        let token = self.current();
        ParseError::new(
            format!("Expected {expected}, found {}", token.kind.describe()),
            token.span,
        )
    }
}

pub fn parse_tokens(tokens: Vec<Token<'_>>) -> ParseResult<Program> {
    Parser::new(tokens).parse_program()
}

/// Parses as far as possible, returning the completed top-level statements
/// along with the first error, if any.
pub fn parse_partial(tokens: Vec<Token<'_>>) -> (Program, Option<ParseError>) {
    let mut parser = Parser::new(tokens);
    let mut statements = Vec::new();
    let error = parser.parse_into(&mut statements).err();
    (Program { statements }, error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinaryOperator;
    use crate::lexer::tokenize;
    use indoc::indoc;

    fn parse(source: &str) -> ParseResult<Program> {
        parse_tokens(tokenize(source).expect("tokenize failed"))
    }

    fn kinds(program: &Program) -> Vec<&StatementKind> {
        program.statements.iter().map(|s| &s.kind).collect()
    }

    #[test]
    fn parses_declarations_with_and_without_initializers() {
        let program = parse("set const number x = 5; set Point p;").expect("parse failed");
        match kinds(&program).as_slice() {
            [
                StatementKind::VariableDeclaration {
                    is_const: true,
                    type_tag: TypeTag::Number,
                    name,
                    initializer: Some(_),
                },
                StatementKind::VariableDeclaration {
                    is_const: false,
                    type_tag: TypeTag::Class(class),
                    initializer: None,
                    ..
                },
            ] => {
                assert_eq!(name, "x");
                assert_eq!(class, "Point");
            }
            other => panic!("unexpected statements: {other:?}"),
        }
    }

    #[test]
    fn parses_if_with_elif_and_else() {
        let program = parse(indoc! {"
            if x < 1 then
                print(1);
            elif x < 2 then
                print(2);
            elif x < 3 then
                print(3);
            else
                print(4);
            endif
        "})
        .expect("parse failed");

        let StatementKind::If {
            then_body,
            elif_branches,
            else_body,
            ..
        } = &program.statements[0].kind
        else {
            panic!("expected if statement");
        };
        assert_eq!(then_body.len(), 1);
        assert_eq!(elif_branches.len(), 2);
        assert_eq!(else_body.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn parses_for_loop_clauses() {
        let program = parse("for (set number i = 0; i < 3; i = i + 1) do print(i); endfor")
            .expect("parse failed");
        let StatementKind::For {
            init,
            condition,
            increment,
            body,
        } = &program.statements[0].kind
        else {
            panic!("expected for statement");
        };
        assert!(matches!(
            init.as_deref().map(|s| &s.kind),
            Some(StatementKind::VariableDeclaration { .. })
        ));
        assert!(condition.is_some());
        assert!(matches!(
            increment.as_deref().map(|s| &s.kind),
            Some(StatementKind::Assign { .. })
        ));
        assert_eq!(body.len(), 1);
    }

    #[test]
    fn parses_for_loop_with_empty_clauses() {
        let program = parse("for (;;) do break; endfor").expect("parse failed");
        assert!(matches!(
            &program.statements[0].kind,
            StatementKind::For {
                init: None,
                condition: None,
                increment: None,
                ..
            }
        ));
    }

    #[test]
    fn parses_function_declaration() {
        let program = parse(indoc! {"
            func number add(number a, number b) do
                return a + b;
            endfunc
        "})
        .expect("parse failed");
        let StatementKind::FunctionDef(function) = &program.statements[0].kind else {
            panic!("expected function");
        };
        assert_eq!(function.name, "add");
        assert_eq!(function.return_type, TypeTag::Number);
        let params: Vec<_> = function.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(params, ["a", "b"]);
        assert!(matches!(
            &function.body[0].kind,
            StatementKind::Return(Some(Expression {
                kind: ExpressionKind::Binary {
                    op: BinaryOperator::Add,
                    ..
                },
                ..
            }))
        ));
    }

    #[test]
    fn parses_class_with_fields_and_methods() {
        let program = parse(indoc! {"
            class Point do
                set number x;
                set number y;
                func void init(number x, number y) do
                    this.x = x;
                    this.y = y;
                endfunc
                func number sum() do
                    return this.x + this.y;
                endfunc
            endclass
        "})
        .expect("parse failed");
        let StatementKind::ClassDef(class) = &program.statements[0].kind else {
            panic!("expected class");
        };
        assert_eq!(class.name, "Point");
        assert_eq!(class.fields.len(), 2);
        let methods: Vec<_> = class.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(methods, ["init", "sum"]);
        assert!(matches!(
            &class.methods[0].body[0].kind,
            StatementKind::Assign {
                target: AssignTarget::Field { .. },
                ..
            }
        ));
    }

    #[test]
    fn accepts_index_and_field_assignment_targets() {
        let program = parse("xs[0] = 1; p.x = 2; m[\"k\"].y = 3;").expect("parse failed");
        assert!(matches!(
            &program.statements[0].kind,
            StatementKind::Assign {
                target: AssignTarget::Index { .. },
                ..
            }
        ));
        assert!(matches!(
            &program.statements[1].kind,
            StatementKind::Assign {
                target: AssignTarget::Field { .. },
                ..
            }
        ));
        assert!(matches!(
            &program.statements[2].kind,
            StatementKind::Assign {
                target: AssignTarget::Field { .. },
                ..
            }
        ));
    }

    #[test]
    fn rejects_invalid_assignment_target() {
        let err = parse("f() = 3;").expect_err("expected parse failure");
        assert!(err.message.contains("Invalid assignment target"));
        assert_eq!(err.span.column, 1);
    }

    #[test]
    fn rejects_void_variables() {
        let err = parse("set void x;").expect_err("expected parse failure");
        assert!(err.message.contains("'void'"));
    }

    #[test]
    fn rejects_field_initializers() {
        let err = parse("class A set number x = 1; endclass").expect_err("expected failure");
        assert!(err.message.contains("cannot have an initializer"));
    }

    #[test]
    fn reports_missing_semicolon_at_offending_token() {
        let err = parse("set number x = 1\nprint(x);").expect_err("expected parse failure");
        assert_eq!(err.message, "Expected ';' after declaration, found 'print'");
        assert_eq!((err.span.line, err.span.column), (2, 1));
    }

    #[test]
    fn reports_unclosed_block_at_end_of_input() {
        let err = parse("while true do print(1);").expect_err("expected parse failure");
        assert_eq!(err.message, "Expected 'endwhile', found end of input");
    }

    #[test]
    fn partial_parse_keeps_statements_before_the_error() {
        let tokens = tokenize("print(1); print(2); print(;").expect("tokenize failed");
        let (program, error) = parse_partial(tokens);
        assert_eq!(program.statements.len(), 2);
        assert!(error.is_some());
    }
}
