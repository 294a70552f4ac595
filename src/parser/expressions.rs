//! Expression grammar, lowest precedence first:
//! `or` → `and` → comparison → additive → multiplicative → power → unary →
//! postfix (`()`, `.name`, `[]`) → primary.

use crate::ast::{BinaryOperator, Expression, ExpressionKind, LogicalOperator, UnaryOperator};
use crate::token::TokenKind;

use super::{ParseResult, Parser};

impl Parser<'_> {
    pub(super) fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_and()?;
        while self.eat(&TokenKind::Or) {
            let right = self.parse_and()?;
            expr = logical(expr, LogicalOperator::Or, right);
        }
        Ok(expr)
    }

    fn parse_and(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_comparison()?;
        while self.eat(&TokenKind::And) {
            let right = self.parse_comparison()?;
            expr = logical(expr, LogicalOperator::And, right);
        }
        Ok(expr)
    }

    fn parse_comparison(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_additive()?;
        loop {
            let op = match self.current().kind {
                TokenKind::EqualEqual => BinaryOperator::Equal,
                TokenKind::BangEqual => BinaryOperator::NotEqual,
                TokenKind::Less => BinaryOperator::Less,
                TokenKind::LessEqual => BinaryOperator::LessEqual,
                TokenKind::Greater => BinaryOperator::Greater,
                TokenKind::GreaterEqual => BinaryOperator::GreaterEqual,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            expr = binary(expr, op, right);
        }
        Ok(expr)
    }

    fn parse_additive(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_multiplicative()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Plus => BinaryOperator::Add,
                TokenKind::Minus => BinaryOperator::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            expr = binary(expr, op, right);
        }
        Ok(expr)
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_power()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Star => BinaryOperator::Mul,
                TokenKind::Slash => BinaryOperator::Div,
                TokenKind::Percent => BinaryOperator::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_power()?;
            expr = binary(expr, op, right);
        }
        Ok(expr)
    }

    /// `^` is right-associative: `2 ^ 3 ^ 2` is `2 ^ (3 ^ 2)`.
    fn parse_power(&mut self) -> ParseResult<Expression> {
        let base = self.parse_unary()?;
        if self.eat(&TokenKind::Caret) {
            let exponent = self.parse_power()?;
            return Ok(binary(base, BinaryOperator::Pow, exponent));
        }
        Ok(base)
    }

    fn parse_unary(&mut self) -> ParseResult<Expression> {
        let op = match self.current().kind {
            TokenKind::Minus => UnaryOperator::Negate,
            TokenKind::Not => UnaryOperator::Not,
            _ => return self.parse_postfix(),
        };
        let start = self.advance().span;
        let operand = self.parse_unary()?;
        let span = start.to(operand.span);
        Ok(Expression::new(
            ExpressionKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        ))
    }

    fn parse_postfix(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_primary()?;
        loop {
            let start = expr.span;
            if self.eat(&TokenKind::LParen) {
                let args = self.parse_arguments()?;
                expr = Expression::new(
                    ExpressionKind::Call {
                        callee: Box::new(expr),
                        args,
                    },
                    start.to(self.previous_span()),
                );
            } else if self.eat(&TokenKind::Dot) {
                let name = self.expect_identifier("field or method name after '.'")?;
                expr = Expression::new(
                    ExpressionKind::FieldAccess {
                        object: Box::new(expr),
                        name,
                    },
                    start.to(self.previous_span()),
                );
            } else if self.eat(&TokenKind::LBracket) {
                let index = self.parse_expression()?;
                self.expect(&TokenKind::RBracket, "']' after index")?;
                expr = Expression::new(
                    ExpressionKind::Index {
                        target: Box::new(expr),
                        index: Box::new(index),
                    },
                    start.to(self.previous_span()),
                );
            } else {
                break;
            }
        }
        Ok(expr)
    }

    /// Comma-separated arguments after an already consumed `(`.
    fn parse_arguments(&mut self) -> ParseResult<Vec<Expression>> {
        let mut args = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                args.push(self.parse_expression()?);
                if !self.eat(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen, "')' after arguments")?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> ParseResult<Expression> {
        let token = self.current().clone();
        let kind = match token.kind {
            TokenKind::Number(value) => ExpressionKind::Number(value),
            TokenKind::String(value) => ExpressionKind::String(value.to_string()),
            TokenKind::True => ExpressionKind::Boolean(true),
            TokenKind::False => ExpressionKind::Boolean(false),
            TokenKind::Identifier(name) => ExpressionKind::Identifier(name.to_string()),
            TokenKind::This => ExpressionKind::This,
            TokenKind::LParen => {
                self.advance();
                let expr = self.parse_expression()?;
                self.expect(&TokenKind::RParen, "')' after expression")?;
                return Ok(expr);
            }
            TokenKind::LBracket => {
                self.advance();
                let mut elements = Vec::new();
                if !self.check(&TokenKind::RBracket) {
                    loop {
                        elements.push(self.parse_expression()?);
                        if !self.eat(&TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.expect(&TokenKind::RBracket, "']' after list elements")?;
                return Ok(Expression::new(
                    ExpressionKind::List(elements),
                    token.span.to(self.previous_span()),
                ));
            }
            TokenKind::LBrace => {
                self.advance();
                let mut entries = Vec::new();
                if !self.check(&TokenKind::RBrace) {
                    loop {
                        let key = self.parse_expression()?;
                        self.expect(&TokenKind::Colon, "':' after dict key")?;
                        let value = self.parse_expression()?;
                        entries.push((key, value));
                        if !self.eat(&TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.expect(&TokenKind::RBrace, "'}' after dict entries")?;
                return Ok(Expression::new(
                    ExpressionKind::Dict(entries),
                    token.span.to(self.previous_span()),
                ));
            }
            _ => return Err(self.expected("expression")),
        };
        self.advance();
        Ok(Expression::new(kind, token.span))
    }
}

fn binary(left: Expression, op: BinaryOperator, right: Expression) -> Expression {
    let span = left.span.to(right.span);
    Expression::new(
        ExpressionKind::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        },
        span,
    )
}

fn logical(left: Expression, op: LogicalOperator, right: Expression) -> Expression {
    let span = left.span.to(right.span);
    Expression::new(
        ExpressionKind::Logical {
            left: Box::new(left),
            op,
            right: Box::new(right),
        },
        span,
    )
}

#[cfg(test)]
mod tests {
    use crate::ast::{BinaryOperator, Expression, ExpressionKind, StatementKind, UnaryOperator};
    use crate::lexer::tokenize;
    use crate::parser::parse_tokens;

    fn expr(source: &str) -> Expression {
        let program = parse_tokens(tokenize(&format!("{source};")).expect("tokenize failed"))
            .expect("parse failed");
        match program.statements.into_iter().next().map(|s| s.kind) {
            Some(StatementKind::Expr(expr)) => expr,
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    /// Renders the tree fully parenthesised so precedence is visible.
    fn shape(expr: &Expression) -> String {
        match &expr.kind {
            ExpressionKind::Number(value) => value.to_string(),
            ExpressionKind::String(value) => format!("{value:?}"),
            ExpressionKind::Boolean(value) => value.to_string(),
            ExpressionKind::Identifier(name) => name.clone(),
            ExpressionKind::This => "this".to_string(),
            ExpressionKind::List(elements) => {
                let inner: Vec<_> = elements.iter().map(shape).collect();
                format!("[{}]", inner.join(", "))
            }
            ExpressionKind::Dict(entries) => {
                let inner: Vec<_> = entries
                    .iter()
                    .map(|(k, v)| format!("{}: {}", shape(k), shape(v)))
                    .collect();
                format!("{{{}}}", inner.join(", "))
            }
            ExpressionKind::Binary { left, op, right } => {
                format!("({} {} {})", shape(left), op.symbol(), shape(right))
            }
            ExpressionKind::Logical { left, op, right } => {
                format!("({} {} {})", shape(left), op.symbol(), shape(right))
            }
            ExpressionKind::Unary { op, operand } => format!("({} {})", op.symbol(), shape(operand)),
            ExpressionKind::Call { callee, args } => {
                let inner: Vec<_> = args.iter().map(shape).collect();
                format!("{}({})", shape(callee), inner.join(", "))
            }
            ExpressionKind::FieldAccess { object, name } => format!("{}.{name}", shape(object)),
            ExpressionKind::Index { target, index } => {
                format!("{}[{}]", shape(target), shape(index))
            }
        }
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        assert_eq!(shape(&expr("1 + 2 * 3 - 4")), "((1 + (2 * 3)) - 4)");
    }

    #[test]
    fn logical_operators_have_lowest_precedence() {
        assert_eq!(
            shape(&expr("a < 1 or b == 2 and not c")),
            "((a < 1) or ((b == 2) and (not c)))"
        );
    }

    #[test]
    fn power_is_right_associative_and_above_multiplication() {
        assert_eq!(shape(&expr("2 * 3 ^ 2 ^ 2")), "(2 * (3 ^ (2 ^ 2)))");
    }

    #[test]
    fn unary_minus_binds_tighter_than_power() {
        assert_eq!(shape(&expr("-2 ^ 2")), "((- 2) ^ 2)");
    }

    #[test]
    fn postfix_operators_chain_in_any_order() {
        assert_eq!(shape(&expr("a.b[0](1, 2).c")), "a.b[0](1, 2).c");
        let parsed = expr("xs[1].length()");
        assert!(matches!(parsed.kind, ExpressionKind::Call { .. }));
    }

    #[test]
    fn parses_list_and_dict_literals() {
        assert_eq!(
            shape(&expr("[1, \"a\", [true]]")),
            "[1, \"a\", [true]]"
        );
        assert_eq!(shape(&expr("{\"k\": 1, 2: [3]}")), "{\"k\": 1, 2: [3]}");
        assert_eq!(shape(&expr("{}")), "{}");
    }

    #[test]
    fn parentheses_override_precedence() {
        assert_eq!(shape(&expr("(1 + 2) * 3")), "((1 + 2) * 3)");
    }

    #[test]
    fn expression_spans_cover_operands() {
        let parsed = expr("12 + foo");
        assert_eq!(parsed.span.start, 0);
        assert_eq!(parsed.span.end, 8);
        let ExpressionKind::Binary { op, .. } = parsed.kind else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOperator::Add);
    }

    #[test]
    fn not_applies_to_the_following_unary() {
        let parsed = expr("not not x");
        let ExpressionKind::Unary { op, operand } = parsed.kind else {
            panic!("expected unary");
        };
        assert_eq!(op, UnaryOperator::Not);
        assert!(matches!(
            operand.kind,
            ExpressionKind::Unary {
                op: UnaryOperator::Not,
                ..
            }
        ));
    }
}
