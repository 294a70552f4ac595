use std::{iter::Peekable, str::CharIndices};

use crate::token::{Span, Token, TokenKind};

mod error;

pub use error::{LexError, LexResult};

pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
    eof_reached: bool,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
            eof_reached: false,
            line: 1,
            column: 1,
        }
    }

    pub fn next_token(&mut self) -> LexResult<Token<'a>> {
        self.skip_trivia()?;

        let Some(&(start_idx, ch)) = self.chars.peek() else {
            self.eof_reached = true;
            let index = self.input.len();
            return Ok(Token::new(
                TokenKind::EOF,
                Span::new(index, index, self.line, self.column),
            ));
        };

        let start_line = self.line;
        let start_column = self.column;
        let kind = match ch {
            '"' => return self.read_string(start_idx, start_line, start_column),
            c if c.is_alphabetic() || c == '_' => {
                return Ok(self.read_identifier(start_idx, start_line, start_column));
            }
            c if c.is_ascii_digit() => {
                return self.read_number(start_idx, start_line, start_column);
            }
            '=' => self.one_or_two('=', TokenKind::Equal, TokenKind::EqualEqual),
            '<' => self.one_or_two('=', TokenKind::Less, TokenKind::LessEqual),
            '>' => self.one_or_two('=', TokenKind::Greater, TokenKind::GreaterEqual),
            '!' => {
                self.advance_char();
                if self.eat('=') {
                    TokenKind::BangEqual
                } else {
                    return Err(LexError::UnexpectedCharacter {
                        character: '!',
                        span: Span::new(start_idx, start_idx + 1, start_line, start_column),
                    });
                }
            }
            '+' => self.single(TokenKind::Plus),
            '-' => self.single(TokenKind::Minus),
            '*' => self.single(TokenKind::Star),
            '/' => self.single(TokenKind::Slash),
            '%' => self.single(TokenKind::Percent),
            '^' => self.single(TokenKind::Caret),
            ':' => self.single(TokenKind::Colon),
            ';' => self.single(TokenKind::Semicolon),
            ',' => self.single(TokenKind::Comma),
            '.' => self.single(TokenKind::Dot),
            '(' => self.single(TokenKind::LParen),
            ')' => self.single(TokenKind::RParen),
            '[' => self.single(TokenKind::LBracket),
            ']' => self.single(TokenKind::RBracket),
            '{' => self.single(TokenKind::LBrace),
            '}' => self.single(TokenKind::RBrace),
            other => {
                return Err(LexError::UnexpectedCharacter {
                    character: other,
                    span: Span::new(
                        start_idx,
                        start_idx + other.len_utf8(),
                        start_line,
                        start_column,
                    ),
                });
            }
        };

        let end_idx = self.current_index();
        Ok(Token::new(
            kind,
            Span::new(start_idx, end_idx, start_line, start_column),
        ))
    }

    /// Skips whitespace and `# ... #` comments.
    fn skip_trivia(&mut self) -> LexResult<()> {
        while let Some(&(idx, c)) = self.chars.peek() {
            if c.is_whitespace() {
                self.advance_char();
            } else if c == '#' {
                let line = self.line;
                let column = self.column;
                self.advance_char(); // Consume opening '#'
                loop {
                    match self.advance_char() {
                        Some((_, '#')) => break,
                        Some(_) => {}
                        None => {
                            return Err(LexError::UnterminatedComment {
                                span: Span::new(idx, self.input.len(), line, column),
                            });
                        }
                    }
                }
            } else {
                break;
            }
        }
        Ok(())
    }

    fn single(&mut self, kind: TokenKind<'a>) -> TokenKind<'a> {
        self.advance_char();
        kind
    }

    fn one_or_two(
        &mut self,
        second: char,
        one: TokenKind<'a>,
        two: TokenKind<'a>,
    ) -> TokenKind<'a> {
        self.advance_char();
        if self.eat(second) { two } else { one }
    }

    fn eat(&mut self, expected: char) -> bool {
        if matches!(self.chars.peek(), Some(&(_, c)) if c == expected) {
            self.advance_char();
            true
        } else {
            false
        }
    }

    fn read_identifier(&mut self, start: usize, line: usize, column: usize) -> Token<'a> {
        self.advance_char(); // Consume first char
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.advance_char();
            } else {
                break;
            }
        }

        let end_idx = self.current_index();
        let ident = &self.input[start..end_idx];
        let kind = match TokenKind::keyword(ident) {
            Some(keyword) => keyword,
            None => TokenKind::Identifier(ident),
        };
        Token::new(kind, Span::new(start, end_idx, line, column))
    }

    fn read_number(&mut self, start: usize, line: usize, column: usize) -> LexResult<Token<'a>> {
        self.consume_digits();

        // A '.' belongs to the literal only when a digit follows it.
        let mut lookahead = self.chars.clone();
        if let Some((_, '.')) = lookahead.next()
            && matches!(lookahead.peek(), Some(&(_, c)) if c.is_ascii_digit())
        {
            self.advance_char(); // Consume '.'
            self.consume_digits();
        }

        let end_idx = self.current_index();
        let literal = &self.input[start..end_idx];
        let span = Span::new(start, end_idx, line, column);
        let value = literal
            .parse::<f64>()
            .map_err(|_| LexError::InvalidNumberLiteral {
                literal: literal.to_string(),
                span,
            })?;
        Ok(Token::new(TokenKind::Number(value), span))
    }

    fn consume_digits(&mut self) {
        while let Some(&(_, c)) = self.chars.peek() {
            if c.is_ascii_digit() {
                self.advance_char();
            } else {
                break;
            }
        }
    }

    fn read_string(&mut self, start: usize, line: usize, column: usize) -> LexResult<Token<'a>> {
        self.advance_char(); // Consume opening quote
        let content_start = start + 1;
        while let Some(&(idx, c)) = self.chars.peek() {
            if c == '"' {
                self.advance_char(); // Consume closing quote
                return Ok(Token::new(
                    TokenKind::String(&self.input[content_start..idx]),
                    Span::new(start, idx + 1, line, column),
                ));
            }
            if c == '\n' {
                return Err(LexError::UnterminatedString {
                    span: Span::new(start, idx, line, column),
                });
            }
            self.advance_char();
        }
        Err(LexError::UnterminatedString {
            span: Span::new(start, self.input.len(), line, column),
        })
    }

    fn advance_char(&mut self) -> Option<(usize, char)> {
        let next = self.chars.next();
        if let Some((_, c)) = next {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        next
    }

    fn current_index(&mut self) -> usize {
        self.chars
            .peek()
            .map(|(idx, _)| *idx)
            .unwrap_or(self.input.len())
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = LexResult<Token<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.eof_reached {
            return None;
        }
        Some(self.next_token())
    }
}

/// Lexes the whole input, ending with a single `EOF` token.
pub fn tokenize<'a>(input: &'a str) -> LexResult<Vec<Token<'a>>> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let is_eof = matches!(token.kind, TokenKind::EOF);
        tokens.push(token);
        if is_eof {
            break;
        }
    }
    Ok(tokens)
}
