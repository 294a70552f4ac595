/// Source region covered by a token or syntax node.
///
/// `start`/`end` are byte offsets into the source; `line` and `column` are
/// 1-based and point at the first character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Self {
            start,
            end,
            line,
            column,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Span starting at `self` and ending where `other` ends.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start,
            end: other.end.max(self.end),
            line: self.line,
            column: self.column,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind<'a> {
    Identifier(&'a str),
    Number(f64),
    String(&'a str),
    True,
    False,

    // Keywords
    Set,
    Const,
    Print,
    If,
    Then,
    Elif,
    Else,
    EndIf,
    While,
    Do,
    EndWhile,
    For,
    EndFor,
    Break,
    Skip,
    Func,
    EndFunc,
    Return,
    Class,
    EndClass,
    This,
    And,
    Or,
    Not,

    // Type names
    NumberType,
    StringType,
    BooleanType,
    ListType,
    DictType,
    VoidType,

    // Operators
    Equal,        // =
    EqualEqual,   // ==
    BangEqual,    // !=
    Less,         // <
    LessEqual,    // <=
    Greater,      // >
    GreaterEqual, // >=
    Plus,         // +
    Minus,        // -
    Star,         // *
    Slash,        // /
    Percent,      // %
    Caret,        // ^

    // Delimiters
    Colon,     // :
    Semicolon, // ;
    Comma,     // ,
    Dot,       // .
    LParen,    // (
    RParen,    // )
    LBracket,  // [
    RBracket,  // ]
    LBrace,    // {
    RBrace,    // }

    EOF,
}

impl TokenKind<'_> {
    /// Keyword lookup; matching ignores ASCII case.
    pub fn keyword(word: &str) -> Option<TokenKind<'static>> {
        let kind = match word.to_ascii_lowercase().as_str() {
            "set" => TokenKind::Set,
            "const" => TokenKind::Const,
            "print" => TokenKind::Print,
            "if" => TokenKind::If,
            "then" => TokenKind::Then,
            "elif" => TokenKind::Elif,
            "else" => TokenKind::Else,
            "endif" => TokenKind::EndIf,
            "while" => TokenKind::While,
            "do" => TokenKind::Do,
            "endwhile" => TokenKind::EndWhile,
            "for" => TokenKind::For,
            "endfor" => TokenKind::EndFor,
            "break" => TokenKind::Break,
            "skip" | "continue" => TokenKind::Skip,
            "func" => TokenKind::Func,
            "endfunc" => TokenKind::EndFunc,
            "return" => TokenKind::Return,
            "class" => TokenKind::Class,
            "endclass" => TokenKind::EndClass,
            "this" => TokenKind::This,
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "not" => TokenKind::Not,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "number" => TokenKind::NumberType,
            "string" => TokenKind::StringType,
            "boolean" => TokenKind::BooleanType,
            "list" => TokenKind::ListType,
            "dict" => TokenKind::DictType,
            "void" => TokenKind::VoidType,
            _ => return None,
        };
        Some(kind)
    }

    /// Human-readable form used in parser diagnostics.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Identifier(name) => format!("identifier '{name}'"),
            TokenKind::Number(value) => format!("number {value}"),
            TokenKind::String(value) => format!("string \"{value}\""),
            TokenKind::EOF => "end of input".to_string(),
            other => format!("'{}'", other.symbol()),
        }
    }

    fn symbol(&self) -> &'static str {
        match self {
            TokenKind::Identifier(_) => "identifier",
            TokenKind::Number(_) => "number",
            TokenKind::String(_) => "string",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Set => "set",
            TokenKind::Const => "const",
            TokenKind::Print => "print",
            TokenKind::If => "if",
            TokenKind::Then => "then",
            TokenKind::Elif => "elif",
            TokenKind::Else => "else",
            TokenKind::EndIf => "endif",
            TokenKind::While => "while",
            TokenKind::Do => "do",
            TokenKind::EndWhile => "endwhile",
            TokenKind::For => "for",
            TokenKind::EndFor => "endfor",
            TokenKind::Break => "break",
            TokenKind::Skip => "skip",
            TokenKind::Func => "func",
            TokenKind::EndFunc => "endfunc",
            TokenKind::Return => "return",
            TokenKind::Class => "class",
            TokenKind::EndClass => "endclass",
            TokenKind::This => "this",
            TokenKind::And => "and",
            TokenKind::Or => "or",
            TokenKind::Not => "not",
            TokenKind::NumberType => "number",
            TokenKind::StringType => "string",
            TokenKind::BooleanType => "boolean",
            TokenKind::ListType => "list",
            TokenKind::DictType => "dict",
            TokenKind::VoidType => "void",
            TokenKind::Equal => "=",
            TokenKind::EqualEqual => "==",
            TokenKind::BangEqual => "!=",
            TokenKind::Less => "<",
            TokenKind::LessEqual => "<=",
            TokenKind::Greater => ">",
            TokenKind::GreaterEqual => ">=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Caret => "^",
            TokenKind::Colon => ":",
            TokenKind::Semicolon => ";",
            TokenKind::Comma => ",",
            TokenKind::Dot => ".",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBracket => "[",
            TokenKind::RBracket => "]",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::EOF => "EOF",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub span: Span,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind<'a>, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn kind(&self) -> &TokenKind<'a> {
        &self.kind
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// The exact source text this token was lexed from.
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        &source[self.span.start..self.span.end]
    }
}
