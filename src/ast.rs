//! Syntax tree shared by the analyzer and the interpreter.
//!
//! The parser builds these nodes once; afterwards they are read-only. Function
//! and class declarations sit behind `Rc` so runtime values can keep a handle
//! on their declaration without copying bodies.

use std::fmt;
use std::rc::Rc;

use crate::token::Span;

/// Nominal type tag written in declarations, parameters and return types.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Number,
    String,
    Boolean,
    List,
    Dict,
    Object,
    Function,
    Void,
    Class(String),
}

impl TypeTag {
    /// Maps a type written as an identifier to its tag.
    pub fn from_identifier(name: &str) -> Self {
        match name {
            "object" => TypeTag::Object,
            "function" => TypeTag::Function,
            _ => TypeTag::Class(name.to_string()),
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeTag::Number => write!(f, "number"),
            TypeTag::String => write!(f, "string"),
            TypeTag::Boolean => write!(f, "boolean"),
            TypeTag::List => write!(f, "list"),
            TypeTag::Dict => write!(f, "dict"),
            TypeTag::Object => write!(f, "object"),
            TypeTag::Function => write!(f, "function"),
            TypeTag::Void => write!(f, "void"),
            TypeTag::Class(name) => write!(f, "{name}"),
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub span: Span,
}

impl Expression {
    pub fn new(kind: ExpressionKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum ExpressionKind {
    Number(f64),
    String(String),
    Boolean(bool),
    Identifier(String),
    This,
    List(Vec<Expression>),
    Dict(Vec<(Expression, Expression)>),
    Binary {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },
    /// `and`/`or`, kept apart from `Binary` because the right operand is
    /// evaluated lazily.
    Logical {
        left: Box<Expression>,
        op: LogicalOperator,
        right: Box<Expression>,
    },
    Unary {
        op: UnaryOperator,
        operand: Box<Expression>,
    },
    Call {
        callee: Box<Expression>,
        args: Vec<Expression>,
    },
    FieldAccess {
        object: Box<Expression>,
        name: String,
    },
    Index {
        target: Box<Expression>,
        index: Box<Expression>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

impl BinaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Equal => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::Less => "<",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterEqual => ">=",
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::Div => "/",
            BinaryOperator::Mod => "%",
            BinaryOperator::Pow => "^",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            LogicalOperator::And => "and",
            LogicalOperator::Or => "or",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negate,
    Not,
}

impl UnaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOperator::Negate => "-",
            UnaryOperator::Not => "not",
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct Statement {
    pub kind: StatementKind,
    pub span: Span,
}

impl Statement {
    pub fn new(kind: StatementKind, span: Span) -> Self {
        Self { kind, span }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum StatementKind {
    VariableDeclaration {
        is_const: bool,
        type_tag: TypeTag,
        name: String,
        initializer: Option<Expression>,
    },
    Assign {
        target: AssignTarget,
        value: Expression,
    },
    Print(Expression),
    If {
        condition: Expression,
        then_body: Vec<Statement>,
        elif_branches: Vec<ElifBranch>,
        else_body: Option<Vec<Statement>>,
    },
    While {
        condition: Expression,
        body: Vec<Statement>,
    },
    For {
        init: Option<Box<Statement>>,
        condition: Option<Expression>,
        increment: Option<Box<Statement>>,
        body: Vec<Statement>,
    },
    Break,
    Skip,
    FunctionDef(Rc<FunctionDecl>),
    Return(Option<Expression>),
    ClassDef(Rc<ClassDecl>),
    Expr(Expression),
}

#[derive(Debug, PartialEq, Clone)]
pub struct ElifBranch {
    pub condition: Expression,
    pub body: Vec<Statement>,
}

/// Assignment target forms accepted by the parser.
///
/// Only identifiers, index expressions and field accesses are assignable; the
/// parser rejects any other left-hand side.
#[derive(Debug, PartialEq, Clone)]
pub enum AssignTarget {
    Name {
        name: String,
        span: Span,
    },
    Index {
        target: Expression,
        index: Expression,
    },
    Field {
        object: Expression,
        name: String,
    },
}

#[derive(Debug, PartialEq, Clone)]
pub struct Parameter {
    pub name: String,
    pub type_tag: TypeTag,
    pub span: Span,
}

#[derive(Debug, PartialEq, Clone)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<Parameter>,
    pub return_type: TypeTag,
    pub body: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, PartialEq, Clone)]
pub struct FieldDecl {
    pub name: String,
    pub type_tag: TypeTag,
    pub span: Span,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ClassDecl {
    pub name: String,
    pub fields: Vec<FieldDecl>,
    pub methods: Vec<Rc<FunctionDecl>>,
    pub span: Span,
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}
