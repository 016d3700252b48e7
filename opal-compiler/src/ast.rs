//! Typed program representation produced by the parser.

use crate::frontend::lexer;
use crate::types::Type;
use crate::CompileError;

#[derive(Debug, Clone)]
pub struct Program {
    pub declarations: Vec<Decl>,
}

#[derive(Debug, Clone)]
pub enum Decl {
    Struct {
        name: String,
        fields: Vec<(Type, String)>,
    },
    Function {
        name: String,
        params: Vec<Param>,
        return_type: Type,
        body: Vec<Stmt>,
        exported: bool,
    },
    /// Declaration without a body; always externally linked
    Extern {
        name: String,
        params: Vec<Param>,
        return_type: Type,
    },
}

#[derive(Debug, Clone)]
pub struct Param {
    pub ty: Type,
    pub name: String,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Let {
        ty: Type,
        name: String,
        value: Expr,
    },
    Return(Option<Expr>),
    Expr(Expr),
    If {
        condition: Expr,
        then_body: Vec<Stmt>,
        else_body: Option<Vec<Stmt>>,
    },
    While {
        condition: Expr,
        body: Vec<Stmt>,
    },
}

#[derive(Debug, Clone)]
pub enum Expr {
    Int(i64),
    Float(f64),
    /// Stored without quotes and without escape processing
    Str(String),
    Bool(bool),
    Identifier(String),
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnOp,
        operand: Box<Expr>,
    },
    Call {
        callee: String,
        args: Vec<Expr>,
    },
    Member {
        object: Box<Expr>,
        field: String,
    },
    Index {
        array: Box<Expr>,
        index: Box<Expr>,
    },
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },
}

impl Expr {
    pub fn binary(op: BinOp, left: Expr, right: Expr) -> Expr {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnOp, operand: Expr) -> Expr {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Not,
    Neg,
    Deref,
    Addr,
}

pub fn parse_to_ast(source: &str) -> Result<Program, CompileError> {
    let lexer = lexer::lex_adapter(source);

    crate::frontend::grammar::ProgramParser::new()
        .parse(lexer)
        .map_err(|e| {
            use lalrpop_util::ParseError;

            match e {
                ParseError::InvalidToken { location } => CompileError::Parse {
                    location,
                    message: "Invalid token".to_string(),
                },
                ParseError::UnrecognizedEof { location, expected } => CompileError::Parse {
                    location,
                    message: format!(
                        "Unexpected end of file. Expected one of: {}",
                        expected.join(", ")
                    ),
                },
                ParseError::UnrecognizedToken {
                    token: (start, tok, end),
                    expected,
                } => CompileError::Parse {
                    location: start,
                    message: format!(
                        "Unexpected token {} at position {}..{}. Expected one of: {}",
                        tok,
                        start,
                        end,
                        expected.join(", ")
                    ),
                },
                ParseError::ExtraToken {
                    token: (start, tok, end),
                } => CompileError::Parse {
                    location: start,
                    message: format!("Extra token {} at position {}..{}", tok, start, end),
                },
                ParseError::User { error } => CompileError::Lexical(error),
            }
        })
}
