//! Defines the AST for SQL expressions.

use model::core::value::Value;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    /// A column or table identifier, e.g. `orders` or `orders.total`.
    Identifier(Ident),

    /// All columns of a relation, e.g. `customers.*`.
    Wildcard { qualifier: Option<String> },

    /// A literal value, such as a string, number, boolean, or NULL.
    Value(Value),

    /// A raw SQL fragment rendered verbatim, e.g. `TRUE` or `now()`.
    Literal(String),

    /// A binary operation, e.g. `status = 'open'` or `a AND b`.
    BinaryOp(Box<BinaryOp>),

    /// `expr IS NULL` / `expr IS NOT NULL`
    IsNull { expr: Box<Expr>, negated: bool },

    /// `expr IN (a, b, c)` / `expr NOT IN (...)`
    InList {
        expr: Box<Expr>,
        list: Vec<Expr>,
        negated: bool,
    },

    /// A function call, e.g., `COUNT(*)` or `MAX(price)`.
    FunctionCall(FunctionCall),

    /// An aliased expression, e.g. `COUNT(*) AS total_count`
    Alias { expr: Box<Expr>, alias: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ident {
    pub qualifier: Option<String>, // e.g., the 'orders' in 'orders.total'
    pub name: String,              // e.g., the 'total' in 'orders.total'
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinaryOp {
    pub left: Expr,
    pub op: BinaryOperator,
    pub right: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<Expr>,
    pub wildcard: bool, // represents the '*' in 'COUNT(*)'
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOperator {
    // Comparison
    Eq,    // =
    NotEq, // <>
    Lt,    // <
    LtEq,  // <=
    Gt,    // >
    GtEq,  // >=
    Like,

    // Logical
    And,
    Or,
}

impl Expr {
    pub fn binary(left: Expr, op: BinaryOperator, right: Expr) -> Self {
        Expr::BinaryOp(Box::new(BinaryOp { left, op, right }))
    }
}
