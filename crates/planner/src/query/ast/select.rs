//! AST of a SELECT statement: projection, base relation, joins and filter.

use crate::query::ast::{
    common::{JoinKind, TableRef},
    expr::Expr,
};
use serde::Serialize;

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct Select {
    pub columns: Vec<Expr>,
    pub from: Option<FromClause>,
    /// Rendered in order.
    pub joins: Vec<JoinClause>,
    pub where_clause: Option<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FromClause {
    pub table: TableRef,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinClause {
    pub kind: JoinKind,
    pub table: TableRef,
    pub alias: Option<String>,
    /// e.g. `customers.id = orders.customer_id`
    pub on: Expr,
}
