//! Typestate builder for `Select` statements.
//!
//! The state parameter enforces clause order at compile time: a projection
//! first, then exactly one `FROM`, then any number of joins and an optional
//! filter.

use crate::query::ast::{
    common::{JoinKind, TableRef},
    expr::Expr,
    select::{FromClause, JoinClause, Select},
};

/// No clause added yet.
#[derive(Debug, Default, Clone)]
pub struct InitialState;

/// Projection set; waiting for the base relation.
#[derive(Debug, Default, Clone)]
pub struct SelectState;

/// Base relation set; joins and a filter may follow.
#[derive(Debug, Default, Clone)]
pub struct FromState;

#[derive(Debug, Clone)]
pub struct SelectBuilder<State> {
    ast: Select,
    state: State,
}

impl Default for SelectBuilder<InitialState> {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectBuilder<InitialState> {
    pub fn new() -> Self {
        Self {
            ast: Select::default(),
            state: InitialState,
        }
    }

    pub fn select(mut self, columns: Vec<Expr>) -> SelectBuilder<SelectState> {
        self.ast.columns = columns;
        SelectBuilder {
            ast: self.ast,
            state: SelectState,
        }
    }
}

impl SelectBuilder<SelectState> {
    /// Sets the base relation, optionally aliased.
    pub fn from(mut self, table: TableRef, alias: Option<&str>) -> SelectBuilder<FromState> {
        self.ast.from = Some(FromClause {
            table,
            alias: alias.map(String::from),
        });
        SelectBuilder {
            ast: self.ast,
            state: FromState,
        }
    }
}

impl SelectBuilder<FromState> {
    /// Appends a join. Joins render in the order they are added.
    pub fn join(mut self, kind: JoinKind, table: TableRef, alias: Option<&str>, on: Expr) -> Self {
        self.ast.joins.push(JoinClause {
            kind,
            table,
            alias: alias.map(String::from),
            on,
        });
        self
    }

    /// Sets the filter. A second call replaces the first.
    pub fn where_clause(mut self, condition: Expr) -> Self {
        self.ast.where_clause = Some(condition);
        self
    }

    pub fn build(self) -> Select {
        self.ast
    }
}
