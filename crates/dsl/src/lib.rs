//! Name resolution and join planning for a relational query DSL.
//!
//! A [`table::Table`] wraps one model of a [`schema::SchemaSource`]; names
//! resolve to columns or associations, expressions are built as
//! [`nodes::Node`]s, and a [`join_dependency::JoinDependency`] turns the
//! associations they reference into joins of a planner `Select`.

use model::core::value::Value;
use planner::query::{ast::select::Select, dialect::Dialect, renderer::render_with};

pub mod association;
pub mod attribute;
pub mod catalog;
pub mod error;
pub mod join_dependency;
pub mod nodes;
pub mod schema;
pub mod table;


/// Renders a planned statement to SQL text plus its bound parameters.
pub fn to_sql(select: &Select, dialect: &dyn Dialect) -> (String, Vec<Value>) {
    render_with(select, dialect)
}
