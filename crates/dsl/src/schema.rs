//! The narrow read-only interface the resolver needs from a model's schema.

use crate::{
    error::Result,
    nodes::Node,
    table::{Context, Relation},
};
use model::{core::value::Value, schema::AssociationKind};
use planner::query::{
    ast::{
        common::TableRef,
        expr::{BinaryOperator, Expr},
    },
    qualified,
};
use std::{collections::HashSet, fmt, sync::Arc};

/// Column names, associations and named predicates of one model.
///
/// Implementations are shared read-only; the resolver never mutates them and
/// queries them on every lookup.
pub trait SchemaSource: fmt::Debug + Send + Sync {
    /// Model name used in error messages, e.g. `Order`.
    fn model_name(&self) -> &str;

    /// The relation backing the model, e.g. `orders`.
    fn table(&self) -> TableRef;

    fn column_names(&self) -> HashSet<String>;

    fn reflect_on_association(&self, name: &str) -> Option<Reflection>;

    fn registered_predicate(&self, name: &str) -> Option<Arc<dyn PredicateBuilder>>;

    fn has_column(&self, name: &str) -> bool {
        self.column_names().contains(name)
    }
}

/// Builds a predicate node for a named "sifter" registered on a model.
pub trait PredicateBuilder: Send + Sync {
    fn build(&self, context: &Context, args: &[Value]) -> Result<Node>;
}

impl<F> PredicateBuilder for F
where
    F: Fn(&Context, &[Value]) -> Result<Node> + Send + Sync,
{
    fn build(&self, context: &Context, args: &[Value]) -> Result<Node> {
        self(context, args)
    }
}

/// Association metadata for one declared relationship.
#[derive(Debug, Clone)]
pub struct Reflection {
    pub name: String,
    pub kind: AssociationKind,
    pub target: Arc<dyn SchemaSource>,
    pub foreign_key: String,
    pub primary_key: String,
    /// Predeclared condition used instead of the key mapping. Rendered as
    /// written; aliases assigned to either side are not applied to it.
    pub join_condition: Option<Box<Node>>,
}

impl Reflection {
    pub fn with_condition(mut self, condition: impl Into<Node>) -> Self {
        self.join_condition = Some(Box::new(condition.into()));
        self
    }

    /// Equality join derived from the key mapping. The target side is always
    /// on the left: `customers.id = orders.customer_id` for a `belongs_to`,
    /// `orders.customer_id = customers.id` for a `has_many`.
    pub fn implicit_condition(&self, owner: &Relation, target: &Relation) -> Expr {
        let (target_col, owner_col) = match self.kind {
            AssociationKind::BelongsTo => (&self.primary_key, &self.foreign_key),
            AssociationKind::HasOne | AssociationKind::HasMany => {
                (&self.foreign_key, &self.primary_key)
            }
        };

        Expr::binary(
            qualified(target.qualifier(), target_col),
            BinaryOperator::Eq,
            qualified(owner.qualifier(), owner_col),
        )
    }
}

impl PartialEq for Reflection {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.kind == other.kind
            && self.target.model_name() == other.target.model_name()
            && self.foreign_key == other.foreign_key
            && self.primary_key == other.primary_key
            && self.join_condition == other.join_condition
    }
}
