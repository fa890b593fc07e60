//! Association descriptors: named relationships traversed from a root table.

use crate::{
    attribute::Attribute,
    error::{DslError, Result},
    nodes::Node,
    schema::Reflection,
    table::{Context, Member, Table},
};
use model::core::value::Value;
use planner::query::ast::common::JoinKind;
use std::iter;

/// One traversed association: its reflection plus the target table carrying
/// any alias, join-kind or condition override for this hop.
#[derive(Debug, Clone, PartialEq)]
pub struct Hop {
    pub reflection: Reflection,
    pub table: Table,
}

impl Hop {
    fn new(reflection: Reflection) -> Self {
        let table = Table::new(reflection.target.clone());
        Self { reflection, table }
    }

    pub fn name(&self) -> &str {
        &self.reflection.name
    }
}

/// A chain of association hops starting at a root table, e.g.
/// `orders.customer.address`. Resolves names against the last hop's target.
#[derive(Debug, Clone, PartialEq)]
pub struct Association {
    root: Table,
    via: Vec<Hop>,
    hop: Hop,
}

impl Association {
    /// Fails with `AssociationNotFound` unless `name` is declared on the
    /// owner's model.
    pub fn new(owner: Table, name: &str) -> Result<Self> {
        let reflection = owner.scope().reflect_on_association(name).ok_or_else(|| {
            DslError::AssociationNotFound {
                model: owner.model_name().to_string(),
                name: name.to_string(),
            }
        })?;
        Ok(Self::from_reflection(owner, reflection))
    }

    pub(crate) fn from_reflection(owner: Table, reflection: Reflection) -> Self {
        Self {
            root: owner,
            via: Vec::new(),
            hop: Hop::new(reflection),
        }
    }

    /// Appends a hop, keeping `self` intact.
    pub(crate) fn extend(&self, reflection: Reflection) -> Self {
        let mut via = self.via.clone();
        via.push(self.hop.clone());
        Self {
            root: self.root.clone(),
            via,
            hop: Hop::new(reflection),
        }
    }

    pub fn name(&self) -> &str {
        self.hop.name()
    }

    pub fn reflection(&self) -> &Reflection {
        &self.hop.reflection
    }

    pub fn root(&self) -> &Table {
        &self.root
    }

    /// The table this association hangs off: the previous hop's target, or
    /// the root for a single hop.
    pub fn owner(&self) -> &Table {
        self.via.last().map_or(&self.root, |hop| &hop.table)
    }

    pub fn target(&self) -> &Table {
        &self.hop.table
    }

    /// Hops in traversal order, root side first.
    pub fn hops(&self) -> impl Iterator<Item = &Hop> {
        self.via.iter().chain(iter::once(&self.hop))
    }

    pub fn path(&self) -> Vec<&str> {
        self.hops().map(Hop::name).collect()
    }

    pub fn association(&self, name: &str) -> Result<Association> {
        let target = self.target();
        let reflection = target.scope().reflect_on_association(name).ok_or_else(|| {
            DslError::AssociationNotFound {
                model: target.model_name().to_string(),
                name: name.to_string(),
            }
        })?;
        Ok(self.extend(reflection))
    }

    pub fn attribute(&self, name: &str) -> Result<Attribute> {
        self.context().attribute(name)
    }

    pub fn resolve(&self, name: &str) -> Option<Member> {
        self.context().resolve(name)
    }

    pub fn get(&self, name: &str) -> Result<Member> {
        self.context().get(name)
    }

    pub fn call(&self, name: &str, args: &[Node]) -> Result<Member> {
        self.context().call(name, args)
    }

    pub fn path_to(&self, dotted: &str) -> Result<Member> {
        self.context().path(dotted)
    }

    pub fn sift(&self, name: &str, args: &[Value]) -> Result<Node> {
        self.context().sift(name, args)
    }

    pub fn alias(&self, alias: &str) -> Association {
        let mut assoc = self.clone();
        assoc.hop.table.set_alias(alias);
        assoc
    }

    pub fn outer(&self) -> Association {
        let mut assoc = self.clone();
        assoc.hop.table.set_join(JoinKind::Left);
        assoc
    }

    pub fn inner(&self) -> Association {
        let mut assoc = self.clone();
        assoc.hop.table.set_join(JoinKind::Inner);
        assoc
    }

    /// Joins this hop on `condition` verbatim instead of the key mapping.
    pub fn on(&self, condition: impl Into<Node>) -> Association {
        let mut assoc = self.clone();
        assoc.hop.table.set_condition(condition.into());
        assoc
    }

    pub fn context(&self) -> Context {
        Context::Association(self.clone())
    }
}
