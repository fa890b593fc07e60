use crate::{nodes::Node, table::Context};
use planner::query::ast::expr::Ident;

/// A column of a table or association context.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    context: Context,
    name: String,
}

impl Attribute {
    pub(crate) fn new(context: Context, name: &str) -> Self {
        Self {
            context,
            name: name.to_string(),
        }
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column reference qualified by the context's own alias or table name.
    /// Does not account for aliases a join plan assigns.
    pub fn to_ident(&self) -> Ident {
        Ident {
            qualifier: Some(self.context.relation().qualifier().to_string()),
            name: self.name.clone(),
        }
    }

    fn node(&self) -> Node {
        Node::Attribute(self.clone())
    }

    pub fn eq(&self, other: impl Into<Node>) -> Node {
        self.node().eq(other)
    }

    pub fn not_eq(&self, other: impl Into<Node>) -> Node {
        self.node().not_eq(other)
    }

    pub fn lt(&self, other: impl Into<Node>) -> Node {
        self.node().lt(other)
    }

    pub fn lt_eq(&self, other: impl Into<Node>) -> Node {
        self.node().lt_eq(other)
    }

    pub fn gt(&self, other: impl Into<Node>) -> Node {
        self.node().gt(other)
    }

    pub fn gt_eq(&self, other: impl Into<Node>) -> Node {
        self.node().gt_eq(other)
    }

    pub fn like(&self, pattern: impl Into<Node>) -> Node {
        self.node().like(pattern)
    }

    pub fn in_list<I, T>(&self, items: I) -> Node
    where
        I: IntoIterator<Item = T>,
        T: Into<Node>,
    {
        self.node().in_list(items)
    }

    pub fn not_in<I, T>(&self, items: I) -> Node
    where
        I: IntoIterator<Item = T>,
        T: Into<Node>,
    {
        self.node().not_in(items)
    }

    pub fn is_null(&self) -> Node {
        self.node().is_null()
    }

    pub fn is_not_null(&self) -> Node {
        self.node().is_not_null()
    }

    pub fn as_alias(&self, alias: &str) -> Node {
        self.node().as_alias(alias)
    }
}

impl From<&Attribute> for Node {
    fn from(attr: &Attribute) -> Self {
        attr.node()
    }
}
