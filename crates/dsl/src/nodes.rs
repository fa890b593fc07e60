//! The expression-node layer: every value entering a query expression is
//! normalized into a [`Node`] before it is lowered into a planner [`Expr`].

use crate::{
    association::Association,
    attribute::Attribute,
    error::Result,
    join_dependency::JoinDependency,
    table::{Context, Table},
};
use model::core::value::Value;
use planner::query::ast::expr::{BinaryOperator, Expr, FunctionCall, Ident};
use std::ops::{BitAnd, BitOr};

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A bound parameter.
    Literal(Value),
    /// A raw SQL fragment, rendered verbatim.
    Sql(String),
    Attribute(Attribute),
    /// A table or association used as a value, rendered as `qualifier.*`.
    Relation(Context),
    Binary {
        left: Box<Node>,
        op: BinaryOperator,
        right: Box<Node>,
    },
    IsNull {
        node: Box<Node>,
        negated: bool,
    },
    InList {
        node: Box<Node>,
        list: Vec<Node>,
        negated: bool,
    },
    Function {
        name: String,
        args: Vec<Node>,
        wildcard: bool,
    },
    Alias {
        node: Box<Node>,
        alias: String,
    },
}

/// Normalizes any supported input into a node. Nodes pass through unchanged.
pub fn wrap(value: impl Into<Node>) -> Node {
    value.into()
}

impl Node {
    pub fn sql(fragment: &str) -> Node {
        Node::Sql(fragment.to_string())
    }

    pub fn func<I, T>(name: &str, args: I) -> Node
    where
        I: IntoIterator<Item = T>,
        T: Into<Node>,
    {
        Node::Function {
            name: name.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            wildcard: false,
        }
    }

    pub fn count_all() -> Node {
        Node::Function {
            name: "COUNT".to_string(),
            args: Vec::new(),
            wildcard: true,
        }
    }

    fn binary(self, op: BinaryOperator, right: impl Into<Node>) -> Node {
        Node::Binary {
            left: Box::new(self),
            op,
            right: Box::new(right.into()),
        }
    }

    pub fn eq(self, other: impl Into<Node>) -> Node {
        self.binary(BinaryOperator::Eq, other)
    }

    pub fn not_eq(self, other: impl Into<Node>) -> Node {
        self.binary(BinaryOperator::NotEq, other)
    }

    pub fn lt(self, other: impl Into<Node>) -> Node {
        self.binary(BinaryOperator::Lt, other)
    }

    pub fn lt_eq(self, other: impl Into<Node>) -> Node {
        self.binary(BinaryOperator::LtEq, other)
    }

    pub fn gt(self, other: impl Into<Node>) -> Node {
        self.binary(BinaryOperator::Gt, other)
    }

    pub fn gt_eq(self, other: impl Into<Node>) -> Node {
        self.binary(BinaryOperator::GtEq, other)
    }

    pub fn like(self, pattern: impl Into<Node>) -> Node {
        self.binary(BinaryOperator::Like, pattern)
    }

    pub fn and(self, other: impl Into<Node>) -> Node {
        self.binary(BinaryOperator::And, other)
    }

    pub fn or(self, other: impl Into<Node>) -> Node {
        self.binary(BinaryOperator::Or, other)
    }

    pub fn is_null(self) -> Node {
        Node::IsNull {
            node: Box::new(self),
            negated: false,
        }
    }

    pub fn is_not_null(self) -> Node {
        Node::IsNull {
            node: Box::new(self),
            negated: true,
        }
    }

    pub fn in_list<I, T>(self, items: I) -> Node
    where
        I: IntoIterator<Item = T>,
        T: Into<Node>,
    {
        Node::InList {
            node: Box::new(self),
            list: items.into_iter().map(Into::into).collect(),
            negated: false,
        }
    }

    pub fn not_in<I, T>(self, items: I) -> Node
    where
        I: IntoIterator<Item = T>,
        T: Into<Node>,
    {
        Node::InList {
            node: Box::new(self),
            list: items.into_iter().map(Into::into).collect(),
            negated: true,
        }
    }

    pub fn as_alias(self, alias: &str) -> Node {
        Node::Alias {
            node: Box::new(self),
            alias: alias.to_string(),
        }
    }

    /// Lowers the node into a planner expression, joining every association
    /// it references into `deps`.
    pub fn lower(&self, deps: &mut JoinDependency) -> Result<Expr> {
        self.build(Some(deps))
    }

    /// Lowers the node without planning joins. Columns are qualified by their
    /// context's own alias or table name. Used for join conditions.
    pub fn lower_detached(&self) -> Result<Expr> {
        self.build(None)
    }

    fn build(&self, mut deps: Option<&mut JoinDependency>) -> Result<Expr> {
        let expr = match self {
            Node::Literal(value) => Expr::Value(value.clone()),
            Node::Sql(fragment) => Expr::Literal(fragment.clone()),
            Node::Attribute(attr) => {
                let qualifier = match deps {
                    Some(deps) => deps.join_context(attr.context())?.qualifier().to_string(),
                    None => attr.context().relation().qualifier().to_string(),
                };
                Expr::Identifier(Ident {
                    qualifier: Some(qualifier),
                    name: attr.name().to_string(),
                })
            }
            Node::Relation(context) => {
                let qualifier = match deps {
                    Some(deps) => deps.join_context(context)?.qualifier().to_string(),
                    None => context.relation().qualifier().to_string(),
                };
                Expr::Wildcard {
                    qualifier: Some(qualifier),
                }
            }
            Node::Binary { left, op, right } => {
                let left = left.build(deps.as_deref_mut())?;
                let right = right.build(deps)?;
                Expr::binary(left, *op, right)
            }
            Node::IsNull { node, negated } => Expr::IsNull {
                expr: Box::new(node.build(deps)?),
                negated: *negated,
            },
            Node::InList {
                node,
                list,
                negated,
            } => {
                let expr = node.build(deps.as_deref_mut())?;
                let list = list
                    .iter()
                    .map(|item| item.build(deps.as_deref_mut()))
                    .collect::<Result<Vec<_>>>()?;
                Expr::InList {
                    expr: Box::new(expr),
                    list,
                    negated: *negated,
                }
            }
            Node::Function {
                name,
                args,
                wildcard,
            } => Expr::FunctionCall(FunctionCall {
                name: name.clone(),
                args: args
                    .iter()
                    .map(|arg| arg.build(deps.as_deref_mut()))
                    .collect::<Result<Vec<_>>>()?,
                wildcard: *wildcard,
            }),
            Node::Alias { node, alias } => Expr::Alias {
                expr: Box::new(node.build(deps)?),
                alias: alias.clone(),
            },
        };
        Ok(expr)
    }
}

impl BitAnd for Node {
    type Output = Node;

    fn bitand(self, rhs: Node) -> Node {
        self.and(rhs)
    }
}

impl BitOr for Node {
    type Output = Node;

    fn bitor(self, rhs: Node) -> Node {
        self.or(rhs)
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        Node::Literal(value)
    }
}

macro_rules! literal_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Node {
                fn from(value: $ty) -> Self {
                    Node::Literal(Value::from(value))
                }
            }
        )*
    };
}

literal_from!(i64, i32, u64, f64, bool, &str, String);

impl From<Attribute> for Node {
    fn from(attr: Attribute) -> Self {
        Node::Attribute(attr)
    }
}

impl From<Table> for Node {
    fn from(table: Table) -> Self {
        Node::Relation(Context::Table(table))
    }
}

impl From<Association> for Node {
    fn from(assoc: Association) -> Self {
        Node::Relation(Context::Association(assoc))
    }
}

impl From<Context> for Node {
    fn from(context: Context) -> Self {
        Node::Relation(context)
    }
}
