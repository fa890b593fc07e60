//! Table contexts: queryable relations that resolve names into columns or
//! associations.

use crate::{
    association::Association,
    attribute::Attribute,
    error::{DslError, Result},
    join_dependency::JoinDependency,
    nodes::{Node, wrap},
    schema::SchemaSource,
};
use model::core::value::Value;
use planner::query::ast::common::{JoinKind, TableRef};
use std::sync::Arc;
use tracing::trace;

/// A concrete relation reference, optionally aliased.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Relation {
    pub table: TableRef,
    pub alias: Option<String>,
}

impl Relation {
    pub fn new(table: TableRef) -> Self {
        Self { table, alias: None }
    }

    /// The name other expressions use to qualify columns of this relation.
    pub fn qualifier(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.table.name)
    }
}

/// A queryable relation bound to a schema scope.
///
/// All public mutators are copy-on-write: `alias`, `outer`, `inner` and `on`
/// return a new context and leave `self` untouched.
#[derive(Debug, Clone)]
pub struct Table {
    scope: Arc<dyn SchemaSource>,
    relation: Relation,
    join: JoinKind,
    on: Option<Box<Node>>,
}

impl Table {
    pub fn new(scope: Arc<dyn SchemaSource>) -> Self {
        let relation = Relation::new(scope.table());
        Self {
            scope,
            relation,
            join: JoinKind::Inner,
            on: None,
        }
    }

    pub fn scope(&self) -> &Arc<dyn SchemaSource> {
        &self.scope
    }

    pub fn model_name(&self) -> &str {
        self.scope.model_name()
    }

    pub fn relation(&self) -> &Relation {
        &self.relation
    }

    pub fn join_kind(&self) -> JoinKind {
        self.join
    }

    pub fn condition(&self) -> Option<&Node> {
        self.on.as_deref()
    }

    /// Direct column access, the equivalent of `table[name]`.
    pub fn attribute(&self, name: &str) -> Result<Attribute> {
        self.context().attribute(name)
    }

    pub fn association(&self, name: &str) -> Result<Association> {
        Association::new(self.clone(), name)
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

    pub fn path(&self, dotted: &str) -> Result<Member> {
        self.context().path(dotted)
    }

    pub fn sift(&self, name: &str, args: &[Value]) -> Result<Node> {
        self.context().sift(name, args)
    }

    /// Aliases the relation. Only meaningful when the table is the target of
    /// an explicit join or the root of a plan.
    pub fn alias(&self, alias: &str) -> Table {
        let mut table = self.clone();
        table.set_alias(alias);
        table
    }

    pub fn outer(&self) -> Table {
        let mut table = self.clone();
        table.set_join(JoinKind::Left);
        table
    }

    pub fn inner(&self) -> Table {
        let mut table = self.clone();
        table.set_join(JoinKind::Inner);
        table
    }

    /// Attaches an explicit join condition, overriding any inferred one.
    pub fn on(&self, condition: impl Into<Node>) -> Table {
        let mut table = self.clone();
        table.set_condition(condition.into());
        table
    }

    /// Starts a join dependency rooted at this table and joins the given
    /// association chain into it.
    pub fn arel(&self, associations: &[&str]) -> Result<JoinDependency> {
        let mut deps = JoinDependency::new(self.clone());
        deps.join_path(associations)?;
        Ok(deps)
    }

    pub fn context(&self) -> Context {
        Context::Table(self.clone())
    }

    pub(crate) fn set_alias(&mut self, alias: &str) {
        self.relation.alias = Some(alias.to_string());
    }

    pub(crate) fn set_join(&mut self, kind: JoinKind) {
        self.join = kind;
    }

    pub(crate) fn set_condition(&mut self, condition: Node) {
        self.on = Some(Box::new(condition));
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.scope.model_name() == other.scope.model_name()
            && self.relation == other.relation
            && self.join == other.join
            && self.on == other.on
    }
}

/// Either a plain table or an association chain; both resolve names the
/// same way.
#[derive(Debug, Clone, PartialEq)]
pub enum Context {
    Table(Table),
    Association(Association),
}

/// A successfully resolved name.
#[derive(Debug, Clone, PartialEq)]
pub enum Member {
    Column(Attribute),
    Association(Association),
}

impl Member {
    pub fn into_attribute(self) -> Option<Attribute> {
        match self {
            Member::Column(attr) => Some(attr),
            Member::Association(_) => None,
        }
    }

    pub fn into_association(self) -> Option<Association> {
        match self {
            Member::Column(_) => None,
            Member::Association(assoc) => Some(assoc),
        }
    }
}

impl From<Member> for Node {
    fn from(member: Member) -> Self {
        match member {
            Member::Column(attr) => Node::from(attr),
            Member::Association(assoc) => Node::from(assoc),
        }
    }
}

impl Context {
    /// The table whose scope answers lookups: the table itself, or the
    /// target of the last association hop.
    pub fn table(&self) -> &Table {
        match self {
            Context::Table(table) => table,
            Context::Association(assoc) => assoc.target(),
        }
    }

    pub fn scope(&self) -> &Arc<dyn SchemaSource> {
        self.table().scope()
    }

    pub fn model_name(&self) -> &str {
        self.table().model_name()
    }

    pub fn relation(&self) -> &Relation {
        self.table().relation()
    }

    /// Looks `name` up as a column first, then as an association.
    /// Returns `None` when neither matches.
    pub fn resolve(&self, name: &str) -> Option<Member> {
        let scope = self.scope();
        if scope.has_column(name) {
            trace!(model = scope.model_name(), name, "resolved column");
            return Some(Member::Column(Attribute::new(self.clone(), name)));
        }

        let reflection = scope.reflect_on_association(name)?;
        trace!(model = scope.model_name(), name, "resolved association");
        let assoc = match self {
            Context::Table(table) => Association::from_reflection(table.clone(), reflection),
            Context::Association(assoc) => assoc.extend(reflection),
        };
        Some(Member::Association(assoc))
    }

    /// Like [`Context::resolve`], but a miss is an error naming the model.
    pub fn get(&self, name: &str) -> Result<Member> {
        self.resolve(name).ok_or_else(|| DslError::ColumnNotFound {
            model: self.model_name().to_string(),
            name: name.to_string(),
        })
    }

    /// Dynamic member access. Only bare names resolve; any arguments are
    /// rejected before lookup.
    pub fn call(&self, name: &str, args: &[Node]) -> Result<Member> {
        if !args.is_empty() {
            return Err(DslError::InvalidDynamicCall {
                model: self.model_name().to_string(),
                name: name.to_string(),
                arity: args.len(),
            });
        }
        self.get(name)
    }

    /// Walks a dotted chain such as `customer.address.city`. Every segment
    /// but the last must be an association.
    pub fn path(&self, dotted: &str) -> Result<Member> {
        let (hops, last) = match dotted.rsplit_once('.') {
            Some((hops, last)) => (Some(hops), last),
            None => (None, dotted),
        };

        let mut current = self.clone();
        for segment in hops.into_iter().flat_map(|h| h.split('.')) {
            current = Context::Association(current.association(segment)?);
        }
        current.get(last)
    }

    pub fn attribute(&self, name: &str) -> Result<Attribute> {
        if !self.scope().has_column(name) {
            return Err(DslError::ColumnNotFound {
                model: self.model_name().to_string(),
                name: name.to_string(),
            });
        }
        Ok(Attribute::new(self.clone(), name))
    }

    pub fn association(&self, name: &str) -> Result<Association> {
        match self {
            Context::Table(table) => table.association(name),
            Context::Association(assoc) => assoc.association(name),
        }
    }

    /// Applies the named predicate registered on this context's scope.
    pub fn sift(&self, name: &str, args: &[Value]) -> Result<Node> {
        let builder = self.scope().registered_predicate(name).ok_or_else(|| {
            DslError::SifterNotFound {
                model: self.model_name().to_string(),
                name: name.to_string(),
            }
        })?;
        Ok(wrap(builder.build(self, args)?))
    }
}

impl From<Table> for Context {
    fn from(table: Table) -> Self {
        Context::Table(table)
    }
}

impl From<Association> for Context {
    fn from(assoc: Association) -> Self {
        Context::Association(assoc)
    }
}
