//! Join planning: turns association chains and explicitly joined tables into
//! an ordered, deduplicated list of join entries and emits them through the
//! planner's `SelectBuilder`.
//!
//! Entries are keyed by (target table, explicit alias, path from the root).
//! A repeated traversal of the same key reuses the first entry, so insertion
//! order is the order of first traversal.

use crate::{
    association::{Association, Hop},
    error::{DslError, Result},
    nodes::Node,
    table::{Context, Relation, Table},
};
use planner::query::{
    ast::{
        common::{JoinKind, TableRef},
        expr::Expr,
        select::Select,
    },
    builder::select::SelectBuilder,
};
use std::collections::HashMap;
use tracing::{debug, trace, warn};

/// One step of a join path: the association name and the alias the caller
/// gave that hop, if any.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    pub name: String,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct JoinKey {
    table: TableRef,
    alias: Option<String>,
    path: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinEntry {
    /// The joined relation, carrying either the caller's alias or one
    /// assigned to avoid a name clash.
    pub relation: Relation,
    pub kind: JoinKind,
    pub on: Expr,
    /// Path from the root; empty for explicitly joined tables.
    pub path: Vec<Segment>,
}

#[derive(Debug, Clone)]
pub struct JoinDependency {
    root: Table,
    entries: Vec<JoinEntry>,
    index: HashMap<JoinKey, usize>,
}

impl JoinDependency {
    pub fn new(root: Table) -> Self {
        Self {
            root,
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn root(&self) -> &Table {
        &self.root
    }

    /// The relation the plan selects FROM.
    pub fn base(&self) -> &Relation {
        self.root.relation()
    }

    pub fn entries(&self) -> &[JoinEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Joins a chain of association names starting at the root, e.g.
    /// `["customer", "region"]`. Nothing is joined if any name fails to
    /// resolve. An empty chain yields the base relation.
    pub fn join_path(&mut self, names: &[&str]) -> Result<Relation> {
        let Some((first, rest)) = names.split_first() else {
            return Ok(self.base().clone());
        };

        let mut assoc = self.root.association(first)?;
        for name in rest {
            assoc = assoc.association(name)?;
        }
        self.join_association(&assoc)
    }

    /// Joins every hop of `assoc` and returns the relation of its last hop,
    /// which is what columns of the association must be qualified with.
    pub fn join_association(&mut self, assoc: &Association) -> Result<Relation> {
        let root = assoc.root();
        if root.model_name() != self.root.model_name() || root.relation() != self.base() {
            return Err(DslError::RootMismatch {
                expected: self.base().qualifier().to_string(),
                found: root.relation().qualifier().to_string(),
            });
        }

        // Entries are staged and only committed once every hop succeeded.
        let mut staged: Vec<(JoinKey, JoinEntry)> = Vec::new();
        let mut owner = self.base().clone();
        let mut path = Vec::new();

        for hop in assoc.hops() {
            let alias = hop.table.relation().alias.clone();
            path.push(Segment {
                name: hop.name().to_string(),
                alias: alias.clone(),
            });
            let key = JoinKey {
                table: hop.table.relation().table.clone(),
                alias,
                path: path.clone(),
            };

            let existing = self
                .index
                .get(&key)
                .map(|&i| &self.entries[i])
                .or_else(|| staged.iter().find(|(k, _)| *k == key).map(|(_, e)| e));

            if let Some(entry) = existing {
                let on = hop_condition(hop, &owner, &entry.relation)?;
                report_duplicate(entry, hop.table.join_kind(), &on);
                owner = entry.relation.clone();
                continue;
            }

            let relation = self.hop_relation(hop, &owner, &staged);
            let on = hop_condition(hop, &owner, &relation)?;
            staged.push((
                key,
                JoinEntry {
                    relation: relation.clone(),
                    kind: hop.table.join_kind(),
                    on,
                    path: path.clone(),
                },
            ));
            owner = relation;
        }

        for (key, entry) in staged {
            self.commit(key, entry);
        }

        Ok(owner)
    }

    /// Joins a plain table on its explicit `on` condition.
    pub fn join_table(&mut self, table: &Table) -> Result<Relation> {
        let Some(condition) = table.condition() else {
            return Err(DslError::MissingJoinCondition {
                table: table.relation().qualifier().to_string(),
            });
        };

        let relation = table.relation().clone();
        let on = condition.lower_detached()?;
        let key = JoinKey {
            table: relation.table.clone(),
            alias: relation.alias.clone(),
            path: Vec::new(),
        };

        if let Some(&i) = self.index.get(&key) {
            let entry = &self.entries[i];
            report_duplicate(entry, table.join_kind(), &on);
            return Ok(entry.relation.clone());
        }

        if self.qualifier_taken(relation.qualifier(), &[]) {
            warn!(
                qualifier = relation.qualifier(),
                "explicit join reuses a qualifier already present in the plan"
            );
        }

        self.commit(
            key,
            JoinEntry {
                relation: relation.clone(),
                kind: table.join_kind(),
                on,
                path: Vec::new(),
            },
        );
        Ok(relation)
    }

    /// Makes the relation behind `context` available to the query and
    /// returns the qualifier-bearing relation to reference it by.
    ///
    /// Tables carrying an `on` condition are joined explicitly. Any other
    /// table must be the root or a relation the plan already joins.
    pub fn join_context(&mut self, context: &Context) -> Result<Relation> {
        match context {
            Context::Association(assoc) => self.join_association(assoc),
            Context::Table(table) => {
                let relation = table.relation();
                let is_root =
                    table.model_name() == self.root.model_name() && relation == self.base();
                if is_root {
                    Ok(relation.clone())
                } else if table.condition().is_some() {
                    self.join_table(table)
                } else if self.entries.iter().any(|e| &e.relation == relation) {
                    Ok(relation.clone())
                } else {
                    Err(DslError::RelationNotInPlan {
                        table: relation.qualifier().to_string(),
                    })
                }
            }
        }
    }

    pub fn lower(&mut self, node: &Node) -> Result<Expr> {
        node.lower(self)
    }

    /// Emits the plan: FROM the base relation, one JOIN per entry in plan
    /// order, then the given projection and filter. An empty projection
    /// selects every column of the base relation.
    pub fn into_select(self, projection: Vec<Expr>, filter: Option<Expr>) -> Select {
        let base = self.root.relation().clone();
        let projection = if projection.is_empty() {
            vec![Expr::Wildcard {
                qualifier: Some(base.qualifier().to_string()),
            }]
        } else {
            projection
        };

        let mut builder = SelectBuilder::new()
            .select(projection)
            .from(base.table, base.alias.as_deref());

        for entry in self.entries {
            builder = builder.join(
                entry.kind,
                entry.relation.table,
                entry.relation.alias.as_deref(),
                entry.on,
            );
        }

        if let Some(filter) = filter {
            builder = builder.where_clause(filter);
        }

        builder.build()
    }

    /// Lowers `projection` and `filter` against this plan, joining whatever
    /// they reference, and emits the statement. Nothing is emitted on error.
    pub fn build_select(mut self, projection: &[Node], filter: Option<&Node>) -> Result<Select> {
        let columns = projection
            .iter()
            .map(|node| node.lower(&mut self))
            .collect::<Result<Vec<_>>>()?;
        let filter = filter.map(|node| node.lower(&mut self)).transpose()?;
        Ok(self.into_select(columns, filter))
    }

    /// Relation for a new hop entry. Implicit hops whose table is already
    /// in use get a deterministic `<association>_<owner table>` alias.
    fn hop_relation(&self, hop: &Hop, owner: &Relation, staged: &[(JoinKey, JoinEntry)]) -> Relation {
        let relation = hop.table.relation().clone();
        if !self.qualifier_taken(relation.qualifier(), staged) {
            return relation;
        }

        if relation.alias.is_some() {
            warn!(
                qualifier = relation.qualifier(),
                association = hop.name(),
                "explicit alias collides with a relation already in the plan"
            );
            return relation;
        }

        let stem = format!("{}_{}", hop.name(), owner.table.name);
        let mut alias = stem.clone();
        let mut n = 2;
        while self.qualifier_taken(&alias, staged) {
            alias = format!("{stem}_{n}");
            n += 1;
        }

        trace!(table = %relation.table.name, alias = %alias, "aliasing repeated table");
        Relation {
            table: relation.table,
            alias: Some(alias),
        }
    }

    fn qualifier_taken(&self, qualifier: &str, staged: &[(JoinKey, JoinEntry)]) -> bool {
        self.base().qualifier() == qualifier
            || self
                .entries
                .iter()
                .chain(staged.iter().map(|(_, e)| e))
                .any(|e| e.relation.qualifier() == qualifier)
    }

    fn commit(&mut self, key: JoinKey, entry: JoinEntry) {
        debug!(
            table = %entry.relation.table.name,
            qualifier = entry.relation.qualifier(),
            path = %path_label(&entry.path),
            kind = ?entry.kind,
            "join appended"
        );
        self.index.insert(key, self.entries.len());
        self.entries.push(entry);
    }
}

/// The hop's `on` condition if set, else the reflection's predeclared one,
/// else the equality join from the key mapping.
fn hop_condition(hop: &Hop, owner: &Relation, target: &Relation) -> Result<Expr> {
    if let Some(condition) = hop.table.condition() {
        return condition.lower_detached();
    }
    if let Some(condition) = &hop.reflection.join_condition {
        return condition.lower_detached();
    }
    Ok(hop.reflection.implicit_condition(owner, target))
}

fn report_duplicate(entry: &JoinEntry, kind: JoinKind, on: &Expr) {
    if entry.kind != kind || &entry.on != on {
        warn!(
            qualifier = entry.relation.qualifier(),
            path = %path_label(&entry.path),
            "duplicate join differs in kind or condition; keeping the first"
        );
    } else {
        trace!(
            qualifier = entry.relation.qualifier(),
            path = %path_label(&entry.path),
            "duplicate join skipped"
        );
    }
}

fn path_label(path: &[Segment]) -> String {
    path.iter()
        .map(|s| match &s.alias {
            Some(alias) => format!("{}({alias})", s.name),
            None => s.name.clone(),
        })
        .collect::<Vec<_>>()
        .join(".")
}
