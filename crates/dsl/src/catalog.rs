//! An in-memory [`SchemaSource`] built from a schema document, with named
//! predicates and predeclared join conditions registered in code.

use crate::{
    error::{DslError, Result},
    nodes::Node,
    schema::{PredicateBuilder, Reflection, SchemaSource},
    table::Table,
};
use model::schema::{ModelDef, SchemaDocument, SchemaError};
use planner::query::ast::common::TableRef;
use std::{
    collections::{HashMap, HashSet},
    fmt,
    path::Path,
    sync::Arc,
};
use tracing::info;

type ScopedName = (String, String);

pub struct Catalog {
    document: SchemaDocument,
    sifters: HashMap<ScopedName, Arc<dyn PredicateBuilder>>,
    conditions: HashMap<ScopedName, Node>,
}

impl Catalog {
    pub fn new(models: Vec<ModelDef>) -> Result<Self> {
        Self::from_document(SchemaDocument { models })
    }

    pub fn from_document(document: SchemaDocument) -> Result<Self> {
        document.validate()?;
        info!(models = document.models.len(), "schema catalog loaded");
        Ok(Self {
            document,
            sifters: HashMap::new(),
            conditions: HashMap::new(),
        })
    }

    pub fn from_json(source: &str) -> Result<Self> {
        let document = SchemaDocument::from_json(source)?;
        Self::from_document(document)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let document = SchemaDocument::from_path(path)?;
        Self::from_document(document)
    }

    pub fn models(&self) -> impl Iterator<Item = &ModelDef> {
        self.document.models.iter()
    }

    /// Registers a named predicate ("sifter") on `model`.
    pub fn register_sifter(
        &mut self,
        model: &str,
        name: &str,
        builder: impl PredicateBuilder + 'static,
    ) -> Result<&mut Self> {
        self.index_of(model)
            .ok_or_else(|| SchemaError::UnknownModel(model.to_string()))?;
        self.sifters
            .insert((model.to_string(), name.to_string()), Arc::new(builder));
        Ok(self)
    }

    /// Replaces the key-mapping join of `model.association` with `condition`.
    ///
    /// The condition is lowered once, without a join plan, and rendered as
    /// written. It is not requalified when either side of the join is
    /// aliased, so a self-referential hop joined as `referrer_customers`
    /// still sees whatever table names the condition spells out.
    pub fn register_join_condition(
        &mut self,
        model: &str,
        association: &str,
        condition: impl Into<Node>,
    ) -> Result<&mut Self> {
        let index = self
            .index_of(model)
            .ok_or_else(|| SchemaError::UnknownModel(model.to_string()))?;
        if self.document.models[index]
            .find_association(association)
            .is_none()
        {
            return Err(DslError::AssociationNotFound {
                model: model.to_string(),
                name: association.to_string(),
            });
        }
        self.conditions.insert(
            (model.to_string(), association.to_string()),
            condition.into(),
        );
        Ok(self)
    }

    /// A fresh schema scope for `model`.
    pub fn scope(self: &Arc<Self>, model: &str) -> Result<Arc<dyn SchemaSource>> {
        let index = self
            .index_of(model)
            .ok_or_else(|| SchemaError::UnknownModel(model.to_string()))?;
        Ok(Arc::new(CatalogScope {
            catalog: Arc::clone(self),
            index,
        }))
    }

    /// A fresh table context for `model`.
    pub fn table(self: &Arc<Self>, model: &str) -> Result<Table> {
        Ok(Table::new(self.scope(model)?))
    }

    fn index_of(&self, model: &str) -> Option<usize> {
        self.document
            .models
            .iter()
            .position(|m| m.name.as_str() == model)
    }
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field(
                "models",
                &self.models().map(|m| m.name.as_str()).collect::<Vec<_>>(),
            )
            .field("sifters", &self.sifters.keys().collect::<Vec<_>>())
            .field("conditions", &self.conditions.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// One model of a shared [`Catalog`].
#[derive(Clone)]
pub struct CatalogScope {
    catalog: Arc<Catalog>,
    index: usize,
}

impl CatalogScope {
    fn def(&self) -> &ModelDef {
        &self.catalog.document.models[self.index]
    }

    fn key(&self, name: &str) -> ScopedName {
        (self.model_name().to_string(), name.to_string())
    }
}

impl fmt::Debug for CatalogScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CatalogScope").field(&self.model_name()).finish()
    }
}

impl SchemaSource for CatalogScope {
    fn model_name(&self) -> &str {
        self.def().name.as_str()
    }

    fn table(&self) -> TableRef {
        let def = self.def();
        TableRef {
            schema: def.schema.clone(),
            name: def.table.clone(),
        }
    }

    fn column_names(&self) -> HashSet<String> {
        self.def().columns.iter().cloned().collect()
    }

    fn has_column(&self, name: &str) -> bool {
        self.def().has_column(name)
    }

    fn reflect_on_association(&self, name: &str) -> Option<Reflection> {
        let assoc = self.def().find_association(name)?;
        let target = self.catalog.index_of(assoc.target.as_str())?;

        Some(Reflection {
            name: assoc.name.clone(),
            kind: assoc.kind,
            target: Arc::new(CatalogScope {
                catalog: Arc::clone(&self.catalog),
                index: target,
            }),
            foreign_key: assoc.foreign_key_column(),
            primary_key: assoc.primary_key.clone(),
            join_condition: self
                .catalog
                .conditions
                .get(&self.key(name))
                .cloned()
                .map(Box::new),
        })
    }

    fn registered_predicate(&self, name: &str) -> Option<Arc<dyn PredicateBuilder>> {
        self.catalog.sifters.get(&self.key(name)).cloned()
    }
}
