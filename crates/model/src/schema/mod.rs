//! Serializable model definitions: the columns and associations a schema
//! document declares for each model.

use crate::core::identifiers::ModelName;
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, path::Path};

pub mod error;

pub use error::SchemaError;

/// The root of a schema document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    pub models: Vec<ModelDef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDef {
    pub name: ModelName,
    pub table: String,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub associations: Vec<AssociationDef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssociationKind {
    /// The owner holds the foreign key (`orders.customer_id -> customers.id`).
    BelongsTo,
    /// The target holds the foreign key and at most one row matches.
    HasOne,
    /// The target holds the foreign key.
    HasMany,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociationDef {
    pub name: String,
    pub kind: AssociationKind,
    pub target: ModelName,
    #[serde(default)]
    pub foreign_key: Option<String>,
    #[serde(default = "default_primary_key")]
    pub primary_key: String,
}

fn default_primary_key() -> String {
    "id".to_string()
}

impl SchemaDocument {
    pub fn from_json(source: &str) -> Result<Self, SchemaError> {
        let document: SchemaDocument = serde_json::from_str(source)?;
        document.validate()?;
        Ok(document)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_json(&source)
    }

    /// Rejects duplicate model names, associations targeting undeclared
    /// models and `has_*` associations without a foreign key.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut seen = HashSet::new();
        for model in &self.models {
            if !seen.insert(model.name.as_str()) {
                return Err(SchemaError::DuplicateModel(model.name.to_string()));
            }
        }

        for model in &self.models {
            for assoc in &model.associations {
                if !seen.contains(assoc.target.as_str()) {
                    return Err(SchemaError::UnknownTarget {
                        model: model.name.to_string(),
                        association: assoc.name.clone(),
                        target: assoc.target.to_string(),
                    });
                }
                if assoc.kind != AssociationKind::BelongsTo && assoc.foreign_key.is_none() {
                    return Err(SchemaError::MissingForeignKey {
                        model: model.name.to_string(),
                        association: assoc.name.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    pub fn model(&self, name: &str) -> Option<&ModelDef> {
        self.models.iter().find(|m| m.name.as_str() == name)
    }
}

impl ModelDef {
    pub fn new(name: impl Into<ModelName>, table: &str) -> Self {
        Self {
            name: name.into(),
            table: table.to_string(),
            schema: None,
            columns: Vec::new(),
            associations: Vec::new(),
        }
    }

    pub fn schema(mut self, schema: &str) -> Self {
        self.schema = Some(schema.to_string());
        self
    }

    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn association(mut self, association: AssociationDef) -> Self {
        self.associations.push(association);
        self
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn find_association(&self, name: &str) -> Option<&AssociationDef> {
        self.associations.iter().find(|a| a.name == name)
    }
}

impl AssociationDef {
    pub fn belongs_to(name: &str, target: impl Into<ModelName>) -> Self {
        Self::new(name, AssociationKind::BelongsTo, target)
    }

    pub fn has_one(name: &str, target: impl Into<ModelName>, foreign_key: &str) -> Self {
        Self::new(name, AssociationKind::HasOne, target).foreign_key(foreign_key)
    }

    pub fn has_many(name: &str, target: impl Into<ModelName>, foreign_key: &str) -> Self {
        Self::new(name, AssociationKind::HasMany, target).foreign_key(foreign_key)
    }

    fn new(name: &str, kind: AssociationKind, target: impl Into<ModelName>) -> Self {
        Self {
            name: name.to_string(),
            kind,
            target: target.into(),
            foreign_key: None,
            primary_key: default_primary_key(),
        }
    }

    pub fn foreign_key(mut self, column: &str) -> Self {
        self.foreign_key = Some(column.to_string());
        self
    }

    pub fn primary_key(mut self, column: &str) -> Self {
        self.primary_key = column.to_string();
        self
    }

    /// The foreign key column, falling back to `<name>_id` for `belongs_to`.
    pub fn foreign_key_column(&self) -> String {
        self.foreign_key
            .clone()
            .unwrap_or_else(|| format!("{}_id", self.name))
    }
}
