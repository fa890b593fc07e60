use model::schema::SchemaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DslError {
    /// A name matched neither a column nor an association of the model.
    #[error("There is no column or association named '{name}' for {model}.")]
    ColumnNotFound { model: String, name: String },

    #[error("Association named '{name}' was not found for {model}.")]
    AssociationNotFound { model: String, name: String },

    /// Dynamic lookups only accept a bare name.
    #[error("'{name}' on {model} is a name lookup and takes no arguments (got {arity})")]
    InvalidDynamicCall {
        model: String,
        name: String,
        arity: usize,
    },

    #[error("No sifter named '{name}' is registered for {model}.")]
    SifterNotFound { model: String, name: String },

    /// A plain table was joined explicitly without an `on` condition.
    #[error("Explicit join on '{table}' requires an ON condition")]
    MissingJoinCondition { table: String },

    /// An association chain was joined into a plan built for another root.
    #[error("Association chain rooted at '{found}' cannot be joined onto '{expected}'")]
    RootMismatch { expected: String, found: String },

    /// A plain table was referenced without being the root, carrying an `on`
    /// condition, or having been joined explicitly.
    #[error("Relation '{table}' is neither the root of the plan nor joined into it")]
    RelationNotInPlan { table: String },

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
}

pub type Result<T> = std::result::Result<T, DslError>;
