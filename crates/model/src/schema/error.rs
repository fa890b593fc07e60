use thiserror::Error;

/// Errors raised while loading or validating a schema document.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The document is not valid JSON or does not match the schema layout.
    #[error("Invalid schema document: {0}")]
    Json(#[from] serde_json::Error),

    /// The document could not be read from disk.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown model: {0}")]
    UnknownModel(String),

    #[error("Model '{0}' is declared more than once")]
    DuplicateModel(String),

    /// An association points at a model the document does not declare.
    #[error("Association '{association}' on {model} targets unknown model '{target}'")]
    UnknownTarget {
        model: String,
        association: String,
        target: String,
    },

    #[error("Association '{association}' on {model} requires an explicit foreign_key")]
    MissingForeignKey { model: String, association: String },
}
