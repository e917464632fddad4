use thiserror::Error;

/// Errors raised while building or validating a type catalog.
///
/// Every variant reflects an authoring mistake in the catalog definition, so
/// none of them are retried; they abort the generation run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Duplicate type id: '{0}' is already registered")]
    DuplicateId(String),

    #[error("Invalid shape for '{id}': {reason}")]
    InvalidShape { id: String, reason: String },

    #[error("Unknown type: '{0}'")]
    UnknownType(String),

    #[error("Name collision: '{first}' and '{second}' both normalize to '{name}'")]
    NameCollision {
        first: String,
        second: String,
        name: String,
    },
}

impl CatalogError {
    pub fn invalid_shape(id: impl Into<String>, reason: impl Into<String>) -> Self {
        CatalogError::InvalidShape {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while reading or writing a persisted catalog snapshot.
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported snapshot format version {found} (expected {expected})")]
    UnsupportedFormat { found: u32, expected: u32 },
}

/// Errors raised while loading a declarative catalog definition.
#[derive(Error, Debug)]
pub enum DefinitionError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML definition: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid JSON definition: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
