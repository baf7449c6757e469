use thiserror::Error;

/// Failure reported by a product or category source.
///
/// The session never branches on the variant: it keeps the rendered message
/// and shows it until the next successful fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("{0}")]
    SourceFailure(String),
}

impl CatalogError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn source_failure(message: impl Into<String>) -> Self {
        Self::SourceFailure(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
