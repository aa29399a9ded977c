use thiserror::Error;

/// Error type collaborators hand back to the engine.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("location search failed: {0}")]
    Search(#[source] BoxError),

    #[error("state store failed: {0}")]
    Store(#[source] BoxError),

    #[error("messaging gateway failed: {0}")]
    Gateway(#[source] BoxError),
}
