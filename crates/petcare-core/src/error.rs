//! Error types for the pet manager.

/// Errors raised while constructing a [`PetManager`](crate::PetManager).
#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    /// The manager was created outside a Tokio runtime.
    #[error("pet manager must be created inside a Tokio runtime: {source}")]
    NoRuntime {
        /// The underlying runtime lookup error.
        #[from]
        source: tokio::runtime::TryCurrentError,
    },
}
