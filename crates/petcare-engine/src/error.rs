//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every startup failure so `main` can propagate
//! with `?`.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: petcare_core::ConfigError,
    },

    /// The pet manager could not be created.
    #[error("manager error: {source}")]
    Manager {
        /// The underlying manager error.
        #[from]
        source: petcare_core::ManagerError,
    },
}
