use thiserror::Error;

/// Errors raised while resolving a repository from the configured registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// No configured repository carries the requested name
    #[error("No repository with name {name}")]
    NotFound {
        /// The name that was looked up
        name: String,
    },
}

/// A declared provider type that no backend implements
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported provider type {0:?}")]
pub struct UnknownProvider(pub String);
