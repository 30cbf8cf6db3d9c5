use thiserror::Error;

/// Errors raised while reaching a repository's backend
#[derive(Debug, Error)]
pub enum RemoteError {
    /// The repository declares a provider type no backend implements
    #[error("provider {provider}, not valid. Verify the repository config. Repository name: {repository}")]
    UnknownProvider {
        /// Name of the repository declaring the provider
        repository: String,
        /// The declared provider type
        provider: String,
    },

    /// The provider entry lacks something its type requires
    #[error("repository {repository} is misconfigured: {reason}")]
    Misconfigured {
        /// Name of the misconfigured repository
        repository: String,
        /// What is missing or invalid
        reason: String,
    },

    /// The backend could not be reached or refused the request
    #[error("{backend} fetch of {target} failed: {reason}")]
    Fetch {
        /// Backend that served the request (`http` or `s3`)
        backend: &'static str,
        /// URL or `bucket/key` that was requested
        target: String,
        /// Transport failure or rejected status
        reason: String,
    },

    /// The fetched index is not a valid tree document
    #[error("failed to decode tree index {target}: {source}")]
    Decode {
        /// Remote path of the index document
        target: String,
        /// Underlying parse error
        #[source]
        source: serde_json::Error,
    },
}

impl RemoteError {
    pub(crate) fn fetch(
        backend: &'static str,
        target: impl Into<String>,
        reason: impl ToString,
    ) -> Self {
        Self::Fetch {
            backend,
            target: target.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn misconfigured(repository: &str, reason: impl Into<String>) -> Self {
        Self::Misconfigured {
            repository: repository.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the error stems from repository configuration rather than I/O
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::UnknownProvider { .. } | Self::Misconfigured { .. }
        )
    }
}
