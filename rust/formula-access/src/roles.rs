use std::collections::HashMap;
use std::error::Error as StdError;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use thiserror::Error;

/// Error raised by a [RolesProvider].
///
/// Wraps the provider's own error without altering its message or source
/// chain.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct RolesError(Box<dyn StdError + Send + Sync>);

impl RolesError {
    /// Wrap a provider error
    pub fn new<E>(error: E) -> Self
    where
        E: Into<Box<dyn StdError + Send + Sync>>,
    {
        Self(error.into())
    }

    /// The wrapped provider error
    pub fn inner(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self.0.as_ref()
    }
}

/// Source of the realm roles a caller holds within an organization.
///
/// Implementations must be idempotent and free of side effects visible to
/// the catalog.
#[async_trait]
pub trait RolesProvider: Send + Sync {
    /// List the roles held by the bearer of `token` in `org`
    async fn list_realm_roles(&self, token: &str, org: &str) -> Result<Vec<String>, RolesError>;
}

#[derive(Debug, Error)]
#[error("{0}")]
struct Unavailable(String);

/// In-memory [RolesProvider] keyed by `(token, org)`.
///
/// Unknown pairs hold no roles. Every call is counted, including failing
/// ones.
#[derive(Debug, Default)]
pub struct MemoryRoles {
    grants: HashMap<(String, String), Vec<String>>,
    failure: Option<String>,
    calls: AtomicUsize,
}

impl MemoryRoles {
    /// A provider granting no roles to anyone
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider whose every lookup fails with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Grant `roles` to the bearer of `token` in `org`
    pub fn grant<I, S>(mut self, token: &str, org: &str, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.grants.insert(
            (token.to_string(), org.to_string()),
            roles.into_iter().map(Into::into).collect(),
        );
        self
    }

    /// Number of lookups served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RolesProvider for MemoryRoles {
    async fn list_realm_roles(&self, token: &str, org: &str) -> Result<Vec<String>, RolesError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = &self.failure {
            return Err(RolesError::new(Unavailable(message.clone())));
        }

        Ok(self
            .grants
            .get(&(token.to_string(), org.to_string()))
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use testresult::TestResult;

    #[tokio::test]
    async fn it_lists_granted_roles() -> TestResult {
        let roles = MemoryRoles::new().grant("token", "acme", ["admin", "ops"]);

        assert_eq!(roles.list_realm_roles("token", "acme").await?, vec!["admin", "ops"]);
        assert!(roles.list_realm_roles("token", "other").await?.is_empty());
        assert!(roles.list_realm_roles("stranger", "acme").await?.is_empty());
        assert_eq!(roles.calls(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn it_passes_provider_errors_through() {
        let roles = MemoryRoles::failing("realm service unavailable");

        let error = roles.list_realm_roles("token", "acme").await.unwrap_err();
        assert_eq!(error.to_string(), "realm service unavailable");
        assert_eq!(error.inner().to_string(), "realm service unavailable");
        assert_eq!(roles.calls(), 1);
    }
}
