use formula_catalog::LookupError;
use formula_remote::RemoteError;
use thiserror::Error;

use crate::RolesError;

/// Errors surfaced by [crate::Catalog] operations
#[derive(Debug, Error)]
pub enum AccessError {
    /// The repository backend could not be reached or returned bad content
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// No repository with the requested name is registered
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// The roles provider failed; its error is passed through unchanged
    #[error(transparent)]
    Roles(#[from] RolesError),
}
