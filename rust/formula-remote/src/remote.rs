use async_trait::async_trait;
use formula_catalog::{ProviderKind, Repository, Tree};
use reqwest::Client;
use tracing::{debug, warn};

use crate::{HttpRemote, RemoteError, RemoteSettings, S3Remote};

/// A backend able to fetch documents out of one repository.
///
/// Paths are repository-relative and start with `/`.
#[async_trait]
pub trait Remote: Send + Sync {
    /// Short backend name used in logs and errors
    fn backend(&self) -> &'static str;

    /// Fetch an index document
    async fn load_index(&self, path: &str) -> Result<Vec<u8>, RemoteError>;

    /// Fetch a raw file
    async fn load_raw(&self, path: &str) -> Result<Vec<u8>, RemoteError>;
}

/// Dispatches fetches to the backend a repository's provider names.
#[derive(Debug, Clone)]
pub struct ProviderRouter {
    settings: RemoteSettings,
    index: Client,
    raw: Client,
}

impl Default for ProviderRouter {
    fn default() -> Self {
        Self::new(RemoteSettings::default())
    }
}

impl ProviderRouter {
    /// Create a router sharing `settings` across every backend it opens.
    pub fn new(settings: RemoteSettings) -> Self {
        let index = Client::builder()
            .timeout(settings.index_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        let mut raw = Client::builder();
        if let Some(timeout) = settings.raw_timeout {
            raw = raw.timeout(timeout);
        }
        let raw = raw.build().unwrap_or_else(|_| Client::new());

        Self {
            settings,
            index,
            raw,
        }
    }

    /// Settings this router was built with
    pub fn settings(&self) -> &RemoteSettings {
        &self.settings
    }

    /// Open the backend serving `repository`.
    pub fn connect(&self, repository: &Repository) -> Result<Box<dyn Remote>, RemoteError> {
        let kind = repository.provider.kind().map_err(|error| {
            warn!(repository = %repository.name, provider = %error.0, "unsupported provider");
            RemoteError::UnknownProvider {
                repository: repository.name.clone(),
                provider: error.0,
            }
        })?;

        let remote: Box<dyn Remote> = match kind {
            ProviderKind::Http => Box::new(HttpRemote::open(
                repository,
                self.index.clone(),
                self.raw.clone(),
            )?),
            ProviderKind::S3 => Box::new(S3Remote::open(
                repository,
                &self.settings,
                self.raw.clone(),
            )?),
        };
        Ok(remote)
    }

    /// Fetch and decode the tree index at `path` in `repository`.
    pub async fn load_tree(&self, path: &str, repository: &Repository) -> Result<Tree, RemoteError> {
        let remote = self.connect(repository)?;
        debug!(repository = %repository.name, backend = remote.backend(), path, "loading tree");

        let bytes = remote
            .load_index(path)
            .await
            .inspect_err(|error| warn!(repository = %repository.name, %error, "tree fetch failed"))?;

        Tree::from_slice(&bytes).map_err(|source| {
            warn!(repository = %repository.name, path, %source, "tree index is malformed");
            RemoteError::Decode {
                target: path.to_string(),
                source,
            }
        })
    }

    /// Fetch the raw bytes at `path` in `repository`.
    pub async fn load_file(
        &self,
        path: &str,
        repository: &Repository,
    ) -> Result<Vec<u8>, RemoteError> {
        let remote = self.connect(repository)?;
        debug!(repository = %repository.name, backend = remote.backend(), path, "loading file");

        remote
            .load_raw(path)
            .await
            .inspect_err(|error| warn!(repository = %repository.name, %error, "file fetch failed"))
    }
}
