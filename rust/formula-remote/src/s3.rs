//! Object-storage backend for repositories hosted in an S3-compatible bucket.
//!
//! Objects are addressed path-style (`<endpoint>/<bucket>/<key>`) where the
//! key is the request path without its leading `/`. Requests are presigned
//! with SigV4 when credentials are configured and sent unsigned otherwise.
//!
//! ```no_run
//! use formula_catalog::{ProviderConfig, Repository};
//! use formula_remote::{Credentials, ProviderRouter, RemoteSettings};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = RemoteSettings::new()
//!     .with_credentials(Credentials::new("key-id", "secret"));
//! let router = ProviderRouter::new(settings);
//!
//! let repository = Repository::new("commons", ProviderConfig::s3("us-east-1", "formulas"));
//! let tree = router.load_tree("/tree/tree.json", &repository).await?;
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use formula_catalog::Repository;
use reqwest::StatusCode;
use tracing::debug;
use url::Url;

mod access;
pub use access::{Credentials, DEFAULT_EXPIRES, Invocation, Session, SigningError};

use access::percent_encode_path;

use crate::{Remote, RemoteError, RemoteSettings};

const BACKEND: &str = "s3";

/// A GET request for one object.
#[derive(Debug, Clone)]
pub struct Get {
    url: Url,
    region: String,
}

impl Get {
    /// Create a GET request for `url` signed for `region`.
    pub fn new(url: Url, region: impl Into<String>) -> Self {
        Self {
            url,
            region: region.into(),
        }
    }
}

impl Invocation for Get {
    fn method(&self) -> &'static str {
        "GET"
    }

    fn url(&self) -> &Url {
        &self.url
    }

    fn region(&self) -> &str {
        &self.region
    }
}

/// Reads a repository's index and formulas out of a bucket
#[derive(Debug, Clone)]
pub struct S3Remote {
    /// Base endpoint URL (e.g., "https://s3.us-east-1.amazonaws.com")
    endpoint: String,
    region: String,
    bucket: String,
    session: Session,
    client: reqwest::Client,
}

impl S3Remote {
    /// Open the bucket configured for `repository`.
    pub fn open(
        repository: &Repository,
        settings: &RemoteSettings,
        client: reqwest::Client,
    ) -> Result<Self, RemoteError> {
        let provider = &repository.provider;
        if provider.bucket.is_empty() {
            return Err(RemoteError::misconfigured(
                &repository.name,
                "S3 provider requires a bucket",
            ));
        }
        if provider.region.is_empty() {
            return Err(RemoteError::misconfigured(
                &repository.name,
                "S3 provider requires a region",
            ));
        }

        let endpoint = match &settings.s3_endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://s3.{}.amazonaws.com", provider.region),
        };

        Ok(Self {
            endpoint,
            region: provider.region.clone(),
            bucket: provider.bucket.clone(),
            session: Session::new(settings.credentials.clone()),
            client,
        })
    }

    /// The object key a request path maps to.
    pub fn key(path: &str) -> &str {
        path.strip_prefix('/').unwrap_or(path)
    }

    fn url(&self, key: &str) -> Result<Url, RemoteError> {
        let url = format!(
            "{}/{}/{}",
            self.endpoint,
            self.bucket,
            percent_encode_path(key)
        );
        Url::parse(&url).map_err(|error| RemoteError::fetch(BACKEND, self.target(key), error))
    }

    fn target(&self, key: &str) -> String {
        format!("{}/{}", self.bucket, key)
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>, RemoteError> {
        let key = Self::key(path);
        let target = self.target(key);
        debug!(backend = BACKEND, %target, "fetching object");

        let request = Get::new(self.url(key)?, self.region.as_str());
        let url = self
            .session
            .authorize(&request)
            .map_err(|error| RemoteError::fetch(BACKEND, &target, error))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|error| RemoteError::fetch(BACKEND, &target, error))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(RemoteError::fetch(
                BACKEND,
                target,
                format!("HTTP {}", status),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|error| RemoteError::fetch(BACKEND, &target, error))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl Remote for S3Remote {
    fn backend(&self) -> &'static str {
        BACKEND
    }

    async fn load_index(&self, path: &str) -> Result<Vec<u8>, RemoteError> {
        self.get(path).await
    }

    async fn load_raw(&self, path: &str) -> Result<Vec<u8>, RemoteError> {
        self.get(path).await
    }
}
