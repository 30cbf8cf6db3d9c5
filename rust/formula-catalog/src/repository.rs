use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{LookupError, UnknownProvider};

/// Index path used when a repository does not configure one
pub const DEFAULT_TREE_PATH: &str = "/tree/tree.json";

/// Connection configuration of one formula catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Unique name the repository is looked up by
    pub name: String,
    /// Relative ordering hint for clients listing repositories
    #[serde(default)]
    pub priority: i64,
    /// Remote path of the index document
    #[serde(default = "default_tree_path", rename = "treePath")]
    pub tree_path: String,
    /// When non-empty, replaces the `repoUrl` of every visible formula
    #[serde(
        default,
        rename = "replaceRepoUrl",
        skip_serializing_if = "String::is_empty"
    )]
    pub replace_repo_url: String,
    /// Backend the repository is served from
    pub provider: ProviderConfig,
}

fn default_tree_path() -> String {
    DEFAULT_TREE_PATH.to_string()
}

impl Repository {
    /// Create a repository with the default tree path and no URL rewrite
    pub fn new(name: impl Into<String>, provider: ProviderConfig) -> Self {
        Self {
            name: name.into(),
            priority: 0,
            tree_path: default_tree_path(),
            replace_repo_url: String::new(),
            provider,
        }
    }

    /// Set the URL that replaces each visible formula's `repoUrl`
    pub fn with_replace_repo_url(mut self, url: impl Into<String>) -> Self {
        self.replace_repo_url = url.into();
        self
    }

    /// Set the remote path of the index document
    pub fn with_tree_path(mut self, path: impl Into<String>) -> Self {
        self.tree_path = path.into();
        self
    }

    /// The replacement `repoUrl`, if one is configured
    pub fn replacement_url(&self) -> Option<&str> {
        if self.replace_repo_url.is_empty() {
            None
        } else {
            Some(&self.replace_repo_url)
        }
    }
}

/// Backend descriptor of a repository.
///
/// The declared `type` is kept as written in the configuration and only
/// interpreted through [ProviderConfig::kind], so an unsupported value is
/// reported against the repository that declared it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Declared provider type (`HTTP` or `S3`)
    #[serde(rename = "type")]
    pub kind: String,
    /// Base URL the request path is appended to (HTTP only)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub remote: String,
    /// Bucket region (S3 only)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub region: String,
    /// Bucket holding the index and formulas (S3 only)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub bucket: String,
}

impl ProviderConfig {
    /// An HTTP provider rooted at `remote`
    pub fn http(remote: impl Into<String>) -> Self {
        Self {
            kind: ProviderKind::Http.to_string(),
            remote: remote.into(),
            ..Self::default()
        }
    }

    /// An S3 provider reading from `bucket` in `region`
    pub fn s3(region: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            kind: ProviderKind::S3.to_string(),
            region: region.into(),
            bucket: bucket.into(),
            ..Self::default()
        }
    }

    /// Interpret the declared provider type
    pub fn kind(&self) -> Result<ProviderKind, UnknownProvider> {
        self.kind.parse()
    }
}

/// Supported provider types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// Plain HTTP GET against a base URL
    Http,
    /// Object storage addressed by region, bucket and key
    S3,
}

impl ProviderKind {
    /// The configuration spelling of this provider type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "HTTP",
            Self::S3 => "S3",
        }
    }
}

impl Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = UnknownProvider;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "HTTP" => Ok(Self::Http),
            "S3" => Ok(Self::S3),
            other => Err(UnknownProvider(other.to_string())),
        }
    }
}

/// Find the first repository named `name`.
///
/// The registry is scanned in order and the first exact match wins; names are
/// not checked for uniqueness. An empty name never matches.
pub fn find_repository<'a>(
    repositories: &'a [Repository],
    name: &str,
) -> Result<&'a Repository, LookupError> {
    repositories
        .iter()
        .find(|repository| !name.is_empty() && repository.name == name)
        .ok_or_else(|| LookupError::NotFound {
            name: name.to_string(),
        })
}
