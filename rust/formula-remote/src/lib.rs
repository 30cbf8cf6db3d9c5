#![warn(missing_docs)]

//! Fetches formula repository content from the backend each repository
//! declares.
//!
//! A [ProviderRouter] turns a [formula_catalog::Repository] into a [Remote]:
//! an [HttpRemote] for `HTTP` providers or an [S3Remote] for `S3` providers.
//! Index documents are decoded into a [formula_catalog::Tree]; raw files are
//! returned as bytes.
//!
//! ```no_run
//! use formula_catalog::{ProviderConfig, Repository};
//! use formula_remote::ProviderRouter;
//!
//! # async fn example() -> Result<(), formula_remote::RemoteError> {
//! let router = ProviderRouter::default();
//! let repository = Repository::new("commons", ProviderConfig::http("https://formulas.example.com"));
//!
//! let tree = router.load_tree("/tree/tree.json", &repository).await?;
//! let script = router.load_file("/formulas/scripts/deploy/run.sh", &repository).await?;
//! # Ok(())
//! # }
//! ```

mod error;
pub use error::*;

mod settings;
pub use settings::*;

mod remote;
pub use remote::*;

mod http;
pub use http::*;

pub mod s3;
pub use s3::{Credentials, S3Remote};

#[cfg(any(test, feature = "helpers"))]
pub mod helpers;
