#![warn(missing_docs)]

//! Types describing a formula catalog: the [Tree] of [Command]s published by
//! a repository, the [Repository] configuration used to reach it, and the
//! case-insensitive [RoleSet] a caller is checked against.
//!
//! Nothing in this crate performs I/O. Fetching trees lives in
//! `formula-remote`, and role-based filtering lives in `formula-access`.
//!
//! ```rust
//! use formula_catalog::{Repository, ProviderConfig, find_repository};
//!
//! let repositories = vec![
//!     Repository::new("commons", ProviderConfig::http("https://formulas.example.com")),
//!     Repository::new("internal", ProviderConfig::s3("us-east-1", "formulas")),
//! ];
//!
//! let repository = find_repository(&repositories, "internal").unwrap();
//! assert_eq!(repository.provider.bucket, "formulas");
//! ```

mod tree;
pub use tree::*;

mod repository;
pub use repository::*;

mod role;
pub use role::*;

mod error;
pub use error::*;
