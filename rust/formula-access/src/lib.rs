#![warn(missing_docs)]

//! Role-based access to formula repositories.
//!
//! A [Catalog] combines a [formula_remote::ProviderRouter] with a
//! [RolesProvider]. It hands callers the part of a repository's tree their
//! realm roles allow them to see, and only serves a formula file when a
//! visible command owns it.
//!
//! ```no_run
//! use formula_access::{Catalog, MemoryRoles};
//! use formula_catalog::{ProviderConfig, Repository};
//! use formula_remote::ProviderRouter;
//!
//! # async fn example() -> Result<(), formula_access::AccessError> {
//! let roles = MemoryRoles::new().grant("token", "acme", ["ops"]);
//! let catalog = Catalog::new(ProviderRouter::default(), roles);
//!
//! let repositories = vec![Repository::new(
//!     "commons",
//!     ProviderConfig::http("https://formulas.example.com"),
//! )];
//! let repository = catalog.lookup(&repositories, "commons")?;
//!
//! let tree = catalog
//!     .visible_tree("/tree/tree.json", "token", "acme", repository)
//!     .await?;
//! let script = catalog
//!     .visible_file("/formulas/scripts/deploy/run.sh", "token", "acme", repository)
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod error;
pub use error::*;

mod roles;
pub use roles::*;

mod filter;
pub use filter::*;

mod gate;
pub use gate::*;

mod catalog;
pub use catalog::*;
