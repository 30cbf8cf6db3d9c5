use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Index document published by a formula repository.
///
/// A tree is decoded fresh from the remote index on every request. Derived
/// trees (for example the subset visible to a caller) are built as new
/// values rather than by mutating a fetched one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    /// Version marker of the index, copied verbatim into derived trees
    #[serde(default, deserialize_with = "null_as_default")]
    pub version: String,
    /// Catalog entries in publication order
    #[serde(default, deserialize_with = "null_as_default")]
    pub commands: Vec<Command>,
}

impl Tree {
    /// Create a tree from a version marker and its commands
    pub fn new(version: impl Into<String>, commands: Vec<Command>) -> Self {
        Self {
            version: version.into(),
            commands,
        }
    }

    /// Decode a tree from the raw bytes of an index document
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Iterate the formulas of all formula-bearing commands
    pub fn formulas(&self) -> impl Iterator<Item = &Formula> {
        self.commands.iter().filter_map(|command| command.formula.as_ref())
    }
}

/// One entry of the catalog.
///
/// Fields this crate does not interpret (`usage`, `help`, `parent`, ...) are
/// carried in [Command::extra] so a re-serialized command is lossless.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// Roles allowed to see this command; empty means everyone
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub roles: Vec<String>,
    /// Implementation location; absent for group commands
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formula: Option<Formula>,
    /// Uninterpreted fields of the index entry
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Command {
    /// A group command with no formula and no role restriction
    pub fn group() -> Self {
        Self::default()
    }

    /// A command backed by the given formula
    pub fn with_formula(formula: Formula) -> Self {
        Self {
            formula: Some(formula),
            ..Self::default()
        }
    }

    /// Restrict the command to the given roles
    pub fn restricted_to<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Whether the command declares no role requirement
    pub fn is_public(&self) -> bool {
        self.roles.is_empty()
    }
}

/// Where the runnable implementation of a command lives
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Formula {
    /// Logical directory key of the formula within the repository
    #[serde(default, deserialize_with = "null_as_default")]
    pub path: String,
    /// Source-of-truth URL of the formula
    #[serde(default, rename = "repoUrl", deserialize_with = "null_as_default")]
    pub repo_url: String,
    /// Uninterpreted fields (`bin`, `config`, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Formula {
    /// Create a formula located at `path` and published from `repo_url`
    pub fn new(path: impl Into<String>, repo_url: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            repo_url: repo_url.into(),
            extra: Map::new(),
        }
    }
}

/// Decode an explicit `null` the same as an absent field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
