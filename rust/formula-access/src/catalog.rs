use formula_catalog::{LookupError, Repository, RoleSet, Tree, find_repository};
use formula_remote::ProviderRouter;
use tracing::{debug, info};

use crate::{AccessError, RolesProvider, filter_tree, formula_key, grants};

/// Serves repository trees and formula files filtered by the caller's roles.
///
/// Every call fetches the index and the caller's roles afresh; nothing is
/// cached between requests.
pub struct Catalog<R: RolesProvider> {
    router: ProviderRouter,
    roles: R,
}

impl<R: RolesProvider> Catalog<R> {
    /// Create a catalog fetching through `router` and resolving roles via `roles`
    pub fn new(router: ProviderRouter, roles: R) -> Self {
        Self { router, roles }
    }

    /// The router used to reach repository backends
    pub fn router(&self) -> &ProviderRouter {
        &self.router
    }

    /// The roles provider consulted on every request
    pub fn roles(&self) -> &R {
        &self.roles
    }

    /// Load the tree at `path` in `repository`, keeping only what the bearer
    /// of `token` may see in `org`.
    pub async fn visible_tree(
        &self,
        path: &str,
        token: &str,
        org: &str,
        repository: &Repository,
    ) -> Result<Tree, AccessError> {
        let tree = self.router.load_tree(path, repository).await?;
        let roles = self.caller_roles(token, org).await?;
        Ok(self.filter(&tree, &roles, repository))
    }

    /// [Catalog::visible_tree] for the repository's own index path.
    pub async fn visible_repository_tree(
        &self,
        token: &str,
        org: &str,
        repository: &Repository,
    ) -> Result<Tree, AccessError> {
        self.visible_tree(&repository.tree_path, token, org, repository)
            .await
    }

    /// Fetch the formula file at `path` when a command visible to the caller
    /// owns it.
    ///
    /// Returns `Ok(None)` when no visible command's formula is located at the
    /// file's directory; that covers both hidden and unknown formulas.
    pub async fn visible_file(
        &self,
        path: &str,
        token: &str,
        org: &str,
        repository: &Repository,
    ) -> Result<Option<Vec<u8>>, AccessError> {
        let tree = self
            .router
            .load_tree(&repository.tree_path, repository)
            .await?;
        let roles = self.caller_roles(token, org).await?;
        let visible = self.filter(&tree, &roles, repository);

        let Some(key) = formula_key(path) else {
            debug!(repository = %repository.name, path, "file path escapes its formula directory");
            return Ok(None);
        };
        if !grants(&visible, &key) {
            debug!(repository = %repository.name, path, %key, "no visible formula owns file");
            return Ok(None);
        }

        let bytes = self.router.load_file(path, repository).await?;
        info!(repository = %repository.name, path, size = bytes.len(), "serving formula file");
        Ok(Some(bytes))
    }

    /// Find the repository registered under `name`
    pub fn lookup<'a>(
        &self,
        repositories: &'a [Repository],
        name: &str,
    ) -> Result<&'a Repository, LookupError> {
        find_repository(repositories, name)
    }

    async fn caller_roles(&self, token: &str, org: &str) -> Result<RoleSet, AccessError> {
        let roles = self.roles.list_realm_roles(token, org).await?;
        Ok(RoleSet::new(roles))
    }

    fn filter(&self, tree: &Tree, roles: &RoleSet, repository: &Repository) -> Tree {
        let visible = filter_tree(tree, roles, repository.replacement_url());
        debug!(
            repository = %repository.name,
            source = tree.commands.len(),
            visible = visible.commands.len(),
            "filtered tree"
        );
        visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryRoles;
    use formula_catalog::ProviderConfig;
    use formula_remote::helpers::LocalHttp;
    use pretty_assertions::assert_eq;
    use testresult::TestResult;

    const TREE: &[u8] = br#"{
        "version": "3",
        "commands": [
            {"name": "help"},
            {"name": "deploy", "roles": ["ops"], "formula": {"path": "scripts/deploy", "repoUrl": "https://git.example/deploy"}},
            {"name": "audit", "roles": ["security"], "formula": {"path": "scripts/audit", "repoUrl": "https://git.example/audit"}}
        ]
    }"#;

    async fn serve() -> anyhow::Result<(LocalHttp, Repository)> {
        let server = LocalHttp::start([
            ("/tree/tree.json", TREE.to_vec()),
            ("/formulas/scripts/deploy/run.sh", b"deploy".to_vec()),
            ("/formulas/scripts/audit/run.sh", b"audit".to_vec()),
        ])
        .await?;
        let repository = Repository::new("web", ProviderConfig::http(&server.endpoint));
        Ok((server, repository))
    }

    #[test]
    fn it_looks_up_repositories() {
        let catalog = Catalog::new(ProviderRouter::default(), MemoryRoles::new());
        let repositories = vec![
            Repository::new("a", ProviderConfig::http("https://a.example")),
            Repository::new("b", ProviderConfig::http("https://b.example")),
        ];

        assert_eq!(catalog.lookup(&repositories, "b").map(|repo| repo.name.as_str()), Ok("b"));
        assert_eq!(
            catalog.lookup(&repositories, "c"),
            Err(LookupError::NotFound { name: "c".into() })
        );
    }

    #[test_log::test(tokio::test)]
    async fn it_filters_the_repository_tree() -> TestResult {
        let (server, repository) = serve().await?;
        let roles = MemoryRoles::new().grant("token", "acme", ["OPS"]);
        let catalog = Catalog::new(ProviderRouter::default(), roles);

        let tree = catalog
            .visible_repository_tree("token", "acme", &repository)
            .await?;
        assert_eq!(tree.version, "3");
        assert_eq!(tree.commands.len(), 2);
        assert_eq!(catalog.roles().calls(), 1);

        server.stop();
        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn it_looks_up_roles_once_per_file() -> TestResult {
        let (server, repository) = serve().await?;
        let roles = MemoryRoles::new().grant("token", "acme", ["ops"]);
        let catalog = Catalog::new(ProviderRouter::default(), roles);

        let bytes = catalog
            .visible_file("/formulas/scripts/deploy/run.sh", "token", "acme", &repository)
            .await?;
        assert_eq!(bytes, Some(b"deploy".to_vec()));
        assert_eq!(catalog.roles().calls(), 1);

        server.stop();
        Ok(())
    }

    #[tokio::test]
    async fn it_hides_files_of_restricted_formulas() -> TestResult {
        let (server, repository) = serve().await?;
        let roles = MemoryRoles::new().grant("token", "acme", ["ops"]);
        let catalog = Catalog::new(ProviderRouter::default(), roles);

        let bytes = catalog
            .visible_file("/formulas/scripts/audit/run.sh", "token", "acme", &repository)
            .await?;
        assert_eq!(bytes, None);
        // index only; the hidden file is never fetched
        assert_eq!(server.hits(), 1);

        server.stop();
        Ok(())
    }

    #[tokio::test]
    async fn it_refuses_dot_segments_in_file_paths() -> TestResult {
        let (server, repository) = serve().await?;
        let roles = MemoryRoles::new().grant("token", "acme", ["ops"]);
        let catalog = Catalog::new(ProviderRouter::default(), roles);

        for path in ["/formulas/scripts/deploy/..", "/formulas/scripts/deploy/%2e%2e"] {
            let bytes = catalog.visible_file(path, "token", "acme", &repository).await?;
            assert_eq!(bytes, None, "{path}");
        }
        // index fetches only; nothing under the formulas tree is requested
        assert_eq!(server.hits(), 2);

        server.stop();
        Ok(())
    }

    #[tokio::test]
    async fn it_propagates_role_failures() -> TestResult {
        let (server, repository) = serve().await?;
        let catalog = Catalog::new(
            ProviderRouter::default(),
            MemoryRoles::failing("realm lookup refused"),
        );

        let error = catalog
            .visible_repository_tree("token", "acme", &repository)
            .await
            .unwrap_err();
        assert!(matches!(error, AccessError::Roles(_)));
        assert_eq!(error.to_string(), "realm lookup refused");

        server.stop();
        Ok(())
    }
}
