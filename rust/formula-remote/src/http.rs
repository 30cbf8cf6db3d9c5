use async_trait::async_trait;
use formula_catalog::Repository;
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::{Remote, RemoteError};

const BACKEND: &str = "http";

/// Serves a repository published under a plain HTTP base URL.
///
/// Index fetches go through a client bounded by the index timeout; raw file
/// fetches use a separate client that carries the raw timeout, if any.
#[derive(Debug, Clone)]
pub struct HttpRemote {
    remote: String,
    index: Client,
    raw: Client,
}

impl HttpRemote {
    /// Open the base URL configured for `repository`.
    pub fn open(repository: &Repository, index: Client, raw: Client) -> Result<Self, RemoteError> {
        let remote = &repository.provider.remote;
        if remote.is_empty() {
            return Err(RemoteError::misconfigured(
                &repository.name,
                "HTTP provider requires a remote URL",
            ));
        }

        Ok(Self {
            remote: remote.clone(),
            index,
            raw,
        })
    }

    /// The full URL a request path resolves to.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.remote, path)
    }

    async fn get(&self, client: &Client, path: &str) -> Result<Vec<u8>, RemoteError> {
        let url = self.url(path);
        debug!(backend = BACKEND, %url, "fetching");

        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|error| RemoteError::fetch(BACKEND, &url, error))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(RemoteError::fetch(BACKEND, url, format!("HTTP {}", status)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|error| RemoteError::fetch(BACKEND, &url, error))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl Remote for HttpRemote {
    fn backend(&self) -> &'static str {
        BACKEND
    }

    async fn load_index(&self, path: &str) -> Result<Vec<u8>, RemoteError> {
        self.get(&self.index, path).await
    }

    async fn load_raw(&self, path: &str) -> Result<Vec<u8>, RemoteError> {
        self.get(&self.raw, path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::LocalHttp;
    use formula_catalog::ProviderConfig;
    use std::time::Duration;
    use testresult::TestResult;

    fn clients(index_timeout: Duration) -> (Client, Client) {
        let index = Client::builder()
            .timeout(index_timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        (index, Client::new())
    }

    #[test]
    fn it_requires_a_remote_url() {
        let repository = Repository::new("blank", ProviderConfig::http(""));
        let (index, raw) = clients(Duration::from_secs(5));

        let error = HttpRemote::open(&repository, index, raw).unwrap_err();
        assert!(error.is_config());
    }

    #[test]
    fn it_appends_paths_to_the_remote() -> TestResult {
        let repository = Repository::new("web", ProviderConfig::http("https://formulas.example"));
        let (index, raw) = clients(Duration::from_secs(5));
        let remote = HttpRemote::open(&repository, index, raw)?;

        assert_eq!(
            remote.url("/tree/tree.json"),
            "https://formulas.example/tree/tree.json"
        );
        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn it_loads_documents() -> TestResult {
        let server = LocalHttp::start([("/tree/tree.json", br#"{"version":"2"}"#.to_vec())]).await?;
        let repository = Repository::new("web", ProviderConfig::http(&server.endpoint));
        let (index, raw) = clients(Duration::from_secs(5));
        let remote = HttpRemote::open(&repository, index, raw)?;

        assert_eq!(remote.load_index("/tree/tree.json").await?, br#"{"version":"2"}"#);
        assert_eq!(remote.load_raw("/tree/tree.json").await?, br#"{"version":"2"}"#);
        assert_eq!(server.hits(), 2);

        server.stop();
        Ok(())
    }

    #[tokio::test]
    async fn it_rejects_non_ok_status() -> TestResult {
        let server = LocalHttp::start([]).await?;
        let repository = Repository::new("web", ProviderConfig::http(&server.endpoint));
        let (index, raw) = clients(Duration::from_secs(5));
        let remote = HttpRemote::open(&repository, index, raw)?;

        let error = remote.load_index("/tree/tree.json").await.unwrap_err();
        let message = error.to_string();
        assert!(message.contains("404"), "{message}");
        assert!(message.contains("/tree/tree.json"), "{message}");

        assert!(remote.load_raw("/formulas/a/run.sh").await.is_err());

        server.stop();
        Ok(())
    }

    #[tokio::test]
    async fn it_bounds_index_fetches_but_not_raw_fetches() -> TestResult {
        let server = LocalHttp::start_with_latency(
            [("/slow.json", b"{}".to_vec())],
            Duration::from_millis(400),
        )
        .await?;
        let repository = Repository::new("web", ProviderConfig::http(&server.endpoint));
        let (index, raw) = clients(Duration::from_millis(100));
        let remote = HttpRemote::open(&repository, index, raw)?;

        let error = remote.load_index("/slow.json").await.unwrap_err();
        assert!(matches!(error, RemoteError::Fetch { backend: "http", .. }));

        assert_eq!(remote.load_raw("/slow.json").await?, b"{}");

        server.stop();
        Ok(())
    }
}
