use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use tokio::net::TcpListener;
use tokio::sync::{RwLock, oneshot};

#[derive(Clone, Default)]
struct Files {
    entries: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    hits: Arc<AtomicUsize>,
    latency: Option<Duration>,
}

async fn serve(State(files): State<Files>, uri: Uri) -> Response {
    files.hits.fetch_add(1, Ordering::SeqCst);
    if let Some(latency) = files.latency {
        tokio::time::sleep(latency).await;
    }

    match files.entries.read().await.get(uri.path()) {
        Some(bytes) => (StatusCode::OK, bytes.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// A running HTTP file server.
pub struct LocalHttp {
    /// Base URL of the server, without a trailing slash
    pub endpoint: String,
    files: Files,
    shutdown_tx: oneshot::Sender<()>,
}

impl LocalHttp {
    /// Serve `files`, keyed by request path.
    pub async fn start<'a, I>(files: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (&'a str, Vec<u8>)>,
    {
        Self::start_internal(files, None).await
    }

    /// Serve `files`, delaying every response by `latency`.
    pub async fn start_with_latency<'a, I>(files: I, latency: Duration) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (&'a str, Vec<u8>)>,
    {
        Self::start_internal(files, Some(latency)).await
    }

    async fn start_internal<'a, I>(files: I, latency: Option<Duration>) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (&'a str, Vec<u8>)>,
    {
        let files = Files {
            entries: Arc::new(RwLock::new(
                files
                    .into_iter()
                    .map(|(path, bytes)| (path.to_string(), bytes))
                    .collect(),
            )),
            latency,
            ..Files::default()
        };

        let app = Router::new().fallback(serve).with_state(files.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let endpoint = format!("http://{}", listener.local_addr()?);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;
        });

        Ok(Self {
            endpoint,
            files,
            shutdown_tx,
        })
    }

    /// Publish `bytes` at `path`, replacing what was there.
    pub async fn put(&self, path: &str, bytes: Vec<u8>) {
        self.files
            .entries
            .write()
            .await
            .insert(path.to_string(), bytes);
    }

    /// Number of requests received so far
    pub fn hits(&self) -> usize {
        self.files.hits.load(Ordering::SeqCst)
    }

    /// Stop the server.
    pub fn stop(self) {
        let _ = self.shutdown_tx.send(());
    }
}
