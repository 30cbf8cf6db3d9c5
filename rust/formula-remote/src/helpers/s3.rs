use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use hyper::server::conn::http1;
use hyper_util::rt::TokioIo;
use hyper_util::service::TowerToHyperService;
use s3s::dto::{GetObjectInput, GetObjectOutput, StreamingBlob};
use s3s::service::S3ServiceBuilder;
use s3s::{S3, S3Request, S3Response, S3Result, s3_error};
use tokio::net::TcpListener;
use tokio::sync::{RwLock, oneshot};

/// Read-only in-memory bucket store.
///
/// Structure: bucket_name -> key -> object bytes
#[derive(Clone, Default)]
struct InMemoryS3 {
    buckets: Arc<RwLock<HashMap<String, HashMap<String, Vec<u8>>>>>,
}

#[async_trait]
impl S3 for InMemoryS3 {
    async fn get_object(
        &self,
        req: S3Request<GetObjectInput>,
    ) -> S3Result<S3Response<GetObjectOutput>> {
        let buckets = self.buckets.read().await;
        let bucket = buckets
            .get(&req.input.bucket)
            .ok_or_else(|| s3_error!(NoSuchBucket))?;
        let data = bucket
            .get(&req.input.key)
            .ok_or_else(|| s3_error!(NoSuchKey))?;

        let body = s3s::Body::from(Bytes::from(data.clone()));
        let output = GetObjectOutput {
            body: Some(StreamingBlob::from(body)),
            content_length: Some(data.len() as i64),
            ..Default::default()
        };
        Ok(S3Response::new(output))
    }
}

/// A running S3-compatible server holding a single bucket.
pub struct LocalS3 {
    /// The endpoint URL where the server is listening
    pub endpoint: String,
    /// Name of the bucket the server was started with
    pub bucket: String,
    storage: InMemoryS3,
    shutdown_tx: oneshot::Sender<()>,
}

impl LocalS3 {
    /// Start a server accepting unsigned requests against `bucket`.
    pub async fn start(bucket: &str) -> anyhow::Result<Self> {
        Self::start_internal(None, bucket).await
    }

    /// Start a server that only accepts requests signed with the given key pair.
    pub async fn start_with_auth(
        access_key: &str,
        secret_key: &str,
        bucket: &str,
    ) -> anyhow::Result<Self> {
        let auth = s3s::auth::SimpleAuth::from_single(access_key, secret_key);
        Self::start_internal(Some(auth), bucket).await
    }

    async fn start_internal(
        auth: Option<s3s::auth::SimpleAuth>,
        bucket: &str,
    ) -> anyhow::Result<Self> {
        let storage = InMemoryS3::default();
        storage
            .buckets
            .write()
            .await
            .insert(bucket.to_string(), HashMap::new());

        let mut builder = S3ServiceBuilder::new(storage.clone());
        if let Some(auth) = auth {
            builder.set_auth(auth);
        }
        let service = builder.build();

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let endpoint = format!("http://{}", listener.local_addr()?);

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    result = listener.accept() => {
                        if let Ok((stream, _)) = result {
                            let hyper_service = TowerToHyperService::new(service.clone());
                            tokio::spawn(async move {
                                let _ = http1::Builder::new()
                                    .serve_connection(TokioIo::new(stream), hyper_service)
                                    .await;
                            });
                        }
                    }
                }
            }
        });

        Ok(Self {
            endpoint,
            bucket: bucket.to_string(),
            storage,
            shutdown_tx,
        })
    }

    /// Store `bytes` under `key` in the bucket.
    pub async fn put(&self, key: &str, bytes: Vec<u8>) {
        let mut buckets = self.storage.buckets.write().await;
        buckets
            .entry(self.bucket.clone())
            .or_default()
            .insert(key.to_string(), bytes);
    }

    /// Stop the server.
    pub fn stop(self) {
        let _ = self.shutdown_tx.send(());
    }
}
