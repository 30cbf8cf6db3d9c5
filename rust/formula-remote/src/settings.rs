use std::time::Duration;

use crate::s3::Credentials;

/// Upper bound on fetching an index document over HTTP
pub const INDEX_TIMEOUT: Duration = Duration::from_secs(5);

/// Environment variable holding the S3 access key id
pub const ACCESS_KEY_ID_VAR: &str = "AWS_ACCESS_KEY_ID";
/// Environment variable holding the S3 secret access key
pub const SECRET_ACCESS_KEY_VAR: &str = "AWS_SECRET_ACCESS_KEY";
/// Environment variable holding an optional S3 session token
pub const SESSION_TOKEN_VAR: &str = "AWS_SESSION_TOKEN";
/// Environment variable overriding the S3 endpoint
pub const S3_ENDPOINT_VAR: &str = "FORMULA_S3_ENDPOINT";

/// Settings shared by every backend a router connects to
#[derive(Debug, Clone)]
pub struct RemoteSettings {
    /// Timeout applied to HTTP index fetches
    pub index_timeout: Duration,

    /// Timeout applied to raw file fetches; `None` waits indefinitely
    pub raw_timeout: Option<Duration>,

    /// Credentials used to sign S3 requests; unsigned when absent
    pub credentials: Option<Credentials>,

    /// S3-compatible endpoint used instead of the regional AWS endpoint
    pub s3_endpoint: Option<String>,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            index_timeout: INDEX_TIMEOUT,
            raw_timeout: None,
            credentials: None,
            s3_endpoint: None,
        }
    }
}

impl RemoteSettings {
    /// Create settings with default timeouts and no S3 credentials
    pub fn new() -> Self {
        Self::default()
    }

    /// Read S3 credentials and endpoint from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from a variable lookup function
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let credentials = match (present(ACCESS_KEY_ID_VAR), present(SECRET_ACCESS_KEY_VAR)) {
            (Some(access_key_id), Some(secret_access_key)) => Some(Credentials {
                access_key_id,
                secret_access_key,
                session_token: present(SESSION_TOKEN_VAR),
            }),
            _ => None,
        };

        Self {
            credentials,
            s3_endpoint: present(S3_ENDPOINT_VAR),
            ..Self::default()
        }
    }

    /// Set the HTTP index fetch timeout
    pub fn with_index_timeout(mut self, timeout: Duration) -> Self {
        self.index_timeout = timeout;
        self
    }

    /// Bound raw file fetches by `timeout`
    pub fn with_raw_timeout(mut self, timeout: Duration) -> Self {
        self.raw_timeout = Some(timeout);
        self
    }

    /// Sign S3 requests with `credentials`
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Send S3 requests to `endpoint`
    pub fn with_s3_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.s3_endpoint = Some(endpoint.into());
        self
    }
}
