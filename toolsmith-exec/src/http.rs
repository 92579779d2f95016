use std::collections::BTreeMap;
use std::time::{Duration, SystemTime};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use toolsmith_core::HttpMethod;
use url::Url;

use crate::error::{FailureCode, TransportError};
use crate::retry::{parse_rate_limit, RateLimitInfo};

/// A fully-resolved call, ready for the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiRequest {
    pub method: HttpMethod,
    /// Path with parameters substituted and percent-encoded.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
    /// Server declared by the operation, used when the executor has no base URL.
    pub server_url: Option<String>,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: BTreeMap::new(),
            body: None,
            server_url: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    /// Parsed JSON, a string for non-JSON payloads, or null when empty.
    pub body: Value,
}

impl ApiResponse {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body,
        }
    }
}

pub fn decode_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

/// The outbound boundary. Implementations return `Err(TransportError::Status)`
/// for any non-2xx response.
#[async_trait]
pub trait ApiExecutor: Send + Sync {
    async fn execute(&self, request: ApiRequest, timeout: Duration) -> Result<ApiResponse, TransportError>;

    fn rate_limit(&self, response: &ApiResponse) -> Option<RateLimitInfo> {
        parse_rate_limit(&response.headers, SystemTime::now())
    }
}

pub struct ReqwestExecutor {
    client: reqwest::Client,
    base_url: Option<Url>,
    token: Option<SecretString>,
}

impl ReqwestExecutor {
    pub fn new(base_url: Option<Url>, token: Option<SecretString>) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("toolsmith/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::InvalidRequest {
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self::with_client(client, base_url, token))
    }

    pub fn with_client(client: reqwest::Client, base_url: Option<Url>, token: Option<SecretString>) -> Self {
        Self {
            client,
            base_url,
            token,
        }
    }

    fn url_for(&self, request: &ApiRequest) -> Result<Url, TransportError> {
        let base = match (&self.base_url, &request.server_url) {
            (Some(base), _) => base.as_str().to_string(),
            (None, Some(server)) => server.clone(),
            (None, None) => {
                return Err(TransportError::InvalidRequest {
                    message: "no base URL configured and the operation declares no server".into(),
                })
            }
        };
        // Concatenate rather than `Url::join`, which would drop a base path like `/v1`.
        let raw = format!("{}{}", base.trim_end_matches('/'), request.path);
        let mut url = Url::parse(&raw).map_err(|e| TransportError::InvalidRequest {
            message: format!("invalid URL '{raw}': {e}"),
        })?;
        if !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in &request.query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl ApiExecutor for ReqwestExecutor {
    async fn execute(&self, request: ApiRequest, timeout: Duration) -> Result<ApiResponse, TransportError> {
        let url = self.url_for(&request)?;
        let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes()).map_err(|e| {
            TransportError::InvalidRequest {
                message: e.to_string(),
            }
        })?;

        let mut rb = self.client.request(method, url).timeout(timeout);
        if let Some(token) = &self.token {
            rb = rb.bearer_auth(token.expose_secret());
        }
        for (k, v) in &request.headers {
            rb = rb.header(k, v);
        }
        if let Some(body) = &request.body {
            rb = rb.json(body);
        }

        let resp = rb.send().await.map_err(map_reqwest_error)?;
        let status = resp.status().as_u16();

        let mut headers = BTreeMap::new();
        for (k, v) in resp.headers().iter() {
            if let Ok(s) = v.to_str() {
                headers.insert(k.to_string(), s.to_string());
            }
        }

        let body = resp.bytes().await.map_err(map_reqwest_error)?.to_vec();
        if !(200..300).contains(&status) {
            return Err(TransportError::Status {
                status,
                headers,
                body,
            });
        }
        Ok(ApiResponse {
            status,
            headers,
            body: decode_body(&body),
        })
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    // Timeout first: a connect timeout is also a connect error.
    if e.is_timeout() {
        return TransportError::Io {
            code: FailureCode::Timeout,
            message: e.to_string(),
        };
    }
    if e.is_builder() {
        return TransportError::InvalidRequest { message: e.to_string() };
    }
    if e.is_connect() {
        return TransportError::Io {
            code: connect_failure_code(&e),
            message: e.to_string(),
        };
    }
    TransportError::Unclassified { message: e.to_string() }
}

fn connect_failure_code(e: &reqwest::Error) -> FailureCode {
    let mut source: Option<&(dyn std::error::Error + 'static)> = std::error::Error::source(e);
    while let Some(err) = source {
        if let Some(io) = err.downcast_ref::<std::io::Error>() {
            match io.kind() {
                std::io::ErrorKind::ConnectionReset => return FailureCode::ConnectionReset,
                std::io::ErrorKind::ConnectionRefused => return FailureCode::ConnectionRefused,
                _ => {}
            }
        }
        if err.to_string().contains("dns error") {
            return FailureCode::DnsLookup;
        }
        source = err.source();
    }
    FailureCode::ConnectionRefused
}
