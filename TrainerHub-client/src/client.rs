use std::env;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::{ApiException, ApiResult, ErrorCode};
use crate::interceptor::{LoggingInterceptor, RequestInterceptor, ResponseInterceptor};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Root of the REST surface, e.g. `http://localhost:8080/api/v1`
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Base URL from `API_BASE_URL`, falling back to the local server
    pub fn from_env() -> Self {
        env::var("API_BASE_URL").map(Self::new).unwrap_or_default()
    }
}

/// Success body of the REST surface
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<Value>,
}

type UnauthorizedHook = Arc<dyn Fn() + Send + Sync>;

/// HTTP client for the TrainerHub API
///
/// Cloning is cheap and clones share the auth token.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Arc<RwLock<Option<String>>>,
    request_interceptors: Vec<Arc<dyn RequestInterceptor>>,
    response_interceptors: Vec<Arc<dyn ResponseInterceptor>>,
    on_unauthorized: Option<UnauthorizedHook>,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| ApiException::new(ErrorCode::InternalError, format!("Failed to create HTTP client: {}", e), 0))?;

        info!("API client targeting {}", config.base_url);
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: Arc::new(RwLock::new(None)),
            request_interceptors: Vec::new(),
            response_interceptors: Vec::new(),
            on_unauthorized: None,
        })
    }

    /// Client for another mount point of the same server, sharing token and hooks
    pub fn with_base_url(&self, base_url: impl Into<String>) -> Self {
        let mut client = self.clone();
        client.base_url = base_url.into().trim_end_matches('/').to_string();
        client
    }

    pub fn with_request_interceptor(mut self, interceptor: impl RequestInterceptor + 'static) -> Self {
        self.request_interceptors.push(Arc::new(interceptor));
        self
    }

    pub fn with_response_interceptor(mut self, interceptor: impl ResponseInterceptor + 'static) -> Self {
        self.response_interceptors.push(Arc::new(interceptor));
        self
    }

    /// Log every request and response at debug level
    pub fn with_logging(self) -> Self {
        self.with_request_interceptor(LoggingInterceptor)
            .with_response_interceptor(LoggingInterceptor)
    }

    /// Called after a 401 has cleared the stored token
    pub fn on_unauthorized(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_unauthorized = Some(Arc::new(hook));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_auth_token(&self, token: impl Into<String>) {
        let mut guard = self.token.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(token.into());
    }

    pub fn clear_auth_token(&self) {
        let mut guard = self.token.write().unwrap_or_else(|e| e.into_inner());
        *guard = None;
    }

    pub fn auth_token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{}", self.base_url, path));
        match self.auth_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and return the body of a successful response
    async fn dispatch(&self, builder: RequestBuilder) -> ApiResult<Vec<u8>> {
        let mut request = builder
            .build()
            .map_err(|e| ApiException::new(ErrorCode::InternalError, format!("Invalid request: {}", e), 0))?;
        for interceptor in &self.request_interceptors {
            interceptor.on_request(&mut request);
        }
        let method = request.method().clone();
        let url = request.url().path().to_string();

        let result = self.execute(request).await;
        match &result {
            Ok((status, _)) => {
                for interceptor in &self.response_interceptors {
                    interceptor.on_response(&method, &url, *status);
                }
            }
            Err(error) => {
                for interceptor in &self.response_interceptors {
                    interceptor.on_error(&method, &url, error);
                }
            }
        }

        let (status, body) = result?;
        if status.is_success() {
            return Ok(body);
        }

        let error = ApiException::from_response(status.as_u16(), &body);
        if status == StatusCode::UNAUTHORIZED {
            warn!("Unauthorized response from {}, clearing session", url);
            self.clear_auth_token();
            if let Some(hook) = &self.on_unauthorized {
                hook();
            }
        }
        for interceptor in &self.response_interceptors {
            interceptor.on_error(&method, &url, &error);
        }
        Err(error)
    }

    async fn execute(&self, request: reqwest::Request) -> ApiResult<(StatusCode, Vec<u8>)> {
        let response = self.http.execute(request).await.map_err(|e| ApiException::network(&e))?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| ApiException::network(&e))?;
        Ok((status, body.to_vec()))
    }

    async fn enveloped<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<T> {
        let body = self.dispatch(builder).await?;
        unwrap_envelope(&body)
    }

    async fn plain<T: DeserializeOwned>(&self, builder: RequestBuilder) -> ApiResult<T> {
        let body = self.dispatch(builder).await?;
        serde_json::from_slice(&body).map_err(|e| ApiException::decode(e, 200))
    }

    // REST surface: the `data` member of the success envelope

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.enveloped(self.request(Method::GET, path)).await
    }

    pub async fn get_with_query<T, Q>(&self, path: &str, query: &Q) -> ApiResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.enveloped(self.request(Method::GET, path).query(query)).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.enveloped(self.request(Method::POST, path).json(body)).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.enveloped(self.request(Method::PUT, path).json(body)).await
    }

    pub async fn patch<T, B>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.enveloped(self.request(Method::PATCH, path).json(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.enveloped(self.request(Method::DELETE, path)).await
    }

    pub async fn delete_with_body<T, B>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.enveloped(self.request(Method::DELETE, path).json(body)).await
    }

    // Function surface: the body as sent

    pub async fn get_plain<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.plain(self.request(Method::GET, path)).await
    }

    pub async fn post_plain<T, B>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.plain(self.request(Method::POST, path).json(body)).await
    }
}

/// Extract `data` from a success envelope; a missing `data` reads as `null`
fn unwrap_envelope<T: DeserializeOwned>(body: &[u8]) -> ApiResult<T> {
    let data = if body.is_empty() {
        Value::Null
    } else {
        let envelope: Envelope = serde_json::from_slice(body).map_err(|e| ApiException::decode(e, 200))?;
        envelope.data.unwrap_or(Value::Null)
    };
    serde_json::from_value(data).map_err(|e| ApiException::decode(e, 200))
}
