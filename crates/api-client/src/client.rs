//! HTTP gateway
//!
//! Every outbound call goes through [`RentacarClient::request`], which
//! attaches the bearer token, drives the [`LoadingBus`], and turns whatever
//! happened on the wire into a [`NormalizedResponse`] or [`NormalizedError`].

use crate::config::{is_absolute, ClientConfig};
use crate::endpoints::{AuthApi, BrandsApi, CarsApi, ClientsApi, RentalsApi};
use crate::error::{ApiError, ApiResult, GatewayResult, NormalizedError};
use crate::loading::{LoadingBus, LoadingGuard};
use crate::navigation::{MemoryNavigator, Navigator, LOGIN_ROUTE};
use crate::resource::Resource;
use crate::response::{body_message, str_field, NormalizedResponse};
use crate::session::SessionTokens;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Method, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Request correlation ID header
const X_REQUEST_ID: &str = "X-Request-ID";

/// Message used when neither the body nor the caller supplied one
const DEFAULT_SUCCESS_MESSAGE: &str = "Request completed";

/// Per-call options understood by the gateway
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Keep this call off the loading bus entirely
    pub skip_global_loading: bool,
    /// Message used when the response body carries none
    pub success_message: Option<String>,
    /// Query string parameters
    pub query: Vec<(String, String)>,
}

impl RequestOptions {
    /// Default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Do not show the global loading indicator for this call
    #[must_use]
    pub fn silent(mut self) -> Self {
        self.skip_global_loading = true;
        self
    }

    /// Message to report when the body has none
    #[must_use]
    pub fn with_success_message(mut self, message: impl Into<String>) -> Self {
        self.success_message = Some(message.into());
        self
    }

    /// Append a query parameter
    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Append several query parameters
    #[must_use]
    pub fn with_query_pairs<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }
}

/// Rentacar backend client
///
/// Cheap to clone; clones share the HTTP connection pool, the loading bus,
/// the session store and the navigator.
#[derive(Clone)]
pub struct RentacarClient {
    inner: Client,
    config: Arc<ClientConfig>,
    bus: LoadingBus,
    session: SessionTokens,
    navigator: Arc<dyn Navigator>,
}

/// Builder for [`RentacarClient`]
pub struct ClientBuilder {
    config: ClientConfig,
    bus: Option<LoadingBus>,
    session: Option<SessionTokens>,
    navigator: Option<Arc<dyn Navigator>>,
}

impl ClientBuilder {
    /// Share an existing loading bus
    #[must_use]
    pub fn loading_bus(mut self, bus: LoadingBus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// Use a session token store
    #[must_use]
    pub fn session(mut self, session: SessionTokens) -> Self {
        self.session = Some(session);
        self
    }

    /// Plug in the front-end router
    #[must_use]
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Build the client
    pub fn build(self) -> ApiResult<RentacarClient> {
        self.config.validate()?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("rentacar-api-client/", env!("CARGO_PKG_VERSION"))),
        );

        let inner = Client::builder()
            .timeout(self.config.timeout)
            .default_headers(default_headers)
            .build()
            .map_err(ApiError::Request)?;

        Ok(RentacarClient {
            inner,
            config: Arc::new(self.config),
            bus: self.bus.unwrap_or_default(),
            session: self.session.unwrap_or_else(SessionTokens::in_memory),
            navigator: self
                .navigator
                .unwrap_or_else(|| Arc::new(MemoryNavigator::default())),
        })
    }
}

impl RentacarClient {
    /// Create a client configured from the environment, with an in-memory
    /// session and no router
    pub fn new() -> ApiResult<Self> {
        Self::builder(ClientConfig::from_env()?).build()
    }

    /// Create a client with specific configuration and default collaborators
    pub fn with_config(config: ClientConfig) -> ApiResult<Self> {
        Self::builder(config).build()
    }

    /// Start building a client
    #[must_use]
    pub fn builder(config: ClientConfig) -> ClientBuilder {
        ClientBuilder {
            config,
            bus: None,
            session: None,
            navigator: None,
        }
    }

    /// Get the current configuration
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the base URL, if configured
    #[must_use]
    pub fn base_url(&self) -> Option<&str> {
        self.config.base_url.as_deref()
    }

    /// Loading bus driven by this client
    #[must_use]
    pub fn loading_bus(&self) -> &LoadingBus {
        &self.bus
    }

    /// Session tokens used for bearer authentication
    #[must_use]
    pub fn session(&self) -> &SessionTokens {
        &self.session
    }

    /// Router notified on session expiry
    #[must_use]
    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    // -------------------------------------------------------------------------
    // Endpoint API accessors
    // -------------------------------------------------------------------------

    /// Generic CRUD client for a backend resource
    #[must_use]
    pub fn resource(&self, base_path: &str, label: &str) -> Resource {
        Resource::new(self.clone(), base_path, label)
    }

    /// Access authentication endpoints
    #[must_use]
    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.clone())
    }

    /// Access vehicle endpoints
    #[must_use]
    pub fn cars(&self) -> CarsApi {
        CarsApi::new(self.clone())
    }

    /// Access brand endpoints
    #[must_use]
    pub fn brands(&self) -> BrandsApi {
        BrandsApi::new(self.clone())
    }

    /// Access client (customer) endpoints
    #[must_use]
    pub fn clients(&self) -> ClientsApi {
        ClientsApi::new(self.clone())
    }

    /// Access rental endpoints
    #[must_use]
    pub fn rentals(&self) -> RentalsApi {
        RentalsApi::new(self.clone())
    }

    // -------------------------------------------------------------------------
    // Gateway
    // -------------------------------------------------------------------------

    /// Perform a GET request
    pub async fn get(&self, path: &str, options: RequestOptions) -> GatewayResult {
        self.request(Method::GET, path, Option::<&()>::None, options)
            .await
    }

    /// Perform a POST request
    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
        options: RequestOptions,
    ) -> GatewayResult {
        self.request(Method::POST, path, body, options).await
    }

    /// Perform a PUT request
    pub async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> GatewayResult {
        self.request(Method::PUT, path, Some(body), options).await
    }

    /// Perform a DELETE request
    pub async fn delete(&self, path: &str, options: RequestOptions) -> GatewayResult {
        self.request(Method::DELETE, path, Option::<&()>::None, options)
            .await
    }

    /// Send a request through the gateway
    ///
    /// Statuses below 500 resolve, except 401 and 403 which expire the
    /// session and reject. 5xx and transport failures reject.
    #[instrument(skip(self, body, options), fields(request_id = tracing::field::Empty))]
    pub async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        options: RequestOptions,
    ) -> GatewayResult {
        let loading = if options.skip_global_loading {
            LoadingGuard::untracked()
        } else {
            self.bus.track()
        };

        let Some(url) = self.resolve_url(path) else {
            warn!(path, "No base URL configured for a relative path");
            return Err(transport_failure(loading, NormalizedError::network()));
        };

        let request_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("request_id", request_id.as_str());

        let mut request = self
            .inner
            .request(method.clone(), &url)
            .header(X_REQUEST_ID, &request_id);

        if !options.query.is_empty() {
            request = request.query(&options.query);
        }

        match self.session.bearer() {
            Some(token) => request = request.bearer_auth(token),
            None => warn!(url = %url, "No session token found for request"),
        }

        if let Some(b) = body {
            request = request.json(b);
        }

        let start = Instant::now();
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(request_id = %request_id, url = %url, error = %e, "Request failed without a response");
                return Err(transport_failure(loading, classify_transport(&e)));
            }
        };

        let status = response.status();
        let headers = collect_headers(response.headers());
        let data = match read_body(response).await {
            Ok(data) => data,
            Err(e) => {
                warn!(request_id = %request_id, url = %url, error = %e, "Failed to read response body");
                return Err(transport_failure(loading, classify_transport(&e)));
            }
        };

        debug!(
            request_id = %request_id,
            method = %method,
            url = %url,
            status = status.as_u16(),
            elapsed_ms = start.elapsed().as_millis(),
            "Request finished"
        );

        loading.finish();

        let code = status.as_u16();
        if code < 500 && !is_auth_failure(code) {
            let message = str_field(&data, "message")
                .map(String::from)
                .or(options.success_message)
                .unwrap_or_else(|| DEFAULT_SUCCESS_MESSAGE.to_string());
            return Ok(NormalizedResponse {
                status: code,
                data,
                message,
                headers,
            });
        }

        if is_auth_failure(code) {
            warn!(request_id = %request_id, status = code, "Session rejected by backend");
            self.expire_session();
        }

        let message = failure_message(status, &data);
        Err(NormalizedError::from_response(NormalizedResponse {
            status: code,
            data,
            message,
            headers,
        }))
    }

    /// Resolve `path` against the base URL; absolute URLs pass through
    fn resolve_url(&self, path: &str) -> Option<String> {
        if is_absolute(path) {
            return Some(path.to_string());
        }
        let base = self.config.base_url.as_deref()?;
        Some(format!(
            "{}/{}",
            base.trim_end_matches('/'),
            path.trim_start_matches('/')
        ))
    }

    /// Drop the stored session and send the front end to the login route
    fn expire_session(&self) {
        if let Err(e) = self.session.clear() {
            warn!(error = %e, "Failed to clear session tokens");
        }
        if self.navigator.current_route() != LOGIN_ROUTE {
            self.navigator.navigate(LOGIN_ROUTE);
        }
    }
}

impl std::fmt::Debug for RentacarClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RentacarClient")
            .field("config", &self.config)
            .field("bus", &self.bus)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

fn is_auth_failure(status: u16) -> bool {
    status == 401 || status == 403
}

// A transport failure may leave several requests with unknown ordering,
// so the counter is zeroed instead of decremented.
fn transport_failure(loading: LoadingGuard, error: NormalizedError) -> NormalizedError {
    loading.reset();
    error
}

fn classify_transport(error: &reqwest::Error) -> NormalizedError {
    if error.is_timeout() {
        NormalizedError::timeout()
    } else {
        NormalizedError::network()
    }
}

fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}

/// Parse a body as JSON, falling back to text; empty bodies become null
async fn read_body(response: Response) -> Result<Value, reqwest::Error> {
    let bytes = response.bytes().await?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned())))
}

/// `message`, `error`, `detail`, reason phrase, then a template
fn failure_message(status: StatusCode, data: &Value) -> String {
    body_message(data)
        .or_else(|| status.canonical_reason())
        .map(String::from)
        .unwrap_or_else(|| format!("Error {}: Request failed", status.as_u16()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_creation() {
        let client = RentacarClient::with_config(ClientConfig::development());
        assert!(client.is_ok());
    }

    #[test]
    fn test_client_rejects_invalid_config() {
        let config = ClientConfig::default().with_base_url("localhost:3000");
        assert!(RentacarClient::with_config(config).is_err());
    }

    #[test]
    fn test_resolve_url() {
        let client = RentacarClient::with_config(
            ClientConfig::default().with_base_url("http://api.test/v1/"),
        )
        .unwrap();
        assert_eq!(client.resolve_url("Car/3").as_deref(), Some("http://api.test/v1/Car/3"));
        assert_eq!(client.resolve_url("/auth/me").as_deref(), Some("http://api.test/v1/auth/me"));
        assert_eq!(
            client.resolve_url("https://other.test/auth/login").as_deref(),
            Some("https://other.test/auth/login")
        );
    }

    #[test]
    fn test_resolve_url_without_base() {
        let client = RentacarClient::with_config(ClientConfig::default()).unwrap();
        assert!(client.resolve_url("Car").is_none());
        assert!(client.resolve_url("http://x.test/auth/login").is_some());
    }

    #[test]
    fn test_failure_message_priority() {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        assert_eq!(failure_message(status, &json!({ "message": "m", "error": "e" })), "m");
        assert_eq!(failure_message(status, &json!({ "error": "e", "detail": "d" })), "e");
        assert_eq!(failure_message(status, &json!({ "detail": "d" })), "d");
        assert_eq!(failure_message(status, &Value::Null), "Internal Server Error");

        let unknown = StatusCode::from_u16(599).unwrap();
        assert_eq!(failure_message(unknown, &Value::Null), "Error 599: Request failed");
    }

    #[test]
    fn test_request_options_builder() {
        let options = RequestOptions::new()
            .silent()
            .with_success_message("ok")
            .with_query("include", "Brand")
            .with_query_pairs([("page", "2")]);

        assert!(options.skip_global_loading);
        assert_eq!(options.success_message.as_deref(), Some("ok"));
        assert_eq!(options.query.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_base_url_resets_bus() {
        let client = RentacarClient::with_config(ClientConfig::default()).unwrap();
        client.loading_bus().increment();

        let err = client.get("Car", RequestOptions::new()).await.unwrap_err();
        assert_eq!(err.status(), 0);
        assert!(err.kind.is_connectivity());
        assert_eq!(client.loading_bus().count(), 0);
    }
}
