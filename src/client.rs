//! Authenticated request pipeline.
//!
//! The [`Client`] builds URLs and headers, sends the request and either hands
//! back a [`Response`] or maps the failure into an [`Error`]. Use
//! [`ClientBuilder`] or [`Client::new`] with a [`Config`] to create one.

use crate::{
    config::{Config, Environment, DEFAULT_ENDPOINT, DEFAULT_VERSION},
    error::{RawRequest, TransportError},
    metadata::RequestOptions,
    multipart,
    validation::Params,
    Error, Response, Result,
};
use http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderMap, HeaderName, HeaderValue, Method,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Value of the JSON `Content-Type` and `Accept` headers.
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// API credentials, fixed for the lifetime of a client.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
    version: String,
    endpoint: String,
}

impl Credentials {
    /// Creates credentials, falling back to the default version and endpoint.
    pub fn new(
        api_key: impl Into<String>,
        version: Option<String>,
        endpoint: Option<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            version: version.unwrap_or_else(|| DEFAULT_VERSION.to_string()),
            endpoint: endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
        }
    }

    /// The API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// The API version segment, e.g. `v1`.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// The base URL of the API.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("version", &self.version)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Client for the mail-fulfillment REST API.
///
/// The client is cheap to clone and is meant to be reused: the underlying
/// connection pool is created once, at build time.
///
/// # Examples
///
/// ```no_run
/// use olc::{Client, RequestOptions};
///
/// # async fn example() -> Result<(), olc::Error> {
/// let client = Client::builder()
///     .api_key("my-api-key")
///     .build()?;
///
/// let orders = client
///     .get("/orders", RequestOptions::new().authorized())
///     .await?
///     .value_at("data")?;
/// println!("Orders: {:?}", orders);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    credentials: Credentials,
    default_headers: HeaderMap,
    timeout: Option<Duration>,
    ssl_verify: bool,
    environment: Environment,
}

impl Client {
    /// Creates a new `ClientBuilder` for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Creates a client from a [`Config`].
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty or the endpoint is not a
    /// valid URL.
    pub fn new(config: Config) -> Result<Self> {
        ClientBuilder::from_config(config).build()
    }

    /// The credentials this client signs requests with.
    pub fn credentials(&self) -> &Credentials {
        &self.inner.credentials
    }

    /// Whether TLS certificates are verified.
    pub fn ssl_verify(&self) -> bool {
        self.inner.ssl_verify
    }

    /// The deployment environment this client was configured for.
    pub fn environment(&self) -> &Environment {
        &self.inner.environment
    }

    /// Joins `{endpoint}/api/{version}/{routes...}`.
    ///
    /// Runs of slashes in the path are collapsed to one. A query string
    /// carried by the last route is left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use olc::Client;
    ///
    /// let client = Client::builder()
    ///     .api_key("k")
    ///     .endpoint("https://api.example.com/")?
    ///     .build()?;
    ///
    /// assert_eq!(
    ///     client.build_url(&["/orders/", "/42"]),
    ///     "https://api.example.com/api/v1/orders/42"
    /// );
    /// # Ok::<(), olc::Error>(())
    /// ```
    pub fn build_url(&self, routes: &[&str]) -> String {
        let (origin, base_path) = split_origin(self.inner.credentials.endpoint());

        let mut joined = format!("{}/api/{}", base_path, self.inner.credentials.version());
        for route in routes {
            joined.push('/');
            joined.push_str(route);
        }

        let (path, query) = match joined.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (joined.as_str(), None),
        };

        let mut url = String::with_capacity(origin.len() + joined.len() + 1);
        url.push_str(origin);
        url.push('/');
        let mut previous_slash = true;
        for c in path.chars() {
            if c == '/' && previous_slash {
                continue;
            }
            previous_slash = c == '/';
            url.push(c);
        }
        if let Some(query) = query {
            url.push('?');
            url.push_str(query);
        }
        url
    }

    /// Builds the headers for a request.
    ///
    /// JSON `Content-Type`/`Accept` are set when `json_headers` is on and the
    /// bearer `Authorization` when `authorize` is on. Caller headers are
    /// merged on top and win, except that they cannot introduce
    /// content-negotiation or authorization headers whose flag is off.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for a header name or value that is
    /// not valid HTTP.
    pub fn build_headers(&self, options: &RequestOptions) -> Result<HeaderMap> {
        let mut headers = self.inner.default_headers.clone();

        if options.json_headers {
            let json = HeaderValue::from_static(JSON_CONTENT_TYPE);
            headers.insert(CONTENT_TYPE, json.clone());
            headers.insert(ACCEPT, json);
        }

        if options.authorize {
            headers.insert(AUTHORIZATION, bearer(self.inner.credentials.api_key())?);
        }

        for (name, value) in &options.headers {
            let name = HeaderName::try_from(name.as_str())
                .map_err(|e| Error::InvalidConfig(format!("Invalid header name: {}", e)))?;

            let governed_by_flag = if name == CONTENT_TYPE || name == ACCEPT {
                Some(options.json_headers)
            } else if name == AUTHORIZATION {
                Some(options.authorize)
            } else {
                None
            };
            if governed_by_flag == Some(false) {
                tracing::warn!(header = %name, "Ignoring header whose request flag is off");
                continue;
            }

            let mut value = HeaderValue::try_from(value.as_str())
                .map_err(|e| Error::InvalidConfig(format!("Invalid header value: {}", e)))?;
            if name == AUTHORIZATION {
                value.set_sensitive(true);
            }
            headers.insert(name, value);
        }

        Ok(headers)
    }

    /// Sends a request and returns the successful response.
    ///
    /// `body` follows these rules: `None` sends no body, an empty map sends an
    /// empty payload, anything else is sent as JSON. Multipart file parts in
    /// `options` are streamed as the body instead.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidConfig`] if the options are contradictory (multipart
    ///   with JSON headers, or multipart with a JSON body)
    /// - [`Error::NotFound`] if a multipart file does not exist
    /// - [`Error::Network`] if the request could not be completed
    /// - [`Error::Transport`] if the service answered with a non-2xx status
    pub async fn request(
        &self,
        method: Method,
        route: &str,
        body: Option<&Params>,
        options: RequestOptions,
    ) -> Result<Response> {
        if options.multipart.is_some() {
            if options.json_headers {
                return Err(Error::InvalidConfig(
                    "Multipart uploads cannot carry JSON content headers".to_string(),
                ));
            }
            if body.is_some_and(|b| !b.is_empty()) {
                return Err(Error::InvalidConfig(
                    "Multipart uploads cannot carry a JSON body".to_string(),
                ));
            }
        }

        let mut url = Url::parse(&self.build_url(&[route]))?;
        if !options.query_params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &options.query_params {
                pairs.append_pair(key, value);
            }
        }

        let headers = self.build_headers(&options)?;

        let form = match &options.multipart {
            Some(parts) => Some(multipart::build_form(parts).await?),
            None => None,
        };

        let payload = match body {
            Some(map) if !map.is_empty() => Some(
                serde_json::to_vec(map).map_err(|e| Error::SerializationFailed(e.to_string()))?,
            ),
            _ => None,
        };

        tracing::debug!(
            method = %method,
            url = %url,
            authorize = options.authorize,
            multipart = form.is_some(),
            "Executing HTTP request"
        );

        let mut request = self
            .inner
            .http_client
            .request(method.clone(), url.clone())
            .headers(headers.clone());

        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }

        if let Some(form) = form {
            request = request.multipart(form);
        } else if let Some(payload) = payload {
            request = request.body(payload);
        } else if body.is_some() {
            request = request.body(Vec::new());
        }

        let start_time = Instant::now();
        let response = request.send().await.map_err(|e| {
            tracing::warn!(error = %e, method = %method, url = %url, "Request failed");
            Error::Network(e)
        })?;

        let status = response.status();
        let response_headers = response.headers().clone();
        let raw_body = response.bytes().await?.to_vec();
        let latency = start_time.elapsed();

        tracing::info!(
            status = status.as_u16(),
            latency_ms = latency.as_millis(),
            "Received HTTP response"
        );

        if !status.is_success() {
            let error = TransportError::new(
                RawRequest {
                    method,
                    url: url.to_string(),
                    headers,
                },
                status,
                response_headers,
                raw_body,
            );

            if status.is_server_error() {
                tracing::warn!(
                    status = status.as_u16(),
                    message = %error.message(),
                    "Server error (5xx)"
                );
            } else {
                tracing::error!(
                    status = status.as_u16(),
                    message = %error.message(),
                    errors = error.error_list().len(),
                    "Request rejected"
                );
            }

            return Err(error.into());
        }

        Ok(Response::new(raw_body, status, response_headers, latency))
    }

    /// Makes a GET request.
    pub async fn get(&self, route: &str, options: RequestOptions) -> Result<Response> {
        self.request(Method::GET, route, None, options).await
    }

    /// Makes a DELETE request.
    pub async fn delete(&self, route: &str, options: RequestOptions) -> Result<Response> {
        self.request(Method::DELETE, route, None, options).await
    }

    /// Makes a POST request.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use olc::{Client, RequestOptions};
    /// use serde_json::json;
    ///
    /// # async fn example() -> Result<(), olc::Error> {
    /// let client = Client::builder().api_key("my-api-key").build()?;
    ///
    /// let body = json!({"customFieldName": "Nickname"});
    /// let created = client
    ///     .post("/custom-fields", body.as_object(), RequestOptions::new().authorized())
    ///     .await?
    ///     .json()?;
    /// println!("Created: {}", created["data"]);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn post(
        &self,
        route: &str,
        body: Option<&Params>,
        options: RequestOptions,
    ) -> Result<Response> {
        self.request(Method::POST, route, body, options).await
    }

    /// Makes a PUT request.
    pub async fn put(
        &self,
        route: &str,
        body: Option<&Params>,
        options: RequestOptions,
    ) -> Result<Response> {
        self.request(Method::PUT, route, body, options).await
    }

    /// Makes a PATCH request.
    pub async fn patch(
        &self,
        route: &str,
        body: Option<&Params>,
        options: RequestOptions,
    ) -> Result<Response> {
        self.request(Method::PATCH, route, body, options).await
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("credentials", &self.inner.credentials)
            .field("ssl_verify", &self.inner.ssl_verify)
            .field("environment", &self.inner.environment)
            .field("timeout", &self.inner.timeout)
            .finish()
    }
}

/// Splits an endpoint into `scheme://authority` and the path after it.
fn split_origin(endpoint: &str) -> (&str, &str) {
    let authority_start = endpoint.find("://").map_or(0, |i| i + 3);
    match endpoint[authority_start..].find('/') {
        Some(i) => endpoint.split_at(authority_start + i),
        None => (endpoint, ""),
    }
}

fn bearer(api_key: &str) -> Result<HeaderValue> {
    let mut value = HeaderValue::try_from(format!("Bearer {}", api_key))
        .map_err(|e| Error::InvalidConfig(format!("Invalid API key: {}", e)))?;
    value.set_sensitive(true);
    Ok(value)
}

/// Builder for configuring and creating a [`Client`].
///
/// # Examples
///
/// ```no_run
/// use olc::ClientBuilder;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), olc::Error> {
/// let client = ClientBuilder::new()
///     .api_key("my-api-key")
///     .version("v1")
///     .endpoint("https://api.openletterconnect.com")?
///     .timeout(Duration::from_secs(30))
///     .default_header("X-Client", "my-app/1.0")?
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    api_key: Option<String>,
    version: Option<String>,
    endpoint: Option<String>,
    default_headers: HeaderMap,
    timeout: Option<Duration>,
    ssl_verify: bool,
    environment: Environment,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        Self {
            api_key: None,
            version: None,
            endpoint: None,
            default_headers: HeaderMap::new(),
            timeout: None,
            ssl_verify: true,
            environment: Environment::Production,
        }
    }

    /// Starts from an existing [`Config`].
    pub fn from_config(config: Config) -> Self {
        Self {
            api_key: Some(config.api_key),
            version: config.version,
            endpoint: config.endpoint,
            default_headers: HeaderMap::new(),
            timeout: config.timeout,
            ssl_verify: config.ssl_verify,
            environment: config.environment,
        }
    }

    /// Sets the API key.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the API version segment.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets the API endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn endpoint(mut self, endpoint: impl AsRef<str>) -> Result<Self> {
        Url::parse(endpoint.as_ref())?;
        self.endpoint = Some(endpoint.as_ref().to_string());
        Ok(self)
    }

    /// Adds a header that will be included in all requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the header is invalid, or if it is one of the
    /// headers controlled per request (`Authorization`, `Content-Type`,
    /// `Accept`).
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::InvalidConfig(format!("Invalid header name: {}", e)))?;
        if name == AUTHORIZATION || name == CONTENT_TYPE || name == ACCEPT {
            return Err(Error::InvalidConfig(format!(
                "The \"{}\" header is set per request",
                name
            )));
        }
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::InvalidConfig(format!("Invalid header value: {}", e)))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Enables or disables TLS certificate verification.
    pub fn ssl_verify(mut self, verify: bool) -> Self {
        self.ssl_verify = verify;
        self
    }

    /// Sets the deployment environment.
    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if no API key was provided, the endpoint is not a
    /// valid URL, or the HTTP client cannot be created.
    pub fn build(self) -> Result<Client> {
        let api_key = self
            .api_key
            .filter(|key| !key.is_empty())
            .ok_or_else(|| Error::InvalidConfig("API key is required".to_string()))?;

        if let Some(endpoint) = &self.endpoint {
            Url::parse(endpoint)?;
        }
        let version = self.version.filter(|v| !v.is_empty());
        let credentials = Credentials::new(api_key, version, self.endpoint);

        if !self.ssl_verify {
            tracing::warn!(
                endpoint = %credentials.endpoint(),
                "TLS certificate verification is disabled"
            );
        }

        let http_client = reqwest::Client::builder()
            .user_agent(format!("olc-rs/{}", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(!self.ssl_verify)
            .build()
            .map_err(|e| Error::InvalidConfig(format!("Failed to build HTTP client: {}", e)))?;

        tracing::debug!(
            endpoint = %credentials.endpoint(),
            version = %credentials.version(),
            environment = %self.environment.name(),
            "Built API client"
        );

        Ok(Client {
            inner: Arc::new(ClientInner {
                http_client,
                credentials,
                default_headers: self.default_headers,
                timeout: self.timeout,
                ssl_verify: self.ssl_verify,
                environment: self.environment,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> Client {
        Client::builder().api_key("test-key").build().unwrap()
    }

    #[test]
    fn test_build_url_defaults() {
        let client = client();
        assert_eq!(
            client.build_url(&["/orders"]),
            "https://api.openletterconnect.com/api/v1/orders"
        );
        assert_eq!(client.credentials().version(), "v1");
    }

    #[test]
    fn test_build_url_collapses_slashes() {
        let client = Client::builder()
            .api_key("k")
            .version("v2")
            .endpoint("http://localhost:8080///")
            .unwrap()
            .build()
            .unwrap();

        for routes in [
            vec!["//orders"],
            vec!["orders/", "/detail//7"],
            vec!["/custom-fields", ""],
        ] {
            let url = client.build_url(&routes);
            assert!(url.starts_with("http://localhost:8080/api/v2/"), "{}", url);
            let path = url.trim_start_matches("http://");
            assert!(!path.contains("//"), "{} has a double slash", url);
        }

        assert_eq!(
            client.build_url(&["orders/", "/detail//7"]),
            "http://localhost:8080/api/v2/orders/detail/7"
        );
    }

    #[test]
    fn test_build_url_collapses_endpoint_path() {
        for endpoint in ["http://localhost:8080//olc", "http://localhost:8080//olc//"] {
            let client = Client::builder()
                .api_key("k")
                .endpoint(endpoint)
                .unwrap()
                .build()
                .unwrap();

            let url = client.build_url(&["/orders"]);
            assert_eq!(url, "http://localhost:8080/olc/api/v1/orders");
            assert!(!url.trim_start_matches("http://").contains("//"), "{}", url);
        }
    }

    #[test]
    fn test_build_url_keeps_query() {
        let client = client();
        assert_eq!(
            client.build_url(&["/templates?next=a//b"]),
            "https://api.openletterconnect.com/api/v1/templates?next=a//b"
        );
    }

    #[test]
    fn test_build_url_is_idempotent() {
        let client = client();
        assert_eq!(client.build_url(&["/orders/1"]), client.build_url(&["/orders/1"]));
    }

    #[test]
    fn test_headers_json_and_authorization() {
        let client = client();
        let headers = client
            .build_headers(&RequestOptions::new().authorized())
            .unwrap();

        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer test-key");
        assert!(headers.get(AUTHORIZATION).unwrap().is_sensitive());
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), JSON_CONTENT_TYPE);
        assert_eq!(headers.get(ACCEPT).unwrap(), JSON_CONTENT_TYPE);
    }

    #[test]
    fn test_headers_without_authorize() {
        let headers = client().build_headers(&RequestOptions::new()).unwrap();
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_headers_without_json() {
        let headers = client()
            .build_headers(&RequestOptions::new().json_headers(false))
            .unwrap();
        assert!(headers.get(CONTENT_TYPE).is_none());
        assert!(headers.get(ACCEPT).is_none());
    }

    #[test]
    fn test_caller_headers_merge_on_top() {
        let options = RequestOptions::new()
            .authorized()
            .with_header("Accept", "application/pdf")
            .with_header("X-Trace", "abc");
        let headers = client().build_headers(&options).unwrap();

        assert_eq!(headers.get(ACCEPT).unwrap(), "application/pdf");
        assert_eq!(headers.get("x-trace").unwrap(), "abc");
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), JSON_CONTENT_TYPE);
    }

    #[test]
    fn test_caller_cannot_bypass_flags() {
        let options = RequestOptions::new()
            .json_headers(false)
            .with_header("Authorization", "Bearer other")
            .with_header("Content-Type", "text/plain");
        let headers = client().build_headers(&options).unwrap();

        assert!(headers.get(AUTHORIZATION).is_none());
        assert!(headers.get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_invalid_header_is_rejected() {
        let options = RequestOptions::new().with_header("bad header", "x");
        assert!(matches!(
            client().build_headers(&options),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_build_headers_is_idempotent() {
        let client = client();
        let options = RequestOptions::new().authorized().with_header("X-A", "1");
        assert_eq!(
            client.build_headers(&options).unwrap(),
            client.build_headers(&options).unwrap()
        );
    }

    #[test]
    fn test_builder_requires_api_key() {
        assert!(matches!(
            Client::builder().build(),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            Client::builder().api_key("").build(),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_builder_rejects_bad_endpoint() {
        assert!(matches!(
            Client::builder().endpoint("not a url"),
            Err(Error::InvalidUrl(_))
        ));
        let config = Config::new("k").with_endpoint("::nope");
        assert!(matches!(Client::new(config), Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_default_header_cannot_shadow_governed_headers() {
        assert!(Client::builder().default_header("Authorization", "x").is_err());
        let client = Client::builder()
            .api_key("k")
            .default_header("X-Client", "demo")
            .unwrap()
            .build()
            .unwrap();
        let headers = client.build_headers(&RequestOptions::new()).unwrap();
        assert_eq!(headers.get("x-client").unwrap(), "demo");
    }

    #[test]
    fn test_from_config() {
        let config = Config::new("k")
            .with_version("v3")
            .with_ssl_verify(false)
            .with_environment(Environment::Other("local".to_string()));
        let client = Client::new(config).unwrap();
        assert_eq!(client.credentials().version(), "v3");
        assert!(!client.ssl_verify());
        assert!(!client.environment().is_production());
        assert!(!format!("{:?}", client).contains("\"k\""));
    }
}
