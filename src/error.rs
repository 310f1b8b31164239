//! Error types for API calls.
//!
//! Validation and local file checks fail before any network I/O. Anything the
//! remote service rejects with a non-2xx status surfaces as
//! [`Error::Transport`], which keeps the raw response around for debugging.

use http::{HeaderMap, Method, StatusCode};
use serde_json::Value;

/// The main error type for the SDK.
///
/// # Examples
///
/// ```no_run
/// use olc::{Config, Error, Olc};
///
/// # async fn example() -> Result<(), Error> {
/// let olc = Olc::new(Config::new("my-api-key"))?;
///
/// match olc.orders().get(42).await {
///     Ok(order) => println!("Order: {}", order["data"]),
///     Err(Error::Transport(e)) => {
///         eprintln!("API rejected the request ({}): {}", e.status(), e.message());
///         for detail in e.error_list() {
///             eprintln!("  - {}", detail);
///         }
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Caller-supplied parameters failed validation.
    ///
    /// Never reaches the network; fix the input and try again.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A referenced local resource (usually a file path) does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The operation is disabled in this version of the API.
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// The remote service answered with a non-2xx status.
    #[error("{0}")]
    Transport(Box<TransportError>),

    /// A response body that had to be JSON could not be decoded.
    #[error("Failed to decode response: {serde_error}")]
    Decode {
        /// The raw response body, lossily converted to UTF-8
        raw_response: String,
        /// The serde error message
        serde_error: String,
    },

    /// A network-level error occurred (connection refused, DNS, TLS, timeout).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Reading a local file for an upload failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An invalid endpoint URL was provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Failed to serialize the request body.
    #[error("Failed to serialize request: {0}")]
    SerializationFailed(String),
}

impl Error {
    /// Returns the HTTP status code if the remote service produced this error.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Transport(e) => Some(e.status()),
            _ => None,
        }
    }

    /// Returns `true` if the error was raised before any request was sent.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InvalidConfig(_) | Error::NotFound(_) | Error::NotImplemented(_)
        )
    }

    /// Returns the mapped transport error, if any.
    pub fn as_transport(&self) -> Option<&TransportError> {
        match self {
            Error::Transport(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Error::Transport(Box::new(e))
    }
}

/// The request that produced a [`TransportError`].
#[derive(Debug, Clone)]
pub struct RawRequest {
    /// The HTTP method.
    pub method: Method,
    /// The fully resolved URL, query string included.
    pub url: String,
    /// The headers that were sent.
    pub headers: HeaderMap,
}

/// A non-2xx answer from the remote service.
///
/// The body is decoded on a best-effort basis: if it is valid JSON, the
/// envelope's `message` and `data.errors` fields are exposed through
/// [`message`](Self::message) and [`error_list`](Self::error_list). If it is
/// not, the message falls back to a description of the failed exchange and the
/// error list is empty. Building one of these never fails.
#[derive(Debug, Clone)]
pub struct TransportError {
    status: StatusCode,
    message: String,
    error_list: Vec<Value>,
    raw_body: Vec<u8>,
    request: RawRequest,
    response_headers: HeaderMap,
}

impl TransportError {
    /// Maps a failed exchange into a typed error.
    pub fn new(
        request: RawRequest,
        status: StatusCode,
        response_headers: HeaderMap,
        raw_body: Vec<u8>,
    ) -> Self {
        let decoded: Option<Value> = serde_json::from_slice(&raw_body).ok();

        let fallback = format!(
            "{} {} resulted in a `{}` response",
            request.method, request.url, status
        );
        let message = decoded
            .as_ref()
            .and_then(|body| body.get("message"))
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or(fallback);

        let error_list = decoded
            .as_ref()
            .and_then(|body| body.get("data"))
            .and_then(|data| data.get("errors"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        Self {
            status,
            message,
            error_list,
            raw_body,
            request,
            response_headers,
        }
    }

    /// The HTTP status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The envelope `message`, or a description of the failed exchange.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The envelope's `data.errors` entries, passed through untouched.
    pub fn error_list(&self) -> &[Value] {
        &self.error_list
    }

    /// The raw response body.
    pub fn raw_body(&self) -> &[u8] {
        &self.raw_body
    }

    /// The raw response body as text.
    pub fn raw_text(&self) -> String {
        String::from_utf8_lossy(&self.raw_body).into_owned()
    }

    /// The decoded response body, or `Value::Null` when it is not JSON.
    pub fn to_value(&self) -> Value {
        serde_json::from_slice(&self.raw_body).unwrap_or(Value::Null)
    }

    /// The request that was sent.
    pub fn request(&self) -> &RawRequest {
        &self.request
    }

    /// The response headers.
    pub fn response_headers(&self) -> &HeaderMap {
        &self.response_headers
    }
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP error {}: {}", self.status, self.message)
    }
}

impl std::error::Error for TransportError {}

/// A specialized `Result` type for SDK calls.
pub type Result<T> = std::result::Result<T, Error>;
