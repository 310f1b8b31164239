//! Per-request options.

use crate::multipart::FilePart;
use std::collections::BTreeMap;

/// Options controlling how a single request is built.
///
/// By default requests carry JSON content-negotiation headers and no
/// authorization. Resource methods almost always call
/// [`authorized`](Self::authorized).
///
/// # Examples
///
/// ```
/// use olc::RequestOptions;
///
/// let options = RequestOptions::new()
///     .authorized()
///     .with_header("X-Request-Id", "abc123")
///     .with_query_param("page", "2");
///
/// assert!(options.authorize);
/// assert!(options.json_headers);
/// ```
#[derive(Debug, Clone)]
pub struct RequestOptions {
    /// Inject `Authorization: Bearer <api key>`.
    pub authorize: bool,

    /// Send `Content-Type` and `Accept` as JSON. Must be off for multipart.
    pub json_headers: bool,

    /// Extra headers keyed by lowercased name, applied on top of the
    /// injected ones.
    pub headers: BTreeMap<String, String>,

    /// Query parameters appended to the URL.
    pub query_params: Vec<(String, String)>,

    /// File parts for a multipart upload.
    pub multipart: Option<Vec<FilePart>>,
}

impl RequestOptions {
    /// Creates options with JSON headers on and authorization off.
    pub fn new() -> Self {
        Self {
            authorize: false,
            json_headers: true,
            headers: BTreeMap::new(),
            query_params: Vec::new(),
            multipart: None,
        }
    }

    /// Turns on bearer authorization.
    pub fn authorized(mut self) -> Self {
        self.authorize = true;
        self
    }

    /// Turns JSON content-negotiation headers on or off.
    pub fn json_headers(mut self, enabled: bool) -> Self {
        self.json_headers = enabled;
        self
    }

    /// Adds an extra header. Names are case-insensitive; later values for
    /// the same name win.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Adds a query parameter.
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.push((key.into(), value.into()));
        self
    }

    /// Adds multiple query parameters.
    pub fn with_query_params(
        mut self,
        params: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        self.query_params.extend(params);
        self
    }

    /// Sends the request as a multipart form made of `parts`.
    ///
    /// This also turns JSON headers off, since the transport sets its own
    /// multipart `Content-Type`.
    pub fn multipart(mut self, parts: Vec<FilePart>) -> Self {
        self.multipart = Some(parts);
        self.json_headers = false;
        self
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = RequestOptions::default();
        assert!(!options.authorize);
        assert!(options.json_headers);
        assert!(options.headers.is_empty());
        assert!(options.multipart.is_none());
    }

    #[test]
    fn test_header_names_are_case_insensitive() {
        let options = RequestOptions::new()
            .with_header("x-trace", "first")
            .with_header("X-Trace", "second");
        assert_eq!(options.headers.len(), 1);
        assert_eq!(options.headers.get("x-trace").map(String::as_str), Some("second"));
    }

    #[test]
    fn test_multipart_turns_json_headers_off() {
        let options = RequestOptions::new()
            .authorized()
            .multipart(vec![FilePart::new("image", "/tmp/a.png")]);
        assert!(!options.json_headers);
        assert!(options.authorize);
        assert_eq!(options.multipart.as_ref().map(Vec::len), Some(1));
    }
}
