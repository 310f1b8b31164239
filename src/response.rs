//! Successful responses.
//!
//! A [`Response`] keeps the raw body and transaction metadata. Decoding is
//! done on demand through [`Response::json`] or [`Response::value_at`].

use crate::{path, Result};
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

/// A 2xx answer from the remote service.
///
/// # Examples
///
/// ```no_run
/// use olc::{Client, RequestOptions};
///
/// # async fn example() -> Result<(), olc::Error> {
/// let client = Client::builder().api_key("my-api-key").build()?;
///
/// let response = client
///     .post("/templates/uploadFile", None, RequestOptions::new().authorized())
///     .await?;
///
/// println!("Status: {} in {:?}", response.status, response.latency);
/// match response.value_at("data[filePath]")? {
///     Some(path) => println!("Stored at {}", path),
///     None => println!("No file path in response"),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Response {
    /// The raw response body.
    pub raw_body: Vec<u8>,

    /// The HTTP status code.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// Time from dispatch until the body was fully read.
    pub latency: Duration,
}

impl Response {
    /// Creates a new `Response`.
    pub fn new(raw_body: Vec<u8>, status: StatusCode, headers: HeaderMap, latency: Duration) -> Self {
        Self {
            raw_body,
            status,
            headers,
            latency,
        }
    }

    /// Decodes the whole body.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Decode`] if the body is not valid JSON.
    pub fn json(&self) -> Result<Value> {
        Ok(path::extract(&self.raw_body, None)?.unwrap_or(Value::Null))
    }

    /// Decodes the body and resolves `path` inside it.
    ///
    /// A missing field is `Ok(None)`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use olc::Response;
    /// # use http::{HeaderMap, StatusCode};
    /// # use std::time::Duration;
    /// let response = Response::new(
    ///     br#"{"message":"ok","data":{"title":"Postcard"}}"#.to_vec(),
    ///     StatusCode::OK,
    ///     HeaderMap::new(),
    ///     Duration::from_millis(20),
    /// );
    ///
    /// assert_eq!(response.value_at("data.title").unwrap().unwrap(), "Postcard");
    /// assert!(response.value_at("data.missing").unwrap().is_none());
    /// ```
    pub fn value_at(&self, path: &str) -> Result<Option<Value>> {
        path::extract(&self.raw_body, Some(path))
    }

    /// Deserializes the body into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Decode`] if the body does not fit `T`.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.raw_body).map_err(|e| crate::Error::Decode {
            raw_response: self.text(),
            serde_error: e.to_string(),
        })
    }

    /// The body as text, with invalid UTF-8 replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.raw_body).into_owned()
    }

    /// Returns a header value by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use serde::Deserialize;

    fn response(body: &str) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        Response::new(
            body.as_bytes().to_vec(),
            StatusCode::OK,
            headers,
            Duration::from_millis(5),
        )
    }

    #[test]
    fn test_json_and_value_at() {
        let r = response(r#"{"message":"ok","data":[]}"#);
        assert_eq!(r.json().unwrap()["message"], "ok");
        assert_eq!(r.value_at("data").unwrap(), Some(serde_json::json!([])));
        assert_eq!(r.header("content-type"), Some("application/json"));
    }

    #[test]
    fn test_parse_typed_envelope() {
        #[derive(Deserialize)]
        struct Envelope {
            message: String,
            data: Vec<u32>,
        }

        let envelope: Envelope = response(r#"{"message":"ok","data":[1,2]}"#).parse().unwrap();
        assert_eq!(envelope.message, "ok");
        assert_eq!(envelope.data, vec![1, 2]);
    }

    #[test]
    fn test_malformed_body_is_decode_error() {
        let r = response("<html>");
        assert!(matches!(r.json(), Err(crate::Error::Decode { .. })));
        assert!(matches!(r.value_at("data"), Err(crate::Error::Decode { .. })));
    }
}
