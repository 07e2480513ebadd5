//! Buffered responses

use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;

use crate::error::HttpError;

/// Result of a transport call
pub type Response<R, E = HttpError> = Result<R, E>;

/// Response with its body already read.
///
/// Status, headers and body stay available together, whatever the status.
#[derive(Debug, Clone)]
pub struct RawResponse {
    status: u16,
    headers: HeaderMap,
    body: String,
}

impl RawResponse {
    pub(crate) async fn read(response: reqwest::Response) -> Response<Self> {
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await.map_err(HttpError::from)?;

        Ok(Self {
            status,
            headers,
            body,
        })
    }

    /// Status code
    pub fn status(&self) -> u16 {
        self.status
    }

    /// 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 4xx
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// 5xx
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }

    /// Header value, looked up case-insensitively. Values that are not
    /// visible ASCII are ignored.
    pub fn header(&self, name: &str) -> Option<String> {
        let value = self.headers.get(name)?.to_str().ok()?;
        Some(value.to_string())
    }

    /// Body as received
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Take the body
    pub fn into_body(self) -> String {
        self.body
    }

    /// Decode the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Response<T> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Turn a non-2xx response into [`HttpError::Status`] carrying the body
    pub fn error_for_status(self) -> Response<Self> {
        if self.is_success() {
            return Ok(self);
        }
        Err(HttpError::Status {
            status: self.status,
            message: self.body,
        })
    }
}
