//! Request builder

use serde::Serialize;

use crate::error::HttpError;
use crate::response::{RawResponse, Response};

/// Request being assembled
#[derive(Debug)]
pub struct RequestBuilder {
    inner: reqwest::RequestBuilder,
}

impl RequestBuilder {
    pub(crate) fn new(inner: reqwest::RequestBuilder) -> Self {
        Self { inner }
    }

    fn map(self, f: impl FnOnce(reqwest::RequestBuilder) -> reqwest::RequestBuilder) -> Self {
        Self {
            inner: f(self.inner),
        }
    }

    /// Add a header
    pub fn header(self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.map(|inner| inner.header(key.as_ref(), value.as_ref()))
    }

    /// Append query parameters
    pub fn query<T: Serialize + ?Sized>(self, query: &T) -> Self {
        self.map(|inner| inner.query(query))
    }

    /// JSON body
    pub fn json<T: Serialize + ?Sized>(self, body: &T) -> Self {
        self.map(|inner| inner.json(body))
    }

    /// Send and read the whole response, whatever its status.
    ///
    /// Only a failed exchange (connect, timeout, unreadable body) is an error.
    pub async fn send(self) -> Response<RawResponse> {
        let response = self.inner.send().await.map_err(HttpError::from)?;
        RawResponse::read(response).await
    }
}
