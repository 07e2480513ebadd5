//! Client and its builder

use std::time::Duration;

use reqwest::Method;
use url::Url;

use crate::error::HttpError;
use crate::request::RequestBuilder;
use crate::response::Response;

/// Shared connection pool. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    /// Client with reqwest defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure a client
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Request with any method
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        RequestBuilder::new(self.inner.request(method, url))
    }

    /// GET
    pub fn get(&self, url: &str) -> RequestBuilder {
        self.request(Method::GET, url)
    }

    /// POST
    pub fn post(&self, url: &str) -> RequestBuilder {
        self.request(Method::POST, url)
    }

    /// DELETE. The store reads a JSON body on some deletes.
    pub fn delete(&self, url: &str) -> RequestBuilder {
        self.request(Method::DELETE, url)
    }
}

/// Builder for [`HttpClient`]
#[derive(Debug, Default)]
pub struct HttpClientBuilder {
    accept_invalid_certs: bool,
    timeout: Option<Duration>,
    proxy: Option<Url>,
    user_agent: Option<String>,
}

impl HttpClientBuilder {
    /// Skip TLS certificate validation
    pub fn danger_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Whole-request timeout, reported as [`HttpError::Timeout`]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Send everything through `url`
    pub fn proxy(mut self, url: Url) -> Self {
        self.proxy = Some(url);
        self
    }

    /// User-Agent header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build
    pub fn build(self) -> Response<HttpClient> {
        let mut builder =
            reqwest::Client::builder().danger_accept_invalid_certs(self.accept_invalid_certs);

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }
        if let Some(proxy) = self.proxy {
            let proxy =
                reqwest::Proxy::all(proxy.as_str()).map_err(|e| HttpError::Proxy(e.to_string()))?;
            builder = builder.proxy(proxy);
        }

        Ok(HttpClient {
            inner: builder.build().map_err(HttpError::from)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_with_every_setting() {
        let client = HttpClient::builder()
            .danger_accept_invalid_certs(true)
            .timeout(Duration::from_secs(10))
            .proxy(Url::parse("socks5://127.0.0.1:9050").expect("valid proxy url"))
            .user_agent("checkout-test")
            .build();
        assert!(client.is_ok());
    }

    #[test]
    fn test_default_build() {
        assert!(HttpClientBuilder::default().build().is_ok());
    }
}
