//! HTTP client abstraction for the storefront checkout
//!
//! This crate wraps the underlying HTTP library (reqwest) behind a small
//! request builder that keeps access to response headers. The checkout needs
//! them: the store reissues its session token in a response header on every
//! call, including failed ones.
//!
//! # Example
//!
//! ```no_run
//! use checkout_http_client::HttpClient;
//!
//! async fn example() -> Result<(), checkout_http_client::HttpError> {
//!     let client = HttpClient::new();
//!     let response = client
//!         .get("https://shop.example.com/rest/s1/pop/cart/info")
//!         .header("api_key", "secret")
//!         .send()
//!         .await?;
//!     let _token = response.header("moquiSessionToken");
//!     let _body = response.body();
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod request;
mod response;

pub use client::{HttpClient, HttpClientBuilder};
pub use reqwest::Method;
pub use error::HttpError;
pub use request::RequestBuilder;
pub use response::{RawResponse, Response};
