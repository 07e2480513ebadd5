//! Store Url

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::{ParseError, Url};

use crate::ensure_checkout;

/// REST namespace the storefront endpoints live under
pub const DEFAULT_REST_PREFIX: &[&str] = &["rest", "s1", "pop"];

/// Url Error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Url error
    #[error(transparent)]
    Url(#[from] ParseError),
    /// Not an http(s) url with a host
    #[error("Invalid URL")]
    InvalidUrl,
}

/// Base url of a store. Scheme and host are lowercased, trailing slashes
/// dropped; the path is kept as given.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StoreUrl(Url);

impl StoreUrl {
    /// Endpoint below the store: `path_elements` are appended as path
    /// segments and percent-encoded where needed.
    pub fn join_paths(&self, path_elements: &[&str]) -> Result<Url, Error> {
        let mut url = self.0.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidUrl)?
            .pop_if_empty()
            .extend(path_elements);
        Ok(url)
    }

    /// Endpoint below the store from a `/`-separated path
    pub fn join(&self, path: &str) -> Result<Url, Error> {
        let elements: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        self.join_paths(&elements)
    }

    /// Parsed base url
    pub fn as_url(&self) -> &Url {
        &self.0
    }
}

impl FromStr for StoreUrl {
    type Err = Error;

    fn from_str(url: &str) -> Result<Self, Self::Err> {
        let url = url.trim();
        ensure_checkout!(!url.is_empty(), Error::InvalidUrl);

        let mut parsed = Url::parse(url)?;
        ensure_checkout!(
            matches!(parsed.scheme(), "http" | "https"),
            Error::InvalidUrl
        );
        ensure_checkout!(
            parsed.host_str().is_some_and(|host| !host.is_empty()),
            Error::InvalidUrl
        );

        let path = parsed.path().trim_end_matches('/').to_string();
        parsed.set_path(&path);
        parsed.set_query(None);
        parsed.set_fragment(None);

        Ok(Self(parsed))
    }
}

impl fmt::Display for StoreUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.as_str().trim_end_matches('/'))
    }
}

impl Serialize for StoreUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for StoreUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        StoreUrl::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_form() {
        let url = StoreUrl::from_str("HTTPS://Shop.Example.com/Store/Front///").expect("valid url");
        assert_eq!(url.to_string(), "https://shop.example.com/Store/Front");

        let bare = StoreUrl::from_str("http://shop.example.com/").expect("valid url");
        assert_eq!(bare.to_string(), "http://shop.example.com");

        let with_port = StoreUrl::from_str("http://127.0.0.1:8080").expect("valid url");
        assert_eq!(with_port.to_string(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_join_below_base_path() {
        let url = StoreUrl::from_str("http://shop.example.com").expect("valid url");
        assert_eq!(
            url.join_paths(&["rest", "s1", "pop", "cart", "info"])
                .expect("joinable")
                .as_str(),
            "http://shop.example.com/rest/s1/pop/cart/info"
        );

        let nested = StoreUrl::from_str("http://shop.example.com/eu/").expect("valid url");
        assert_eq!(
            nested.join("/cart/info").expect("joinable").as_str(),
            "http://shop.example.com/eu/cart/info"
        );
    }

    #[test]
    fn test_rejected_urls() {
        assert_eq!(StoreUrl::from_str(""), Err(Error::InvalidUrl));
        assert_eq!(StoreUrl::from_str("ftp://shop.example.com"), Err(Error::InvalidUrl));
        assert!(matches!(
            StoreUrl::from_str("shop.example.com"),
            Err(Error::Url(_))
        ));
    }

    #[test]
    fn test_serde_uses_display_form() {
        let url = StoreUrl::from_str("https://shop.example.com/").expect("valid url");
        let json = serde_json::to_string(&url).expect("serializable");
        assert_eq!(json, "\"https://shop.example.com\"");
        let back: StoreUrl = serde_json::from_str(&json).expect("deserializable");
        assert_eq!(back, url);
    }
}
