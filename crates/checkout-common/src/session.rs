//! Session credentials
//!
//! The store authenticates a request either with the customer's `api_key` or,
//! before login, with an anti-forgery session token. The server may reissue
//! the token on any response, error responses included, and treats a stale
//! token as request forgery. [`Session`] is the one shared handle every
//! connector call reads from, and [`Session::rotate_token`] is the only place
//! the token changes after construction.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::step::CheckoutStep;

/// Header carrying the api key
pub const API_KEY_HEADER: &str = "api_key";
/// Header carrying the session token, on requests and responses
pub const SESSION_TOKEN_HEADER: &str = "moquiSessionToken";

/// Credential values sent with every request
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCredential {
    /// Present only once the customer is fully authenticated
    pub api_key: Option<String>,
    /// Rotating anti-forgery token
    pub session_token: Option<String>,
}

impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCredential")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

impl SessionCredential {
    /// New credential
    pub fn new(api_key: Option<String>, session_token: Option<String>) -> Self {
        Self {
            api_key,
            session_token,
        }
    }

    /// Whether an api key is present
    pub fn is_authenticated(&self) -> bool {
        self.api_key.as_deref().is_some_and(|key| !key.is_empty())
    }

    /// Headers to attach to a request
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = Vec::with_capacity(2);
        if let Some(api_key) = self.api_key.as_ref().filter(|key| !key.is_empty()) {
            headers.push((API_KEY_HEADER, api_key.clone()));
        }
        if let Some(token) = self.session_token.as_ref().filter(|token| !token.is_empty()) {
            headers.push((SESSION_TOKEN_HEADER, token.clone()));
        }
        headers
    }
}

#[derive(Debug, Default)]
struct SessionState {
    credential: SessionCredential,
    pending_destination: Option<CheckoutStep>,
}

/// Shared, cloneable handle over the session credential
#[derive(Debug, Clone, Default)]
pub struct Session {
    inner: Arc<RwLock<SessionState>>,
}

impl Session {
    /// Create a new [`Session`]
    pub fn new(credential: SessionCredential) -> Self {
        Self {
            inner: Arc::new(RwLock::new(SessionState {
                credential,
                pending_destination: None,
            })),
        }
    }

    /// Copy of the current credential
    pub async fn credential(&self) -> SessionCredential {
        self.inner.read().await.credential.clone()
    }

    /// Whether the customer is logged in
    pub async fn is_authenticated(&self) -> bool {
        self.inner.read().await.credential.is_authenticated()
    }

    /// Apply a token reissued by the server.
    ///
    /// Returns `true` when the stored token changed. Empty tokens are ignored.
    pub async fn rotate_token(&self, token: &str) -> bool {
        if token.is_empty() {
            return false;
        }

        let mut state = self.inner.write().await;
        if state.credential.session_token.as_deref() == Some(token) {
            return false;
        }

        tracing::debug!("Session token rotated by server");
        state.credential.session_token = Some(token.to_string());
        true
    }

    /// Install a freshly issued api key after login, optionally with the
    /// session token that came with it.
    pub async fn authenticate(&self, api_key: String, session_token: Option<String>) {
        let mut state = self.inner.write().await;
        state.credential.api_key = Some(api_key);
        if let Some(token) = session_token.filter(|token| !token.is_empty()) {
            state.credential.session_token = Some(token);
        }
    }

    /// Drop the api key, keeping the anti-forgery token
    pub async fn clear_api_key(&self) {
        self.inner.write().await.credential.api_key = None;
    }

    /// Remember where to send the customer once login completes
    pub async fn remember_destination(&self, step: CheckoutStep) {
        self.inner.write().await.pending_destination = Some(step);
    }

    /// Take the remembered destination, if any
    pub async fn take_destination(&self) -> Option<CheckoutStep> {
        self.inner.write().await.pending_destination.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rotation_is_visible_to_all_clones() {
        let session = Session::new(SessionCredential::new(None, Some("t1".into())));
        let clone = session.clone();

        assert!(session.rotate_token("t2").await);
        assert_eq!(
            clone.credential().await.session_token.as_deref(),
            Some("t2")
        );
    }

    #[tokio::test]
    async fn test_rotation_ignores_empty_and_unchanged_tokens() {
        let session = Session::new(SessionCredential::new(None, Some("t1".into())));
        assert!(!session.rotate_token("").await);
        assert!(!session.rotate_token("t1").await);
        assert_eq!(
            session.credential().await.session_token.as_deref(),
            Some("t1")
        );
    }

    #[tokio::test]
    async fn test_authenticate_and_destination() {
        let session = Session::default();
        assert!(!session.is_authenticated().await);

        session.remember_destination(CheckoutStep::Billing).await;
        session.authenticate("key".into(), Some("t9".into())).await;

        assert!(session.is_authenticated().await);
        assert_eq!(session.take_destination().await, Some(CheckoutStep::Billing));
        assert_eq!(session.take_destination().await, None);
    }

    #[test]
    fn test_headers_skip_missing_values() {
        let credential = SessionCredential::new(Some("key".into()), None);
        assert_eq!(credential.headers(), vec![(API_KEY_HEADER, "key".to_string())]);

        let credential = SessionCredential::new(Some(String::new()), Some("tok".into()));
        assert!(!credential.is_authenticated());
        assert_eq!(
            credential.headers(),
            vec![(SESSION_TOKEN_HEADER, "tok".to_string())]
        );
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let credential = SessionCredential::new(Some("secret-key".into()), Some("tok".into()));
        let debug = format!("{credential:?}");
        assert!(!debug.contains("secret-key"));
        assert!(!debug.contains("tok\""));
    }
}
