//! Identity provider boundary
//!
//! The provider issues short-lived bearer tokens and performs redirect-based
//! login/logout. [`SessionOracle`] is the seam an adapter implements;
//! [`TokenCache`] wraps any oracle with a bounded-lifetime token cache,
//! mirroring the provider SDK's silent-token behavior.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

/// Session/identity-provider error types
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Access token unavailable: {message}")]
    TokenUnavailable { message: String },

    #[error("Interactive login required")]
    InteractionRequired,
}

impl SessionError {
    pub fn token_unavailable(message: impl Into<String>) -> Self {
        Self::TokenUnavailable {
            message: message.into(),
        }
    }
}

/// Identity provider operations consumed by the authorization core.
///
/// Token and session persistence belong entirely to the implementor; the
/// core never stores credentials.
#[async_trait]
pub trait SessionOracle: Send + Sync {
    /// Obtain a bearer token for backend calls.
    async fn access_token(&self) -> Result<String, SessionError>;

    /// Start an interactive, redirect-based login.
    fn login(&self);

    /// End the session; the provider returns the browser to `return_to`.
    fn logout(&self, return_to: &str);
}

/// Build the provider's authorization redirect URL.
pub fn authorize_redirect_url(
    domain: &str,
    client_id: &str,
    redirect_uri: &str,
    audience: &str,
) -> String {
    format!(
        "https://{}/authorize?response_type=code&client_id={}&redirect_uri={}&audience={}",
        domain,
        urlencoding::encode(client_id),
        urlencoding::encode(redirect_uri),
        urlencoding::encode(audience),
    )
}

/// Build the provider's logout URL with a post-logout return target.
pub fn logout_redirect_url(domain: &str, client_id: &str, return_to: &str) -> String {
    format!(
        "https://{}/v2/logout?client_id={}&returnTo={}",
        domain,
        urlencoding::encode(client_id),
        urlencoding::encode(return_to),
    )
}

/// Default token cache lifetime: 5 minutes
const TOKEN_CACHE_TTL_SECS: i64 = 300;

struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
    generation: u64,
}

/// Token-caching decorator around a [`SessionOracle`].
///
/// Guards fetch the role on every navigation attempt; caching the token for a
/// short interval keeps that from turning into a provider round-trip per
/// click. Logout invalidates the cache.
pub struct TokenCache {
    inner: Arc<dyn SessionOracle>,
    ttl_secs: i64,
    /// Bumped on logout/invalidate; a fetch started under an older generation
    /// must not land in the cache afterwards.
    generation: AtomicU64,
    cached: RwLock<Option<CachedToken>>,
}

impl TokenCache {
    pub fn new(inner: Arc<dyn SessionOracle>) -> Self {
        Self::with_ttl(inner, TOKEN_CACHE_TTL_SECS)
    }

    pub fn with_ttl(inner: Arc<dyn SessionOracle>, ttl_secs: i64) -> Self {
        Self {
            inner,
            ttl_secs,
            generation: AtomicU64::new(0),
            cached: RwLock::new(None),
        }
    }

    /// Drop any cached token and retire in-flight fetches.
    pub async fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        *self.cached.write().await = None;
    }
}

#[async_trait]
impl SessionOracle for TokenCache {
    async fn access_token(&self) -> Result<String, SessionError> {
        let generation = self.generation.load(Ordering::SeqCst);
        {
            let cached = self.cached.read().await;
            if let Some(token) = cached.as_ref() {
                if token.generation == generation && Utc::now() < token.expires_at {
                    return Ok(token.value.clone());
                }
            }
        }

        let value = self.inner.access_token().await?;

        let mut cached = self.cached.write().await;
        // A logout during the fetch bumps the generation; that token belongs
        // to the torn-down session and must not be served to later callers.
        if self.generation.load(Ordering::SeqCst) == generation {
            debug!("Refreshed cached access token");
            *cached = Some(CachedToken {
                value: value.clone(),
                expires_at: Utc::now() + Duration::seconds(self.ttl_secs),
                generation,
            });
        }

        Ok(value)
    }

    fn login(&self) {
        self.inner.login();
    }

    fn logout(&self, return_to: &str) {
        // The generation bump retires both the cached token and any fetch
        // still in flight; clearing the slot is best-effort cleanup.
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut cached) = self.cached.try_write() {
            *cached = None;
        }
        self.inner.logout(return_to);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration as StdDuration;
    use tokio::sync::Notify;

    struct CountingOracle {
        calls: AtomicUsize,
    }

    impl CountingOracle {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SessionOracle for CountingOracle {
        async fn access_token(&self) -> Result<String, SessionError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("token-{}", n))
        }

        fn login(&self) {}
        fn logout(&self, _return_to: &str) {}
    }

    #[tokio::test]
    async fn test_token_cached_within_ttl() {
        let inner = Arc::new(CountingOracle::new());
        let cache = TokenCache::new(inner.clone());

        let first = cache.access_token().await.unwrap();
        let second = cache.access_token().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_token_refetched() {
        let inner = Arc::new(CountingOracle::new());
        // Already-expired TTL forces a refetch on every call.
        let cache = TokenCache::with_ttl(inner.clone(), -1);

        let first = cache.access_token().await.unwrap();
        let second = cache.access_token().await.unwrap();

        assert_ne!(first, second);
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_logout_invalidates_cache() {
        let inner = Arc::new(CountingOracle::new());
        let cache = TokenCache::new(inner.clone());

        cache.access_token().await.unwrap();
        cache.logout("/home");
        cache.access_token().await.unwrap();

        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    struct GatedOracle {
        calls: AtomicUsize,
        gate: Arc<Notify>,
    }

    impl GatedOracle {
        fn new(gate: Arc<Notify>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                gate,
            }
        }
    }

    #[async_trait]
    impl SessionOracle for GatedOracle {
        async fn access_token(&self) -> Result<String, SessionError> {
            self.gate.notified().await;
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("token-{}", n))
        }

        fn login(&self) {}
        fn logout(&self, _return_to: &str) {}
    }

    #[tokio::test]
    async fn test_fetch_in_flight_at_logout_is_not_cached() {
        let gate = Arc::new(Notify::new());
        let inner = Arc::new(GatedOracle::new(gate.clone()));
        let cache = Arc::new(TokenCache::new(inner.clone()));

        let in_flight = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.access_token().await })
        };
        // Let the fetch park on the gate before logging out.
        tokio::time::sleep(StdDuration::from_millis(10)).await;
        cache.logout("/home");
        gate.notify_one();
        let stale = in_flight.await.unwrap().unwrap();

        gate.notify_one();
        let fresh = cache.access_token().await.unwrap();

        assert_ne!(stale, fresh, "cache served a token fetched before logout");
        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let inner = Arc::new(CountingOracle::new());
        let cache = TokenCache::new(inner.clone());

        cache.access_token().await.unwrap();
        cache.invalidate().await;
        cache.access_token().await.unwrap();

        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_error_not_cached() {
        struct FailingOracle;

        #[async_trait]
        impl SessionOracle for FailingOracle {
            async fn access_token(&self) -> Result<String, SessionError> {
                Err(SessionError::token_unavailable("provider offline"))
            }
            fn login(&self) {}
            fn logout(&self, _return_to: &str) {}
        }

        let cache = TokenCache::new(Arc::new(FailingOracle));
        assert!(cache.access_token().await.is_err());
        assert!(cache.access_token().await.is_err());
    }

    #[test]
    fn test_redirect_urls_encoded() {
        let url = authorize_redirect_url(
            "clinica.eu.auth0.com",
            "abc 123",
            "https://app.example/callback",
            "https://api.example/",
        );
        assert!(url.starts_with("https://clinica.eu.auth0.com/authorize?"));
        assert!(url.contains("client_id=abc%20123"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fapp.example%2Fcallback"));

        let logout = logout_redirect_url("clinica.eu.auth0.com", "abc", "https://app.example/home");
        assert!(logout.contains("returnTo=https%3A%2F%2Fapp.example%2Fhome"));
    }
}
