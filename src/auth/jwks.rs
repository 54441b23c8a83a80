use std::time::{Duration, Instant};

use anyhow::Context;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, DecodingKey, Header, Validation};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::auth::claims::RemoteClaims;
use crate::error::ApiError;

/// A fetched key set together with when it was fetched.
#[derive(Clone)]
struct Fetched {
    keys: JwkSet,
    fetched_at: Instant,
}

impl Fetched {
    fn is_stale(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() >= ttl
    }
}

/// TTL-refreshed cache of a remote JWKS document.
///
/// Concurrent requests share the cached set read-only; a stale or missing
/// set (and an unknown `kid`, which usually means the provider rotated
/// keys) triggers a refetch under the write lock.
pub struct JwksCache {
    url: String,
    ttl: Duration,
    http: reqwest::Client,
    inner: RwLock<Option<Fetched>>,
}

impl JwksCache {
    pub fn new(url: String, ttl_seconds: u64) -> Self {
        Self {
            url,
            ttl: Duration::from_secs(ttl_seconds),
            http: reqwest::Client::new(),
            inner: RwLock::new(None),
        }
    }

    async fn fetch(&self) -> anyhow::Result<JwkSet> {
        let set = self
            .http
            .get(&self.url)
            .send()
            .await
            .context("fetch JWKS")?
            .error_for_status()
            .context("JWKS endpoint returned an error status")?
            .json::<JwkSet>()
            .await
            .context("parse JWKS")?;
        info!(url = %self.url, keys = set.keys.len(), "jwks fetched");
        Ok(set)
    }

    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, ApiError> {
        {
            let guard = self.inner.read().await;
            if let Some(fetched) = guard.as_ref() {
                if !fetched.is_stale(self.ttl) {
                    if let Some(jwk) = fetched.keys.find(kid) {
                        debug!(kid, "jwks cache hit");
                        return DecodingKey::from_jwk(jwk)
                            .map_err(|e| ApiError::Internal(e.into()));
                    }
                }
            }
        }

        // Stale, empty or unknown kid: refetch once and retry the lookup.
        let keys = self.fetch().await?;
        let mut guard = self.inner.write().await;
        *guard = Some(Fetched {
            keys,
            fetched_at: Instant::now(),
        });
        let jwk = guard
            .as_ref()
            .and_then(|f| f.keys.find(kid))
            .ok_or_else(|| {
                warn!(kid, "key id not present in JWKS");
                ApiError::Auth("Signing key not found".into())
            })?;
        DecodingKey::from_jwk(jwk).map_err(|e| ApiError::Internal(e.into()))
    }

    /// Verify an externally issued token whose header names a key id.
    pub async fn verify(&self, token: &str, header: &Header) -> Result<RemoteClaims, ApiError> {
        let kid = header
            .kid
            .as_deref()
            .ok_or_else(|| ApiError::Auth("Token is missing a key id".into()))?;
        let key = self.decoding_key(kid).await?;

        let mut validation = Validation::new(header.alg);
        // External issuers set their own audience; expiry is still enforced.
        validation.validate_aud = false;
        let data = decode::<RemoteClaims>(token, &key, &validation)
            .map_err(|e| ApiError::Auth(format!("Token verification failed: {e}")))?;
        debug!(user_id = %data.claims.sub, "remote jwt verified");
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_JWKS: &str = r#"{
        "keys": [{
            "kty": "RSA",
            "kid": "key-1",
            "alg": "RS256",
            "use": "sig",
            "n": "0vx7agoebGcQSuuPiLJXZptN9nndrQmbXEps2aiAFbWhM78LhWx4cbbfAAtVT86zwu1RK7aPFFxuhDR1L6tSoc_BJECPebWKRXjBZCiFV4n3oknjhMstn64tZ_2W-5JsGY4Hc5n9yBXArwl93lqt7_RN5w6Cf0h4QyQ5v-65YGjQR0_FDW2QvzqY368QQMicAtaSqzs8KJZgnYb9c7d0zgdAZHzu6qMQvRL5hajrn1n91CbOpbISD08qNLyrdkt-bFTWhAI4vMQFh6WeZu0fM4lFd2NcRwr3XPksINHaQ-G_xBniIqbw0Ls1jF44-csFCur-kEgU8awapJzKnqDKgw",
            "e": "AQAB"
        }]
    }"#;

    fn parsed() -> JwkSet {
        serde_json::from_str(SAMPLE_JWKS).expect("valid jwks json")
    }

    #[test]
    fn finds_key_by_kid() {
        let set = parsed();
        assert!(set.find("key-1").is_some());
        assert!(set.find("key-2").is_none());
    }

    #[test]
    fn decoding_key_builds_from_rsa_jwk() {
        let set = parsed();
        let jwk = set.find("key-1").unwrap();
        assert!(DecodingKey::from_jwk(jwk).is_ok());
    }

    #[test]
    fn staleness_respects_ttl() {
        let fetched = Fetched {
            keys: parsed(),
            fetched_at: Instant::now(),
        };
        assert!(!fetched.is_stale(Duration::from_secs(60)));
        assert!(fetched.is_stale(Duration::ZERO));
    }

    #[tokio::test]
    async fn verify_without_kid_is_auth_error() {
        let cache = JwksCache::new("http://localhost:1/jwks.json".into(), 60);
        let header = Header::new(jsonwebtoken::Algorithm::RS256);
        let err = cache.verify("irrelevant", &header).await.unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::UNAUTHORIZED);
    }
}
