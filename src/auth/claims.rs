use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Payload of locally issued (HS256) access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,    // user ID
    pub email: String,
    pub iat: usize,   // issued at (unix timestamp)
    pub exp: usize,   // expires at (unix timestamp)
    pub iss: String,
    pub aud: String,
}

/// Payload we require from externally issued (JWKS-verified) tokens.
/// Deserialization fails when `sub` or `email` is missing, which the
/// extractor surfaces as 401.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteClaims {
    pub sub: Uuid,
    pub email: String,
    #[allow(dead_code)]
    pub exp: usize,
}

/// The authenticated identity every guarded handler works against.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: Uuid,
    pub email: String,
}

impl From<Claims> for Principal {
    fn from(c: Claims) -> Self {
        Self {
            user_id: c.sub,
            email: c.email,
        }
    }
}

impl From<RemoteClaims> for Principal {
    fn from(c: RemoteClaims) -> Self {
        Self {
            user_id: c.sub,
            email: c.email,
        }
    }
}
