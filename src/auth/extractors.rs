use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use jsonwebtoken::decode_header;
use tracing::warn;

use crate::auth::claims::Principal;
use crate::auth::jwt::JwtKeys;
use crate::error::ApiError;
use crate::state::AppState;

/// Extracts the bearer token and resolves the caller's identity.
///
/// Tokens whose header carries a `kid` are verified against the remote
/// key set; everything else goes through the shared-secret path.
pub struct AuthUser(pub Principal);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Auth("Missing Authorization header".into()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .ok_or_else(|| ApiError::Auth("Invalid Authorization header".into()))?;

        let header = decode_header(token)
            .map_err(|_| ApiError::Auth("Malformed token".into()))?;

        if header.kid.is_some() {
            let Some(jwks) = state.jwks.as_ref() else {
                warn!("token carries a kid but no JWKS url is configured");
                return Err(ApiError::Auth("Unrecognized token issuer".into()));
            };
            let claims = jwks.verify(token, &header).await?;
            return Ok(AuthUser(claims.into()));
        }

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|_| {
            warn!("invalid or expired token");
            ApiError::Auth("Invalid or expired token".into())
        })?;
        Ok(AuthUser(claims.into()))
    }
}
