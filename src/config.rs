use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// Remote key-set used to verify externally issued bearer tokens.
/// `url` unset disables the asymmetric verification path entirely.
#[derive(Debug, Clone, Deserialize)]
pub struct JwksConfig {
    pub url: Option<String>,
    pub ttl_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub jwks: JwksConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "nutritrack".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "nutritrack-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
        };
        let jwks = JwksConfig {
            url: std::env::var("JWKS_URL").ok(),
            ttl_seconds: std::env::var("JWKS_TTL_SECONDS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(3600),
        };
        Ok(Self {
            database_url,
            jwt,
            jwks,
        })
    }
}
