use std::fmt;

use serde::Deserialize;

/// 100 hours, the lifetime the web client has always relied on.
const DEFAULT_TTL_MINUTES: i64 = 100 * 60;

#[derive(Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl_minutes", &self.ttl_minutes)
            .finish()
    }
}

#[derive(Clone, Deserialize)]
pub struct GithubConfig {
    pub api_url: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

impl fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GithubConfig")
            .field("api_url", &self.api_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub db_timeout_secs: u64,
    pub jwt: JwtConfig,
    pub github: GithubConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let db_timeout_secs = std::env::var("DB_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(5);
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "devconnect".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "devconnect-users".into()),
            ttl_minutes: std::env::var("JWT_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(DEFAULT_TTL_MINUTES),
        };
        let github = GithubConfig {
            api_url: std::env::var("GITHUB_API_URL")
                .unwrap_or_else(|_| "https://api.github.com".into()),
            client_id: std::env::var("GITHUB_CLIENT_ID").ok().filter(|v| !v.is_empty()),
            client_secret: std::env::var("GITHUB_SECRET").ok().filter(|v| !v.is_empty()),
        };
        Ok(Self {
            database_url,
            db_timeout_secs,
            jwt,
            github,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_secrets() {
        let jwt = JwtConfig {
            secret: "super-secret-value".into(),
            issuer: "iss".into(),
            audience: "aud".into(),
            ttl_minutes: 5,
        };
        let github = GithubConfig {
            api_url: "https://api.github.com".into(),
            client_id: Some("client".into()),
            client_secret: Some("gh-secret-value".into()),
        };
        let rendered = format!("{:?} {:?}", jwt, github);
        assert!(!rendered.contains("super-secret-value"));
        assert!(!rendered.contains("gh-secret-value"));
        assert!(rendered.contains("<redacted>"));
    }
}
