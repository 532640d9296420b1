use std::time::Duration;

use anyhow::Context;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::config::GithubConfig;

const USER_AGENT: &str = concat!("devconnect/", env!("CARGO_PKG_VERSION"));

/// Thin client for the repository listing shown on profile pages.
#[derive(Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    api_url: String,
    credentials: Option<(String, String)>,
}

pub(crate) fn is_valid_username(username: &str) -> bool {
    lazy_static! {
        static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9-]{1,39}$").unwrap();
    }
    USERNAME_RE.is_match(username)
}

impl GithubClient {
    pub fn new(cfg: &GithubConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(10))
            .build()
            .context("build github http client")?;
        let credentials = match (&cfg.client_id, &cfg.client_secret) {
            (Some(id), Some(secret)) => Some((id.clone(), secret.clone())),
            _ => None,
        };
        Ok(Self {
            http,
            api_url: cfg.api_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    pub(crate) fn repos_url(&self, username: &str) -> String {
        format!(
            "{}/users/{}/repos?per_page=5&sort=created&direction=asc",
            self.api_url, username
        )
    }

    /// Five oldest-first public repositories of `username`, or `None` when
    /// GitHub does not know the user.
    pub async fn recent_repos(&self, username: &str) -> anyhow::Result<Option<serde_json::Value>> {
        if !is_valid_username(username) {
            debug!(%username, "rejecting malformed github username");
            return Ok(None);
        }

        let mut req = self.http.get(self.repos_url(username));
        if let Some((id, secret)) = &self.credentials {
            req = req.basic_auth(id, Some(secret));
        }
        let res = req.send().await.context("github repos request")?;

        let status = res.status();
        if status != StatusCode::OK {
            warn!(%username, %status, "github repos lookup failed");
            return Ok(None);
        }
        let body = res
            .json::<serde_json::Value>()
            .await
            .context("decode github repos")?;
        Ok(Some(body))
    }
}
