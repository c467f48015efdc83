use anyhow::{Context, Result};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Base URLs of the remote services. Every follower operation can live on
/// its own host, so each one is configured separately.
#[derive(Clone, Debug)]
pub struct Endpoints {
    pub api_url: String,
    pub likes_url: String,
    pub followers_add_url: String,
    pub followers_remove_url: String,
    pub followers_query_url: String,
}

impl Endpoints {
    /// Every service on the same host, handy for tests and local stacks.
    pub fn single(base: &str) -> Self {
        let base = trim_url(base);
        Self {
            api_url: base.clone(),
            likes_url: base.clone(),
            followers_add_url: base.clone(),
            followers_remove_url: base.clone(),
            followers_query_url: base,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub port: u16,
    pub addr: SocketAddr,
    pub endpoints: Endpoints,
    pub session_dir: PathBuf,
    pub request_timeout: Duration,
    pub toggle_timeout: Option<Duration>,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3000);
        let addr = SocketAddr::from(([0, 0, 0, 0], port));

        let api_url = env::var("PETHUB_API_URL").context("PETHUB_API_URL must be set")?;
        let followers_url =
            env::var("PETHUB_FOLLOWERS_API_URL").context("PETHUB_FOLLOWERS_API_URL must be set")?;

        let endpoints = Endpoints {
            likes_url: var_or("PETHUB_LIKES_API_URL", &api_url),
            followers_add_url: var_or("PETHUB_FOLLOWERS_ADD_URL", &followers_url),
            followers_remove_url: var_or("PETHUB_FOLLOWERS_REMOVE_URL", &followers_url),
            followers_query_url: var_or("PETHUB_FOLLOWERS_QUERY_URL", &followers_url),
            api_url: trim_url(&api_url),
        };

        let session_dir = env::var("PETHUB_SESSION_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".pethub"));

        let request_timeout = secs_var("PETHUB_REQUEST_TIMEOUT_SECS")?
            .unwrap_or(Duration::from_secs(30));
        let toggle_timeout = secs_var("PETHUB_TOGGLE_TIMEOUT_SECS")?;

        Ok(Self {
            port,
            addr,
            endpoints,
            session_dir,
            request_timeout,
            toggle_timeout,
        })
    }
}

fn var_or(key: &str, fallback: &str) -> String {
    trim_url(&env::var(key).unwrap_or_else(|_| fallback.to_string()))
}

fn secs_var(key: &str) -> Result<Option<Duration>> {
    match env::var(key) {
        Ok(raw) => {
            let secs: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("{key} must be a whole number of seconds"))?;
            Ok(Some(Duration::from_secs(secs)))
        }
        Err(_) => Ok(None),
    }
}

fn trim_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
