//! Configuration management for songcat.
//!
//! This module handles loading configuration values from environment
//! variables and `.env` files. Values are read once at startup into a
//! [`Config`]; nothing else in the crate touches the environment.
//!
//! The configuration system follows a hierarchical approach:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (where applicable)

use std::{env, path::PathBuf, time::Duration};

use crate::{
    Error, Res,
    types::{ClientCredentials, Tenant},
};

pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8080";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SCOPE: &str = "user-read-playback-state user-modify-playback-state user-read-currently-playing playlist-read-private playlist-modify-public playlist-modify-private";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_AUTH_STATE_TTL_SECS: u64 = 600;
pub const DEFAULT_QUEUE_LENGTH: usize = 1;

/// Loads environment variables from a `.env` file in the local data directory.
///
/// The file lives in the platform-specific local data directory under
/// `songcat/.env`:
/// - Linux: `~/.local/share/songcat/.env`
/// - macOS: `~/Library/Application Support/songcat/.env`
/// - Windows: `%LOCALAPPDATA%/songcat/.env`
///
/// A missing file is fine; the process environment is used as is.
///
/// # Errors
///
/// Fails if the directory cannot be created or the file exists but cannot be
/// parsed.
pub async fn load_env() -> Res<()> {
    let path = env_path();
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::Config(e.to_string()))?;
    }

    match dotenv::from_path(&path) {
        Ok(()) => Ok(()),
        Err(dotenv::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::Config(format!("{}: {}", path.display(), e))),
    }
}

fn env_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("songcat/.env");
    path
}

/// A named catalog the HTTP surface may load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub redirect_uri: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
    pub scope: String,
    pub tenants: Vec<Tenant>,
    pub catalogs: Vec<CatalogEntry>,
    pub request_timeout: Duration,
    pub auth_state_ttl: Duration,
    pub queue_length: usize,
    pub artist_match_case_sensitive: bool,
    pub frontend_url: Option<String>,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Res<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the configuration through an arbitrary key lookup.
    ///
    /// Required keys: `SPOTIFY_API_REDIRECT_URI`, `SONGCAT_TENANTS` and
    /// `SONGCAT_CATALOGS`. Tenant credentials are read from
    /// `SPOTIFY_CLIENT_ID_<TENANT>` and `SPOTIFY_CLIENT_SECRET_<TENANT>`; a
    /// tenant without them is still listed so that authorization can report
    /// the missing credentials.
    pub fn from_lookup<F>(lookup: F) -> Res<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let require = |key: &str| get(key).ok_or_else(|| Error::Config(format!("{} must be set", key)));

        let tenants = parse_tenants(&require("SONGCAT_TENANTS")?, &get)?;
        let catalogs = parse_catalogs(&require("SONGCAT_CATALOGS")?)?;

        Ok(Self {
            server_address: get("SERVER_ADDRESS").unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.into()),
            redirect_uri: require("SPOTIFY_API_REDIRECT_URI")?,
            auth_url: get("SPOTIFY_API_AUTH_URL").unwrap_or_else(|| DEFAULT_AUTH_URL.into()),
            token_url: get("SPOTIFY_API_TOKEN_URL").unwrap_or_else(|| DEFAULT_TOKEN_URL.into()),
            api_url: get("SPOTIFY_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.into())
                .trim_end_matches('/')
                .to_string(),
            scope: get("SPOTIFY_API_AUTH_SCOPE").unwrap_or_else(|| DEFAULT_SCOPE.into()),
            tenants,
            catalogs,
            request_timeout: Duration::from_secs(parse_number(
                "SONGCAT_REQUEST_TIMEOUT_SECS",
                get("SONGCAT_REQUEST_TIMEOUT_SECS"),
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?),
            auth_state_ttl: Duration::from_secs(parse_number(
                "SONGCAT_AUTH_STATE_TTL_SECS",
                get("SONGCAT_AUTH_STATE_TTL_SECS"),
                DEFAULT_AUTH_STATE_TTL_SECS,
            )?),
            queue_length: parse_number(
                "SONGCAT_QUEUE_LENGTH",
                get("SONGCAT_QUEUE_LENGTH"),
                DEFAULT_QUEUE_LENGTH,
            )?,
            artist_match_case_sensitive: parse_bool(
                "SONGCAT_ARTIST_MATCH_CASE_SENSITIVE",
                get("SONGCAT_ARTIST_MATCH_CASE_SENSITIVE"),
                true,
            )?,
            frontend_url: get("SONGCAT_FRONTEND_URL"),
        })
    }
}

fn parse_tenants<F>(raw: &str, get: &F) -> Res<Vec<Tenant>>
where
    F: Fn(&str) -> Option<String>,
{
    let mut tenants: Vec<Tenant> = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        let name = name.to_lowercase();
        if tenants.iter().any(|t| t.name == name) {
            continue;
        }

        let suffix = name.to_uppercase();
        let client_id = get(&format!("SPOTIFY_CLIENT_ID_{}", suffix));
        let client_secret = get(&format!("SPOTIFY_CLIENT_SECRET_{}", suffix));
        let credentials = match (client_id, client_secret) {
            (Some(client_id), Some(client_secret)) => Some(ClientCredentials {
                client_id,
                client_secret,
            }),
            _ => None,
        };

        tenants.push(Tenant { name, credentials });
    }

    if tenants.is_empty() {
        return Err(Error::Config("SONGCAT_TENANTS lists no tenant".into()));
    }
    Ok(tenants)
}

/// Parses `name=url,name=url`.
pub fn parse_catalogs(raw: &str) -> Res<Vec<CatalogEntry>> {
    let mut catalogs = Vec::new();
    for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let Some((name, url)) = pair.split_once('=') else {
            return Err(Error::Config(format!(
                "SONGCAT_CATALOGS entry '{}' is not name=url",
                pair
            )));
        };
        let (name, url) = (name.trim(), url.trim());
        if name.is_empty() || url.is_empty() {
            return Err(Error::Config(format!(
                "SONGCAT_CATALOGS entry '{}' is not name=url",
                pair
            )));
        }
        catalogs.push(CatalogEntry {
            name: name.to_lowercase(),
            url: url.to_string(),
        });
    }

    if catalogs.is_empty() {
        return Err(Error::Config("SONGCAT_CATALOGS lists no catalog".into()));
    }
    Ok(catalogs)
}

fn parse_number<T: std::str::FromStr>(key: &str, value: Option<String>, default: T) -> Res<T> {
    match value {
        Some(v) => v
            .parse()
            .map_err(|_| Error::Config(format!("{} is not a valid number: '{}'", key, v))),
        None => Ok(default),
    }
}

fn parse_bool(key: &str, value: Option<String>, default: bool) -> Res<bool> {
    match value.as_deref().map(str::to_lowercase).as_deref() {
        None => Ok(default),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => Err(Error::Config(format!("{} is not a boolean: '{}'", key, other))),
    }
}
