//! Configuration types and loading
//!
//! Config precedence: CLI args > env vars > config file > defaults.
//! The client secret and subscription key come from DOCARTS_CLIENT_SECRET /
//! DOCARTS_SUBSCRIPTION_KEY or from the matching `*_file` setting, never
//! from the TOML directly.

use common::Secret;
use dam_auth::AuthConfig;
use dam_client::ApiConfig;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CLIENT_SECRET_ENV: &str = "DOCARTS_CLIENT_SECRET";
pub const SUBSCRIPTION_KEY_ENV: &str = "DOCARTS_SUBSCRIPTION_KEY";

/// Root configuration
#[derive(Debug, Deserialize)]
pub struct Config {
    pub auth: AuthSection,
    pub api: ApiSection,
    pub server: ServerSection,
    #[serde(default)]
    pub storage: StorageSection,
    #[serde(default)]
    pub gallery: GallerySection,
}

/// Identity provider registration
#[derive(Debug, Deserialize)]
pub struct AuthSection {
    pub endpoint: String,
    #[serde(default = "default_authorize_path")]
    pub authorize_path: String,
    #[serde(default = "default_token_path")]
    pub token_path: String,
    pub client_id: String,
    pub redirect_uri: String,
    #[serde(default)]
    pub client_secret_file: Option<PathBuf>,
    #[serde(skip)]
    pub client_secret: Option<Secret<String>>,
}

/// DAM API connection
#[derive(Debug, Deserialize)]
pub struct ApiSection {
    pub base_url: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub subscription_key_file: Option<PathBuf>,
    #[serde(skip)]
    pub subscription_key: Option<Secret<String>>,
    /// Hosts besides the API origin that serve images (`host` or `host:port`)
    #[serde(default)]
    pub media_hosts: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ServerSection {
    pub listen_addr: SocketAddr,
    /// Where auth failures send the user back to
    #[serde(default = "default_home_url")]
    pub home_url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

/// Token persistence; the token lives in memory when `token_path` is unset.
#[derive(Debug, Default, Deserialize)]
pub struct StorageSection {
    #[serde(default)]
    pub token_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
pub struct GallerySection {
    #[serde(default = "default_images_per_load")]
    pub images_per_load: usize,
    #[serde(default = "default_featured_root_folder")]
    pub featured_root_folder: String,
    #[serde(default = "default_carousel_page_size")]
    pub carousel_page_size: usize,
}

impl Default for GallerySection {
    fn default() -> Self {
        Self {
            images_per_load: default_images_per_load(),
            featured_root_folder: default_featured_root_folder(),
            carousel_page_size: default_carousel_page_size(),
        }
    }
}

fn default_authorize_path() -> String {
    "/connect/authorize".into()
}

fn default_token_path() -> String {
    "/connect/token".into()
}

fn default_api_version() -> String {
    dam_client::config::DEFAULT_API_VERSION.into()
}

fn default_timeout_ms() -> u64 {
    dam_client::config::DEFAULT_TIMEOUT.as_millis() as u64
}

fn default_home_url() -> String {
    "/".into()
}

fn default_max_connections() -> usize {
    1000
}

fn default_images_per_load() -> usize {
    gallery::DEFAULT_IMAGES_PER_LOAD
}

fn default_featured_root_folder() -> String {
    "db5f8d55-361f-47bd-9e8d-5dac38189fcb".into()
}

fn default_carousel_page_size() -> usize {
    gallery::DEFAULT_PAGE_SIZE
}

impl Config {
    /// Load configuration from a TOML file, validate it, then resolve
    /// secrets (env var first, then the configured file).
    pub fn load(path: &Path) -> common::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&contents)?;
        config.validate()?;

        config.auth.client_secret = resolve_secret(
            CLIENT_SECRET_ENV,
            config.auth.client_secret_file.as_deref(),
            "client_secret_file",
        )?;
        config.api.subscription_key = resolve_secret(
            SUBSCRIPTION_KEY_ENV,
            config.api.subscription_key_file.as_deref(),
            "subscription_key_file",
        )?;

        Ok(config)
    }

    fn validate(&self) -> common::Result<()> {
        require_http("auth.endpoint", &self.auth.endpoint)?;
        require_http("auth.redirect_uri", &self.auth.redirect_uri)?;
        require_http("api.base_url", &self.api.base_url)?;
        if !self.server.home_url.starts_with('/') {
            require_http("server.home_url", &self.server.home_url)?;
        }
        if self.api.media_hosts.iter().any(|h| h.trim().is_empty() || h.contains('/')) {
            return Err(common::Error::Config(
                "api.media_hosts entries must be bare hosts like cdn.example.com".into(),
            ));
        }
        if self.auth.client_id.trim().is_empty() {
            return Err(common::Error::Config("auth.client_id must not be empty".into()));
        }
        if self.gallery.featured_root_folder.trim().is_empty() {
            return Err(common::Error::Config(
                "gallery.featured_root_folder must not be empty".into(),
            ));
        }
        for (name, value) in [
            ("api.timeout_ms", self.api.timeout_ms as usize),
            ("server.max_connections", self.server.max_connections),
            ("gallery.images_per_load", self.gallery.images_per_load),
            ("gallery.carousel_page_size", self.gallery.carousel_page_size),
        ] {
            if value == 0 {
                return Err(common::Error::Config(format!("{name} must be greater than 0")));
            }
        }
        Ok(())
    }

    /// Provider settings for the token store. Fails without a client secret.
    pub fn auth_config(&self) -> common::Result<AuthConfig> {
        let client_secret = self.auth.client_secret.clone().ok_or_else(|| {
            common::Error::Config(format!(
                "no client secret: set {CLIENT_SECRET_ENV} or auth.client_secret_file"
            ))
        })?;
        Ok(AuthConfig {
            endpoint: self.auth.endpoint.clone(),
            authorize_path: self.auth.authorize_path.clone(),
            token_path: self.auth.token_path.clone(),
            client_id: self.auth.client_id.clone(),
            client_secret,
            redirect_uri: self.auth.redirect_uri.clone(),
        })
    }

    pub fn api_config(&self) -> ApiConfig {
        let mut api = ApiConfig::new(self.api.base_url.as_str());
        api.api_version = self.api.api_version.clone();
        api.subscription_key = self.api.subscription_key.clone();
        api.timeout = Duration::from_millis(self.api.timeout_ms);
        api.media_hosts = self.api.media_hosts.clone();
        api
    }

    /// Resolve config file path from CLI arg or CONFIG_PATH env var.
    pub fn resolve_path(cli_path: Option<&str>) -> PathBuf {
        if let Some(p) = cli_path {
            return PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("CONFIG_PATH") {
            return PathBuf::from(p);
        }
        PathBuf::from("docarts.toml")
    }
}

fn require_http(name: &str, value: &str) -> common::Result<()> {
    let parsed = url::Url::parse(value)?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(common::Error::Config(format!(
            "{name} must start with http:// or https://, got: {value}"
        )));
    }
    Ok(())
}

fn resolve_secret(
    env_key: &str,
    file: Option<&Path>,
    setting: &str,
) -> common::Result<Option<Secret<String>>> {
    if let Ok(value) = std::env::var(env_key) {
        let value = value.trim().to_owned();
        if !value.is_empty() {
            return Ok(Some(Secret::new(value)));
        }
    }
    match file {
        Some(path) => Secret::from_file(path).map_err(|e| {
            common::Error::Config(format!("failed to read {setting} {}: {e}", path.display()))
        }),
        None => Ok(None),
    }
}
