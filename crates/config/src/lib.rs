use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "courier.toml",
    "config/courier.toml",
    "crates/config/courier.toml",
    "../courier.toml",
    "../config/courier.toml",
];

const DEFAULT_ALLOWED_ORIGINS: &[&str] = &[
    "http://localhost:*",
    "https://localhost:*",
    "http://127.0.0.1:*",
    "https://127.0.0.1:*",
    "https://*.netlify.app",
    "https://*.vercel.app",
    "https://*.onrender.com",
    "https://*.herokuapp.com",
    "https://*.github.io",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub broker: BrokerConfig,
    pub messages: MessagesConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://courier.db".to_string(),
            max_connections: 10,
        }
    }
}

/// Which pub/sub backend carries delivery payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BrokerKind {
    #[default]
    Memory,
    Redis,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    pub kind: BrokerKind,
    pub redis_url: String,
    /// Buffered payloads per topic before slow subscribers start lagging.
    pub channel_capacity: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            kind: BrokerKind::Memory,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            channel_capacity: 100,
        }
    }
}

/// Limits applied by the message service.
///
/// ```
/// use courier_config::MessagesConfig;
///
/// let limits = MessagesConfig::default();
/// assert_eq!(limits.default_page_size, 20);
/// assert!(limits.max_page_size >= limits.default_page_size);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesConfig {
    pub max_content_length: usize,
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            max_content_length: 4000,
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Origin patterns; `*` matches any run of characters.
    pub allowed_origins: Vec<String>,
    pub max_age_seconds: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(|origin| origin.to_string())
                .collect(),
            max_age_seconds: 3600,
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.database.max_connections > 0,
            "database.max_connections must be greater than zero"
        );
        ensure!(
            self.broker.channel_capacity > 0,
            "broker.channel_capacity must be greater than zero"
        );
        ensure!(
            self.messages.max_content_length > 0,
            "messages.max_content_length must be greater than zero"
        );
        ensure!(
            self.messages.default_page_size > 0
                && self.messages.default_page_size <= self.messages.max_page_size,
            "messages.default_page_size must be between 1 and messages.max_page_size"
        );
        Ok(())
    }
}

fn to_i64<T: TryInto<i64>>(value: T) -> i64 {
    value.try_into().unwrap_or(i64::MAX)
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use courier_config::load;
///
/// std::env::remove_var("COURIER_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    load_from(None)
}

/// Like [`load`], but an explicit file path takes precedence over
/// `COURIER_CONFIG` and the default search locations.
pub fn load_from(explicit: Option<PathBuf>) -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let mut builder = config::Config::builder()
        .set_default("http.address", defaults.http.address.clone())?
        .set_default("http.port", i64::from(defaults.http.port))?
        .set_default("database.url", defaults.database.url.clone())?
        .set_default(
            "database.max_connections",
            i64::from(defaults.database.max_connections),
        )?
        .set_default("broker.kind", "memory")?
        .set_default("broker.redis_url", defaults.broker.redis_url.clone())?
        .set_default(
            "broker.channel_capacity",
            to_i64(defaults.broker.channel_capacity),
        )?
        .set_default(
            "messages.max_content_length",
            to_i64(defaults.messages.max_content_length),
        )?
        .set_default(
            "messages.default_page_size",
            i64::from(defaults.messages.default_page_size),
        )?
        .set_default(
            "messages.max_page_size",
            i64::from(defaults.messages.max_page_size),
        )?
        .set_default("cors.allowed_origins", defaults.cors.allowed_origins.clone())?
        .set_default("cors.max_age_seconds", to_i64(defaults.cors.max_age_seconds))?;

    let environment_overrides = config::Environment::with_prefix("COURIER")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("cors.allowed_origins")
        .try_parsing(true);

    let mut config_file_attached = false;

    let explicit = explicit.or_else(|| std::env::var("COURIER_CONFIG").ok().map(PathBuf::from));

    if let Some(path) = explicit {
        debug!(path = %path.display(), "loading explicit configuration file");
        builder = builder.add_source(config::File::from(path));
        config_file_attached = true;
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    config.validate().context("invalid configuration")?;

    debug!(?config, "loaded backend configuration");
    Ok(config)
}
