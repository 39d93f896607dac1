use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "agora.toml",
    "config/agora.toml",
    "crates/config/agora.toml",
    "../agora.toml",
    "../config/agora.toml",
];

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub throttle: ThrottleConfig,
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
            port: 8000,
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
            url: "sqlite://agora.db".to_string(),
            max_connections: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "AuthConfig::default_session_ttl")]
    pub session_ttl_seconds: u64,
    #[serde(default = "AuthConfig::default_login_attempts_limit")]
    pub login_attempts_limit: u32,
    #[serde(default = "AuthConfig::default_login_lockout_seconds")]
    pub login_lockout_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_seconds: Self::default_session_ttl(),
            login_attempts_limit: Self::default_login_attempts_limit(),
            login_lockout_seconds: Self::default_login_lockout_seconds(),
        }
    }
}

impl AuthConfig {
    fn default_session_ttl() -> u64 {
        86_400
    }

    fn default_login_attempts_limit() -> u32 {
        5
    }

    fn default_login_lockout_seconds() -> u64 {
        300
    }
}

/// Rate limiting applied to unauthenticated login attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrottleConfig {
    #[serde(default = "ThrottleConfig::default_login_per_minute")]
    pub login_per_minute: u32,
    #[serde(default = "ThrottleConfig::default_login_burst")]
    pub login_burst: u32,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            login_per_minute: Self::default_login_per_minute(),
            login_burst: Self::default_login_burst(),
        }
    }
}

impl ThrottleConfig {
    fn default_login_per_minute() -> u32 {
        5
    }

    fn default_login_burst() -> u32 {
        5
    }
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use agora_config::load;
///
/// std::env::remove_var("AGORA_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let session_ttl = defaults.auth.session_ttl_seconds;
    let session_ttl_i64 = if session_ttl > i64::MAX as u64 {
        i64::MAX
    } else {
        session_ttl as i64
    };

    let mut builder = config::Config::builder();
    builder = builder
        .set_default("http.address", defaults.http.address.clone())
        .unwrap()
        .set_default("http.port", i64::from(defaults.http.port))
        .unwrap()
        .set_default("database.url", defaults.database.url.clone())
        .unwrap()
        .set_default(
            "database.max_connections",
            i64::from(defaults.database.max_connections),
        )
        .unwrap()
        .set_default("auth.session_ttl_seconds", session_ttl_i64)
        .unwrap()
        .set_default(
            "auth.login_attempts_limit",
            i64::from(defaults.auth.login_attempts_limit),
        )
        .unwrap()
        .set_default(
            "auth.login_lockout_seconds",
            defaults.auth.login_lockout_seconds as i64,
        )
        .unwrap()
        .set_default(
            "throttle.login_per_minute",
            i64::from(defaults.throttle.login_per_minute),
        )
        .unwrap()
        .set_default(
            "throttle.login_burst",
            i64::from(defaults.throttle.login_burst),
        )
        .unwrap();

    let environment_overrides = config::Environment::with_prefix("AGORA").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("AGORA_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via AGORA_CONFIG");
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

    let mut config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    if config.auth.session_ttl_seconds > i64::MAX as u64 {
        config.auth.session_ttl_seconds = i64::MAX as u64;
    }

    debug!(?config, "loaded backend configuration");
    Ok(config)
}
