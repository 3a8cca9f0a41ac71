use serde::Deserialize;
use std::{env, fs, net::SocketAddr, path::Path};

pub const DEFAULT_CONFIG_PATH: &str = "./resource/config.toml";

/// Upper bound for `auth.token_ttl_hours` (100 years).
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365 * 100;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file read error: {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Configuration file decoding error: {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Service configuration, read from a TOML file and overridden by the environment.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub password: HashingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    pub bootstrap: Option<BootstrapUser>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://data/userdemo.db?mode=rwc".to_string(),
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub secret: String,
    #[serde(default = "default_issuer")]
    pub issuer: String,
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
}

/// Argon2 work factor.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HashingConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: argon2::Params::DEFAULT_M_COST,
            iterations: argon2::Params::DEFAULT_T_COST,
            parallelism: argon2::Params::DEFAULT_P_COST,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogMode {
    #[default]
    Stdout,
    Json,
    #[serde(alias = "null")]
    Nil,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    pub mode: LogMode,
    pub filter: Option<String>,
}

/// Account guaranteed to exist after startup.
#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapUser {
    pub login: String,
    pub password: String,
}

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_issuer() -> String {
    "userdemo".to_string()
}

fn default_token_ttl_hours() -> i64 {
    72
}

impl AppConfig {
    /// Reads the file at `path`, applies environment overrides and validates.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;

        let mut config = Self::from_toml(&raw).map_err(|source| ConfigError::Decode {
            path: display,
            source,
        })?;

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(raw)
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(url) = env::var("DATABASE_URL") {
            self.database.url = url;
        }
        if let Ok(secret) = env::var("JWT_SECRET") {
            self.auth.secret = secret;
        }
        if let Ok(host) = env::var("HOST") {
            self.server.host = host;
        }
        if let Ok(port) = env::var("PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("PORT is not a valid port: {}", port)))?;
        }
        if let Ok(format) = env::var("LOG_FORMAT") {
            match format.as_str() {
                "json" => self.logging.mode = LogMode::Json,
                "stdout" | "text" => self.logging.mode = LogMode::Stdout,
                "nil" | "null" => self.logging.mode = LogMode::Nil,
                other => {
                    return Err(ConfigError::Invalid(format!(
                        "LOG_FORMAT must be json, stdout or nil, got {}",
                        other
                    )))
                }
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.secret.is_empty() {
            return Err(ConfigError::Invalid("auth.secret must not be empty".into()));
        }
        if self.auth.token_ttl_hours <= 0 || self.auth.token_ttl_hours > MAX_TOKEN_TTL_HOURS {
            return Err(ConfigError::Invalid(format!(
                "auth.token_ttl_hours must be between 1 and {}",
                MAX_TOKEN_TTL_HOURS
            )));
        }
        if self.database.url.is_empty() {
            return Err(ConfigError::Invalid("database.url must not be empty".into()));
        }
        if let Some(bootstrap) = &self.bootstrap {
            if bootstrap.login.is_empty() || bootstrap.password.is_empty() {
                return Err(ConfigError::Invalid(
                    "bootstrap login and password must not be empty".into(),
                ));
            }
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        let host: std::net::IpAddr = self
            .server
            .host
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("invalid host: {}", self.server.host)))?;
        Ok(SocketAddr::from((host, self.server.port)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FULL: &str = r#"
version = "1.2.3"

[server]
host = "0.0.0.0"
port = 9000

[database]
url = "sqlite::memory:"
max_connections = 2

[auth]
secret = "s3cret"
issuer = "test-issuer"
token_ttl_hours = 24

[password]
memory_kib = 1024
iterations = 1
parallelism = 1

[logging]
mode = "null"

[bootstrap]
login = "admin"
password = "admin"
"#;

    #[test]
    fn test_parse_full_config() {
        let config = AppConfig::from_toml(FULL).unwrap();

        assert_eq!(config.version, "1.2.3");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.database.max_connections, 2);
        assert_eq!(config.auth.issuer, "test-issuer");
        assert_eq!(config.auth.token_ttl_hours, 24);
        assert_eq!(config.password.memory_kib, 1024);
        assert_eq!(config.logging.mode, LogMode::Nil);
        assert_eq!(config.bootstrap.as_ref().unwrap().login, "admin");
        assert!(config.listen_addr().is_ok());
    }

    #[test]
    fn test_defaults_apply() {
        let config = AppConfig::from_toml("[auth]\nsecret = \"x\"\n").unwrap();

        assert_eq!(config.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.auth.issuer, "userdemo");
        assert_eq!(config.auth.token_ttl_hours, 72);
        assert_eq!(config.logging.mode, LogMode::Stdout);
        assert!(config.bootstrap.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_auth_section_is_decode_error() {
        assert!(AppConfig::from_toml("version = \"1\"").is_err());
    }

    #[test]
    fn test_empty_secret_is_invalid() {
        let config = AppConfig::from_toml("[auth]\nsecret = \"\"\n").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_token_ttl_is_bounded() {
        let mut config = AppConfig::from_toml("[auth]\nsecret = \"x\"\n").unwrap();

        config.auth.token_ttl_hours = MAX_TOKEN_TTL_HOURS;
        assert!(config.validate().is_ok());

        config.auth.token_ttl_hours = 1_000_000_000_000;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.auth.token_ttl_hours = i64::MAX;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.auth.token_ttl_hours = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = AppConfig::load("/definitely/not/here.toml");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_load_undecodable_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "this is = = not toml").unwrap();

        let result = AppConfig::load(file.path());
        assert!(matches!(result, Err(ConfigError::Decode { .. })));
    }
}
