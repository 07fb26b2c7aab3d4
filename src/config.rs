use std::env;
use std::fmt;

/// Process configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub server_port: u16,
    pub server_host: String,
    pub jwt_secret: String,
    pub bcrypt_cost: u32,
}

/// Reasons the configuration cannot be loaded. All of them are fatal.
#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{} must be set", key),
            ConfigError::Invalid(key) => write!(f, "{} has an invalid value", key),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// `DATABASE_URL` wins when present; otherwise the URL is assembled from
    /// `DB_HOST`, `DB_PORT`, `DB_USER`, `DB_PASSWORD` and `DB_NAME`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let database_url = match get("DATABASE_URL") {
            Some(url) => url,
            None => {
                let host = get("DB_HOST").ok_or(ConfigError::Missing("DATABASE_URL or DB_HOST"))?;
                let port = get("DB_PORT").unwrap_or_else(|| "5432".to_string());
                let user = get("DB_USER").ok_or(ConfigError::Missing("DB_USER"))?;
                let password = get("DB_PASSWORD").unwrap_or_default();
                let name = get("DB_NAME").ok_or(ConfigError::Missing("DB_NAME"))?;
                format!("postgres://{}:{}@{}:{}/{}", user, password, host, port, name)
            }
        };

        Ok(Self {
            database_url,
            max_connections: parse_or(get("DB_MAX_CONNECTIONS"), 5, "DB_MAX_CONNECTIONS")?,
            server_port: parse_or(get("SERVER_PORT"), 8080, "SERVER_PORT")?,
            server_host: get("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            jwt_secret,
            bcrypt_cost: parse_or(get("BCRYPT_COST"), bcrypt::DEFAULT_COST, "BCRYPT_COST")?,
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_or<T: std::str::FromStr>(
    value: Option<String>,
    default: T,
    key: &'static str,
) -> Result<T, ConfigError> {
    match value {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}
