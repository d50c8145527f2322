//! Configuration loading, generalized from the teacher's env/file/memory
//! source loader down to the fields this core actually consumes (spec §6).

use std::collections::HashMap;
use std::env;
use std::fmt;

#[derive(Debug, Clone)]
pub enum ConfigSource {
    Env { prefix: Option<String> },
    File(String),
    Memory(HashMap<String, String>),
}

impl ConfigSource {
    pub fn env() -> Self {
        Self::Env { prefix: None }
    }

    pub fn env_with_prefix(prefix: impl Into<String>) -> Self {
        Self::Env {
            prefix: Some(prefix.into()),
        }
    }

    pub fn memory(values: HashMap<String, String>) -> Self {
        Self::Memory(values)
    }
}

#[derive(Debug, Clone)]
pub enum ConfigError {
    MissingKey(String),
    InvalidValue { key: String, value: String, reason: String },
    ReadError { path: String, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingKey(key) => write!(f, "missing required configuration key: {key}"),
            Self::InvalidValue { key, value, reason } => {
                write!(f, "invalid value '{value}' for key '{key}': {reason}")
            }
            Self::ReadError { path, message } => {
                write!(f, "failed to read config file '{path}': {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

pub trait Config: Sized {
    fn from_map(map: &HashMap<String, String>) -> Result<Self, ConfigError>;
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    sources: Vec<ConfigSource>,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: ConfigSource) -> Self {
        self.sources.push(source);
        self
    }

    pub fn load<T: Config>(self) -> Result<T, ConfigError> {
        let mut merged = HashMap::new();
        for source in &self.sources {
            let values = match source {
                ConfigSource::Env { prefix } => load_from_env(prefix.as_deref()),
                ConfigSource::File(path) => load_from_file(path)?,
                ConfigSource::Memory(values) => values.clone(),
            };
            merged.extend(values);
        }
        T::from_map(&merged)
    }
}

fn load_from_env(prefix: Option<&str>) -> HashMap<String, String> {
    let mut result = HashMap::new();
    let prefix = prefix.map(|p| format!("{}_", p.to_uppercase()));
    for (key, value) in env::vars() {
        if let Some(ref p) = prefix {
            if let Some(stripped) = key.strip_prefix(p) {
                result.insert(stripped.to_lowercase(), value);
            }
        } else {
            result.insert(key.to_lowercase(), value);
        }
    }
    result
}

fn load_from_file(path: &str) -> Result<HashMap<String, String>, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        message: e.to_string(),
    })?;
    toml::from_str(&content).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        message: e.to_string(),
    })
}

/// Every environment variable the core consumes (spec §6). Collaborator-owned
/// variables (SMTP creds, frontend base path, …) are not modeled here.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub identity_provider_uri: String,
    pub identity_provider_api_key: String,
    pub queue_broker_uri: String,
    pub invitation_ttl_hours: i64,
    pub invitation_base_url: String,
    pub tenant_init_service_urls: Vec<String>,
}

impl Config for AppConfig {
    fn from_map(map: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            map.get(key)
                .cloned()
                .ok_or_else(|| ConfigError::MissingKey(key.to_string()))
        };

        let invitation_ttl_hours = map
            .get("invitation_ttl_hours")
            .map(|v| {
                v.parse::<i64>().map_err(|_| ConfigError::InvalidValue {
                    key: "invitation_ttl_hours".to_string(),
                    value: v.clone(),
                    reason: "must be an integer".to_string(),
                })
            })
            .transpose()?
            .unwrap_or(72);

        let tenant_init_service_urls = map
            .get("tenant_init_service_urls")
            .map(|v| v.split(',').map(str::trim).map(str::to_string).collect())
            .unwrap_or_default();

        Ok(Self {
            database_url: get("database_url")?,
            identity_provider_uri: get("identity_provider_uri")?,
            identity_provider_api_key: get("identity_provider_api_key")?,
            queue_broker_uri: get("queue_broker_uri")?,
            invitation_ttl_hours,
            invitation_base_url: get("invitation_base_url")?,
            tenant_init_service_urls,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_map() -> HashMap<String, String> {
        let mut m = HashMap::new();
        m.insert("database_url".into(), "postgres://localhost/iam".into());
        m.insert("identity_provider_uri".into(), "https://idp.example".into());
        m.insert("identity_provider_api_key".into(), "secret".into());
        m.insert("queue_broker_uri".into(), "amqp://localhost".into());
        m.insert("invitation_base_url".into(), "https://app.example/accept".into());
        m
    }

    #[test]
    fn invitation_ttl_defaults_to_72_hours() {
        let config = AppConfig::from_map(&base_map()).unwrap();
        assert_eq!(config.invitation_ttl_hours, 72);
    }

    #[test]
    fn tenant_init_service_urls_split_on_comma() {
        let mut map = base_map();
        map.insert(
            "tenant_init_service_urls".into(),
            "https://svc-a, https://svc-b".into(),
        );
        let config = AppConfig::from_map(&map).unwrap();
        assert_eq!(
            config.tenant_init_service_urls,
            vec!["https://svc-a".to_string(), "https://svc-b".to_string()]
        );
    }

    #[test]
    fn missing_required_key_is_an_error() {
        let mut map = base_map();
        map.remove("database_url");
        let err = AppConfig::from_map(&map).unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey(k) if k == "database_url"));
    }
}
