use std::path::PathBuf;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    File,
    Memory,
}

impl std::str::FromStr for StorageKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "memory" => Ok(Self::Memory),
            other => anyhow::bail!("unknown storage backend {other:?} (expected file or memory)"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub ttl_minutes: i64,
    pub cookie_name: String,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub storage: StorageKind,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = parse_var("APP_PORT", 8080u16)?;
        let data_dir = std::env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));
        let storage = parse_var("STORAGE_BACKEND", StorageKind::File)?;
        let session = SessionConfig {
            ttl_minutes: parse_var("SESSION_TTL_MINUTES", 60 * 24)?,
            cookie_name: std::env::var("SESSION_COOKIE_NAME").unwrap_or_else(|_| "sid".into()),
            cookie_secure: parse_var("SESSION_COOKIE_SECURE", false)?,
        };
        anyhow::ensure!(session.ttl_minutes > 0, "SESSION_TTL_MINUTES must be positive");
        Ok(Self {
            host,
            port,
            data_dir,
            storage,
            session,
        })
    }
}

fn parse_var<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEYS: [&str; 7] = [
        "APP_HOST",
        "APP_PORT",
        "DATA_DIR",
        "STORAGE_BACKEND",
        "SESSION_TTL_MINUTES",
        "SESSION_COOKIE_NAME",
        "SESSION_COOKIE_SECURE",
    ];

    fn clear_env() {
        for key in KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn defaults_when_env_is_empty() {
        clear_env();
        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.storage, StorageKind::File);
        assert_eq!(config.session.ttl_minutes, 1440);
        assert_eq!(config.session.cookie_name, "sid");
        assert!(!config.session.cookie_secure);
    }

    #[test]
    #[serial]
    fn reads_custom_values() {
        clear_env();
        std::env::set_var("APP_PORT", "5000");
        std::env::set_var("DATA_DIR", "/tmp/taskboard");
        std::env::set_var("STORAGE_BACKEND", "Memory");
        std::env::set_var("SESSION_TTL_MINUTES", "30");
        std::env::set_var("SESSION_COOKIE_SECURE", "true");

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/taskboard"));
        assert_eq!(config.storage, StorageKind::Memory);
        assert_eq!(config.session.ttl_minutes, 30);
        assert!(config.session.cookie_secure);

        clear_env();
    }

    #[test]
    #[serial]
    fn rejects_garbage_values() {
        clear_env();
        std::env::set_var("APP_PORT", "eighty");
        let err = AppConfig::from_env().unwrap_err();
        assert!(format!("{err:#}").contains("APP_PORT"));

        clear_env();
        std::env::set_var("STORAGE_BACKEND", "postgres");
        assert!(AppConfig::from_env().is_err());

        clear_env();
        std::env::set_var("SESSION_TTL_MINUTES", "0");
        assert!(AppConfig::from_env().is_err());

        clear_env();
    }
}
