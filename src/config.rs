use crate::errors::AppError;
use std::{
    env,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
};

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_PATH: &str = "data/trips.json";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub data_path: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let port = match lookup("PORT") {
            Some(value) => value
                .trim()
                .parse::<u16>()
                .map_err(|err| AppError::Config(format!("invalid PORT '{value}': {err}")))?,
            None => DEFAULT_PORT,
        };

        let host = match lookup("APP_HOST") {
            Some(value) => value
                .trim()
                .parse::<IpAddr>()
                .map_err(|err| AppError::Config(format!("invalid APP_HOST '{value}': {err}")))?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };

        let data_path = lookup("APP_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));

        Ok(Self {
            listen_addr: SocketAddr::new(host, port),
            data_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, AppError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.listen_addr, SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)));
        assert_eq!(config.data_path, PathBuf::from(DEFAULT_DATA_PATH));
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("PORT", "9090"),
            ("APP_HOST", "127.0.0.1"),
            ("APP_DATA_PATH", "/tmp/trips.json"),
        ])
        .unwrap();
        assert_eq!(config.listen_addr, SocketAddr::from(([127, 0, 0, 1], 9090)));
        assert_eq!(config.data_path, PathBuf::from("/tmp/trips.json"));
    }

    #[test]
    fn rejects_bad_port() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
