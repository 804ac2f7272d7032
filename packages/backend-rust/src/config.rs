use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};

use painpredict_algo::synthetic::DEFAULT_SEED;

const DEFAULT_PORT: u16 = 8000;
const DATABASE_FILE: &str = "pain_predictor.db";
const MODEL_FILE: &str = "ml_models/population_model.json";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub database_url: String,
    pub model_path: PathBuf,
    pub model_seed: u64,
    pub recommender_seed: Option<u64>,
    pub log: LogConfig,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub file_enabled: bool,
    pub dir: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file_enabled: false,
            dir: PathBuf::from("./logs"),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let data_dir = default_data_dir();
        let defaults = Self::with_data_dir(&data_dir);

        let port = std::env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(defaults.port);

        let host = std::env::var("HOST")
            .ok()
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(defaults.host);

        let log_level = std::env::var("RUST_LOG").unwrap_or(defaults.log_level);

        let database_url = env_string("DATABASE_URL").unwrap_or(defaults.database_url);

        let model_path = env_string("MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.model_path);

        let log = LogConfig {
            file_enabled: env_bool("ENABLE_FILE_LOGS").unwrap_or(false),
            dir: env_string("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.log.dir),
        };

        Self {
            host,
            port,
            log_level,
            database_url,
            model_path,
            model_seed: env_u64("MODEL_SEED").unwrap_or(DEFAULT_SEED),
            recommender_seed: env_u64("RECOMMENDER_SEED"),
            log,
        }
    }

    /// Defaults with the database and model artifact stored under `dir`
    pub fn with_data_dir(dir: &Path) -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: DEFAULT_PORT,
            log_level: "info".to_string(),
            database_url: sqlite_url(&dir.join(DATABASE_FILE)),
            model_path: dir.join(MODEL_FILE),
            model_seed: DEFAULT_SEED,
            recommender_seed: None,
            log: LogConfig::default(),
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("painpredict"))
        .unwrap_or_else(|| PathBuf::from("./data"))
}

pub fn sqlite_url(path: &Path) -> String {
    format!("sqlite:{}?mode=rwc", path.display())
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_u64(key: &str) -> Option<u64> {
    env_string(key).and_then(|v| v.parse().ok())
}

fn env_bool(key: &str) -> Option<bool> {
    let normalized = env_string(key)?.to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_data_dir_roots_artifacts() {
        let config = Config::with_data_dir(Path::new("/tmp/pp"));
        assert_eq!(config.database_url, "sqlite:/tmp/pp/pain_predictor.db?mode=rwc");
        assert_eq!(
            config.model_path,
            PathBuf::from("/tmp/pp/ml_models/population_model.json")
        );
        assert_eq!(config.port, 8000);
        assert_eq!(config.model_seed, 42);
        assert!(config.recommender_seed.is_none());
    }

    #[test]
    fn test_bind_addr() {
        let mut config = Config::with_data_dir(Path::new("."));
        config.port = 9100;
        assert_eq!(config.bind_addr().to_string(), "0.0.0.0:9100");
    }
}
