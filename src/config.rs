use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use log::LevelFilter;

use crate::{
    engine::{EngineSettings, DEFAULT_QUESTION_SECONDS},
    error::ConfigError,
};

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: String,
    pub database_path: PathBuf,
    pub question_seconds: u32,
    pub tick_millis: u64,
    pub default_count: usize,
    pub log_dir: PathBuf,
    pub log_level: LevelFilter,
    pub seed_pack: Option<PathBuf>,
}

impl Config {
    /// Reads the process environment. Call `dotenv` first to pick up `.env`.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default_seconds = DEFAULT_QUESTION_SECONDS.to_string();

        let config = Config {
            addr: try_load(&lookup, "INSCOVIA_ADDR", "127.0.0.1:9001")?,
            database_path: try_load(&lookup, "INSCOVIA_DB_PATH", "inscovia.db")?,
            question_seconds: try_load(&lookup, "INSCOVIA_QUESTION_SECONDS", &default_seconds)?,
            tick_millis: try_load(&lookup, "INSCOVIA_TICK_MILLIS", "1000")?,
            default_count: try_load(&lookup, "INSCOVIA_DEFAULT_COUNT", "10")?,
            log_dir: try_load(&lookup, "INSCOVIA_LOG_DIR", "log")?,
            log_level: try_load(&lookup, "INSCOVIA_LOG_LEVEL", "info")?,
            seed_pack: lookup("INSCOVIA_SEED_PACK")
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
        };

        positive("INSCOVIA_QUESTION_SECONDS", config.question_seconds as u64)?;
        positive("INSCOVIA_TICK_MILLIS", config.tick_millis)?;
        positive("INSCOVIA_DEFAULT_COUNT", config.default_count as u64)?;
        Ok(config)
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            question_seconds: self.question_seconds,
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }
}

fn try_load<F, T>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    let value = lookup(key).unwrap_or_else(|| default.to_string());
    value.trim().parse().map_err(|error: T::Err| ConfigError::InvalidValue {
        key,
        value: value.clone(),
        reason: error.to_string(),
    })
}

fn positive(key: &'static str, value: u64) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(())
}
