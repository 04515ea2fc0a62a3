//! Layered configuration of the `banana` binary.
//!
//! Sources, lowest to highest priority:
//! 1. built-in defaults
//! 2. `~/.config/banana/config.toml`
//! 3. `./banana.toml`, or the file given with `--config`
//! 4. `BANANA_*` environment variables, `__` separating sections
//!    (`BANANA_API__BASE_URL` -> `api.base_url`)

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use banana_client::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS};
use banana_core::{ConfigError, DEFAULT_INTERVAL_MS, DEFAULT_MAX_ATTEMPTS, PollConfig};
use banana_observe::LoggerConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

const LOCAL_CONFIG: &str = "banana.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSection {
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollSection {
    pub interval_ms: u64,
    pub max_attempts: u32,
    pub timeout_ms: u64,
}

impl Default for PollSection {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            timeout_ms: banana_core::DEFAULT_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BananaConfig {
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub poll: PollSection,
    #[serde(default)]
    pub log: LoggerConfig,
}

impl BananaConfig {
    pub fn load(explicit: Option<&Path>) -> Result<Self, figment::Error> {
        Self::figment(explicit).extract()
    }

    pub fn figment(explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global) = Self::global_config_path()
            && global.exists()
        {
            figment = figment.merge(Toml::file(global));
        }

        match explicit {
            Some(path) => figment = figment.merge(Toml::file(path)),
            None if Path::new(LOCAL_CONFIG).exists() => {
                figment = figment.merge(Toml::file(LOCAL_CONFIG));
            }
            None => {}
        }

        figment.merge(Env::prefixed("BANANA_").split("__"))
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("banana").join("config.toml"))
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(self.api.base_url.clone())
            .with_timeout(Duration::from_millis(self.api.timeout_ms))
    }

    pub fn poll_config(&self) -> Result<PollConfig, ConfigError> {
        PollConfig::from_millis(self.poll.interval_ms, self.poll.max_attempts, self.poll.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use banana_observe::LoggerFormat;
    use figment::Jail;

    use super::*;

    #[test]
    fn defaults_without_sources() {
        Jail::expect_with(|_jail| {
            let cfg = BananaConfig::load(None)?;
            assert_eq!(cfg.api.base_url, "http://localhost:5000");
            assert_eq!(cfg.poll_config().unwrap(), PollConfig::default());
            Ok(())
        });
    }

    #[test]
    fn local_file_then_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "banana.toml",
                r#"
                [api]
                base_url = "http://slides.internal:8080"

                [poll]
                interval_ms = 500
                max_attempts = 10

                [log]
                format = "json"
                "#,
            )?;
            jail.set_env("BANANA_POLL__MAX_ATTEMPTS", "3");

            let cfg = BananaConfig::load(None)?;
            assert_eq!(cfg.api.base_url, "http://slides.internal:8080");
            assert_eq!(cfg.api.timeout_ms, 300_000);
            assert_eq!(cfg.poll.interval_ms, 500);
            assert_eq!(cfg.poll.max_attempts, 3);
            assert_eq!(cfg.log.format, LoggerFormat::Json);
            Ok(())
        });
    }

    #[test]
    fn explicit_file_replaces_local() {
        Jail::expect_with(|jail| {
            jail.create_file("banana.toml", "[api]\nbase_url = \"http://local:1\"\n")?;
            jail.create_file("other.toml", "[api]\nbase_url = \"http://other:2\"\n")?;

            let cfg = BananaConfig::load(Some(Path::new("other.toml")))?;
            assert_eq!(cfg.api.base_url, "http://other:2");
            Ok(())
        });
    }

    #[test]
    fn zero_poll_values_are_rejected() {
        Jail::expect_with(|jail| {
            jail.set_env("BANANA_POLL__INTERVAL_MS", "0");
            let cfg = BananaConfig::load(None)?;
            assert_eq!(cfg.poll_config(), Err(ConfigError::ZeroInterval));
            Ok(())
        });
    }
}
