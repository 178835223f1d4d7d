use crate::policy::RetryPolicy;
use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

#[derive(Clone, Copy, Debug)]
pub enum ConfigReadOption {
    FromLocalFile,
    FromXdgConfigDir,
}

impl ConfigReadOption {
    pub fn path(self) -> Result<String> {
        match self {
            ConfigReadOption::FromLocalFile => Ok("retry.toml".to_string()),
            ConfigReadOption::FromXdgConfigDir => {
                let home = std::env::var("HOME").context("no $HOME")?;
                Ok(format!("{home}/.config/linear-retry/retry.toml"))
            }
        }
    }
}

/// The numeric part of a [`RetryPolicy`], loadable from TOML.
///
/// ```toml
/// max_retries = 3
/// initial_delay_ms = 1000
/// delay_step_ms = 1000
/// ```
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub delay_step_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_delay_ms: 0,
            delay_step_ms: 0,
        }
    }
}

impl RetryConfig {
    pub fn read(option: ConfigReadOption) -> Result<Self> {
        Self::read_from(option.path()?)
    }

    pub fn read_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("in {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("invalid config format")
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn delay_step(&self) -> Duration {
        Duration::from_millis(self.delay_step_ms)
    }
}

impl<E> From<&RetryConfig> for RetryPolicy<E> {
    fn from(config: &RetryConfig) -> Self {
        RetryPolicy::new()
            .max_retries(config.max_retries)
            .initial_delay(config.initial_delay())
            .delay_step(config.delay_step())
    }
}
