//! Application configuration: defaults, then an optional YAML file, then
//! environment overrides.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dosage_engine::{parse_duration, DayWindowConfig};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub schedule: DayWindowConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub format: LogFormat,
    /// Also append events to this file.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Text,
            file: None,
        }
    }
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

impl AppConfig {
    /// Load `.env`, read `path` if given, apply environment overrides and
    /// validate the day window.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut cfg = match path {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("failed to read config file {}", path.display()))?;
                Self::from_yaml(&raw)
                    .with_context(|| format!("failed to parse config file {}", path.display()))?
            }
            None => Self::default(),
        };

        cfg.apply_env()?;
        cfg.schedule.validate()?;
        Ok(cfg)
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        // an empty file is a valid, all-default config
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Some(v) = env_opt("BEGIN_DAY_HOUR") {
            self.schedule.begin_day_hour = v
                .parse()
                .with_context(|| format!("BEGIN_DAY_HOUR: invalid hour '{v}'"))?;
        }
        if let Some(v) = env_opt("END_DAY_HOUR") {
            self.schedule.end_day_hour = v
                .parse()
                .with_context(|| format!("END_DAY_HOUR: invalid hour '{v}'"))?;
        }
        if let Some(v) = env_opt("TIME_ROUND") {
            self.schedule.time_round = parse_duration(&v).context("TIME_ROUND")?;
        }
        if let Some(v) = env_opt("NEXT_TAKING_PERIOD") {
            self.schedule.next_taking_period = parse_duration(&v).context("NEXT_TAKING_PERIOD")?;
        }
        if let Some(v) = env_opt("LOG_LEVEL") {
            self.log.level = v;
        }
        if let Some(v) = env_opt("LOG_FILE") {
            self.log.file = Some(PathBuf::from(v));
        }
        if let Some(v) = env_opt("LOG_FORMAT") {
            self.log.format = match v.to_lowercase().as_str() {
                "json" => LogFormat::Json,
                "text" => LogFormat::Text,
                other => anyhow::bail!("LOG_FORMAT: expected 'text' or 'json', got '{other}'"),
            };
        }
        Ok(())
    }

    pub fn log_summary(&self) {
        tracing::debug!(
            begin_day_hour = self.schedule.begin_day_hour,
            end_day_hour = self.schedule.end_day_hour,
            time_round = %dosage_engine::format_duration(self.schedule.time_round),
            next_taking_period = %dosage_engine::format_duration(self.schedule.next_taking_period),
            "config loaded"
        );
    }
}
