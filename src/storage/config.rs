use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

const DEFAULT_DOUBLE_CLICK_INTERVAL_SECS: f64 = 2.5;
const DEFAULT_PLAYABILITY_TIMEOUT_MS: u64 = 3_000;

#[derive(Debug, Clone, PartialEq)]
pub struct PandoraConfig {
    pub double_click_interval: f64,
}

impl PandoraConfig {
    pub fn double_click_interval(&self) -> Result<Duration> {
        let interval = self.double_click_interval;
        if !interval.is_finite() || interval <= 0.0 {
            return Err(anyhow!(
                "invalid double_click_interval '{interval}' (expected a positive number of seconds)"
            ));
        }
        Duration::try_from_secs_f64(interval)
            .map_err(|err| anyhow!("invalid double_click_interval '{interval}': {err}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayabilityConfig {
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeConfig {
    pub pandora: PandoraConfig,
    pub playability: PlayabilityConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            pandora: PandoraConfig {
                double_click_interval: DEFAULT_DOUBLE_CLICK_INTERVAL_SECS,
            },
            playability: PlayabilityConfig {
                timeout_ms: DEFAULT_PLAYABILITY_TIMEOUT_MS,
            },
        }
    }
}

impl RuntimeConfig {
    pub fn default_path() -> PathBuf {
        env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(".config/pandora-playback/config.toml")
    }

    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::default_path())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let mut config = Self::default();
        config.merge_file(path)?;
        config.merge_env()?;
        config.validate()?;
        Ok(config)
    }

    fn merge_file(&mut self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed reading config file: {}", path.display()))?;
        self.merge_toml_text(&content)
            .with_context(|| format!("failed parsing config TOML: {}", path.display()))
    }

    fn merge_toml_text(&mut self, content: &str) -> Result<()> {
        let mut section = String::new();

        for (idx, raw_line) in content.lines().enumerate() {
            let line = strip_comment(raw_line).trim();
            if line.is_empty() {
                continue;
            }

            if line.starts_with('[') {
                if !line.ends_with(']') {
                    return Err(anyhow!("line {}: invalid section syntax", idx + 1));
                }
                section = line[1..line.len() - 1].trim().to_string();
                continue;
            }

            let (key, value_raw) = line
                .split_once('=')
                .ok_or_else(|| anyhow!("line {}: expected key=value", idx + 1))?;
            let key = key.trim();
            let value = parse_value(value_raw.trim())
                .with_context(|| format!("line {}: invalid value", idx + 1))?;

            self.apply_file_value(&section, key, value)
                .with_context(|| format!("line {}: invalid {section}.{key}", idx + 1))?;
        }

        Ok(())
    }

    fn apply_file_value(&mut self, section: &str, key: &str, value: TomlValue) -> Result<()> {
        match (section, key) {
            ("pandora", "double_click_interval") => {
                self.pandora.double_click_interval = value.as_f64()?;
            }
            ("playability", "timeout_ms") => {
                self.playability.timeout_ms = value.as_u64()?;
            }
            _ => {}
        }

        Ok(())
    }

    fn merge_env(&mut self) -> Result<()> {
        if let Ok(interval) = env::var("PANDORA_DOUBLE_CLICK_INTERVAL") {
            self.pandora.double_click_interval = interval
                .trim()
                .parse::<f64>()
                .with_context(|| "invalid PANDORA_DOUBLE_CLICK_INTERVAL".to_string())?;
        }
        if let Ok(timeout_ms) = env::var("PANDORA_PLAYABILITY_TIMEOUT_MS") {
            self.playability.timeout_ms = timeout_ms
                .trim()
                .parse::<u64>()
                .with_context(|| "invalid PANDORA_PLAYABILITY_TIMEOUT_MS".to_string())?;
        }

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        self.pandora.double_click_interval()?;
        Ok(())
    }
}

fn strip_comment(line: &str) -> &str {
    let mut in_quotes = false;
    for (idx, ch) in line.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '#' if !in_quotes => return &line[..idx],
            _ => {}
        }
    }
    line
}

#[derive(Debug, Clone)]
enum TomlValue {
    String(String),
    Integer(u64),
    Float(f64),
}

impl TomlValue {
    fn as_u64(&self) -> Result<u64> {
        match self {
            Self::Integer(value) => Ok(*value),
            Self::String(_) | Self::Float(_) => Err(anyhow!("expected integer value")),
        }
    }

    fn as_f64(&self) -> Result<f64> {
        match self {
            Self::Float(value) => Ok(*value),
            Self::Integer(value) => Ok(*value as f64),
            // Mopidy-style configs quote numbers.
            Self::String(value) => value
                .trim()
                .parse::<f64>()
                .map_err(|_| anyhow!("expected numeric value, got '{value}'")),
        }
    }
}

fn parse_value(value: &str) -> Result<TomlValue> {
    let trimmed = value.trim();
    if trimmed.starts_with('"') {
        if !trimmed.ends_with('"') || trimmed.len() < 2 {
            return Err(anyhow!("unterminated string"));
        }
        return Ok(TomlValue::String(trimmed[1..trimmed.len() - 1].to_string()));
    }

    if let Ok(number) = trimmed.parse::<u64>() {
        return Ok(TomlValue::Integer(number));
    }
    if let Ok(number) = trimmed.parse::<f64>() {
        return Ok(TomlValue::Float(number));
    }

    Ok(TomlValue::String(trimmed.to_string()))
}
