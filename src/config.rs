//! Configuration file support and lenient value parsing.
//!
//! Settings can come from a JSON file and from the command line. The delay
//! and tab width are kept as the raw strings the user typed; [`Config::resolve`]
//! turns them into numbers and falls back to documented defaults when they do
//! not parse.

use crate::dispatcher::DEFAULT_TICK_INTERVAL;
use crate::error::{Result, TyperError};
use crate::normalizer::{TabPolicy, DEFAULT_TAB_WIDTH, MAX_TAB_WIDTH};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fs;
use std::time::Duration;
use tracing::warn;

/// Seconds to wait before typing when the configured delay is unusable.
pub const DEFAULT_DELAY_SECS: f64 = 5.0;

/// How tabs are handled, as written in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabMode {
    #[default]
    Replace,
    Remove,
}

/// On-disk configuration.
///
/// ```json
/// {
///   "delay": "5",
///   "tab_mode": "replace",
///   "tab_width": "4",
///   "tick_interval": "10ms",
///   "stop_hotkey": "ctrl+alt+s"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Seconds before the first keystroke, as entered.
    #[serde(default = "default_delay")]
    pub delay: String,

    #[serde(default)]
    pub tab_mode: TabMode,

    /// Spaces per tab, as entered. Only used with [`TabMode::Replace`].
    #[serde(default = "default_tab_width")]
    pub tab_width: String,

    #[serde(
        default = "default_tick_interval",
        serialize_with = "serialize_duration",
        deserialize_with = "deserialize_duration"
    )]
    pub tick_interval: Duration,

    #[serde(default = "default_stop_hotkey")]
    pub stop_hotkey: String,

    #[serde(default = "default_true")]
    pub enable_stop_hotkey: bool,

    #[serde(default)]
    pub verbose: bool,
}

/// Settings resolved into the values the typing pipeline consumes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypingSettings {
    pub initial_delay: Duration,
    pub tab_policy: TabPolicy,
    pub tick_interval: Duration,
}

fn default_delay() -> String {
    "5".to_string()
}

fn default_tab_width() -> String {
    DEFAULT_TAB_WIDTH.to_string()
}

fn default_tick_interval() -> Duration {
    DEFAULT_TICK_INTERVAL
}

fn default_stop_hotkey() -> String {
    "ctrl+alt+s".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            delay: default_delay(),
            tab_mode: TabMode::default(),
            tab_width: default_tab_width(),
            tick_interval: default_tick_interval(),
            stop_hotkey: default_stop_hotkey(),
            enable_stop_hotkey: true,
            verbose: false,
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|e| TyperError::config_load(path, e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| TyperError::config_load(path, e.to_string()))
    }

    pub fn save_to_file(&self, path: &str) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| TyperError::config_save(path, e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_interval.is_zero() {
            return Err(TyperError::config_validation(
                "tick_interval must be greater than zero",
            ));
        }

        if self.enable_stop_hotkey && self.stop_hotkey.trim().is_empty() {
            return Err(TyperError::config_validation(
                "stop_hotkey cannot be empty while the stop hotkey is enabled",
            ));
        }

        Ok(())
    }

    pub fn tab_policy(&self) -> TabPolicy {
        match self.tab_mode {
            TabMode::Replace => TabPolicy::ReplaceWithSpaces(tab_width_or_default(&self.tab_width)),
            TabMode::Remove => TabPolicy::RemoveTabs,
        }
    }

    pub fn resolve(&self) -> TypingSettings {
        TypingSettings {
            initial_delay: delay_or_default(&self.delay),
            tab_policy: self.tab_policy(),
            tick_interval: self.tick_interval,
        }
    }
}

/// Parse a delay in (possibly fractional) seconds.
pub fn parse_delay(value: &str) -> Result<Duration> {
    let secs: f64 = value
        .trim()
        .parse()
        .map_err(|_| TyperError::parse("delay", value, "expected a number of seconds"))?;

    Duration::try_from_secs_f64(secs)
        .map_err(|_| TyperError::parse("delay", value, "must be a finite, non-negative number"))
}

/// Parse a tab width between 1 and [`MAX_TAB_WIDTH`].
pub fn parse_tab_width(value: &str) -> Result<usize> {
    match value.trim().parse::<usize>() {
        Ok(0) => Err(TyperError::parse("tab width", value, "must be at least 1")),
        Ok(width) if width > MAX_TAB_WIDTH => Err(TyperError::parse(
            "tab width",
            value,
            format!("must be at most {MAX_TAB_WIDTH}"),
        )),
        Ok(width) => Ok(width),
        Err(_) => Err(TyperError::parse(
            "tab width",
            value,
            "expected a positive whole number",
        )),
    }
}

/// [`parse_delay`], substituting [`DEFAULT_DELAY_SECS`] on failure.
pub fn delay_or_default(value: &str) -> Duration {
    parse_delay(value).unwrap_or_else(|e| {
        warn!(error = %e, default_secs = DEFAULT_DELAY_SECS, "Using default delay");
        Duration::from_secs_f64(DEFAULT_DELAY_SECS)
    })
}

/// [`parse_tab_width`], substituting [`DEFAULT_TAB_WIDTH`] on failure.
pub fn tab_width_or_default(value: &str) -> usize {
    parse_tab_width(value).unwrap_or_else(|e| {
        warn!(error = %e, default = DEFAULT_TAB_WIDTH, "Using default tab width");
        DEFAULT_TAB_WIDTH
    })
}

/// Parse a duration such as `10ms`, `2s` or `1m`. A bare number is
/// milliseconds; case and surrounding whitespace are ignored.
pub fn parse_duration(value: &str) -> Result<Duration> {
    let normalized = value.trim().to_lowercase();
    if normalized.is_empty() {
        return Err(TyperError::invalid_duration(value, "empty duration"));
    }

    let (number, unit_ms) = if let Some(n) = normalized.strip_suffix("ms") {
        (n, 1)
    } else if let Some(n) = normalized.strip_suffix('s') {
        (n, 1_000)
    } else if let Some(n) = normalized.strip_suffix('m') {
        (n, 60_000)
    } else {
        (normalized.as_str(), 1)
    };

    let amount: u64 = number.trim().parse().map_err(|_| {
        TyperError::invalid_duration(value, "expected a non-negative whole number with ms, s or m")
    })?;

    amount
        .checked_mul(unit_ms)
        .map(Duration::from_millis)
        .ok_or_else(|| TyperError::invalid_duration(value, "duration is too large"))
}

fn format_duration(duration: &Duration) -> String {
    format!("{}ms", duration.as_millis())
}

fn serialize_duration<S>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_duration(duration))
}

fn deserialize_duration<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    parse_duration(&value).map_err(serde::de::Error::custom)
}
