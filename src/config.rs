//! Optional configuration file supplying client defaults.
//!
//! The file is a flat list of `key = value` lines; `#` starts a comment
//! outside quoted strings. Supported keys:
//!
//! ```text
//! connect_timeout_secs = 30
//! read_timeout_secs = 300
//! user_agent = "my-tool/1.0"
//! verbosity = "quiet"   # default | verbose | quiet | debug
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::download::ClientConfig;

const TIMEOUT_RANGE_SECS: std::ops::RangeInclusive<u64> = 1..=3600;

/// Errors raised while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A line is not of the form `key = value`.
    #[error("invalid config syntax on line {line}: expected key = value")]
    Syntax { line: usize },

    /// A known key carries a value it cannot take.
    #[error("invalid `{key}` value on line {line}: {reason}")]
    InvalidValue {
        key: &'static str,
        line: usize,
        reason: String,
    },

    #[error("unknown configuration key '{key}' on line {line}")]
    UnknownKey { key: String, line: usize },
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

impl VerbositySetting {
    /// Returns the stable string label for display output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Verbose => "verbose",
            Self::Quiet => "quiet",
            Self::Debug => "debug",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "default" => Some(Self::Default),
            "verbose" => Some(Self::Verbose),
            "quiet" => Some(Self::Quiet),
            "debug" => Some(Self::Debug),
            _ => None,
        }
    }
}

/// Values read from the configuration file. Absent keys stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Connect timeout in seconds (1..=3600).
    pub connect_timeout_secs: Option<u64>,
    /// Idle read timeout in seconds (1..=3600).
    pub read_timeout_secs: Option<u64>,
    /// User-Agent override.
    pub user_agent: Option<String>,
    /// Default verbosity mode.
    pub verbosity: Option<VerbositySetting>,
}

impl FileConfig {
    /// Overlays the values present in the file onto `config`.
    pub fn apply_to(&self, config: &mut ClientConfig) {
        if let Some(secs) = self.connect_timeout_secs {
            config.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.read_timeout_secs {
            config.read_timeout = Duration::from_secs(secs);
        }
        if let Some(user_agent) = &self.user_agent {
            config.user_agent.clone_from(user_agent);
        }
    }
}

impl std::str::FromStr for FileConfig {
    type Err = ConfigError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let mut cfg = Self::default();
        for (index, raw_line) in raw.lines().enumerate() {
            let line = index + 1;
            let content = strip_inline_comment(raw_line).trim();
            if content.is_empty() {
                continue;
            }

            let Some((raw_key, raw_value)) = content.split_once('=') else {
                return Err(ConfigError::Syntax { line });
            };
            let value = raw_value.trim();

            match raw_key.trim() {
                "connect_timeout_secs" => {
                    cfg.connect_timeout_secs =
                        Some(parse_timeout_secs("connect_timeout_secs", value, line)?);
                }
                "read_timeout_secs" => {
                    cfg.read_timeout_secs =
                        Some(parse_timeout_secs("read_timeout_secs", value, line)?);
                }
                "user_agent" => {
                    let parsed = parse_string_literal("user_agent", value, line)?;
                    if parsed.trim().is_empty() {
                        return Err(invalid("user_agent", line, "must not be empty"));
                    }
                    cfg.user_agent = Some(parsed);
                }
                "verbosity" => {
                    let parsed = parse_string_literal("verbosity", value, line)?;
                    let Some(verbosity) = VerbositySetting::parse(&parsed) else {
                        return Err(invalid(
                            "verbosity",
                            line,
                            format!("'{parsed}' is not one of default, verbose, quiet, debug"),
                        ));
                    };
                    cfg.verbosity = Some(verbosity);
                }
                unknown => {
                    return Err(ConfigError::UnknownKey {
                        key: unknown.to_string(),
                        line,
                    });
                }
            }
        }
        Ok(cfg)
    }
}

fn invalid(key: &'static str, line: usize, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        line,
        reason: reason.into(),
    }
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(key: &'static str, raw_value: &str, line: usize) -> Result<String, ConfigError> {
    raw_value
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .map(str::to_string)
        .ok_or_else(|| invalid(key, line, "expected double-quoted string"))
}

fn parse_timeout_secs(key: &'static str, raw_value: &str, line: usize) -> Result<u64, ConfigError> {
    let value = raw_value
        .parse::<u64>()
        .map_err(|e| invalid(key, line, e.to_string()))?;
    if !TIMEOUT_RANGE_SECS.contains(&value) {
        return Err(invalid(
            key,
            line,
            format!("{value} outside expected range 1..=3600"),
        ));
    }
    Ok(value)
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists.
    pub config: Option<FileConfig>,
}

impl LoadedConfig {
    #[must_use]
    pub fn loaded_from_file(&self) -> bool {
        self.config.is_some()
    }
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/fetchfile/config.toml`
/// 2. `$HOME/.config/fetchfile/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("fetchfile")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("fetchfile")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from the default path if a file is present there.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file exists but cannot be read or parsed.
pub fn load_default_file_config() -> Result<LoadedConfig, ConfigError> {
    let path = resolve_default_config_path();
    let config = match path.as_deref() {
        Some(path_ref) if path_ref.exists() => Some(load_config_file(path_ref)?),
        _ => None,
    };
    Ok(LoadedConfig { path, config })
}

/// Reads and parses one config file.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file cannot be read or parsed.
pub fn load_config_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    raw.parse()
}
