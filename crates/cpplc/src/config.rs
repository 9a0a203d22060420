//! Compiler configuration
//!
//! Options are read from a TOML file (an explicit path, or `cppl.toml` in the
//! working directory when present) and then overridden by environment
//! variables from [`crate::env`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "cppl.toml";

/// What to do after an item fails to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorMode {
    /// Stop at the first failing item.
    Abort,
    /// Skip the failing item and keep building the rest.
    #[default]
    Collect,
}

impl std::str::FromStr for ErrorMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "abort" => Ok(ErrorMode::Abort),
            "collect" => Ok(ErrorMode::Collect),
            other => Err(ConfigError::Invalid {
                key: "error_mode".to_string(),
                value: other.to_string(),
                expected: "`abort` or `collect`",
            }),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("I/O error for config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value '{value}' for `{key}`, expected {expected}")]
    Invalid {
        key: String,
        value: String,
        expected: &'static str,
    },
}

/// Options that shape a single compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Name of the emitted IR module.
    pub module_name: String,
    /// Pointer width of the target in bits; also the width of string lengths.
    pub pointer_width: u32,
    pub error_mode: ErrorMode,
    /// Verify each function right after its body is lowered.
    pub verify_each_function: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            module_name: "cppl_module".to_string(),
            pointer_width: 64,
            error_mode: ErrorMode::Collect,
            verify_each_function: true,
        }
    }
}

impl CompilerConfig {
    /// Load configuration from `path` (or `./cppl.toml` if it exists), then
    /// apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => {
                let default_path = Path::new(CONFIG_FILE_NAME);
                if default_path.exists() {
                    Self::load_from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Some(name) = crate::env::get_module_name() {
            self.module_name = name;
        }
        if let Some(width) = crate::env::get_pointer_width() {
            self.pointer_width = width.parse().map_err(|_| ConfigError::Invalid {
                key: "pointer_width".to_string(),
                value: width.clone(),
                expected: "32 or 64",
            })?;
        }
        if let Some(mode) = crate::env::get_error_mode() {
            self.error_mode = mode.parse()?;
        }
        if let Some(verify) = crate::env::get_verify() {
            self.verify_each_function = verify;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.pointer_width, 32 | 64) {
            return Err(ConfigError::Invalid {
                key: "pointer_width".to_string(),
                value: self.pointer_width.to_string(),
                expected: "32 or 64",
            });
        }
        if self.module_name.is_empty() {
            return Err(ConfigError::Invalid {
                key: "module_name".to_string(),
                value: String::new(),
                expected: "a non-empty name",
            });
        }
        Ok(())
    }
}
