//! # Configuration State
//!
//! Register configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`BALCAO_*`)
//! 2. Config file (`register.toml`)
//! 3. Defaults (this file)
//!
//! ```toml
//! [store]
//! name = "Pet Shop Central"
//! currency_symbol = "R$"
//! decimal_separator = ","
//!
//! [register]
//! id = "caixa-01"
//! default_operator = "Ana"
//! default_opening_float_cents = 10000
//! ```
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use std::path::{Path, PathBuf};

use balcao_core::Money;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// File name looked up in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "register.toml";

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {var}: '{value}'")]
    InvalidEnv { var: String, value: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Register configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterConfig {
    pub store: StoreConfig,
    pub register: RegisterSection,
}

/// Store identity and currency display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Store name (printed on receipts)
    pub name: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Decimal separator used when rendering amounts
    pub decimal_separator: char,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            name: "Balcão".to_string(),
            currency_symbol: "R$".to_string(),
            decimal_separator: ',',
        }
    }
}

/// This drawer's settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterSection {
    /// Register identifier
    pub id: String,

    /// Operator used when `open` is given none
    pub default_operator: Option<String>,

    /// Opening float used when `open` is given none
    pub default_opening_float_cents: i64,
}

impl Default for RegisterSection {
    fn default() -> Self {
        RegisterSection {
            id: "caixa-01".to_string(),
            default_operator: None,
            default_opening_float_cents: 0,
        }
    }
}

impl RegisterConfig {
    /// Platform config path (`~/.config/balcao/register.toml` on Linux).
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("br", "balcao", "balcao")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Loads defaults → file → environment, then validates.
    ///
    /// An explicit `path` must exist; the default path may be missing.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => {
                    debug!("No config file found, using defaults");
                    RegisterConfig::default()
                }
            },
        };

        config.apply_env_overrides(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Like [`RegisterConfig::load`], but logs a failure and falls back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                warn!(error = %err, "Falling back to default configuration");
                RegisterConfig::default()
            }
        }
    }

    /// Parses a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: RegisterConfig = toml::from_str(&text)?;
        info!(path = %path.display(), "Loaded register config");
        Ok(config)
    }

    /// Applies `BALCAO_*` overrides read through `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup("BALCAO_STORE_NAME") {
            self.store.name = name;
        }
        if let Some(id) = lookup("BALCAO_REGISTER_ID") {
            self.register.id = id;
        }
        if let Some(operator) = lookup("BALCAO_OPERATOR") {
            self.register.default_operator = Some(operator);
        }
        if let Some(value) = lookup("BALCAO_OPENING_FLOAT") {
            let amount = Money::parse(&value).map_err(|_| ConfigError::InvalidEnv {
                var: "BALCAO_OPENING_FLOAT".to_string(),
                value: value.clone(),
            })?;
            self.register.default_opening_float_cents = amount.cents();
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.name.trim().is_empty() {
            return Err(ConfigError::Invalid("store.name is required".to_string()));
        }
        if self.register.id.trim().is_empty() {
            return Err(ConfigError::Invalid("register.id is required".to_string()));
        }
        if self.register.default_opening_float_cents < 0 {
            return Err(ConfigError::Invalid(
                "register.default_opening_float_cents must not be negative".to_string(),
            ));
        }
        if let Some(operator) = &self.register.default_operator {
            if operator.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "register.default_operator must not be blank".to_string(),
                ));
            }
        }
        if self.store.decimal_separator.is_ascii_digit() {
            return Err(ConfigError::Invalid(
                "store.decimal_separator must not be a digit".to_string(),
            ));
        }
        Ok(())
    }

    pub fn default_opening_float(&self) -> Money {
        Money::from_cents(self.register.default_opening_float_cents)
    }

    /// Renders an amount for display, e.g. `R$ 12,50` or `-R$ 5,00`.
    pub fn format_currency(&self, amount: Money) -> String {
        let sign = if amount.is_negative() { "-" } else { "" };
        let abs = amount.abs();
        format!(
            "{}{} {}{}{:02}",
            sign,
            self.store.currency_symbol,
            abs.major(),
            self.store.decimal_separator,
            abs.minor()
        )
    }
}
