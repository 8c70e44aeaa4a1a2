//! Layered settings: built-in defaults, then an optional file, then
//! `CONFORMANT_*` environment variables.

use std::path::Path;

use config::{Config, Environment, File, Map};
use serde::{Deserialize, Serialize};

use crate::error::{ConformantError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    /// Tracing filter used when `RUST_LOG` is not set.
    pub log: String,
    pub seed: f64,
    pub sides: usize,
    pub final_square: usize,
    /// Turns after which the game is given up.
    pub max_turns: usize,
    pub format: ReportFormat,
}

impl Settings {
    pub const ENV_PREFIX: &'static str = "CONFORMANT";
    pub const DEFAULT_FILE: &'static str = "conformant";

    /// Reads the given file, or `conformant.{toml,json,...}` in the working
    /// directory when no path is given. Only an explicitly given file has to
    /// exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Like [`load`](Self::load), reading `CONFORMANT_*` variables from `env`
    /// instead of the process environment when given.
    pub fn load_with_env(path: Option<&Path>, env: Option<Map<String, String>>) -> Result<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(Self::DEFAULT_FILE).required(false),
        };
        let settings: Settings = Config::builder()
            .set_default("log", "conformant=info")?
            .set_default("seed", 42.0)?
            .set_default("sides", 6_i64)?
            .set_default("final_square", 25_i64)?
            .set_default("max_turns", 1000_i64)?
            .set_default("format", "text")?
            .add_source(file)
            .add_source(
                Environment::with_prefix(Self::ENV_PREFIX)
                    .try_parsing(true)
                    .source(env),
            )
            .build()?
            .try_deserialize()?;
        settings.validate()
    }

    fn validate(self) -> Result<Self> {
        if self.sides == 0 {
            return Err(ConformantError::Config("sides must be at least 1".into()));
        }
        if self.final_square == 0 {
            return Err(ConformantError::Config("final_square must be at least 1".into()));
        }
        if self.max_turns == 0 {
            return Err(ConformantError::Config("max_turns must be at least 1".into()));
        }
        if !self.seed.is_finite() {
            return Err(ConformantError::Config(format!("seed {} is not a finite number", self.seed)));
        }
        Ok(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log: "conformant=info".into(),
            seed: 42.0,
            sides: 6,
            final_square: 25,
            max_turns: 1000,
            format: ReportFormat::Text,
        }
    }
}
