// Configuration loading
// Looked up in: --config path, ./qbank.toml, ~/.config/qbank/config.toml

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

pub const LOCAL_FILE: &str = "qbank.toml";

#[derive(Debug)]
pub enum ConfigError {
    /// The file exists (or was named explicitly) but could not be read.
    Read { path: PathBuf, message: String },
    /// The file is not valid TOML for the schema.
    Parse { path: PathBuf, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, message } => {
                write!(f, "cannot read config {}: {message}", path.display())
            }
            Self::Parse { path, message } => {
                write!(f, "invalid config {}: {message}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// File names of the bank stages. Relative names resolve against `data_dir`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub data_dir: PathBuf,
    pub input: PathBuf,
    pub backup: PathBuf,
    pub cleaned: PathBuf,
    pub answered: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("src/data"),
            input: PathBuf::from("all-questions.csv"),
            backup: PathBuf::from("all-questions.backup.csv"),
            cleaned: PathBuf::from("all-questions.cleaned.csv"),
            answered: PathBuf::from("all-questions.answered.csv"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BankConfig {
    pub paths: PathsConfig,
    /// Where the configuration came from; `None` for built-in defaults
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

/// Concrete file locations after resolving against the data directory.
#[derive(Debug, Clone, PartialEq)]
pub struct BankPaths {
    pub input: PathBuf,
    pub backup: PathBuf,
    pub cleaned: PathBuf,
    pub answered: PathBuf,
}

impl BankConfig {
    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// User-level config file path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("qbank").join("config.toml"))
    }

    /// Load using the standard lookup order relative to the current directory.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let local = PathBuf::from(LOCAL_FILE);
        Self::load_from(explicit, &[Some(local), Self::user_config_path()])
    }

    /// An explicit path must exist; the first existing candidate is used
    /// otherwise, and defaults apply when none exists.
    pub fn load_from(
        explicit: Option<&Path>,
        candidates: &[Option<PathBuf>],
    ) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::read_file(path);
        }
        for path in candidates.iter().flatten() {
            if path.is_file() {
                return Self::read_file(path);
            }
        }
        debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let mut config = Self::from_toml(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })?;
        debug!("loaded config from {}", path.display());
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Resolve stage files. `data_dir` overrides the configured directory.
    pub fn resolve(&self, data_dir: Option<&Path>) -> BankPaths {
        let base = data_dir.unwrap_or(self.paths.data_dir.as_path());
        BankPaths {
            input: base.join(&self.paths.input),
            backup: base.join(&self.paths.backup),
            cleaned: base.join(&self.paths.cleaned),
            answered: base.join(&self.paths.answered),
        }
    }
}
