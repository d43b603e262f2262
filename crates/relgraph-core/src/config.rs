//! Configuration schema (relgraph.toml)

use crate::ids::{IdGenerator, SequentialIdGenerator};
use crate::naming::{NameMatching, SharedNameComparer};
use serde::{Deserialize, Serialize};

/// Direction of a dependency ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderDirection {
    /// Referenced (parent) tables first - insert order
    LeastDependentFirst,

    /// Referencing (child) tables first - delete order
    MostDependentFirst,
}

impl Default for OrderDirection {
    fn default() -> Self {
        Self::LeastDependentFirst
    }
}

impl std::fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LeastDependentFirst => write!(f, "least-dependent-first"),
            Self::MostDependentFirst => write!(f, "most-dependent-first"),
        }
    }
}

impl std::str::FromStr for OrderDirection {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "least-dependent-first" | "least" | "insert" => Ok(Self::LeastDependentFirst),
            "most-dependent-first" | "most" | "delete" => Ok(Self::MostDependentFirst),
            other => Err(ConfigError::ParseError(format!("unknown order direction '{}'", other))),
        }
    }
}

/// Name matching section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Compare names case-sensitively
    pub case_sensitive: bool,

    /// Trim surrounding whitespace before comparing
    pub trim_whitespace: bool,
}

impl Default for NamingConfig {
    fn default() -> Self {
        let matching = NameMatching::default();
        Self {
            case_sensitive: matching.case_sensitive,
            trim_whitespace: matching.trim_whitespace,
        }
    }
}

/// Unique id section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdConfig {
    /// Assign unique ids to constraint columns as they are added
    pub enabled: bool,

    /// First id handed out
    pub start: u64,
}

impl Default for IdConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            start: 1,
        }
    }
}

/// Ordering section
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderingConfig {
    /// Default direction for sorted table lists
    pub direction: OrderDirection,
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Schema assumed for declarations that do not name one
    #[serde(default = "default_schema")]
    pub default_schema: String,

    /// Name matching policy
    #[serde(default)]
    pub naming: NamingConfig,

    /// Unique id allocation
    #[serde(default)]
    pub ids: IdConfig,

    /// Dependency ordering
    #[serde(default)]
    pub ordering: OrderingConfig,
}

fn default_schema() -> String {
    "public".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_schema: default_schema(),
            naming: NamingConfig::default(),
            ids: IdConfig::default(),
            ordering: OrderingConfig::default(),
        }
    }
}

impl Config {
    /// Load config from TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Self::from_toml(&contents)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml)
            .map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save config to TOML file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(path, toml)
            .map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Matching policy described by the `[naming]` section
    pub fn name_matching(&self) -> NameMatching {
        NameMatching {
            case_sensitive: self.naming.case_sensitive,
            trim_whitespace: self.naming.trim_whitespace,
        }
    }

    /// Shared name comparer for collections and graphs
    pub fn name_comparer(&self) -> SharedNameComparer {
        self.name_matching().shared()
    }

    /// Id generator, or `None` when id assignment is disabled
    pub fn id_generator(&self) -> Option<Box<dyn IdGenerator>> {
        if self.ids.enabled {
            Some(Box::new(SequentialIdGenerator::starting_at(self.ids.start)))
        } else {
            None
        }
    }
}

/// Config error types
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Missing collaborator: {0}")]
    MissingCollaborator(String),

    #[error("Conflicting strategy: {0}")]
    ConflictingStrategy(String),
}
