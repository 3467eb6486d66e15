//! CLI configuration handling.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use chronicle_migrate::{IdStrategy, MergeConfig};

use crate::error::{CliError, CliResult};

/// Directory holding the migration scripts (relative to the base path)
pub const SCRIPTS_DIR: &str = "scripts";

/// Directory holding environment files (relative to the base path)
pub const ENVIRONMENTS_DIR: &str = "environments";

/// Default SQLite database used by `init`
pub const DEFAULT_DATABASE_URL: &str = "sqlite:./chronicle.db";

/// Per-environment configuration, read from `environments/<env>.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    /// Changelog table and delimiter settings
    #[serde(flatten)]
    pub merge: MergeConfig,

    /// How `new` numbers scripts
    pub id_strategy: IdStrategy,

    /// Database configuration
    pub database: DatabaseConfig,
}

impl EnvironmentConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: EnvironmentConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> CliResult<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// The configured database URL
    pub fn database_url(&self) -> CliResult<&str> {
        self.database
            .url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| CliError::Config("database.url is not set".to_string()))
    }
}

/// Database configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database connection URL (SQLite path or `sqlite:`/`file:` URL)
    pub url: Option<String>,
}

/// Resolved project paths for one invocation
#[derive(Debug, Clone)]
pub struct Paths {
    base: PathBuf,
    env: String,
}

impl Paths {
    /// Create paths rooted at `base` for environment `env`
    pub fn new(base: impl Into<PathBuf>, env: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            env: env.into(),
        }
    }

    /// Base directory
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// Environment name
    pub fn env(&self) -> &str {
        &self.env
    }

    /// Scripts directory
    pub fn scripts_dir(&self) -> PathBuf {
        self.base.join(SCRIPTS_DIR)
    }

    /// Environments directory
    pub fn environments_dir(&self) -> PathBuf {
        self.base.join(ENVIRONMENTS_DIR)
    }

    /// Environment file for the selected environment
    pub fn environment_file(&self) -> PathBuf {
        self.environments_dir().join(format!("{}.toml", self.env))
    }

    /// Load the selected environment's configuration
    pub fn load_environment(&self) -> CliResult<EnvironmentConfig> {
        let path = self.environment_file();
        if !path.exists() {
            return Err(CliError::Config(format!(
                "Environment file not found: {} (run `chronicle init`)",
                path.display()
            )));
        }
        EnvironmentConfig::load(&path)
    }

    /// Resolve a database URL relative to the base directory
    pub fn resolve_database_url(&self, url: &str) -> String {
        let (prefix, path) = ["sqlite://", "sqlite:", "file:"]
            .iter()
            .find_map(|prefix| url.strip_prefix(prefix).map(|rest| (*prefix, rest)))
            .unwrap_or(("", url));

        if Path::new(path).is_absolute() {
            url.to_string()
        } else {
            format!("{}{}", prefix, self.base.join(path).display())
        }
    }
}
