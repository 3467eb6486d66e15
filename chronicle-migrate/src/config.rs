//! Merge configuration and statement delimiter resolution.

use serde::{Deserialize, Serialize};

/// Default changelog table name.
pub const DEFAULT_CHANGELOG_TABLE: &str = "CHANGELOG";

/// Default statement delimiter.
pub const DEFAULT_DELIMITER: &str = ";";

/// Settings for merged script generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Name of the bookkeeping table.
    #[serde(rename = "changelog")]
    pub changelog_table: String,
    /// Statement terminator appended to generated statements.
    pub delimiter: String,
    /// Put the delimiter on a line of its own.
    pub full_line_delimiter: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            changelog_table: DEFAULT_CHANGELOG_TABLE.to_string(),
            delimiter: DEFAULT_DELIMITER.to_string(),
            full_line_delimiter: false,
        }
    }
}

impl MergeConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the changelog table name.
    pub fn changelog_table(mut self, table: impl Into<String>) -> Self {
        self.changelog_table = table.into();
        self
    }

    /// Set the statement delimiter.
    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Set whether the delimiter goes on its own line.
    pub fn full_line_delimiter(mut self, full_line: bool) -> Self {
        self.full_line_delimiter = full_line;
        self
    }

    /// The terminator written after each generated statement.
    ///
    /// A newline precedes the configured delimiter when `full_line_delimiter`
    /// is set. The delimiter itself is used verbatim.
    pub fn resolved_delimiter(&self) -> String {
        let mut resolved = String::with_capacity(self.delimiter.len() + 1);
        if self.full_line_delimiter {
            resolved.push('\n');
        }
        resolved.push_str(&self.delimiter);
        resolved
    }
}
