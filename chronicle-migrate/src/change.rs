//! Change identifiers and the change value type.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use bigdecimal::num_bigint::Sign;
use bigdecimal::BigDecimal;

use crate::error::{MigrateResult, MigrationError};

/// Arbitrary-precision decimal identifying a change.
///
/// Identifiers are commonly timestamps (`20231215120000`) or sequence numbers,
/// and may carry more digits than fit in a 64-bit integer. Comparison is
/// numeric, so `1.0` and `1` identify the same change.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ChangeId(BigDecimal);

impl ChangeId {
    /// Parse an identifier from its decimal text.
    pub fn parse(text: &str) -> MigrateResult<Self> {
        text.parse()
    }

    /// The identifier that follows this one in a sequence: the integer part plus one.
    pub fn next_in_sequence(&self) -> Self {
        Self(self.0.with_scale(0) + BigDecimal::from(1))
    }

    /// Render in plain decimal notation, never using an exponent.
    pub fn to_plain_string(&self) -> String {
        let (unscaled, scale) = self.0.as_bigint_and_exponent();
        let negative = unscaled.sign() == Sign::Minus;
        let digits = unscaled.magnitude().to_string();

        let mut out = String::with_capacity(digits.len() + 2);
        if negative {
            out.push('-');
        }

        if scale <= 0 {
            out.push_str(&digits);
            if digits != "0" {
                out.extend(std::iter::repeat_n('0', scale.unsigned_abs() as usize));
            }
            return out;
        }

        let scale = scale as usize;
        if digits.len() > scale {
            let (int_part, frac_part) = digits.split_at(digits.len() - scale);
            out.push_str(int_part);
            out.push('.');
            out.push_str(frac_part);
        } else {
            out.push_str("0.");
            out.extend(std::iter::repeat_n('0', scale - digits.len()));
            out.push_str(&digits);
        }
        out
    }
}

impl FromStr for ChangeId {
    type Err = MigrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(MigrationError::invalid_migration("empty change id"));
        }
        BigDecimal::from_str(trimmed)
            .map(Self)
            .map_err(|e| MigrationError::invalid_migration(format!("invalid change id '{}': {}", s, e)))
    }
}

impl From<u64> for ChangeId {
    fn from(value: u64) -> Self {
        Self(BigDecimal::from(value))
    }
}

impl From<BigDecimal> for ChangeId {
    fn from(value: BigDecimal) -> Self {
        Self(value)
    }
}

impl Hash for ChangeId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Normalize so numerically equal ids hash alike.
        self.0.normalized().hash(state);
    }
}

impl fmt::Display for ChangeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_plain_string())
    }
}

/// One versioned migration script, or one row of the changelog.
///
/// Two changes are the same change when their ids are equal; filename,
/// description and `applied_at` never take part in equality or ordering.
#[derive(Debug, Clone)]
pub struct Change {
    /// Version identifier.
    pub id: ChangeId,
    /// Script file name, used for display only.
    pub filename: String,
    /// Free-text description, taken from the file name.
    pub description: String,
    /// When the change was applied; only set for changelog rows.
    pub applied_at: Option<String>,
}

impl Change {
    /// Create a change for a migration script.
    pub fn new(id: ChangeId, filename: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            filename: filename.into(),
            description: description.into(),
            applied_at: None,
        }
    }

    /// Create a change as recorded in the changelog.
    pub fn applied(
        id: ChangeId,
        applied_at: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id,
            filename: String::new(),
            description: description.into(),
            applied_at: Some(applied_at.into()),
        }
    }

    /// Build a change from a script file name of the form `<id>_<description>.sql`.
    pub fn from_filename(filename: &str) -> MigrateResult<Self> {
        let stem = filename.strip_suffix(".sql").ok_or_else(|| {
            MigrationError::invalid_migration(format!("not a .sql script: {}", filename))
        })?;

        let (id, description) = stem.split_once('_').ok_or_else(|| {
            MigrationError::invalid_migration(format!(
                "Invalid migration name format (expected <id>_<description>.sql): {}",
                filename
            ))
        })?;

        Ok(Self::new(id.parse()?, filename, description))
    }

    /// Whether this change has been recorded as applied.
    pub fn is_applied(&self) -> bool {
        self.applied_at.is_some()
    }
}

impl PartialEq for Change {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Change {}

impl PartialOrd for Change {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Change {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Hash for Change {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.id, self.description)
    }
}
