//! Row-types and the stream context discriminator.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Qualified identifier of the stream a record belongs to, e.g.
/// `http://rs.tdwg.org/dwc/terms/Taxon`. Comparison is case-insensitive;
/// the original spelling is preserved for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowType(String);

impl RowType {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for RowType {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for RowType {}

impl Hash for RowType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.0.bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
    }
}

impl fmt::Display for RowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowType {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Distinguishes the archive's core stream from its extension streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvaluationContext {
    Core,
    Ext,
}

impl EvaluationContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Core => "CORE",
            Self::Ext => "EXT",
        }
    }
}

impl fmt::Display for EvaluationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
