//! Tuning knobs for the spill/sort machinery.

use serde::{Deserialize, Serialize};

/// Configuration for the external sort.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SortConfig {
    /// Maximum lines held in memory per sorted run. Default: 50_000.
    pub chunk_size: Option<usize>,
}

impl SortConfig {
    pub fn effective_chunk_size(&self) -> usize {
        // A chunk below 2 lines would degenerate into one run per line.
        self.chunk_size.unwrap_or(50_000).max(2)
    }
}

/// Configuration for the value recorder.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RecorderConfig {
    /// Buffered values before a spill to disk. Default: 1000.
    pub capacity: Option<usize>,
}

impl RecorderConfig {
    pub fn effective_capacity(&self) -> usize {
        self.capacity.unwrap_or(1000).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        assert_eq!(SortConfig::default().effective_chunk_size(), 50_000);
        assert_eq!(RecorderConfig::default().effective_capacity(), 1000);
    }

    #[test]
    fn degenerate_values_are_clamped() {
        let sort = SortConfig { chunk_size: Some(0) };
        assert_eq!(sort.effective_chunk_size(), 2);
        let recorder = RecorderConfig { capacity: Some(0) };
        assert_eq!(recorder.effective_capacity(), 1);
    }
}
