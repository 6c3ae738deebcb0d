//! Accumulators: write-only finding sinks.
//!
//! Evaluators never deduplicate and never read back; an accumulator shared
//! between evaluators must serialize `accept` internally.

use std::sync::Mutex;

use crate::errors::{ValidationError, ValidationResult};

use super::Finding;

/// Write-only sink for findings.
pub trait FindingAccumulator: Send + Sync {
    /// Accept one finding. Bounded implementations reject on overflow.
    fn accept(&self, finding: Finding) -> ValidationResult<()>;
}

/// Buffering accumulator with read-back, optionally bounded.
pub struct InMemoryAccumulator {
    buffer: Mutex<Vec<Finding>>,
    capacity: Option<usize>,
}

impl InMemoryAccumulator {
    /// Unbounded accumulator.
    pub fn new() -> Self {
        Self {
            buffer: Mutex::new(Vec::new()),
            capacity: None,
        }
    }

    /// Accumulator that rejects findings beyond `capacity`.
    pub fn bounded(capacity: usize) -> Self {
        Self {
            buffer: Mutex::new(Vec::new()),
            capacity: Some(capacity),
        }
    }

    /// Snapshot of everything accepted so far, in acceptance order.
    pub fn findings(&self) -> Vec<Finding> {
        self.buffer.lock().map(|b| b.clone()).unwrap_or_default()
    }

    /// Number of findings accepted so far.
    pub fn len(&self) -> usize {
        self.buffer.lock().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take all buffered findings, leaving the accumulator empty.
    pub fn drain(&self) -> Vec<Finding> {
        self.buffer
            .lock()
            .map(|mut b| std::mem::take(&mut *b))
            .unwrap_or_default()
    }
}

impl Default for InMemoryAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl FindingAccumulator for InMemoryAccumulator {
    fn accept(&self, finding: Finding) -> ValidationResult<()> {
        let mut buffer = self
            .buffer
            .lock()
            .map_err(|_| ValidationError::AccumulatorPoisoned)?;
        if let Some(capacity) = self.capacity {
            if buffer.len() >= capacity {
                return Err(ValidationError::AccumulatorOverflow { capacity });
            }
        }
        buffer.push(finding);
        Ok(())
    }
}
