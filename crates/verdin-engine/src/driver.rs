//! Single-pass evaluation driver.
//!
//! The embedder pumps each stream of the archive through the registry
//! (core stream and extensions, each under its own context), then calls
//! `finish` exactly once: finalize fan-out in topological order, close-all,
//! stats.

use serde::Serialize;
use verdin_core::errors::ValidationResult;
use verdin_core::findings::FindingAccumulator;
use verdin_core::types::record::RecordSource;
use verdin_core::types::row_type::EvaluationContext;

use crate::evaluators::registry::EvaluatorRegistry;

/// Counters for one archive pass.
#[derive(Debug, Default, Clone, Serialize)]
pub struct RunStats {
    pub records_seen: u64,
    /// Findings returned directly from `handle_record` (stateless rules).
    pub immediate_findings: u64,
    pub evaluators_failed: usize,
    pub closes_failed: usize,
}

/// Drives one pass over an archive's record streams.
pub struct EvaluationDriver {
    registry: EvaluatorRegistry,
    stats: RunStats,
}

impl EvaluationDriver {
    pub fn new(registry: EvaluatorRegistry) -> Self {
        Self {
            registry,
            stats: RunStats::default(),
        }
    }

    /// Feed every record of one stream to the registry under `context`.
    /// Call once per stream; a record source error aborts the pass, after
    /// which `finish` must still run so temp files are deleted.
    pub fn pump<S: RecordSource>(
        &mut self,
        source: &mut S,
        context: EvaluationContext,
        accumulator: &dyn FindingAccumulator,
    ) -> ValidationResult<()> {
        while let Some(record) = source.next_record()? {
            self.stats.records_seen += 1;
            self.stats.immediate_findings +=
                self.registry
                    .handle_record(&record, context, accumulator)?;
        }
        Ok(())
    }

    /// End-of-stream: finalize producers then consumers, close everything,
    /// and return the stats. Findings land in the accumulator.
    pub fn finish(mut self, accumulator: &dyn FindingAccumulator) -> RunStats {
        self.stats.evaluators_failed = self.registry.finalize_all(accumulator);
        self.stats.closes_failed = self.registry.close_all();
        self.stats
    }

    /// Abandon the pass without finalizing: close everything and delete
    /// temp files. Used on cancellation.
    pub fn abort(mut self) -> RunStats {
        self.stats.closes_failed = self.registry.close_all();
        self.stats
    }
}
