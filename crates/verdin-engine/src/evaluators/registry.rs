//! EvaluatorRegistry: holds the stateful evaluators for one archive pass
//! and fans records, finalization, and close out to them.

use std::panic::{catch_unwind, AssertUnwindSafe};

use verdin_core::errors::ValidationResult;
use verdin_core::findings::{Finding, FindingAccumulator, FindingKind, Severity};
use verdin_core::traits::{FinalizeStage, StatefulEvaluator};
use verdin_core::types::record::Record;
use verdin_core::types::row_type::EvaluationContext;

/// Registry of stateful evaluators. The evaluator set is closed and
/// assembled at build time; there is no dynamic discovery.
pub struct EvaluatorRegistry {
    evaluators: Vec<Box<dyn StatefulEvaluator>>,
}

impl EvaluatorRegistry {
    pub fn new() -> Self {
        Self {
            evaluators: Vec::new(),
        }
    }

    /// Register an evaluator. Producers and consumers may be registered in
    /// any order; finalization is staged, producers first.
    pub fn register(&mut self, evaluator: Box<dyn StatefulEvaluator>) {
        self.evaluators.push(evaluator);
    }

    pub fn count(&self) -> usize {
        self.evaluators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.evaluators.is_empty()
    }

    /// Offer one record to every evaluator, forwarding any immediate
    /// findings. Returns how many findings were forwarded.
    pub fn handle_record(
        &mut self,
        record: &dyn Record,
        context: EvaluationContext,
        accumulator: &dyn FindingAccumulator,
    ) -> ValidationResult<u64> {
        let mut forwarded = 0;
        for evaluator in &mut self.evaluators {
            if let Some(finding) = evaluator.handle_record(record, context) {
                accumulator.accept(finding)?;
                forwarded += 1;
            }
        }
        Ok(forwarded)
    }

    /// Finalize every evaluator in topological order: producers publish
    /// their reference indexes before any consumer reads them. A failing or
    /// panicking evaluator does not stop its siblings. Returns how many
    /// evaluators failed.
    pub fn finalize_all(&mut self, accumulator: &dyn FindingAccumulator) -> usize {
        let mut failed = 0;
        for stage in [FinalizeStage::Produce, FinalizeStage::Consume] {
            for evaluator in &mut self.evaluators {
                if evaluator.stage() != stage {
                    continue;
                }
                let key = evaluator.key();
                let context = evaluator.context();
                let outcome = catch_unwind(AssertUnwindSafe(|| evaluator.finalize(accumulator)));
                match outcome {
                    Ok(Ok(())) => {}
                    Ok(Err(error)) => {
                        failed += 1;
                        tracing::error!(evaluator = key, %error, "finalization failed");
                    }
                    Err(_) => {
                        failed += 1;
                        tracing::error!(evaluator = key, "evaluator panicked during finalization");
                        let _ = accumulator.accept(Finding::new(
                            "",
                            key,
                            context,
                            None,
                            FindingKind::EvaluationFailure,
                            Severity::Error,
                            format!("evaluation of {key} panicked"),
                        ));
                    }
                }
            }
        }
        failed
    }

    /// Close every evaluator, deleting temp files, whether or not
    /// finalization ran. Returns how many closes failed.
    pub fn close_all(&mut self) -> usize {
        let mut failed = 0;
        for evaluator in &mut self.evaluators {
            if let Err(error) = evaluator.close() {
                failed += 1;
                tracing::warn!(evaluator = evaluator.key(), %error, "close failed");
            }
        }
        failed
    }
}

impl Default for EvaluatorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
