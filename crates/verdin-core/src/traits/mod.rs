//! Evaluator dispatch traits.
//!
//! Evaluators split into two capabilities: everything can look at a record
//! and possibly return an immediate finding; stateful evaluators additionally
//! buffer across the whole pass and report at end-of-stream. Drivers branch
//! on capability, not on concrete type.

use serde::{Deserialize, Serialize};

use crate::errors::ValidationResult;
use crate::findings::{Finding, FindingAccumulator};
use crate::types::record::Record;
use crate::types::row_type::{EvaluationContext, RowType};

/// The `(context, optional row-type)` filter deciding which records an
/// evaluator considers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restriction {
    pub context: EvaluationContext,
    pub row_type: Option<RowType>,
}

impl Restriction {
    pub fn new(context: EvaluationContext, row_type: Option<RowType>) -> Self {
        Self { context, row_type }
    }

    /// True when the record is inside this restriction. Row-type equality is
    /// case-insensitive; an unset row-type matches every stream in context.
    pub fn matches(&self, record: &dyn Record, context: EvaluationContext) -> bool {
        if self.context != context {
            return false;
        }
        match &self.row_type {
            Some(required) => required == record.row_type(),
            None => true,
        }
    }
}

/// Anything that can look at one record in stream order.
pub trait RecordEvaluator: Send {
    /// Stable key naming this evaluator in findings and logs.
    fn key(&self) -> &'static str;

    /// Offer one record. Stateful implementations buffer and return `None`;
    /// stateless rules may return an immediate finding.
    fn handle_record(
        &mut self,
        record: &dyn Record,
        context: EvaluationContext,
    ) -> Option<Finding>;
}

/// Position of a stateful evaluator in the finalize order. Producers publish
/// reference indexes that consumers read, so all producers finalize first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FinalizeStage {
    Produce,
    Consume,
}

/// An evaluator that buffers across the whole pass and reports only once the
/// stream is exhausted. Not safe for concurrent mutation: `handle_record`
/// calls must be totally ordered and must not overlap `finalize` or `close`.
pub trait StatefulEvaluator: RecordEvaluator {
    fn stage(&self) -> FinalizeStage;

    /// Stream context this evaluator is restricted to.
    fn context(&self) -> EvaluationContext;

    /// Called exactly once after the final record; must be safe when zero
    /// records were offered. All findings are emitted here.
    fn finalize(&mut self, accumulator: &dyn FindingAccumulator) -> ValidationResult<()>;

    /// Idempotent cleanup. Deletes temp files whether or not finalization
    /// ran.
    fn close(&mut self) -> ValidationResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::record::MapRecord;

    #[test]
    fn restriction_matches_context_and_row_type() {
        let restriction = Restriction::new(
            EvaluationContext::Core,
            Some(RowType::new("http://rs.tdwg.org/dwc/terms/Taxon")),
        );
        let record = MapRecord::new("1", RowType::new("HTTP://RS.TDWG.ORG/DWC/TERMS/TAXON"));

        assert!(restriction.matches(&record, EvaluationContext::Core));
        assert!(!restriction.matches(&record, EvaluationContext::Ext));
    }

    #[test]
    fn unset_row_type_matches_any_stream() {
        let restriction = Restriction::new(EvaluationContext::Ext, None);
        let record = MapRecord::new("1", RowType::new("anything"));
        assert!(restriction.matches(&record, EvaluationContext::Ext));
    }
}
