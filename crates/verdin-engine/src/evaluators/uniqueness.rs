//! Uniqueness evaluator: one value per qualifying record, duplicates
//! reported after an external sort of the spill file.

use std::path::PathBuf;
use std::sync::Arc;

use verdin_core::config::UniquenessConfig;
use verdin_core::errors::{ValidationError, ValidationResult};
use verdin_core::findings::{Finding, FindingAccumulator, FindingKind, Severity};
use verdin_core::messages::MessageCatalog;
use verdin_core::traits::{FinalizeStage, RecordEvaluator, Restriction, StatefulEvaluator};
use verdin_core::types::record::Record;
use verdin_core::types::row_type::EvaluationContext;

use crate::index::ReferenceIndex;
use crate::recorder::ValueRecorder;
use crate::sort::ExternalSorter;

use super::{remove_if_exists, sorted_sibling, ValueLines};

pub const UNIQUENESS_KEY: &str = "field_uniqueness";

/// Detects repeated values of one term (or of the primary identifier)
/// within a `(context, row-type)` restriction.
///
/// Intake spills the chosen value per record; finalization sorts the spill
/// into the reference index and scans it with a one-line lookback. The index
/// path is published through [`ReferenceIndex`] so referential evaluators
/// can be bound to it.
pub struct UniquenessEvaluator {
    config: UniquenessConfig,
    restriction: Restriction,
    catalog: MessageCatalog,
    recorder: Option<ValueRecorder>,
    spill_path: PathBuf,
    sorted_path: Option<PathBuf>,
    index: Arc<ReferenceIndex>,
    rejected_values: u64,
    closed: bool,
}

impl UniquenessEvaluator {
    /// Validate the configuration and open the spill file eagerly.
    pub fn new(config: UniquenessConfig, catalog: MessageCatalog) -> ValidationResult<Self> {
        config.validate()?;
        let recorder =
            ValueRecorder::create_in(&config.working_dir, "unique_", &config.recorder)?;
        let spill_path = recorder.path().to_path_buf();
        let restriction = Restriction::new(config.context, config.row_type.clone());

        Ok(Self {
            restriction,
            catalog,
            recorder: Some(recorder),
            spill_path,
            sorted_path: None,
            index: Arc::new(ReferenceIndex::new(UNIQUENESS_KEY)),
            rejected_values: 0,
            closed: false,
            config,
        })
    }

    /// Shared handle to the sorted reference index this evaluator will
    /// publish at finalization. Hand this to referential evaluators.
    pub fn index_handle(&self) -> Arc<ReferenceIndex> {
        Arc::clone(&self.index)
    }

    fn resolve<'a>(&self, record: &'a dyn Record) -> Option<&'a str> {
        match &self.config.term {
            Some(term) => record.value(term),
            None => Some(record.id()),
        }
    }

    fn run_finalize(&mut self, accumulator: &dyn FindingAccumulator) -> ValidationResult<()> {
        let recorder = self.recorder.take().ok_or_else(|| {
            ValidationError::EvaluatorClosed {
                key: UNIQUENESS_KEY.to_string(),
            }
        })?;
        let spill = recorder.finish()?;
        let degraded = spill.degraded || self.rejected_values > 0;

        let sorted_path = sorted_sibling(&spill.path);
        ExternalSorter::new(&self.config.sort).sort_file(&spill.path, &sorted_path)?;
        self.sorted_path = Some(sorted_path.clone());

        let case_insensitive = self.config.effective_case_insensitive();
        let field = self.config.checked_field().to_string();
        let mut lines = ValueLines::open(&sorted_path)?;
        let mut previous: Option<String> = None;
        while let Some(current) = lines.next_value()? {
            let duplicate = previous.as_deref().is_some_and(|prev| {
                if case_insensitive {
                    prev.eq_ignore_ascii_case(&current)
                } else {
                    prev == current
                }
            });
            if duplicate {
                let message = self.catalog.not_unique(&current, &field);
                accumulator.accept(Finding::new(
                    current.clone(),
                    UNIQUENESS_KEY,
                    self.config.context,
                    self.config.row_type.clone(),
                    FindingKind::FieldUniqueness,
                    Severity::Error,
                    message,
                ))?;
            }
            // Advances unconditionally: n equal lines yield n-1 findings.
            previous = Some(current);
        }

        self.index.publish(sorted_path);

        if degraded {
            let detail = if self.rejected_values > 0 {
                format!("{} values rejected at intake", self.rejected_values)
            } else {
                "an intake batch was lost to an I/O failure".to_string()
            };
            accumulator.accept(Finding::new(
                "",
                UNIQUENESS_KEY,
                self.config.context,
                self.config.row_type.clone(),
                FindingKind::EvaluationFailure,
                Severity::Warning,
                self.catalog.incomplete_results(UNIQUENESS_KEY, &detail),
            ))?;
        }
        Ok(())
    }
}

impl RecordEvaluator for UniquenessEvaluator {
    fn key(&self) -> &'static str {
        UNIQUENESS_KEY
    }

    fn handle_record(
        &mut self,
        record: &dyn Record,
        context: EvaluationContext,
    ) -> Option<Finding> {
        if self.closed || !self.restriction.matches(record, context) {
            return None;
        }
        let value = self.resolve(record)?;
        if value.trim().is_empty() {
            return None;
        }
        if let Some(separator) = &self.config.forbidden_separator {
            if value.contains(separator.as_str()) {
                self.rejected_values += 1;
                tracing::warn!(
                    evaluator = UNIQUENESS_KEY,
                    value,
                    separator = %separator,
                    "value contains the reserved separator, rejected at intake"
                );
                return None;
            }
        }
        if let Some(recorder) = self.recorder.as_mut() {
            recorder.record(value);
        }
        None
    }
}

impl StatefulEvaluator for UniquenessEvaluator {
    fn stage(&self) -> FinalizeStage {
        FinalizeStage::Produce
    }

    fn context(&self) -> EvaluationContext {
        self.config.context
    }

    fn finalize(&mut self, accumulator: &dyn FindingAccumulator) -> ValidationResult<()> {
        let result = self.run_finalize(accumulator);
        if let Err(error) = &result {
            let message = self
                .catalog
                .evaluation_failed(UNIQUENESS_KEY, &error.to_string());
            if let Err(accept_error) = accumulator.accept(Finding::new(
                "",
                UNIQUENESS_KEY,
                self.config.context,
                self.config.row_type.clone(),
                FindingKind::EvaluationFailure,
                Severity::Error,
                message,
            )) {
                tracing::error!(
                    evaluator = UNIQUENESS_KEY,
                    error = %accept_error,
                    "could not report finalization failure"
                );
            }
        }
        result
    }

    fn close(&mut self) -> ValidationResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        // Drop the write handle before deleting.
        self.recorder = None;

        let mut first_error = remove_if_exists(&self.spill_path).err();
        if let Some(sorted) = &self.sorted_path {
            if let Err(e) = remove_if_exists(sorted) {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
