//! Referential-integrity evaluator: source values diffed against the
//! sorted reference index of a bound uniqueness evaluator.

use std::path::PathBuf;
use std::sync::Arc;

use smallvec::SmallVec;
use verdin_core::config::ReferentialConfig;
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

pub const REFERENTIAL_KEY: &str = "field_referential_integrity";

/// Detects source-field values with no counterpart in the target field of
/// another stream.
///
/// Intake spills every non-blank source token (a multi-valued field is split
/// on the configured separator). Finalization sorts the spill and walks a
/// sorted merge diff against the target's reference index: one finding per
/// distinct unmatched source value. The diff comparison is case-sensitive.
pub struct ReferentialIntegrityEvaluator {
    config: ReferentialConfig,
    restriction: Restriction,
    catalog: MessageCatalog,
    target: Arc<ReferenceIndex>,
    recorder: Option<ValueRecorder>,
    spill_path: PathBuf,
    sorted_path: Option<PathBuf>,
    closed: bool,
}

impl ReferentialIntegrityEvaluator {
    /// Validate the configuration, bind the target index, and open the
    /// spill file eagerly.
    pub fn new(
        config: ReferentialConfig,
        target: Arc<ReferenceIndex>,
        catalog: MessageCatalog,
    ) -> ValidationResult<Self> {
        config.validate()?;
        let recorder =
            ValueRecorder::create_in(&config.working_dir, "resolve_", &config.recorder)?;
        let spill_path = recorder.path().to_path_buf();
        let restriction = Restriction::new(config.context, Some(config.row_type.clone()));

        Ok(Self {
            restriction,
            catalog,
            target,
            recorder: Some(recorder),
            spill_path,
            sorted_path: None,
            closed: false,
            config,
        })
    }

    fn run_finalize(&mut self, accumulator: &dyn FindingAccumulator) -> ValidationResult<()> {
        let recorder = self.recorder.take().ok_or_else(|| {
            ValidationError::EvaluatorClosed {
                key: REFERENTIAL_KEY.to_string(),
            }
        })?;
        let spill = recorder.finish()?;
        let degraded = spill.degraded;

        let sorted_path = sorted_sibling(&spill.path);
        ExternalSorter::new(&self.config.sort).sort_file(&spill.path, &sorted_path)?;
        self.sorted_path = Some(sorted_path.clone());

        let target_path = self.target.path()?.to_path_buf();
        let mut left = ValueLines::open(&sorted_path)?;
        let mut right = ValueLines::open(&target_path)?;
        let mut right_head = right.next_value()?;
        let mut previous_left: Option<String> = None;

        while let Some(current) = left.next_value()? {
            // Duplicate source values sit adjacent after the sort; only the
            // first of each run is diffed.
            if previous_left.as_deref() == Some(current.as_str()) {
                continue;
            }
            while right_head
                .as_deref()
                .is_some_and(|head| head < current.as_str())
            {
                right_head = right.next_value()?;
            }
            if right_head.as_deref() == Some(current.as_str()) {
                right_head = right.next_value()?;
            } else {
                let message = self.catalog.unresolved_reference(&current);
                accumulator.accept(Finding::new(
                    current.clone(),
                    REFERENTIAL_KEY,
                    self.config.context,
                    Some(self.config.row_type.clone()),
                    FindingKind::FieldReferentialIntegrity,
                    Severity::Error,
                    message,
                ))?;
            }
            previous_left = Some(current);
        }

        if degraded {
            accumulator.accept(Finding::new(
                "",
                REFERENTIAL_KEY,
                self.config.context,
                Some(self.config.row_type.clone()),
                FindingKind::EvaluationFailure,
                Severity::Warning,
                self.catalog.incomplete_results(
                    REFERENTIAL_KEY,
                    "an intake batch was lost to an I/O failure",
                ),
            ))?;
        }
        Ok(())
    }
}

impl RecordEvaluator for ReferentialIntegrityEvaluator {
    fn key(&self) -> &'static str {
        REFERENTIAL_KEY
    }

    fn handle_record(
        &mut self,
        record: &dyn Record,
        context: EvaluationContext,
    ) -> Option<Finding> {
        if self.closed || !self.restriction.matches(record, context) {
            return None;
        }
        let value = record.value(&self.config.source_term)?;
        if value.trim().is_empty() {
            return None;
        }

        let tokens: SmallVec<[&str; 4]> = match &self.config.multi_value_separator {
            Some(separator) if value.contains(separator.as_str()) => {
                value.split(separator.as_str()).collect()
            }
            _ => SmallVec::from_slice(&[value]),
        };
        if let Some(recorder) = self.recorder.as_mut() {
            for token in tokens {
                if !token.trim().is_empty() {
                    recorder.record(token);
                }
            }
        }
        None
    }
}

impl StatefulEvaluator for ReferentialIntegrityEvaluator {
    fn stage(&self) -> FinalizeStage {
        FinalizeStage::Consume
    }

    fn context(&self) -> EvaluationContext {
        self.config.context
    }

    fn finalize(&mut self, accumulator: &dyn FindingAccumulator) -> ValidationResult<()> {
        let result = self.run_finalize(accumulator);
        if let Err(error) = &result {
            let message = self
                .catalog
                .evaluation_failed(REFERENTIAL_KEY, &error.to_string());
            if let Err(accept_error) = accumulator.accept(Finding::new(
                "",
                REFERENTIAL_KEY,
                self.config.context,
                Some(self.config.row_type.clone()),
                FindingKind::EvaluationFailure,
                Severity::Error,
                message,
            )) {
                tracing::error!(
                    evaluator = REFERENTIAL_KEY,
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
        self.recorder = None;

        // The target index belongs to the target evaluator; only this
        // evaluator's own files are deleted here.
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
