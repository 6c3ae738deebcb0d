//! Referential-integrity evaluator behavior, bound to a uniqueness
//! evaluator on the same taxonomic stream.

use tempfile::TempDir;
use verdin_core::config::{ReferentialConfig, UniquenessConfig};
use verdin_core::findings::{Finding, FindingKind, InMemoryAccumulator, Severity};
use verdin_core::messages::MessageCatalog;
use verdin_core::traits::{RecordEvaluator, StatefulEvaluator};
use verdin_core::types::record::MapRecord;
use verdin_core::types::row_type::{EvaluationContext, RowType};
use verdin_core::types::term::dwc;
use verdin_engine::{ReferentialIntegrityEvaluator, UniquenessEvaluator};

fn taxon() -> RowType {
    RowType::new("http://rs.tdwg.org/dwc/terms/Taxon")
}

/// A taxon record with a taxonID and an acceptedNameUsageID pointing at
/// another taxon (possibly blank).
fn record(taxon_id: &str, accepted: &str) -> MapRecord {
    MapRecord::new(taxon_id, taxon())
        .with_value(dwc::taxon_id(), taxon_id)
        .with_value(dwc::accepted_name_usage_id(), accepted)
}

/// Feed the same stream to a taxonID uniqueness evaluator and an
/// acceptedNameUsageID referential evaluator bound to it, finalize in
/// dependency order, and return the referential findings.
fn run_accepted_check(records: &[MapRecord], separator: Option<&str>) -> Vec<Finding> {
    let target_dir = TempDir::new().unwrap();
    let source_dir = TempDir::new().unwrap();

    let target_config =
        UniquenessConfig::on_term(EvaluationContext::Core, dwc::taxon_id(), target_dir.path());
    let mut target = UniquenessEvaluator::new(target_config, MessageCatalog::default()).unwrap();

    let mut source_config = ReferentialConfig::new(
        dwc::accepted_name_usage_id(),
        EvaluationContext::Core,
        taxon(),
        source_dir.path(),
    );
    if let Some(sep) = separator {
        source_config = source_config.with_separator(sep);
    }
    let mut source = ReferentialIntegrityEvaluator::new(
        source_config,
        target.index_handle(),
        MessageCatalog::default(),
    )
    .unwrap();

    for rec in records {
        let _ = target.handle_record(rec, EvaluationContext::Core);
        let _ = source.handle_record(rec, EvaluationContext::Core);
    }

    let target_acc = InMemoryAccumulator::new();
    target.finalize(&target_acc).unwrap();

    let acc = InMemoryAccumulator::new();
    source.finalize(&acc).unwrap();

    source.close().unwrap();
    target.close().unwrap();
    acc.findings()
}

#[test]
fn resolvable_references_produce_no_findings() {
    let findings = run_accepted_check(
        &[record("1", "2b"), record("2a", "1"), record("2b", "")],
        None,
    );
    assert!(findings.is_empty());
}

#[test]
fn dangling_reference_is_reported_once() {
    let findings = run_accepted_check(&[record("1", "4"), record("2", "1")], None);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].value, "4");
    assert_eq!(findings[0].kind, FindingKind::FieldReferentialIntegrity);
    assert_eq!(findings[0].severity, Severity::Error);
    assert_eq!(findings[0].message, "4 was not found in target");
}

#[test]
fn multi_valued_references_resolve_per_token() {
    let findings = run_accepted_check(
        &[record("1", "3|4"), record("3", ""), record("4", "")],
        Some("|"),
    );
    assert!(findings.is_empty());
}

#[test]
fn multi_valued_dangling_token_is_reported() {
    let findings = run_accepted_check(
        &[record("1", "3|5"), record("3", ""), record("4", "")],
        Some("|"),
    );
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].value, "5");
}

#[test]
fn empty_tokens_inside_multi_values_are_ignored() {
    let findings = run_accepted_check(
        &[record("a", "a||b"), record("b", "")],
        Some("|"),
    );
    assert!(findings.is_empty());
}

#[test]
fn without_separator_the_value_is_one_token() {
    // "3|4" is a single (dangling) value when no separator is configured.
    let findings = run_accepted_check(
        &[record("1", "3|4"), record("3", ""), record("4", "")],
        None,
    );
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].value, "3|4");
}

#[test]
fn duplicate_source_values_yield_a_single_finding() {
    let findings = run_accepted_check(&[record("1", "9"), record("2", "9")], None);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].value, "9");
}

#[test]
fn empty_target_reports_every_distinct_source_token() {
    // No record carries a taxonID, so the target set is empty.
    let no_id_a = MapRecord::new("r1", taxon()).with_value(dwc::accepted_name_usage_id(), "x");
    let no_id_b = MapRecord::new("r2", taxon()).with_value(dwc::accepted_name_usage_id(), "y");
    let no_id_c = MapRecord::new("r3", taxon()).with_value(dwc::accepted_name_usage_id(), "x");

    let findings = run_accepted_check(&[no_id_a, no_id_b, no_id_c], None);
    let values: Vec<_> = findings.iter().map(|f| f.value.as_str()).collect();
    assert_eq!(values, ["x", "y"]);
}

#[test]
fn diff_is_case_sensitive() {
    // Target holds "a"; the source references "A".
    let findings = run_accepted_check(&[record("a", "A")], None);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].value, "A");
}

#[test]
fn blank_source_values_are_skipped() {
    let findings = run_accepted_check(
        &[record("1", ""), record("2", "   "), record("3", "1")],
        None,
    );
    assert!(findings.is_empty());
}

#[test]
fn records_outside_the_source_row_type_are_ignored() {
    let media = MapRecord::new("m1", RowType::new("gbif:Multimedia"))
        .with_value(dwc::accepted_name_usage_id(), "nope");
    let findings = run_accepted_check(&[record("1", "1"), media], None);
    assert!(findings.is_empty());
}

#[test]
fn unpublished_target_index_is_a_fatal_error() {
    let dir = TempDir::new().unwrap();
    let config = ReferentialConfig::new(
        dwc::accepted_name_usage_id(),
        EvaluationContext::Core,
        taxon(),
        dir.path(),
    );
    let never_published = std::sync::Arc::new(verdin_engine::ReferenceIndex::new("missing"));
    let mut evaluator = ReferentialIntegrityEvaluator::new(
        config,
        never_published,
        MessageCatalog::default(),
    )
    .unwrap();

    let _ = evaluator.handle_record(&record("1", "2"), EvaluationContext::Core);

    let acc = InMemoryAccumulator::new();
    let err = evaluator.finalize(&acc).unwrap_err();
    assert!(err.to_string().contains("missing"));

    // Terminal diagnostic reaches the accumulator, and close still cleans
    // the working directory.
    let findings = acc.findings();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].kind, FindingKind::EvaluationFailure);
    evaluator.close().unwrap();
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn close_leaves_the_target_index_alone() {
    let target_dir = TempDir::new().unwrap();
    let source_dir = TempDir::new().unwrap();

    let target_config =
        UniquenessConfig::on_term(EvaluationContext::Core, dwc::taxon_id(), target_dir.path());
    let mut target = UniquenessEvaluator::new(target_config, MessageCatalog::default()).unwrap();
    let config = ReferentialConfig::new(
        dwc::accepted_name_usage_id(),
        EvaluationContext::Core,
        taxon(),
        source_dir.path(),
    );
    let mut source = ReferentialIntegrityEvaluator::new(
        config,
        target.index_handle(),
        MessageCatalog::default(),
    )
    .unwrap();

    let rec = record("1", "1");
    let _ = target.handle_record(&rec, EvaluationContext::Core);
    let _ = source.handle_record(&rec, EvaluationContext::Core);

    let acc = InMemoryAccumulator::new();
    target.finalize(&acc).unwrap();
    source.finalize(&acc).unwrap();

    let index_path = target.index_handle().path().unwrap().to_path_buf();
    source.close().unwrap();
    assert!(index_path.exists(), "target index must survive source close");
    assert_eq!(std::fs::read_dir(source_dir.path()).unwrap().count(), 0);

    target.close().unwrap();
    assert!(!index_path.exists());
}
