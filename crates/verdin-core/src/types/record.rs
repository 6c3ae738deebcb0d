//! The record capability and the concrete implementations used by
//! embedders that already hold rows in memory.
//!
//! Records handed to evaluators are ephemeral snapshots: an evaluator that
//! needs a value past the current call must copy it out.

use crate::errors::ValidationResult;
use crate::types::collections::FxHashMap;
use crate::types::row_type::RowType;
use crate::types::term::Term;

/// A single tabular row: primary identifier, row-type, per-term lookup.
pub trait Record {
    /// The record's primary identifier.
    fn id(&self) -> &str;

    /// The row-type of the stream this record belongs to.
    fn row_type(&self) -> &RowType;

    /// Look up the value of a term, if present.
    fn value(&self, term: &Term) -> Option<&str>;
}

/// A source of records with `next()` semantics. Returning `Ok(None)`
/// signals end-of-stream and triggers the finalize fan-out in the driver.
pub trait RecordSource {
    type Rec: Record;

    fn next_record(&mut self) -> ValidationResult<Option<Self::Rec>>;
}

/// Map-backed record.
#[derive(Debug, Clone)]
pub struct MapRecord {
    id: String,
    row_type: RowType,
    values: FxHashMap<Term, String>,
}

impl MapRecord {
    pub fn new(id: impl Into<String>, row_type: RowType) -> Self {
        Self {
            id: id.into(),
            row_type,
            values: FxHashMap::default(),
        }
    }

    /// Builder-style value assignment.
    pub fn with_value(mut self, term: Term, value: impl Into<String>) -> Self {
        self.values.insert(term, value.into());
        self
    }

    pub fn set_value(&mut self, term: Term, value: impl Into<String>) {
        self.values.insert(term, value.into());
    }
}

impl Record for MapRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn row_type(&self) -> &RowType {
        &self.row_type
    }

    fn value(&self, term: &Term) -> Option<&str> {
        self.values.get(term).map(String::as_str)
    }
}

/// Record source over an in-memory vector, in insertion order.
pub struct VecRecordSource {
    records: std::vec::IntoIter<MapRecord>,
}

impl VecRecordSource {
    pub fn new(records: Vec<MapRecord>) -> Self {
        Self {
            records: records.into_iter(),
        }
    }
}

impl RecordSource for VecRecordSource {
    type Rec = MapRecord;

    fn next_record(&mut self) -> ValidationResult<Option<MapRecord>> {
        Ok(self.records.next())
    }
}
