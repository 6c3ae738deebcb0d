//! CSV accumulator with a dedicated writer thread.
//!
//! `accept` enqueues onto a bounded channel; a writer thread appends rows
//! and flushes every `BATCH_SIZE` rows or after `FLUSH_TIMEOUT` of quiet.
//! This is what lets evaluators running on distinct threads share one
//! accumulator: the channel serializes `accept` internally.

use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use serde::Serialize;
use verdin_core::errors::{ValidationError, ValidationResult};
use verdin_core::findings::{Finding, FindingAccumulator};

const CHANNEL_BOUND: usize = 1024;
const BATCH_SIZE: usize = 500;
const FLUSH_TIMEOUT: Duration = Duration::from_millis(100);

const HEADER: [&str; 7] = [
    "value",
    "evaluator",
    "context",
    "row_type",
    "kind",
    "severity",
    "message",
];

/// Counters from the writer thread.
#[derive(Debug, Default, Clone, Serialize)]
pub struct CsvWriteStats {
    pub rows: usize,
    pub flushes: usize,
}

enum WriterCommand {
    Accept(Finding),
    Shutdown,
}

/// Accumulator writing findings as CSV rows.
pub struct CsvAccumulator {
    tx: Sender<WriterCommand>,
    handle: Option<JoinHandle<ValidationResult<CsvWriteStats>>>,
}

impl CsvAccumulator {
    /// Create the CSV file, write the header row, and start the writer
    /// thread.
    pub fn create(path: &Path) -> ValidationResult<Self> {
        let mut writer = csv::Writer::from_path(path).map_err(|e| csv_error(path, e))?;
        writer
            .write_record(HEADER)
            .map_err(|e| csv_error(path, e))?;

        let (tx, rx) = bounded(CHANNEL_BOUND);
        let thread_path = path.to_path_buf();
        let handle = thread::Builder::new()
            .name("verdin-csv-writer".to_string())
            .spawn(move || writer_loop(writer, thread_path, rx))
            .map_err(|e| ValidationError::io(path, e))?;

        Ok(Self {
            tx,
            handle: Some(handle),
        })
    }

    /// Stop the writer thread, flush, and return its counters.
    pub fn shutdown(mut self) -> ValidationResult<CsvWriteStats> {
        let _ = self.tx.send(WriterCommand::Shutdown);
        let handle = self
            .handle
            .take()
            .ok_or(ValidationError::AccumulatorDisconnected)?;
        handle
            .join()
            .map_err(|_| ValidationError::AccumulatorPoisoned)?
    }
}

impl FindingAccumulator for CsvAccumulator {
    fn accept(&self, finding: Finding) -> ValidationResult<()> {
        self.tx
            .send(WriterCommand::Accept(finding))
            .map_err(|_| ValidationError::AccumulatorDisconnected)
    }
}

fn writer_loop(
    mut writer: csv::Writer<std::fs::File>,
    path: PathBuf,
    rx: Receiver<WriterCommand>,
) -> ValidationResult<CsvWriteStats> {
    let mut stats = CsvWriteStats::default();
    let mut pending = 0usize;

    loop {
        match rx.recv_timeout(FLUSH_TIMEOUT) {
            Ok(WriterCommand::Accept(finding)) => {
                write_row(&mut writer, &path, &finding)?;
                stats.rows += 1;
                pending += 1;
                if pending >= BATCH_SIZE {
                    writer.flush().map_err(|e| ValidationError::io(&path, e))?;
                    stats.flushes += 1;
                    pending = 0;
                }
            }
            Ok(WriterCommand::Shutdown) => break,
            Err(RecvTimeoutError::Timeout) => {
                if pending > 0 {
                    writer.flush().map_err(|e| ValidationError::io(&path, e))?;
                    stats.flushes += 1;
                    pending = 0;
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    writer.flush().map_err(|e| ValidationError::io(&path, e))?;
    if pending > 0 {
        stats.flushes += 1;
    }
    Ok(stats)
}

fn write_row(
    writer: &mut csv::Writer<std::fs::File>,
    path: &Path,
    finding: &Finding,
) -> ValidationResult<()> {
    let row_type = finding.row_type.as_ref().map(|rt| rt.as_str());
    let kind = finding.kind.to_string();
    let severity = finding.severity.to_string();
    writer
        .write_record([
            finding.value.as_str(),
            finding.evaluator_key.as_str(),
            finding.context.as_str(),
            row_type.unwrap_or(""),
            kind.as_str(),
            severity.as_str(),
            finding.message.as_str(),
        ])
        .map_err(|e| csv_error(path, e))
}

fn csv_error(path: &Path, error: csv::Error) -> ValidationError {
    ValidationError::io(
        path,
        std::io::Error::new(std::io::ErrorKind::Other, error.to_string()),
    )
}
