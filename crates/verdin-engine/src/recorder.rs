//! Per-evaluator append-only value buffer with batch spill to disk.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use verdin_core::config::RecorderConfig;
use verdin_core::errors::{ValidationError, ValidationResult};

/// The closed spill file an evaluator sorts during finalization.
#[derive(Debug)]
pub struct SpillFile {
    pub path: PathBuf,
    /// True when an intake-time write failed and a batch may be missing.
    pub degraded: bool,
}

/// Bounded in-memory buffer of captured values. Reaching capacity flushes
/// the batch to a random-named spill file in the working directory, one
/// non-blank value per line.
///
/// Intake-time write failures are logged and flip the degraded flag; intake
/// continues and the affected batch may be lost. The finalize-time flush in
/// [`ValueRecorder::finish`] is fatal instead.
pub struct ValueRecorder {
    buffer: Vec<String>,
    capacity: usize,
    writer: BufWriter<File>,
    path: PathBuf,
    degraded: bool,
}

impl ValueRecorder {
    /// Open a spill file eagerly in `dir` and return an empty recorder.
    pub fn create_in(dir: &Path, prefix: &str, config: &RecorderConfig) -> ValidationResult<Self> {
        let temp = tempfile::Builder::new()
            .prefix(prefix)
            .suffix(".txt")
            .tempfile_in(dir)
            .map_err(|e| ValidationError::io(dir, e))?;
        // Deletion is the owning evaluator's job, on close.
        let (file, path) = temp
            .keep()
            .map_err(|e| ValidationError::io(dir, e.error))?;

        let capacity = config.effective_capacity();
        Ok(Self {
            buffer: Vec::with_capacity(capacity),
            capacity,
            writer: BufWriter::new(file),
            path,
            degraded: false,
        })
    }

    /// Path of the spill file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one value. Blank values are dropped. At capacity the buffer is
    /// spilled and cleared.
    pub fn record(&mut self, value: &str) {
        if value.trim().is_empty() {
            return;
        }
        self.buffer.push(value.to_string());
        if self.buffer.len() >= self.capacity {
            self.spill();
        }
    }

    /// Number of values currently buffered, not yet spilled.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    fn spill(&mut self) {
        for value in self.buffer.drain(..) {
            if let Err(error) = writeln!(self.writer, "{value}") {
                tracing::warn!(
                    path = %self.path.display(),
                    %error,
                    "spill write failed, dropping the rest of the batch"
                );
                self.degraded = true;
                break;
            }
        }
        self.buffer.clear();
    }

    /// Flush the partial batch and close the write handle, returning the
    /// spill file for sorting. Failure here is fatal to finalization.
    pub fn finish(mut self) -> ValidationResult<SpillFile> {
        let pending: Vec<String> = self.buffer.drain(..).collect();
        for value in &pending {
            writeln!(self.writer, "{value}")
                .map_err(|e| ValidationError::io(&self.path, e))?;
        }
        self.writer
            .flush()
            .map_err(|e| ValidationError::io(&self.path, e))?;
        Ok(SpillFile {
            path: self.path,
            degraded: self.degraded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn recorder_with_capacity(dir: &Path, capacity: usize) -> ValueRecorder {
        ValueRecorder::create_in(
            dir,
            "values_",
            &RecorderConfig {
                capacity: Some(capacity),
            },
        )
        .unwrap()
    }

    #[test]
    fn buffers_until_capacity_then_spills() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut recorder = recorder_with_capacity(dir.path(), 2);

        recorder.record("a");
        assert_eq!(recorder.pending(), 1);
        assert_eq!(fs::read_to_string(recorder.path()).unwrap(), "");

        recorder.record("b");
        assert_eq!(recorder.pending(), 0);

        let spill = recorder.finish().unwrap();
        assert_eq!(fs::read_to_string(&spill.path).unwrap(), "a\nb\n");
        assert!(!spill.degraded);
    }

    #[test]
    fn blank_values_are_never_written() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut recorder = recorder_with_capacity(dir.path(), 10);

        recorder.record("");
        recorder.record("   ");
        recorder.record("x");

        let spill = recorder.finish().unwrap();
        assert_eq!(fs::read_to_string(&spill.path).unwrap(), "x\n");
    }

    #[test]
    fn finish_flushes_partial_batch() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut recorder = recorder_with_capacity(dir.path(), 100);
        recorder.record("only");

        let spill = recorder.finish().unwrap();
        assert_eq!(fs::read_to_string(&spill.path).unwrap(), "only\n");
    }

    #[test]
    fn spill_file_has_txt_extension() {
        let dir = tempfile::TempDir::new().unwrap();
        let recorder = recorder_with_capacity(dir.path(), 10);
        assert_eq!(
            recorder.path().extension().and_then(|e| e.to_str()),
            Some("txt")
        );
    }
}
