//! The stateful evaluators and their registry.

pub mod referential;
pub mod registry;
pub mod uniqueness;

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};

use verdin_core::errors::{ValidationError, ValidationResult};

/// Sibling path of a spill file with `_sorted` appended before the
/// extension: `values_ab12.txt` becomes `values_ab12_sorted.txt`.
pub(crate) fn sorted_sibling(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("values");
    path.with_file_name(format!("{stem}_sorted.txt"))
}

/// Delete a file, treating "already gone" as success. Used by `close`
/// implementations, which must succeed whether or not finalization ran.
pub(crate) fn remove_if_exists(path: &Path) -> ValidationResult<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ValidationError::io(path, e)),
    }
}

/// Line reader over a sorted value file that skips blank lines.
pub(crate) struct ValueLines {
    lines: Lines<BufReader<File>>,
    path: PathBuf,
}

impl ValueLines {
    pub(crate) fn open(path: &Path) -> ValidationResult<Self> {
        let file = File::open(path).map_err(|e| ValidationError::io(path, e))?;
        Ok(Self {
            lines: BufReader::new(file).lines(),
            path: path.to_path_buf(),
        })
    }

    /// Next non-blank line, or `None` at end of file.
    pub(crate) fn next_value(&mut self) -> ValidationResult<Option<String>> {
        for line in &mut self.lines {
            let line = line.map_err(|e| ValidationError::io(&self.path, e))?;
            if !line.trim().is_empty() {
                return Ok(Some(line));
            }
        }
        Ok(None)
    }
}
