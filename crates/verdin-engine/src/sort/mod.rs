//! External merge sort over newline-delimited value files.
//!
//! Distribution phase: read up to `chunk_size` lines, sort in memory, write a
//! sorted run into a scratch directory. Merge phase: k-way merge of all runs
//! through a min-heap keyed on each run's current head line. Memory use is
//! bounded by the chunk size plus one buffered line per run.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Lines, Write};
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use verdin_core::config::SortConfig;
use verdin_core::errors::{ValidationError, ValidationResult};

/// Sorts a file of UTF-8 lines into ascending byte-lexicographic order.
/// Duplicates are preserved; equal lines keep their input order.
pub struct ExternalSorter {
    chunk_size: usize,
}

impl ExternalSorter {
    pub fn new(config: &SortConfig) -> Self {
        Self {
            chunk_size: config.effective_chunk_size(),
        }
    }

    /// Sort `input` into `output`. The output holds the same multiset of
    /// lines; every output line is `\n`-terminated, including the last, even
    /// when the input's final line is not. Empty input yields empty output.
    ///
    /// Run files live in a scratch directory next to `output` and are
    /// removed when sorting finishes or fails.
    pub fn sort_file(&self, input: &Path, output: &Path) -> ValidationResult<()> {
        let infile = File::open(input).map_err(|e| ValidationError::io(input, e))?;
        let mut lines = BufReader::new(infile).lines();

        let scratch_parent = output.parent().unwrap_or_else(|| Path::new("."));
        let scratch = TempDir::with_prefix_in("sort_runs_", scratch_parent)
            .map_err(|e| ValidationError::io(scratch_parent, e))?;

        let mut buffer: Vec<String> = Vec::new();
        let mut runs: Vec<PathBuf> = Vec::new();

        for line in &mut lines {
            buffer.push(line.map_err(|e| ValidationError::io(input, e))?);
            if buffer.len() >= self.chunk_size {
                buffer.sort();
                runs.push(write_run(scratch.path(), runs.len(), &buffer)?);
                buffer.clear();
            }
        }

        buffer.sort();
        if runs.is_empty() {
            // Everything fit in one chunk; skip the merge entirely.
            return write_lines(output, &buffer);
        }
        if !buffer.is_empty() {
            runs.push(write_run(scratch.path(), runs.len(), &buffer)?);
        }

        merge_runs(&runs, output)
    }
}

fn write_run(dir: &Path, index: usize, lines: &[String]) -> ValidationResult<PathBuf> {
    let path = dir.join(format!("run_{index}.txt"));
    write_lines(&path, lines)?;
    Ok(path)
}

fn write_lines(path: &Path, lines: &[String]) -> ValidationResult<()> {
    let file = File::create(path).map_err(|e| ValidationError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    for line in lines {
        writer
            .write_all(line.as_bytes())
            .and_then(|()| writer.write_all(b"\n"))
            .map_err(|e| ValidationError::io(path, e))?;
    }
    writer.flush().map_err(|e| ValidationError::io(path, e))
}

/// K-way merge. The heap orders by `(line, run index)`, so equal lines drain
/// in run-creation order, which preserves the input order of equal keys.
fn merge_runs(runs: &[PathBuf], output: &Path) -> ValidationResult<()> {
    let mut readers: Vec<Lines<BufReader<File>>> = Vec::with_capacity(runs.len());
    for path in runs {
        let file = File::open(path).map_err(|e| ValidationError::io(path, e))?;
        readers.push(BufReader::new(file).lines());
    }

    let mut heap: BinaryHeap<Reverse<(String, usize)>> = BinaryHeap::with_capacity(runs.len());
    for (index, reader) in readers.iter_mut().enumerate() {
        if let Some(line) = reader.next() {
            let line = line.map_err(|e| ValidationError::io(&runs[index], e))?;
            heap.push(Reverse((line, index)));
        }
    }

    let file = File::create(output).map_err(|e| ValidationError::io(output, e))?;
    let mut writer = BufWriter::new(file);
    while let Some(Reverse((line, index))) = heap.pop() {
        writer
            .write_all(line.as_bytes())
            .and_then(|()| writer.write_all(b"\n"))
            .map_err(|e| ValidationError::io(output, e))?;
        if let Some(next) = readers[index].next() {
            let next = next.map_err(|e| ValidationError::io(&runs[index], e))?;
            heap.push(Reverse((next, index)));
        }
    }
    writer.flush().map_err(|e| ValidationError::io(output, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn sort_with_chunk(input_text: &str, chunk_size: usize) -> String {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("values.txt");
        let output = dir.path().join("values_sorted.txt");
        fs::write(&input, input_text).unwrap();

        let sorter = ExternalSorter::new(&SortConfig {
            chunk_size: Some(chunk_size),
        });
        sorter.sort_file(&input, &output).unwrap();
        fs::read_to_string(&output).unwrap()
    }

    #[test]
    fn sorts_within_a_single_chunk() {
        assert_eq!(sort_with_chunk("c\na\nb\n", 100), "a\nb\nc\n");
    }

    #[test]
    fn sorts_across_many_runs() {
        // chunk_size 2 forces three runs and a real merge.
        assert_eq!(
            sort_with_chunk("e\nc\na\nd\nb\nf\n", 2),
            "a\nb\nc\nd\ne\nf\n"
        );
    }

    #[test]
    fn duplicates_are_not_collapsed() {
        assert_eq!(sort_with_chunk("b\na\nb\na\n", 2), "a\na\nb\nb\n");
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert_eq!(sort_with_chunk("", 2), "");
    }

    #[test]
    fn missing_final_newline_is_tolerated() {
        assert_eq!(sort_with_chunk("b\na", 100), "a\nb\n");
    }

    #[test]
    fn byte_order_puts_uppercase_before_lowercase() {
        assert_eq!(sort_with_chunk("a\nB\nA\n", 2), "A\nB\na\n");
    }

    #[test]
    fn scratch_runs_are_removed() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("values.txt");
        let output = dir.path().join("values_sorted.txt");
        fs::write(&input, "b\na\nc\n").unwrap();

        let sorter = ExternalSorter::new(&SortConfig {
            chunk_size: Some(1),
        });
        sorter.sort_file(&input, &output).unwrap();

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(leftovers.len(), 2, "only input and output remain: {leftovers:?}");
    }
}
