//! External sort invariants, including the property that sorting never
//! changes the multiset of lines.

use proptest::prelude::*;
use tempfile::TempDir;
use verdin_core::config::SortConfig;
use verdin_engine::ExternalSorter;

fn sort_lines(lines: &[String], chunk_size: usize) -> Vec<String> {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("values.txt");
    let output = dir.path().join("values_sorted.txt");

    let text = if lines.is_empty() {
        String::new()
    } else {
        format!("{}\n", lines.join("\n"))
    };
    std::fs::write(&input, text).unwrap();

    ExternalSorter::new(&SortConfig {
        chunk_size: Some(chunk_size),
    })
    .sort_file(&input, &output)
    .unwrap();

    std::fs::read_to_string(&output)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[test]
fn large_input_spanning_many_runs_comes_back_sorted() {
    // 10_000 lines through chunks of 512 lines: 20 runs merged.
    let lines: Vec<String> = (0..10_000u32)
        .map(|i| format!("{:08x}", i.wrapping_mul(2_654_435_761)))
        .collect();
    let sorted = sort_lines(&lines, 512);

    assert_eq!(sorted.len(), lines.len());
    assert!(sorted.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn merge_preserves_duplicates_across_runs() {
    let lines: Vec<String> = ["x", "y", "x", "y", "x"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(sort_lines(&lines, 2), ["x", "x", "x", "y", "y"]);
}

proptest! {
    /// Sorting yields exactly the input multiset, ascending, for any input
    /// and any chunk size.
    #[test]
    fn sort_is_a_permutation_into_ascending_order(
        lines in proptest::collection::vec("[A-Za-z0-9:/. ]{0,16}", 0..200),
        chunk_size in 2usize..64,
    ) {
        let sorted = sort_lines(&lines, chunk_size);

        let mut expected = lines.clone();
        expected.sort();
        prop_assert_eq!(sorted, expected);
    }

    /// Chunk size never changes the result.
    #[test]
    fn chunk_size_is_invisible_in_the_output(
        lines in proptest::collection::vec("[a-z]{0,8}", 0..100),
    ) {
        let small_chunks = sort_lines(&lines, 2);
        let one_chunk = sort_lines(&lines, 10_000);
        prop_assert_eq!(small_chunks, one_chunk);
    }
}
