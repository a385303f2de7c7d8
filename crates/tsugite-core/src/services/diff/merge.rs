use std::sync::LazyLock;

use regex::Regex;

use super::{Error, Result, UnifiedParser};
use crate::models::{DiffChunk, Line};

static LINE_TERMINATOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n").expect("hardcoded line terminator regex"));

/// Merge a unified diff into the original text it was taken against,
/// producing one flat listing for the whole file: untouched rows as Same
/// plus every Insertion and Deletion the diff carries, in file order.
///
/// Same rows outside the hunks get their new-side numbers synthesized from
/// the running drift, so numbering stays consistent across hunks. A diff
/// with no file-pair header at all yields an all-Same listing.
///
/// Each hunk's declared start positions must agree with the drift
/// accumulated by the hunks before it, and its leading context must fall
/// inside the original text; otherwise the merge fails without a partial
/// result.
pub fn to_lines(original: &str, diff: &str) -> Result<Vec<Line>> {
    let rows = split_rows(original);
    let mut parser = UnifiedParser::new(diff);
    let mut lines: Vec<Line> = Vec::new();

    // Next original row not yet emitted, and the new-vs-old row offset the
    // hunks so far have produced.
    let mut line: u32 = 1;
    let mut drift: i64 = 0;

    if parser.next_file_pair()?.is_some() {
        while let Some(chunk) = parser.next_chunk()? {
            let old_start = chunk.old_body_start();
            let new_start = chunk.new_body_start();
            if i64::from(new_start) - i64::from(old_start) != drift {
                log::warn!(
                    "hunk -{},{} +{},{} disagrees with accumulated drift {}",
                    chunk.old_start,
                    chunk.old_lines,
                    chunk.new_start,
                    chunk.new_lines,
                    drift
                );
                return Err(integrity_failure(&chunk));
            }
            while line < old_start {
                let Some(text) = rows.get((line - 1) as usize) else {
                    return Err(integrity_failure(&chunk));
                };
                lines.push(Line::same(line, (i64::from(line) + drift) as u32, *text));
                line += 1;
            }
            lines.extend(chunk.lines.iter().cloned());
            line = old_start + chunk.old_lines;
            drift = i64::from(new_start + chunk.new_lines)
                - i64::from(old_start + chunk.old_lines);
        }
    }

    while (line as usize) <= rows.len() {
        let text = rows[(line - 1) as usize];
        lines.push(Line::same(line, (i64::from(line) + drift) as u32, text));
        line += 1;
    }

    Ok(lines)
}

fn integrity_failure(chunk: &DiffChunk) -> Error {
    Error::RowCountIntegrity {
        old_start: chunk.old_start,
        old_lines: chunk.old_lines,
        new_start: chunk.new_start,
        new_lines: chunk.new_lines,
    }
}

/// Rows of the original text, tolerating `\r\n`. A trailing terminator does
/// not produce a phantom empty row.
fn split_rows(text: &str) -> Vec<&str> {
    let mut rows: Vec<&str> = LINE_TERMINATOR_RE.split(text).collect();
    if rows.last() == Some(&"") {
        rows.pop();
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    // Replace row 2 of a three-row file with two rows.
    //
    //   a     a
    //   b  →  B
    //   c     extra
    //         c
    const ORIGINAL: &str = "a\nb\nc\n";
    const DIFF: &str = "\
--- a/f
+++ b/f
@@ -2,1 +2,2 @@
-b
+B
+extra
";

    #[test]
    fn merges_hunk_into_full_file_listing() {
        let lines = to_lines(ORIGINAL, DIFF).unwrap();
        assert_eq!(
            lines,
            vec![
                Line::same(1, 1, "a"),
                Line::del(2, 2, "b"),
                Line::ins(3, 2, "B"),
                Line::ins(3, 3, "extra"),
                // Drift after the hunk is (2+2)-(2+1) = 1.
                Line::same(3, 4, "c"),
            ]
        );
    }

    #[test]
    fn carries_drift_across_hunks_and_flushes_the_tail() {
        let original = "a\nb\nc\nd\ne\nf\ng\nh\ni\nj\n";
        let diff = "\
--- a/f
+++ b/f
@@ -2,3 +2,4 @@
 b
-c
+C
+C2
 d
@@ -7,2 +8,2 @@
 g
-h
+H
";
        let lines = to_lines(original, diff).unwrap();
        assert_eq!(
            lines,
            vec![
                Line::same(1, 1, "a"),
                Line::same(2, 2, "b"),
                Line::del(3, 3, "c"),
                Line::ins(4, 3, "C"),
                Line::ins(4, 4, "C2"),
                Line::same(4, 5, "d"),
                Line::same(5, 6, "e"),
                Line::same(6, 7, "f"),
                Line::same(7, 8, "g"),
                Line::del(8, 9, "h"),
                Line::ins(9, 9, "H"),
                Line::same(9, 10, "i"),
                Line::same(10, 11, "j"),
            ]
        );
    }

    #[test]
    fn merges_insertion_only_hunk() {
        let diff = "--- a/f\n+++ b/f\n@@ -1,0 +2,1 @@\n+x\n";
        let lines = to_lines(ORIGINAL, diff).unwrap();
        assert_eq!(
            lines,
            vec![
                Line::same(1, 1, "a"),
                Line::ins(2, 2, "x"),
                Line::same(2, 3, "b"),
                Line::same(3, 4, "c"),
            ]
        );
    }

    #[test]
    fn empty_diff_yields_all_same() {
        let lines = to_lines("a\nb\n", "").unwrap();
        assert_eq!(lines, vec![Line::same(1, 1, "a"), Line::same(2, 2, "b")]);
    }

    #[test]
    fn empty_original_and_empty_diff_yield_nothing() {
        assert_eq!(to_lines("", "").unwrap(), vec![]);
    }

    #[test]
    fn crlf_original_splits_cleanly() {
        let lines = to_lines("a\r\nb\r\n", "").unwrap();
        assert_eq!(lines, vec![Line::same(1, 1, "a"), Line::same(2, 2, "b")]);
    }

    #[test]
    fn hunk_start_inconsistent_with_drift_fails() {
        // The first hunk shifts everything below it by +1, so a second hunk
        // claiming identical start rows cannot be from the same diff.
        let diff = "\
--- a/f
+++ b/f
@@ -1,1 +1,2 @@
-a
+A
+A2
@@ -3,1 +3,1 @@
-c
+C
";
        assert!(matches!(
            to_lines(ORIGINAL, diff),
            Err(Error::RowCountIntegrity { old_start: 3, .. })
        ));
    }

    #[test]
    fn hunk_beyond_original_rows_fails() {
        let diff = "--- a/f\n+++ b/f\n@@ -5,1 +5,1 @@\n-x\n+X\n";
        assert!(matches!(
            to_lines("a\n", diff),
            Err(Error::RowCountIntegrity { .. })
        ));
    }
}
