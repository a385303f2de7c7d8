use std::ops::Range;

use similar::{ChangeTag, TextDiff};

/// An original text plus line edits applied on top of it, with a
/// unified-diff renderer over the pair.
///
/// Rows are 1-based. Texts are expected to end with a line terminator. The
/// rendered diff always writes explicit `start,count` header ranges and
/// `\n` terminators, so strict parsers accept it as-is.
pub struct DiffFixture {
    path: String,
    original: String,
    rows: Vec<String>,
}

impl DiffFixture {
    pub fn new(original: impl Into<String>) -> Self {
        let original = original.into();
        let rows = split(&original);
        DiffFixture {
            path: "file.txt".to_string(),
            original,
            rows,
        }
    }

    /// Path used in the `--- a/...`/`+++ b/...` header.
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn replace_line(mut self, row: usize, text: impl Into<String>) -> Self {
        assert!(
            row >= 1 && row <= self.rows.len(),
            "row {row} out of range for {} rows",
            self.rows.len()
        );
        self.rows[row - 1] = text.into();
        self
    }

    /// Insert a row before `row`; one past the last row appends.
    pub fn insert_line(mut self, row: usize, text: impl Into<String>) -> Self {
        assert!(
            row >= 1 && row <= self.rows.len() + 1,
            "row {row} out of range for {} rows",
            self.rows.len()
        );
        self.rows.insert(row - 1, text.into());
        self
    }

    pub fn delete_line(mut self, row: usize) -> Self {
        assert!(
            row >= 1 && row <= self.rows.len(),
            "row {row} out of range for {} rows",
            self.rows.len()
        );
        self.rows.remove(row - 1);
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    /// The text after all edits, with every row terminated.
    pub fn modified(&self) -> String {
        let mut text = String::new();
        for row in &self.rows {
            text.push_str(row);
            text.push('\n');
        }
        text
    }

    /// Unified diff from original to modified with `context` rows of
    /// context around each change. No edits yields the empty string.
    pub fn unified_diff(&self, context: usize) -> String {
        let modified = self.modified();
        let diff = TextDiff::from_lines(self.original.as_str(), modified.as_str());

        let mut hunks = String::new();
        for group in diff.grouped_ops(context) {
            let (Some(first), Some(last)) = (group.first(), group.last()) else {
                continue;
            };
            let old_span = first.old_range().start..last.old_range().end;
            let new_span = first.new_range().start..last.new_range().end;
            hunks.push_str(&format!(
                "@@ -{},{} +{},{} @@\n",
                hunk_start(&old_span),
                old_span.len(),
                hunk_start(&new_span),
                new_span.len(),
            ));
            for op in &group {
                for change in diff.iter_changes(op) {
                    hunks.push(match change.tag() {
                        ChangeTag::Equal => ' ',
                        ChangeTag::Delete => '-',
                        ChangeTag::Insert => '+',
                    });
                    let value = change.value();
                    let value = value.strip_suffix('\n').unwrap_or(value);
                    hunks.push_str(value.strip_suffix('\r').unwrap_or(value));
                    hunks.push('\n');
                }
            }
        }
        if hunks.is_empty() {
            return String::new();
        }
        format!("--- a/{path}\n+++ b/{path}\n{hunks}", path = self.path)
    }
}

/// 1-based header start for a 0-based row span; an empty span names the
/// row before itself, per the `,0` convention.
fn hunk_start(span: &Range<usize>) -> usize {
    if span.is_empty() {
        span.start
    } else {
        span.start + 1
    }
}

fn split(text: &str) -> Vec<String> {
    let mut rows: Vec<String> = text.split('\n').map(str::to_string).collect();
    if rows.last().is_some_and(String::is_empty) {
        rows.pop();
    }
    rows
}
