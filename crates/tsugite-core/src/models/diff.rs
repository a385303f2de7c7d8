use serde::Serialize;

/// One row of a diff or of a merged file listing.
///
/// Line numbers are 1-based, matching unified-diff headers. A `Same` row
/// exists on both sides; an `Insertion` only on the new side; a `Deletion`
/// only on the old side. Insertions additionally carry `old_anchor`, the
/// old-file row the inserted text precedes, and deletions carry
/// `new_anchor`, the new-file row the deleted text would have preceded.
/// The anchors come from the parser's cursors and give emitters a stable
/// position for rows that have no number on one side; they are not
/// occupied rows, so `old_line()`/`new_line()` do not expose them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Line {
    Same {
        old_line: u32,
        new_line: u32,
        text: String,
    },
    Insertion {
        old_anchor: u32,
        new_line: u32,
        text: String,
    },
    Deletion {
        old_line: u32,
        new_anchor: u32,
        text: String,
    },
}

impl Line {
    pub fn same(old_line: u32, new_line: u32, text: impl Into<String>) -> Self {
        Line::Same {
            old_line,
            new_line,
            text: text.into(),
        }
    }

    pub fn ins(old_anchor: u32, new_line: u32, text: impl Into<String>) -> Self {
        Line::Insertion {
            old_anchor,
            new_line,
            text: text.into(),
        }
    }

    pub fn del(old_line: u32, new_anchor: u32, text: impl Into<String>) -> Self {
        Line::Deletion {
            old_line,
            new_anchor,
            text: text.into(),
        }
    }

    /// Old-file row this line occupies. `None` for insertions.
    pub fn old_line(&self) -> Option<u32> {
        match self {
            Line::Same { old_line, .. } | Line::Deletion { old_line, .. } => Some(*old_line),
            Line::Insertion { .. } => None,
        }
    }

    /// New-file row this line occupies. `None` for deletions.
    pub fn new_line(&self) -> Option<u32> {
        match self {
            Line::Same { new_line, .. } | Line::Insertion { new_line, .. } => Some(*new_line),
            Line::Deletion { .. } => None,
        }
    }

    /// Line content, without the marker character and without a newline.
    pub fn text(&self) -> &str {
        match self {
            Line::Same { text, .. } | Line::Insertion { text, .. } | Line::Deletion { text, .. } => {
                text
            }
        }
    }

    /// The marker character the line carries in serialized form.
    pub fn marker(&self) -> char {
        match self {
            Line::Same { .. } => ' ',
            Line::Insertion { .. } => '+',
            Line::Deletion { .. } => '-',
        }
    }

    /// Position in (old row, new row) space, substituting the anchor on the
    /// side the line does not occupy. Emitters order lines by this key.
    pub(crate) fn sort_key(&self) -> (u32, u32) {
        match self {
            Line::Same {
                old_line, new_line, ..
            } => (*old_line, *new_line),
            Line::Insertion {
                old_anchor,
                new_line,
                ..
            } => (*old_anchor, *new_line),
            Line::Deletion {
                old_line,
                new_anchor,
                ..
            } => (*old_line, *new_anchor),
        }
    }

    /// Swap the old/new roles of this line: a deletion of old row N becomes
    /// an insertion at new row N and vice versa. Applying twice restores the
    /// original line.
    pub fn reverse(self) -> Line {
        match self {
            Line::Same {
                old_line,
                new_line,
                text,
            } => Line::Same {
                old_line: new_line,
                new_line: old_line,
                text,
            },
            Line::Insertion {
                old_anchor,
                new_line,
                text,
            } => Line::Deletion {
                old_line: new_line,
                new_anchor: old_anchor,
                text,
            },
            Line::Deletion {
                old_line,
                new_anchor,
                text,
            } => Line::Insertion {
                old_anchor: new_anchor,
                new_line: old_line,
                text,
            },
        }
    }

    /// Reverse every line in the list, preserving order.
    pub fn reverse_lines(lines: Vec<Line>) -> Vec<Line> {
        lines.into_iter().map(Line::reverse).collect()
    }
}

/// One unified-diff hunk.
/// Coordinates are 1-based, matching the `@@ -old_start,old_lines +new_start,new_lines @@` header.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffChunk {
    pub old_start: u32,
    pub old_lines: u32,
    pub new_start: u32,
    pub new_lines: u32,
    /// Trailing free text on the header line (often a function signature).
    pub header: Option<String>,
    pub lines: Vec<Line>,
}

impl DiffChunk {
    /// First old row the hunk body occupies. A `,0` count makes the header
    /// name the row before the change, so the body begins one row later.
    pub fn old_body_start(&self) -> u32 {
        if self.old_lines == 0 {
            self.old_start + 1
        } else {
            self.old_start
        }
    }

    /// First new row the hunk body occupies; see [`Self::old_body_start`].
    pub fn new_body_start(&self) -> u32 {
        if self.new_lines == 0 {
            self.new_start + 1
        } else {
            self.new_start
        }
    }

    /// Swap the old/new sides of the hunk, reversing every line in place
    /// order. The result describes the patch that undoes this one.
    pub fn reverse(&self) -> DiffChunk {
        DiffChunk {
            old_start: self.new_start,
            old_lines: self.new_lines,
            new_start: self.old_start,
            new_lines: self.old_lines,
            header: self.header.clone(),
            lines: self.lines.iter().cloned().map(Line::reverse).collect(),
        }
    }
}

/// The filename fields of one `--- `/`+++ ` file-pair header, exactly as
/// they appeared in the diff. The parser never strips the conventional
/// `a/`/`b/` prefixes; `file_name` is the opt-in helper for that.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffFileHeader {
    pub old_file: String,
    pub new_file: String,
}

impl DiffFileHeader {
    /// The file's path with the conventional prefix stripped, preferring the
    /// new side. `/dev/null` (added or deleted files) falls back to the
    /// other side.
    pub fn file_name(&self) -> &str {
        let preferred = if self.new_file == "/dev/null" {
            &self.old_file
        } else {
            &self.new_file
        };
        preferred
            .strip_prefix("a/")
            .or_else(|| preferred.strip_prefix("b/"))
            .unwrap_or(preferred)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_swaps_insertion_and_deletion() {
        let del = Line::del(2, 2, "b");
        let ins = del.clone().reverse();
        assert_eq!(ins, Line::ins(2, 2, "b"));
        assert_eq!(ins.old_line(), None);
        assert_eq!(ins.new_line(), Some(2));
    }

    #[test]
    fn reverse_twice_is_identity() {
        let lines = vec![
            Line::same(1, 1, "a"),
            Line::del(2, 2, "b"),
            Line::ins(3, 2, "B"),
        ];
        let restored = Line::reverse_lines(Line::reverse_lines(lines.clone()));
        assert_eq!(restored, lines);
    }

    #[test]
    fn reverse_chunk_swaps_header_coordinates() {
        let chunk = DiffChunk {
            old_start: 2,
            old_lines: 1,
            new_start: 2,
            new_lines: 2,
            header: Some("fn main".to_string()),
            lines: vec![Line::del(2, 2, "b"), Line::ins(3, 2, "B"), Line::ins(3, 3, "extra")],
        };
        let reversed = chunk.reverse();
        assert_eq!(reversed.old_start, 2);
        assert_eq!(reversed.old_lines, 2);
        assert_eq!(reversed.new_start, 2);
        assert_eq!(reversed.new_lines, 1);
        assert_eq!(reversed.header.as_deref(), Some("fn main"));
        assert_eq!(reversed.lines[0], Line::ins(2, 2, "b"));
        assert_eq!(reversed.lines[1], Line::del(2, 3, "B"));
        // Reversing back restores the original chunk.
        assert_eq!(reversed.reverse(), chunk);
    }

    #[test]
    fn file_header_strips_conventional_prefix() {
        let header = DiffFileHeader {
            old_file: "a/src/main.rs".to_string(),
            new_file: "b/src/main.rs".to_string(),
        };
        assert_eq!(header.file_name(), "src/main.rs");

        let deleted = DiffFileHeader {
            old_file: "a/gone.txt".to_string(),
            new_file: "/dev/null".to_string(),
        };
        assert_eq!(deleted.file_name(), "gone.txt");
    }

    #[test]
    fn line_serializes_tagged_with_camel_case_fields() {
        let same = serde_json::to_value(Line::same(1, 1, "a")).unwrap();
        assert_eq!(
            same,
            serde_json::json!({"type": "same", "oldLine": 1, "newLine": 1, "text": "a"})
        );

        let ins = serde_json::to_value(Line::ins(3, 2, "B")).unwrap();
        assert_eq!(
            ins,
            serde_json::json!({"type": "insertion", "oldAnchor": 3, "newLine": 2, "text": "B"})
        );
    }
}
