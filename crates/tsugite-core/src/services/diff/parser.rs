use std::sync::LazyLock;

use regex::Regex;

use super::{Error, Result};
use crate::models::{DiffChunk, DiffFileHeader, Line};

static HUNK_HEADER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@\s*-(\d+),(\d+)\s+\+(\d+),(\d+)\s*@@( (.*))?$")
        .expect("hardcoded hunk header regex")
});

/// Streaming parser over one unified diff.
///
/// Holds a read cursor over the input text; construct a fresh parser per
/// diff. `next_file_pair` and `next_chunk` alternate naturally over
/// multi-file diffs: when `next_chunk` runs into the next file's `--- `
/// header it pushes that line back and reports end-of-hunks, so the
/// following `next_file_pair` call picks the header up.
pub struct UnifiedParser<'a> {
    text: &'a str,
    pos: usize,
    pending: Option<&'a str>,
}

impl<'a> UnifiedParser<'a> {
    pub fn new(text: &'a str) -> Self {
        UnifiedParser {
            text,
            pos: 0,
            pending: None,
        }
    }

    /// Next input line without its terminator. Accepts `\n` and `\r\n`.
    fn next_line(&mut self) -> Option<&'a str> {
        if let Some(line) = self.pending.take() {
            return Some(line);
        }
        if self.pos >= self.text.len() {
            return None;
        }
        let rest = &self.text[self.pos..];
        match rest.find('\n') {
            Some(idx) => {
                self.pos += idx + 1;
                let line = &rest[..idx];
                Some(line.strip_suffix('\r').unwrap_or(line))
            }
            None => {
                self.pos = self.text.len();
                Some(rest)
            }
        }
    }

    /// Scan forward to the next `--- `/`+++ ` file-pair header.
    ///
    /// Returns `Ok(None)` when the input has no further file pairs. A
    /// `--- ` line that is not followed by a `+++ ` line is a format error.
    /// The returned fields are raw: conventional `a/`/`b/` prefixes are the
    /// caller's business.
    pub fn next_file_pair(&mut self) -> Result<Option<DiffFileHeader>> {
        while let Some(line) = self.next_line() {
            let Some(old_file) = line.strip_prefix("--- ") else {
                continue;
            };
            let new_file = self
                .next_line()
                .and_then(|next| next.strip_prefix("+++ "))
                .ok_or(Error::IncompleteFileHeader)?;
            return Ok(Some(DiffFileHeader {
                old_file: old_file.to_string(),
                new_file: new_file.to_string(),
            }));
        }
        Ok(None)
    }

    /// Parse the next hunk of the current file pair.
    ///
    /// Scans forward to the next `@@ ` header, skipping noise lines such as
    /// `diff --git`/`index` metadata. Returns `Ok(None)` at end of input or
    /// when the next file's `--- ` header is reached (the header line is
    /// pushed back for `next_file_pair`).
    ///
    /// The hunk body is read until both declared row counts are spent;
    /// running out of input, a blank line, an unknown marker character, or
    /// a count going negative all fail as a malformed diff.
    pub fn next_chunk(&mut self) -> Result<Option<DiffChunk>> {
        let header = loop {
            let Some(line) = self.next_line() else {
                return Ok(None);
            };
            if line.starts_with("--- ") {
                self.pending = Some(line);
                return Ok(None);
            }
            if line.starts_with("@@ ") {
                break line;
            }
        };

        let captures = HUNK_HEADER_RE
            .captures(header)
            .ok_or_else(|| Error::MalformedChunkHeader(header.to_string()))?;
        let parse_u32 = |idx: usize| -> Result<u32> {
            captures[idx]
                .parse()
                .map_err(|_| Error::MalformedChunkHeader(header.to_string()))
        };
        let mut chunk = DiffChunk {
            old_start: parse_u32(1)?,
            old_lines: parse_u32(2)?,
            new_start: parse_u32(3)?,
            new_lines: parse_u32(4)?,
            header: captures.get(6).map(|m| m.as_str().to_string()),
            lines: Vec::new(),
        };

        // Starting the cursors at the body rows keeps anchors uniform: an
        // insertion's old anchor is always the old row it precedes, a
        // deletion's new anchor the new row it would have preceded.
        let mut old_row = chunk.old_body_start();
        let mut new_row = chunk.new_body_start();
        let mut old_left = chunk.old_lines as i64;
        let mut new_left = chunk.new_lines as i64;

        while old_left > 0 || new_left > 0 {
            let line = self.next_line().ok_or(Error::EndedPrematurely)?;
            let marker = line.chars().next().ok_or(Error::UnexpectedBlankLine)?;
            let text = &line[marker.len_utf8()..];
            match marker {
                ' ' => {
                    chunk.lines.push(Line::same(old_row, new_row, text));
                    old_row += 1;
                    new_row += 1;
                    old_left -= 1;
                    new_left -= 1;
                }
                '-' => {
                    chunk.lines.push(Line::del(old_row, new_row, text));
                    old_row += 1;
                    old_left -= 1;
                }
                '+' => {
                    chunk.lines.push(Line::ins(old_row, new_row, text));
                    new_row += 1;
                    new_left -= 1;
                }
                other => return Err(Error::UnexpectedLeadingCharacter(other)),
            }
            if old_left < 0 || new_left < 0 {
                return Err(Error::EndedPrematurely);
            }
        }

        Ok(Some(chunk))
    }
}
