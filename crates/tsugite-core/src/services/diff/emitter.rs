use crate::models::{DiffChunk, Line};

/// Builds a unified diff from selected lines.
///
/// Callers register hunks as context with [`add_context`] and stage the
/// changes to include with [`add_diffs`]; [`create_patch`] then renders a
/// patch containing exactly the staged insertions and deletions, with
/// unstaged context rows demoted to plain context. Staging everything a
/// hunk carries reproduces the hunk verbatim; staging a subset yields the
/// partial patch git would need to apply just those lines.
///
/// [`add_context`]: Self::add_context
/// [`add_diffs`]: Self::add_diffs
/// [`create_patch`]: Self::create_patch
pub struct UnifiedEmitter {
    old_file: String,
    new_file: String,
    context: Vec<Line>,
    diffs: Vec<Line>,
}

impl UnifiedEmitter {
    /// Emitter for a patch against a single path; the file-pair header gets
    /// the conventional `a/`/`b/` prefixes.
    pub fn new(path: &str) -> Self {
        Self::with_paths(path, path)
    }

    /// Emitter whose old and new sides carry different paths, for patches
    /// across a rename.
    pub fn with_paths(old_path: &str, new_path: &str) -> Self {
        UnifiedEmitter {
            old_file: format!("a/{old_path}"),
            new_file: format!("b/{new_path}"),
            context: Vec::new(),
            diffs: Vec::new(),
        }
    }

    /// Register a hunk's rows as context for the patch. Unchanged rows are
    /// kept as-is; deletions are kept too, since an unstaged deletion must
    /// reappear as an untouched row. Insertions are not context: unstaged
    /// inserted text simply does not exist on the old side.
    pub fn add_context(&mut self, chunk: &DiffChunk) {
        self.context.extend(
            chunk
                .lines
                .iter()
                .filter(|line| !matches!(line, Line::Insertion { .. }))
                .cloned(),
        );
    }

    /// Stage lines for inclusion in the patch. Same lines are dropped;
    /// everything else is kept, in any order and across any number of
    /// calls.
    pub fn add_diffs(&mut self, lines: &[Line]) {
        self.diffs.extend(
            lines
                .iter()
                .filter(|line| !matches!(line, Line::Same { .. }))
                .cloned(),
        );
    }

    /// Stage every change a hunk carries, with the hunk itself as context.
    pub fn add_chunk_diffs(&mut self, chunk: &DiffChunk) {
        self.add_context(chunk);
        self.add_diffs(&chunk.lines);
    }

    /// Render the staged lines as a unified diff. Row numbers are recomputed
    /// from scratch: each staged insertion shifts the rows below it down,
    /// each staged deletion shifts them up, and unstaged changes contribute
    /// no shift at all.
    ///
    /// With nothing staged the patch is the empty string, file header
    /// included. The emitter is not consumed; staging more lines and
    /// rendering again is fine.
    pub fn create_patch(&self, include_file_header: bool) -> String {
        log::debug!(
            "rendering patch for {} from {} context and {} staged lines",
            self.new_file,
            self.context.len(),
            self.diffs.len()
        );
        let merged = self.merge_walk();

        let mut hunks = String::new();
        let mut start = 0;
        while start < merged.len() {
            let end = run_end(&merged, start);
            render_run(&mut hunks, &merged[start..end]);
            start = end;
        }
        if hunks.is_empty() {
            return String::new();
        }

        let mut patch = String::new();
        if include_file_header {
            patch.push_str(&format!("--- {}\n+++ {}\n", self.old_file, self.new_file));
        }
        patch.push_str(&hunks);
        patch
    }

    /// Interleave context and staged lines into one ordered listing with
    /// patch-local row numbers.
    ///
    /// Both buffers are sorted by (old row, new row) and walked together;
    /// on a tie the staged line goes first, and `last_old` then suppresses
    /// the context copy of the same row. `skew` tracks the new-side shift
    /// produced by the staged lines seen so far.
    fn merge_walk(&self) -> Vec<Line> {
        let mut context = self.context.clone();
        let mut diffs = self.diffs.clone();
        context.sort_by_key(|line| line.sort_key());
        context.dedup();
        diffs.sort_by_key(|line| line.sort_key());
        diffs.dedup();

        let mut merged = Vec::new();
        let mut skew: i64 = 0;
        let mut last_old: u32 = 0;
        let mut context = context.iter().peekable();
        let mut diffs = diffs.iter().peekable();

        loop {
            let from_context = match (context.peek(), diffs.peek()) {
                (Some(ctx), Some(diff)) => ctx.sort_key() < diff.sort_key(),
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (None, None) => break,
            };
            if from_context {
                if let Some(line) = context.next() {
                    // An unstaged deletion's row is still present, so both
                    // Same and Deletion context render as an unchanged row.
                    let old = line.sort_key().0;
                    if old > last_old {
                        merged.push(Line::same(old, shifted(old, skew), line.text()));
                        last_old = old;
                    }
                }
            } else if let Some(line) = diffs.next() {
                match line {
                    Line::Deletion { old_line, text, .. } => {
                        merged.push(Line::del(*old_line, shifted(*old_line, skew), text.as_str()));
                        skew -= 1;
                        last_old = *old_line;
                    }
                    Line::Insertion { old_anchor, text, .. } => {
                        merged.push(Line::ins(
                            *old_anchor,
                            shifted(*old_anchor, skew),
                            text.as_str(),
                        ));
                        skew += 1;
                    }
                    // Same lines are filtered out in add_diffs.
                    Line::Same { .. } => {}
                }
            }
        }
        merged
    }
}

fn shifted(row: u32, skew: i64) -> u32 {
    (i64::from(row) + skew) as u32
}

/// End (exclusive) of the contiguous run starting at `start`.
///
/// A run extends while each Same/Deletion consumes exactly the next old
/// row, and each Insertion anchors on that next row or the one just
/// consumed. Any gap in old rows starts a new hunk.
fn run_end(lines: &[Line], start: usize) -> usize {
    let mut next_old = match &lines[start] {
        Line::Insertion { old_anchor, .. } => *old_anchor,
        line => line.sort_key().0 + 1,
    };
    let mut end = start + 1;
    while end < lines.len() {
        match &lines[end] {
            Line::Insertion { old_anchor, .. } => {
                if *old_anchor + 1 < next_old || *old_anchor > next_old {
                    break;
                }
            }
            line => {
                let old = line.sort_key().0;
                if old != next_old {
                    break;
                }
                next_old = old + 1;
            }
        }
        end += 1;
    }
    end
}

/// Append one `@@` hunk for the run. Runs that carry no staged change are
/// dropped entirely.
fn render_run(patch: &mut String, run: &[Line]) {
    if run.iter().all(|line| matches!(line, Line::Same { .. })) {
        return;
    }

    let old_count = run
        .iter()
        .filter(|line| !matches!(line, Line::Insertion { .. }))
        .count() as u32;
    let new_count = run
        .iter()
        .filter(|line| !matches!(line, Line::Deletion { .. }))
        .count() as u32;

    // A side with no rows names the row before the change instead of the
    // first row of the run.
    let (first_old, first_new) = run[0].sort_key();
    let old_start = if old_count == 0 {
        first_old.saturating_sub(1)
    } else {
        first_old
    };
    let new_start = if new_count == 0 {
        first_new.saturating_sub(1)
    } else {
        first_new
    };

    patch.push_str(&format!(
        "@@ -{old_start},{old_count} +{new_start},{new_count} @@\n"
    ));
    for line in run {
        patch.push(line.marker());
        patch.push_str(line.text());
        patch.push('\n');
    }
}
