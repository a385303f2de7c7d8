pub use emitter::UnifiedEmitter;
pub use merge::to_lines;
pub use parser::UnifiedParser;

mod emitter;
mod merge;
mod parser;

pub type Result<T> = std::result::Result<T, Error>;

/// A malformed diff. There is no recovery; callers discard the whole
/// parse or merge attempt.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Incomplete file header")]
    IncompleteFileHeader,

    #[error("Malformed chunk header: {0}")]
    MalformedChunkHeader(String),

    #[error("Unexpected blank line in hunk")]
    UnexpectedBlankLine,

    #[error("Unexpected leading character: {0:?}")]
    UnexpectedLeadingCharacter(char),

    #[error("Diff ended prematurely")]
    EndedPrematurely,

    #[error("Row count integrity failure at hunk -{old_start},{old_lines} +{new_start},{new_lines}")]
    RowCountIntegrity {
        old_start: u32,
        old_lines: u32,
        new_start: u32,
        new_lines: u32,
    },
}

#[cfg(test)]
mod tests {
    use test_diffs::DiffFixture;

    use super::*;

    fn reemit(diff: &str, path: &str) -> String {
        let mut parser = UnifiedParser::new(diff);
        parser.next_file_pair().unwrap();
        let mut emitter = UnifiedEmitter::new(path);
        while let Some(chunk) = parser.next_chunk().unwrap() {
            emitter.add_chunk_diffs(&chunk);
        }
        emitter.create_patch(true)
    }

    #[test]
    fn generated_diff_round_trips_byte_for_byte() {
        let fixture = DiffFixture::new(
            "alpha\nbeta\ngamma\ndelta\nepsilon\nzeta\neta\ntheta\n",
        )
        .with_path("src/lines.txt")
        .replace_line(2, "BETA")
        .delete_line(5)
        .insert_line(8, "iota");
        let diff = fixture.unified_diff(1);
        assert!(!diff.is_empty());
        assert_eq!(reemit(&diff, fixture.path()), diff);
    }

    #[test]
    fn merged_listing_carries_both_sides_of_the_fixture() {
        let fixture = DiffFixture::new("one\ntwo\nthree\nfour\n").replace_line(3, "THREE");
        let diff = fixture.unified_diff(1);
        let lines = to_lines(fixture.original(), &diff).unwrap();

        let old_side: String = lines
            .iter()
            .filter(|line| line.old_line().is_some())
            .map(|line| format!("{}\n", line.text()))
            .collect();
        let new_side: String = lines
            .iter()
            .filter(|line| line.new_line().is_some())
            .map(|line| format!("{}\n", line.text()))
            .collect();
        assert_eq!(old_side, fixture.original());
        assert_eq!(new_side, fixture.modified());
    }

    #[test]
    fn staging_one_chunk_of_many_keeps_original_row_numbers() {
        // Leaving the first hunk unstaged must not shift the second hunk's
        // coordinates; the staged patch has to apply to the pristine file.
        let fixture = DiffFixture::new("a\nb\nc\nd\ne\nf\ng\nh\ni\nj\n")
            .replace_line(2, "B")
            .replace_line(9, "I");
        let diff = fixture.unified_diff(1);

        let mut parser = UnifiedParser::new(&diff);
        parser.next_file_pair().unwrap();
        let first = parser.next_chunk().unwrap().unwrap();
        let second = parser.next_chunk().unwrap().unwrap();
        assert!(parser.next_chunk().unwrap().is_none());
        assert_eq!(first.old_start, 1);

        let mut emitter = UnifiedEmitter::new(fixture.path());
        emitter.add_chunk_diffs(&second);
        assert_eq!(
            emitter.create_patch(true),
            "--- a/file.txt\n+++ b/file.txt\n@@ -8,3 +8,3 @@\n h\n-i\n+I\n j\n"
        );
    }
}
