//! Position service.
//!
//! A [`ParseState`](crate::engine::state::ParseState) builds one
//! [`PositionIndex`] up front (a single pass over the input recording
//! every newline offset, preceded by a sentinel `-1`, matching
//! `original_source/GrammarRule.py`'s `__gen_newline_cache`). Every later
//! `get_position(i)` call is then a binary search instead of a rescan.

/// A byte index resolved into 1-based line/column coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    /// Byte offset into the original input.
    pub index: usize,
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number.
    pub column: usize,
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Precomputed newline offsets for O(log n) position lookups.
///
/// `offsets[0]` is always the sentinel `-1`, so that a `bisect_left`-style
/// search (here: `partition_point`) behaves correctly for indices before
/// the first newline, exactly like the Python original.
#[derive(Debug, Clone)]
pub(crate) struct PositionIndex {
    offsets: Vec<isize>,
}

impl PositionIndex {
    pub(crate) fn build(text: &str) -> Self {
        let mut offsets = vec![-1isize];
        offsets.extend(text.char_indices().filter(|&(_, c)| c == '\n').map(|(i, _)| i as isize));
        PositionIndex { offsets }
    }

    /// Resolve a byte index into a [`Position`].
    ///
    /// Mirrors `bisect.bisect_left(newline_cache, index)`: `line` is the
    /// count of newline offsets strictly less than `index` (the sentinel
    /// counts as "line 0" conceptually, so the first real line is 1), and
    /// `column` is the distance from the newline immediately before
    /// `index` (or the sentinel, for line 1).
    pub(crate) fn get_position(&self, index: usize) -> Position {
        let idx = index as isize;
        let line = self.offsets.partition_point(|&offset| offset < idx);
        let last_newline = self.offsets[line - 1];
        Position { index, line, column: (idx - last_newline) as usize }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_line_first_column() {
        let idx = PositionIndex::build("abc");
        assert_eq!(idx.get_position(0), Position { index: 0, line: 1, column: 1 });
    }

    #[test]
    fn after_newline_resets_column() {
        let idx = PositionIndex::build("ab\ncd");
        // 'c' is at byte index 3, right after the newline at index 2.
        assert_eq!(idx.get_position(3), Position { index: 3, line: 2, column: 1 });
    }

    #[test]
    fn position_at_the_newline_itself_is_end_of_prior_line() {
        let idx = PositionIndex::build("ab\ncd");
        // The newline character itself (index 2) is still on line 1, column 3.
        assert_eq!(idx.get_position(2), Position { index: 2, line: 1, column: 3 });
    }

    #[test]
    fn multiple_newlines() {
        let idx = PositionIndex::build("a\nb\nc");
        assert_eq!(idx.get_position(4), Position { index: 4, line: 3, column: 1 });
    }
}
