//! Character-offset ranges and their adjustment across document edits.
//!
//! A [`NodeRange`] is the stable coordinate a pointer stores for a node: a
//! half-open `[start, end)` range in Unicode scalar values (`char`) within the
//! node's containing document. When the document is edited the stored range is
//! shifted so that a later restoration searches the right place.
//!
//! The shift policy is deliberately conservative: when an edit makes the exact
//! boundary ambiguous, the range is kept **wide** rather than narrow. An
//! over-wide range still finds the node through the kind + position scan, while
//! an under-wide range can miss it entirely.

use crate::document::DocEdit;

/// A half-open character-offset range (`start..end`) in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRange {
    /// Range start offset (inclusive), in `char`s from the start of the document.
    pub start: usize,
    /// Range end offset (exclusive), in `char`s from the start of the document.
    pub end: usize,
}

impl NodeRange {
    /// Create a new range. `start` must not exceed `end`.
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "range start {start} exceeds end {end}");
        Self { start, end }
    }

    /// Length of the range in characters.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Check if the range is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Check if this range fully contains `other`.
    pub fn contains_range(&self, other: NodeRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Shift the range to account for an applied edit.
    ///
    /// The deletion part of the edit is mapped first, then the insertion
    /// (matching the order in which a replace mutates the document):
    ///
    /// - a deletion entirely before the range shifts both endpoints left;
    /// - a deletion entirely after the range leaves it untouched;
    /// - an overlapping deletion clamps the overlapped endpoints to the
    ///   deletion boundaries, so the surviving text stays covered;
    /// - an insertion strictly before the range shifts both endpoints right;
    /// - an insertion at the start, inside, or at the end of the range grows
    ///   the end only, keeping the range wide.
    pub fn adjusted_for(&self, edit: &DocEdit) -> NodeRange {
        let mut start = self.start;
        let mut end = self.end;

        if edit.deleted_len > 0 {
            let del_start = edit.offset;
            let del_end = edit.offset + edit.deleted_len;
            start = if del_end <= start {
                start - edit.deleted_len
            } else {
                start.min(del_start)
            };
            end = if del_end <= end {
                end - edit.deleted_len
            } else {
                end.min(del_start)
            };
            end = end.max(start);
        }

        if edit.inserted_len > 0 {
            if edit.offset < start {
                start += edit.inserted_len;
                end += edit.inserted_len;
            } else if edit.offset <= end {
                end += edit.inserted_len;
            }
        }

        NodeRange::new(start, end)
    }
}

impl From<std::ops::Range<usize>> for NodeRange {
    fn from(range: std::ops::Range<usize>) -> Self {
        NodeRange::new(range.start, range.end)
    }
}
