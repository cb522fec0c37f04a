/// A location in the document as a (line, column) pair.
///
/// Both are 0-based; `column` is a byte offset within the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Point {
    pub line: usize,
    pub column: usize,
}

impl Point {
    #[must_use]
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A normalised span of the document, `start <= end`.
///
/// `size` and `line_count` are computed once, when the region is built
/// against a buffer's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub start: usize,
    pub end: usize,
    /// Byte count, `end - start`.
    pub size: usize,
    /// Line terminators inside the region.
    pub line_count: usize,
}

impl Region {
    /// Builds the region between two offsets of `text`, in either order.
    /// Both are clamped to the text.
    #[must_use]
    pub fn new(text: &crate::rblist::Seq, a: usize, b: usize) -> Self {
        let len = text.len();
        let start = std::cmp::min(a, b).min(len);
        let end = std::cmp::max(a, b).min(len);

        Self {
            start,
            end,
            size: end - start,
            line_count: text.newlines_before(end) - text.newlines_before(start),
        }
    }

    /// An empty region at `pos`, the target of a pure insertion.
    #[must_use]
    pub fn empty_at(text: &crate::rblist::Seq, pos: usize) -> Self {
        Self::new(text, pos, pos)
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rblist::Balancer;

    #[test]
    fn test_point_ordering() {
        assert!(Point::new(1, 0) > Point::new(0, 40));
        assert!(Point::new(2, 3) < Point::new(2, 4));
        assert_eq!(Point::default(), Point::new(0, 0));
    }

    #[test]
    fn test_region_normalises_and_counts() {
        let text = Balancer::seeded(1).from_bytes(b"Line 1\nLine 2\nLine 3");
        let region = Region::new(&text, 12, 3);

        assert_eq!(region.start, 3);
        assert_eq!(region.end, 12);
        assert_eq!(region.size, 9);
        assert_eq!(region.line_count, 1);
    }

    #[test]
    fn test_region_clamps() {
        let text = Balancer::seeded(2).from_bytes(b"abc\n");
        let region = Region::new(&text, 2, 100);

        assert_eq!((region.start, region.end), (2, 4));
        assert_eq!(region.size, 2);
        assert_eq!(region.line_count, 1);

        let empty = Region::empty_at(&text, 50);

        assert!(empty.is_empty());
        assert_eq!(empty.start, 4);
    }
}
