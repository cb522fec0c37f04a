use std::cmp::Ordering;
use std::rc::Rc;

/// A contiguous run of bytes, always shorter than
/// [`LEAF_THRESHOLD`](crate::rblist::LEAF_THRESHOLD).
#[derive(Debug)]
pub struct LeafNode {
    pub bytes: Box<[u8]>,
    pub newlines: usize,
}

/// The concatenation of two shorter sequences.
#[derive(Debug)]
pub struct BranchNode {
    pub len: usize,
    pub newlines: usize,
    pub left: Seq,
    pub right: Seq,
}

#[derive(Debug)]
pub enum Node {
    Leaf(LeafNode),
    Branch(BranchNode),
}

/// Shared handle to an immutable sequence node.
///
/// Cloning is O(1) and aliases the whole sub-tree.
#[derive(Clone, Debug)]
pub struct Seq(Rc<Node>);

/*

====================
===== CREATION =====
====================

*/

impl Seq {
    /// The zero-length sequence.
    #[must_use]
    pub fn empty() -> Self {
        Self::leaf(&[])
    }

    #[must_use]
    pub fn singleton(byte: u8) -> Self {
        Self::leaf(&[byte])
    }

    pub(crate) fn leaf(bytes: &[u8]) -> Self {
        debug_assert!(bytes.len() < crate::rblist::LEAF_THRESHOLD);

        Self(Rc::new(Node::Leaf(LeafNode {
            bytes: bytes.into(),
            newlines: memchr::memchr_iter(b'\n', bytes).count(),
        })))
    }

    pub(crate) fn branch(left: Seq, right: Seq) -> Self {
        debug_assert!(left.len() + right.len() >= crate::rblist::LEAF_THRESHOLD);

        Self(Rc::new(Node::Branch(BranchNode {
            len: left.len() + right.len(),
            newlines: left.newlines() + right.newlines(),
            left,
            right,
        })))
    }

    /// Joins two short sequences into a single leaf.
    pub(crate) fn merge_leaves(left: &Seq, right: &Seq) -> Self {
        let mut bytes = Vec::with_capacity(left.len() + right.len());

        for chunk in left.chunks().chain(right.chunks()) {
            bytes.extend_from_slice(chunk);
        }

        Self::leaf(&bytes)
    }
}

/*

==========================
===== INLINE METHODS =====
==========================

*/

impl Seq {
    #[inline]
    pub fn node(&self) -> &Node {
        &self.0
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        match self.node() {
            Node::Leaf(leaf) => leaf.bytes.len(),
            Node::Branch(branch) => branch.len,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of `\n` bytes in the sequence.
    #[inline]
    #[must_use]
    pub fn newlines(&self) -> usize {
        match self.node() {
            Node::Leaf(leaf) => leaf.newlines,
            Node::Branch(branch) => branch.newlines,
        }
    }

    /// True if both handles alias the same node.
    #[inline]
    #[must_use]
    pub fn ptr_eq(&self, other: &Seq) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/*

===================
===== GETTERS =====
===================

*/

impl Seq {
    /// Returns the byte at `pos`, or `None` past the end.
    #[must_use]
    pub fn get(&self, mut pos: usize) -> Option<u8> {
        let mut current = self;

        loop {
            match current.node() {
                Node::Leaf(leaf) => return leaf.bytes.get(pos).copied(),
                Node::Branch(branch) => {
                    let mid = branch.left.len();

                    if pos < mid {
                        current = &branch.left;
                    } else {
                        pos -= mid;
                        current = &branch.right;
                    }
                }
            }
        }
    }

    /// Counts the line terminators in `[0, offset)`. `offset` is clamped.
    #[must_use]
    pub fn newlines_before(&self, offset: usize) -> usize {
        let mut offset = offset.min(self.len());
        let mut current = self;
        let mut count = 0;

        loop {
            match current.node() {
                Node::Leaf(leaf) => {
                    return count + memchr::memchr_iter(b'\n', &leaf.bytes[..offset]).count();
                }
                Node::Branch(branch) => {
                    let mid = branch.left.len();

                    if offset <= mid {
                        current = &branch.left;
                    } else {
                        count += branch.left.newlines();
                        offset -= mid;
                        current = &branch.right;
                    }
                }
            }
        }
    }

    /// Offset of the first byte of line `line` (0-based).
    ///
    /// Returns `None` if the sequence has fewer than `line + 1` lines.
    #[must_use]
    pub fn line_start(&self, line: usize) -> Option<usize> {
        if line == 0 {
            return Some(0);
        }

        if line > self.newlines() {
            return None;
        }

        // The terminator ending line `line - 1`, counted from zero.
        let mut nth = line - 1;
        let mut current = self;
        let mut base = 0;

        loop {
            match current.node() {
                Node::Leaf(leaf) => {
                    let idx = memchr::memchr_iter(b'\n', &leaf.bytes).nth(nth)?;

                    return Some(base + idx + 1);
                }
                Node::Branch(branch) => {
                    let left_newlines = branch.left.newlines();

                    if nth < left_newlines {
                        current = &branch.left;
                    } else {
                        nth -= left_newlines;
                        base += branch.left.len();
                        current = &branch.right;
                    }
                }
            }
        }
    }

    /// Copies the whole sequence into a flat buffer.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.len());

        for chunk in self.chunks() {
            bytes.extend_from_slice(chunk);
        }

        bytes
    }

    /// Lazily yields every byte in order.
    #[must_use]
    pub fn iter(&self) -> crate::rblist::iter::Bytes<'_> {
        crate::rblist::iter::Bytes::new(self)
    }

    /// Lazily yields the non-empty leaves in order.
    #[must_use]
    pub fn chunks(&self) -> crate::rblist::iter::Chunks<'_> {
        crate::rblist::iter::Chunks::new(self)
    }

    /// The leaves of `[offset, len)` in order. O(depth) to start.
    #[must_use]
    pub fn chunks_from(&self, offset: usize) -> crate::rblist::iter::Chunks<'_> {
        crate::rblist::iter::Chunks::starting_at(self, offset)
    }

    /// The leaves of `[0, end)` in reverse order.
    #[must_use]
    pub fn chunks_rev(&self, end: usize) -> crate::rblist::iter::RevChunks<'_> {
        crate::rblist::iter::RevChunks::ending_at(self, end)
    }

    /// Number of node levels on the longest root-to-leaf path.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut stack = vec![(self, 1usize)];
        let mut deepest = 0;

        while let Some((seq, level)) = stack.pop() {
            match seq.node() {
                Node::Leaf(_) => deepest = deepest.max(level),
                Node::Branch(branch) => {
                    stack.push((&branch.left, level + 1));
                    stack.push((&branch.right, level + 1));
                }
            }
        }

        deepest
    }
}

impl Default for Seq {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for Seq {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || (self.len() == other.len() && self.iter().eq(other.iter()))
    }
}

impl Eq for Seq {}

impl PartialOrd for Seq {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Lexicographic byte order; a proper prefix sorts first.
impl Ord for Seq {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<'a> IntoIterator for &'a Seq {
    type Item = u8;
    type IntoIter = crate::rblist::iter::Bytes<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
