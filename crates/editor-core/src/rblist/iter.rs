use crate::rblist::node::{Node, Seq};

/// Walks the leaves of a sequence left to right.
///
/// Only the right sub-trees still to be visited are kept on the stack, so
/// the auxiliary memory is bounded by the tree depth.
#[derive(Debug)]
pub struct Chunks<'seq> {
    pending: Vec<&'seq Seq>,
    /// Tail of the leaf the walk started in.
    head: &'seq [u8],
}

impl<'seq> Chunks<'seq> {
    pub(crate) fn new(seq: &'seq Seq) -> Self {
        // Random trees of a million bytes stay well under 64 levels.
        let mut pending = Vec::with_capacity(16);

        pending.push(seq);

        Self { pending, head: &[] }
    }

    /// Starts the walk at `offset` (clamped). The first chunk is the tail of
    /// the leaf holding `offset`.
    pub(crate) fn starting_at(seq: &'seq Seq, offset: usize) -> Self {
        let mut offset = offset.min(seq.len());
        let mut pending = Vec::with_capacity(16);
        let mut current = seq;

        loop {
            match current.node() {
                Node::Leaf(leaf) => {
                    return Self {
                        pending,
                        head: &leaf.bytes[offset..],
                    };
                }
                Node::Branch(branch) => {
                    let mid = branch.left.len();

                    if offset < mid {
                        pending.push(&branch.right);
                        current = &branch.left;
                    } else {
                        offset -= mid;
                        current = &branch.right;
                    }
                }
            }
        }
    }

    /// Follows left children down to a leaf, remembering every right sibling.
    fn descend(&mut self, mut seq: &'seq Seq) -> &'seq [u8] {
        loop {
            match seq.node() {
                Node::Leaf(leaf) => return &leaf.bytes,
                Node::Branch(branch) => {
                    self.pending.push(&branch.right);
                    seq = &branch.left;
                }
            }
        }
    }
}

impl<'seq> Iterator for Chunks<'seq> {
    type Item = &'seq [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if !self.head.is_empty() {
            return Some(std::mem::take(&mut self.head));
        }

        loop {
            let seq = self.pending.pop()?;
            let leaf = self.descend(seq);

            if !leaf.is_empty() {
                return Some(leaf);
            }
        }
    }
}

/// Walks the leaves of `[0, end)` right to left.
#[derive(Debug)]
pub struct RevChunks<'seq> {
    /// Left sub-trees still to be visited.
    pending: Vec<&'seq Seq>,
    /// Front of the leaf the walk started in.
    head: &'seq [u8],
}

impl<'seq> RevChunks<'seq> {
    pub(crate) fn ending_at(seq: &'seq Seq, end: usize) -> Self {
        let mut end = end.min(seq.len());
        let mut pending = Vec::with_capacity(16);
        let mut current = seq;

        loop {
            match current.node() {
                Node::Leaf(leaf) => {
                    return Self {
                        pending,
                        head: &leaf.bytes[..end],
                    };
                }
                Node::Branch(branch) => {
                    let mid = branch.left.len();

                    if end <= mid {
                        current = &branch.left;
                    } else {
                        pending.push(&branch.left);
                        end -= mid;
                        current = &branch.right;
                    }
                }
            }
        }
    }

    fn descend(&mut self, mut seq: &'seq Seq) -> &'seq [u8] {
        loop {
            match seq.node() {
                Node::Leaf(leaf) => return &leaf.bytes,
                Node::Branch(branch) => {
                    self.pending.push(&branch.left);
                    seq = &branch.right;
                }
            }
        }
    }
}

impl<'seq> Iterator for RevChunks<'seq> {
    type Item = &'seq [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if !self.head.is_empty() {
            return Some(std::mem::take(&mut self.head));
        }

        loop {
            let seq = self.pending.pop()?;
            let leaf = self.descend(seq);

            if !leaf.is_empty() {
                return Some(leaf);
            }
        }
    }
}

/// Lazily yields the bytes of a sequence. Restart by calling
/// [`Seq::iter`] again.
#[derive(Debug)]
pub struct Bytes<'seq> {
    chunks: Chunks<'seq>,
    current: &'seq [u8],
    remaining: usize,
}

impl<'seq> Bytes<'seq> {
    pub(crate) fn new(seq: &'seq Seq) -> Self {
        Self {
            chunks: Chunks::new(seq),
            current: &[],
            remaining: seq.len(),
        }
    }
}

impl Iterator for Bytes<'_> {
    type Item = u8;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((&first, rest)) = self.current.split_first() {
                self.current = rest;
                self.remaining -= 1;

                return Some(first);
            }

            self.current = self.chunks.next()?;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Bytes<'_> {}

impl std::iter::FusedIterator for Bytes<'_> {}

#[cfg(test)]
mod tests {
    use crate::rblist::{Balancer, Seq};

    #[test]
    fn test_iterate_empty() {
        let seq = Seq::empty();

        assert_eq!(seq.iter().next(), None);
        assert_eq!(seq.chunks().count(), 0);
    }

    #[test]
    fn test_iterate_matches_source() {
        let text: Vec<u8> = (0..1_000u32).map(|i| b'a' + (i % 26) as u8).collect();
        let seq = Balancer::seeded(11).from_bytes(&text);
        let collected: Vec<u8> = seq.iter().collect();

        assert_eq!(collected, text);
        assert_eq!(seq.iter().len(), text.len());
    }

    #[test]
    fn test_iterate_is_restartable() {
        let seq = Balancer::seeded(3).from_bytes(b"restartable iteration over a long enough sequence");
        let mut first = seq.iter();

        first.next();
        first.next();

        assert_eq!(seq.iter().next(), Some(b'r'));
        assert_eq!(first.next(), Some(b's'));
    }

    #[test]
    fn test_chunks_skip_empty_leaves() {
        let mut balancer = Balancer::seeded(5);
        let tail = balancer.from_bytes(b"abc");
        let seq = balancer.concat(&Seq::empty(), &tail);

        let chunks: Vec<&[u8]> = seq.chunks().collect();

        assert_eq!(chunks, vec![b"abc".as_slice()]);
    }

    #[test]
    fn test_chunks_respect_leaf_threshold() {
        let text = vec![b'z'; 4_096];
        let seq = Balancer::seeded(9).from_bytes(&text);

        assert!(
            seq.chunks()
                .all(|chunk| chunk.len() < crate::rblist::LEAF_THRESHOLD)
        );
        assert_eq!(seq.chunks().map(<[u8]>::len).sum::<usize>(), 4_096);
    }

    #[test]
    fn test_chunks_from_offset() {
        let text: Vec<u8> = (0..500u32).map(|i| b'a' + (i % 23) as u8).collect();
        let seq = Balancer::seeded(13).from_bytes(&text);

        for offset in [0, 1, 31, 32, 250, 499, 500, 900] {
            let tail: Vec<u8> = seq.chunks_from(offset).flatten().copied().collect();

            assert_eq!(tail, text[offset.min(500)..], "offset {offset}");
        }
    }

    #[test]
    fn test_chunks_rev() {
        let text: Vec<u8> = (0..500u32).map(|i| b'a' + (i % 19) as u8).collect();
        let seq = Balancer::seeded(14).from_bytes(&text);

        for end in [0, 1, 31, 32, 250, 500, 900] {
            let chunks: Vec<&[u8]> = seq.chunks_rev(end).collect();
            let front: Vec<u8> = chunks.into_iter().rev().flatten().copied().collect();

            assert_eq!(front, text[..end.min(500)], "end {end}");
        }
    }
}
