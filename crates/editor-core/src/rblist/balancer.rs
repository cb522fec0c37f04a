use rand::{Rng, SeedableRng};
use std::cmp::Ordering;

use crate::rblist::LEAF_THRESHOLD;
use crate::rblist::node::{Node, Seq};

/// Source of the random split points that shape every sequence.
///
/// Determinism only matters for reproducible tests; use [`Balancer::seeded`]
/// there and [`Balancer::new`] everywhere else.
#[derive(Clone, Debug)]
pub struct Balancer {
    rng: rand::rngs::StdRng,
}

/// Work left over while walking down a concatenation or a split.
enum Frame {
    /// A finished sub-tree that sits left of the result still being built.
    Before(Seq),
    /// A finished sub-tree that sits right of the result still being built.
    After(Seq),
}

/*

====================
===== CREATION =====
====================

*/

impl Balancer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: rand::rngs::StdRng::from_entropy(),
        }
    }

    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: rand::rngs::StdRng::seed_from_u64(seed),
        }
    }

    /// A cut point uniform in `[1, len - 1]`. `len` must be at least 2.
    #[inline]
    fn cut(&mut self, len: usize) -> usize {
        self.rng.gen_range(1..len)
    }
}

impl Default for Balancer {
    fn default() -> Self {
        Self::new()
    }
}

/*

========================
===== CONSTRUCTORS =====
========================

*/

impl Balancer {
    /// Builds a sequence whose whole shape is drawn at random.
    ///
    /// This is the reference distribution every other operation preserves.
    pub fn from_bytes(&mut self, bytes: &[u8]) -> Seq {
        if bytes.len() < LEAF_THRESHOLD {
            return Seq::leaf(bytes);
        }

        let pos = self.cut(bytes.len());
        let left = self.from_bytes(&bytes[..pos]);
        let right = self.from_bytes(&bytes[pos..]);

        Seq::branch(left, right)
    }

    /// Concatenates two sequences.
    ///
    /// The result is distributed like `from_bytes(left ++ right)` provided the
    /// operands were independent and correctly distributed. When the random
    /// cut falls inside an operand that is already a branch, its existing
    /// cut is reused: that cut was itself uniform, so no sub-tree needs
    /// rebuilding.
    pub fn concat(&mut self, left: &Seq, right: &Seq) -> Seq {
        let mut frames = Vec::new();
        let mut left = left.clone();
        let mut right = right.clone();

        let mut joined = loop {
            let mid = left.len();
            let total = mid + right.len();

            if total < LEAF_THRESHOLD {
                break Seq::merge_leaves(&left, &right);
            }

            if mid == 0 {
                break right;
            }

            if right.is_empty() {
                break left;
            }

            let pos = self.cut(total);

            match pos.cmp(&mid) {
                Ordering::Less => {
                    let (kept, rest) = Self::random_split(&left, pos);

                    frames.push(Frame::Before(kept));
                    left = rest;
                }
                Ordering::Greater => {
                    let (rest, kept) = Self::random_split(&right, pos - mid);

                    frames.push(Frame::After(kept));
                    right = rest;
                }
                Ordering::Equal => break Seq::branch(left, right),
            }
        };

        while let Some(frame) = frames.pop() {
            joined = match frame {
                Frame::Before(kept) => Seq::branch(kept, joined),
                Frame::After(kept) => Seq::branch(joined, kept),
            };
        }

        joined
    }

    /// Takes `seq` apart at a uniformly random point.
    ///
    /// A leaf is cut at `pos`, which the caller drew uniformly from
    /// `[1, len - 1]`. A branch is cut where it was cut when it was built.
    fn random_split(seq: &Seq, pos: usize) -> (Seq, Seq) {
        match seq.node() {
            Node::Leaf(leaf) => (Seq::leaf(&leaf.bytes[..pos]), Seq::leaf(&leaf.bytes[pos..])),
            Node::Branch(branch) => (branch.left.clone(), branch.right.clone()),
        }
    }
}

/*

=====================
===== SPLITTING =====
=====================

*/

impl Balancer {
    /// Splits `seq` into `[0, pos)` and `[pos, len)`. `pos` is clamped.
    pub fn split(&mut self, seq: &Seq, pos: usize) -> (Seq, Seq) {
        let pos = pos.min(seq.len());

        if pos == 0 {
            return (Seq::empty(), seq.clone());
        }

        if pos == seq.len() {
            return (seq.clone(), Seq::empty());
        }

        let mut frames = Vec::new();
        let mut current = seq.clone();
        let mut offset = pos;

        let (mut head, mut tail) = loop {
            let next = match current.node() {
                Node::Leaf(leaf) => {
                    break (
                        Seq::leaf(&leaf.bytes[..offset]),
                        Seq::leaf(&leaf.bytes[offset..]),
                    );
                }
                Node::Branch(branch) => {
                    let mid = branch.left.len();

                    match offset.cmp(&mid) {
                        Ordering::Less => {
                            frames.push(Frame::After(branch.right.clone()));
                            branch.left.clone()
                        }
                        Ordering::Greater => {
                            frames.push(Frame::Before(branch.left.clone()));
                            offset -= mid;
                            branch.right.clone()
                        }
                        Ordering::Equal => break (branch.left.clone(), branch.right.clone()),
                    }
                }
            };

            current = next;
        };

        // Re-attach the untouched siblings innermost first.
        while let Some(frame) = frames.pop() {
            match frame {
                Frame::Before(kept) => head = self.concat(&kept, &head),
                Frame::After(kept) => tail = self.concat(&tail, &kept),
            }
        }

        (head, tail)
    }

    /// The bytes in `[from, to)`. Both bounds are clamped.
    pub fn substring(&mut self, seq: &Seq, from: usize, to: usize) -> Seq {
        let to = to.min(seq.len());
        let from = from.min(to);
        let (head, _) = self.split(seq, to);
        let (_, middle) = self.split(&head, from);

        middle
    }

    /// Replaces `[start, end)` of `seq` with `replacement`.
    pub fn splice(&mut self, seq: &Seq, start: usize, end: usize, replacement: &Seq) -> Seq {
        let end = end.min(seq.len());
        let start = start.min(end);
        let (head, rest) = self.split(seq, start);
        let (_, tail) = self.split(&rest, end - start);
        let head = self.concat(&head, replacement);

        self.concat(&head, &tail)
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn text_with_newlines() -> impl Strategy<Value = Vec<u8>> {
        prop::collection::vec(
            prop_oneof![4 => (b'a'..=b'z').prop_map(|c| c), 1 => Just(b'\n')],
            0..300,
        )
    }

    proptest! {
        #[test]
        fn prop_from_bytes_round_trips(text in text_with_newlines(), seed in any::<u64>()) {
            let seq = Balancer::seeded(seed).from_bytes(&text);

            prop_assert_eq!(seq.to_bytes(), text.clone());
            prop_assert_eq!(seq.len(), text.len());
            prop_assert_eq!(seq.newlines(), text.iter().filter(|&&b| b == b'\n').count());
        }

        #[test]
        fn prop_split_partitions(text in text_with_newlines(), at in any::<prop::sample::Index>(), seed in any::<u64>()) {
            let mut balancer = Balancer::seeded(seed);
            let seq = balancer.from_bytes(&text);
            let i = at.index(text.len() + 1);
            let (head, tail) = balancer.split(&seq, i);

            prop_assert_eq!(head.len(), i);
            prop_assert_eq!(head.to_bytes(), text[..i].to_vec());
            prop_assert_eq!(tail.to_bytes(), text[i..].to_vec());

            let joined = balancer.concat(&head, &tail);

            prop_assert_eq!(joined.to_bytes(), text);
        }

        #[test]
        fn prop_concat_adds_counts(left in text_with_newlines(), right in text_with_newlines(), seed in any::<u64>()) {
            let mut balancer = Balancer::seeded(seed);
            let a = balancer.from_bytes(&left);
            let b = balancer.from_bytes(&right);
            let joined = balancer.concat(&a, &b);

            prop_assert_eq!(joined.len(), a.len() + b.len());
            prop_assert_eq!(joined.newlines(), a.newlines() + b.newlines());
            prop_assert_eq!(joined.to_bytes(), [left, right].concat());
        }
    }
}
