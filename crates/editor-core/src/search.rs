//! Plain substring scans over a buffer's bytes.

/// True if `pattern` has no upper-case ASCII letter.
///
/// With `regex` set, the byte after each backslash is skipped, so `\W` does
/// not count as upper case.
#[must_use]
pub fn no_upper(pattern: &[u8], regex: bool) -> bool {
    let mut bytes = pattern.iter();

    while let Some(&byte) = bytes.next() {
        if regex && byte == b'\\' {
            bytes.next();
        } else if byte.is_ascii_uppercase() {
            return false;
        }
    }

    true
}

/// Offset of the first match of `pattern` starting at or after `from`.
///
/// Only the leaves from `from` up to the match are visited. A window keeps
/// the last `pattern.len() - 1` bytes of the previous leaf so matches that
/// straddle a leaf boundary are found.
#[must_use]
pub fn search_forward(
    text: &crate::rblist::Seq,
    from: usize,
    pattern: &[u8],
    fold_case: bool,
) -> Option<usize> {
    let from = from.min(text.len());

    if pattern.is_empty() {
        return Some(from);
    }

    let needle = prepare_pattern(pattern, fold_case);
    let finder = memchr::memmem::Finder::new(&needle);
    let keep = needle.len() - 1;
    let mut window: Vec<u8> = Vec::with_capacity(keep + crate::rblist::LEAF_THRESHOLD);
    let mut window_start = from;

    for chunk in text.chunks_from(from) {
        let appended = window.len();

        window.extend_from_slice(chunk);

        if fold_case {
            window[appended..].make_ascii_lowercase();
        }

        if let Some(idx) = finder.find(&window) {
            return Some(window_start + idx);
        }

        let dropped = window.len().saturating_sub(keep);

        window.drain(..dropped);
        window_start += dropped;
    }

    None
}

/// Offset of the last match of `pattern` that ends at or before `to`.
#[must_use]
pub fn search_backward(
    text: &crate::rblist::Seq,
    to: usize,
    pattern: &[u8],
    fold_case: bool,
) -> Option<usize> {
    let to = to.min(text.len());

    if pattern.is_empty() {
        return Some(to);
    }

    let needle = prepare_pattern(pattern, fold_case);
    let finder = memchr::memmem::FinderRev::new(&needle);
    let keep = needle.len() - 1;
    let mut window: Vec<u8> = Vec::new();
    let mut window_start = to;

    for chunk in text.chunks_rev(to) {
        let mut next = Vec::with_capacity(chunk.len() + keep);

        next.extend_from_slice(chunk);

        if fold_case {
            next.make_ascii_lowercase();
        }

        next.extend_from_slice(&window[..window.len().min(keep)]);
        window = next;
        window_start -= chunk.len();

        if let Some(idx) = finder.rfind(&window) {
            return Some(window_start + idx);
        }
    }

    None
}

fn prepare_pattern(pattern: &[u8], fold_case: bool) -> std::borrow::Cow<'_, [u8]> {
    if fold_case {
        std::borrow::Cow::Owned(pattern.to_ascii_lowercase())
    } else {
        std::borrow::Cow::Borrowed(pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rblist::Balancer;

    #[test]
    fn test_no_upper() {
        assert!(no_upper(b"hello world", false));
        assert!(!no_upper(b"Hello", false));
        assert!(no_upper(b"\\Word", true));
        assert!(!no_upper(b"\\Word", false));
        assert!(!no_upper(b"a\\bC", true));
        assert!(no_upper(b"trailing\\", true));
    }

    #[test]
    fn test_search_forward() {
        let text = Balancer::seeded(4).from_bytes(
            b"the cat sat on the mat; the Cat came back, and THE cat stayed",
        );

        assert_eq!(search_forward(&text, 0, b"the", false), Some(0));
        assert_eq!(search_forward(&text, 1, b"the", false), Some(15));
        assert_eq!(search_forward(&text, 25, b"Cat", false), Some(28));
        assert_eq!(search_forward(&text, 47, b"the", false), None);
        assert_eq!(search_forward(&text, 47, b"the", true), Some(47));
        assert_eq!(search_forward(&text, 1_000, b"the", false), None);
    }

    #[test]
    fn test_search_backward() {
        let text = Balancer::seeded(5).from_bytes(b"one two one two one");

        assert_eq!(search_backward(&text, 19, b"one", false), Some(16));
        assert_eq!(search_backward(&text, 18, b"one", false), Some(8));
        assert_eq!(search_backward(&text, 2, b"one", false), None);
        assert_eq!(search_backward(&text, 100, b"TWO", true), Some(12));
    }

    #[test]
    fn test_matches_across_leaf_boundaries() {
        let text: Vec<u8> = (0..600u32).map(|i| b'a' + (i * 7 % 26) as u8).collect();
        let seq = Balancer::seeded(6).from_bytes(&text);
        let upper = Balancer::seeded(6).from_bytes(&text.to_ascii_uppercase());
        let mut boundary = 0;

        let leaves: Vec<usize> = seq.chunks().map(<[u8]>::len).collect();
        assert!(leaves.len() > 10);

        for len in leaves {
            boundary += len;

            if boundary < 3 || boundary + 3 > text.len() {
                continue;
            }

            let pattern = &text[boundary - 3..boundary + 3];
            let expected = memchr::memmem::find(&text, pattern);

            assert_eq!(search_forward(&seq, 0, pattern, false), expected);
            assert_eq!(search_forward(&seq, boundary - 3, pattern, false), Some(boundary - 3));
            assert_eq!(search_backward(&seq, boundary + 3, pattern, false), Some(boundary - 3));
            assert_eq!(search_forward(&upper, boundary - 3, pattern, true), Some(boundary - 3));
            assert_eq!(search_backward(&upper, boundary + 3, pattern, true), Some(boundary - 3));
        }
    }

    #[test]
    fn test_empty_pattern_matches_in_place() {
        let text = Balancer::seeded(1).from_bytes(b"abc");

        assert_eq!(search_forward(&text, 2, b"", false), Some(2));
        assert_eq!(search_backward(&text, 9, b"", false), Some(3));
    }
}
