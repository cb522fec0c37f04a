/// What a recorded undo delta describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeltaKind {
    /// `old_size` bytes at `pos` were replaced by `new_size` bytes.
    ReplaceBlock,
    /// Opens a group of deltas undone as one step.
    StartSequence,
    /// Closes a group of deltas undone as one step.
    EndSequence,
}

/// Who is asking the undo log to record a delta.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Recording {
    /// An ordinary edit; the undo cursor jumps to the new delta.
    Command,
    /// The compensating delta of a revert; the undo cursor stays put so the
    /// undo walk continues into older history.
    Undo,
}

/// Case conversions applied to a word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Case {
    Upper,
    Lower,
    Capitalize,
}

impl Case {
    /// Converts `bytes` in place. Only ASCII letters change.
    pub fn apply(self, bytes: &mut [u8]) {
        for (idx, byte) in bytes.iter_mut().enumerate() {
            *byte = match self {
                Case::Upper => byte.to_ascii_uppercase(),
                Case::Lower => byte.to_ascii_lowercase(),
                Case::Capitalize if idx == 0 => byte.to_ascii_uppercase(),
                Case::Capitalize => byte.to_ascii_lowercase(),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_apply() {
        let mut word = *b"hELLo9";

        Case::Upper.apply(&mut word);
        assert_eq!(&word, b"HELLO9");

        Case::Lower.apply(&mut word);
        assert_eq!(&word, b"hello9");

        Case::Capitalize.apply(&mut word);
        assert_eq!(&word, b"Hello9");
    }
}
