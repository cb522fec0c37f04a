pub type TextBufferResult<T> = Result<T, TextBufferError>;

#[derive(Debug, thiserror::Error)]
pub enum TextBufferError {
    #[error("i/o error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Buffer is read-only")]
    ReadOnly,
    #[error("No file path associated with this buffer")]
    NoFilePath,
}

/// Reported outcomes of the `undo` command. None of these leave the buffer
/// half-modified; the `Display` text is meant for the minibuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UndoError {
    #[error("Undo disabled in this buffer")]
    Disabled,
    #[error("Buffer is read-only")]
    ReadOnly,
    #[error("No further undo information")]
    NoFurtherUndo,
    #[error("Undo history has an unterminated sequence")]
    UnbalancedSequence,
}
