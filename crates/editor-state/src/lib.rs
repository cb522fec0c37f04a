//! Editor commands layered over [`editor_core::text::TextBuffer`].
//!
//! - [`document::Document`] wraps one buffer with the commands a key binding
//!   would call: self-insert, kill region, case words, replace-string.
//! - [`isearch::IncrementalSearch`] tracks one incremental search session
//!   and puts point back when it is cancelled.

pub mod document;
pub mod isearch;
