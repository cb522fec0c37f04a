//! Text storage for one open document: a randomized balanced byte sequence,
//! the buffer model built on it, markers, and an undo log.

pub mod enums;
pub mod errors;
pub mod marker;
pub mod options;
pub mod point;
pub mod rblist;
pub mod search;
pub mod text;
pub mod undo;
