//! Raw-byte persistence for text buffers.
//!
//! Loading goes through a read-only memory map, saving through a temporary
//! file in the destination directory that is renamed into place.
pub mod atomic;
pub mod mmap;
