//! Windows capture backend.

mod gdi;

pub use gdi::GdiBackend;
