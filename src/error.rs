//! Bridge error type.

use crate::http::Method;
use thiserror::Error;

/// The reason a bridge operation produced no result.
///
/// The exported C functions flatten every variant to a null result; this type
/// keeps the reason available to Rust callers and to the log.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("no string was supplied")]
    Absent,
    #[error("the supplied string is empty")]
    Empty,
    #[error("failed to allocate a {0} byte native buffer")]
    NativeAlloc(usize),
    #[error("host runtime failed to allocate a string of {0} code units")]
    HostAlloc(usize),
    #[error("native {0} callee returned no response")]
    Callee(Method),
}

impl Error {
    /// Returns `true` for errors caused by the caller's input rather than by
    /// an allocator or the callee.
    pub fn is_bad_input(&self) -> bool {
        matches!(self, Error::Absent | Error::Empty)
    }
}
