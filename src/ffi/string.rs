//! Host runtime string implementation.

use crate::ffi::buffer::{HostBuf, HostBuffer};
use std::{
    fmt::{self, Debug, Formatter},
    ops::Deref,
    ptr::NonNull,
    string::FromUtf16Error,
};

/// A borrowed host string: a length-prefixed sequence of UTF-16 code units.
///
/// Dynamically sized types are not safe over FFI boundries, so it is important
/// to only use `HostStr` (and not `HostString`) as exported and imported
/// function parameter types.
#[repr(transparent)]
pub struct HostStr {
    inner: HostBuf<u16>,
}

impl HostStr {
    /// Returns the number of UTF-16 code units in the string.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the string has no code units.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the raw UTF-16 code units of the string.
    pub fn code_units(&self) -> &[u16] {
        self.inner.as_slice()
    }

    /// Returns the raw UTF-16 code units of the string for writing.
    pub fn code_units_mut(&mut self) -> &mut [u16] {
        self.inner.as_mut_slice()
    }

    /// Converts the host string into a Rust `String`.
    pub fn to_string(&self) -> Result<String, FromUtf16Error> {
        String::from_utf16(self.code_units())
    }

    /// Converts the host string into a Rust `String`, replacing invalid data
    /// with the replacement character (`U+FFFD`).
    pub fn to_string_lossy(&self) -> String {
        String::from_utf16_lossy(self.code_units())
    }
}

impl Debug for HostStr {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Debug::fmt(&self.to_string_lossy(), f)
    }
}

/// A Rust-owned host string.
pub struct HostString {
    inner: Box<HostBuffer<u16>>,
}

impl HostString {
    /// Creates a new host string from a Rust string slice.
    pub fn new(s: impl AsRef<str>) -> Self {
        let s = s.as_ref();

        let code_units = {
            let mut buffer = Vec::with_capacity(s.len());
            buffer.extend(s.encode_utf16());
            buffer
        };

        Self::from_code_units(&code_units)
    }

    /// Creates a new host string from raw UTF-16 code units. The code units
    /// do not need to be valid UTF-16.
    pub fn from_code_units(code_units: &[u16]) -> Self {
        HostString {
            inner: HostBuffer::new(code_units),
        }
    }

    /// Creates a host string of `len` copies of `fill`, returning `None` if
    /// the allocation fails.
    pub fn try_filled(len: usize, fill: u16) -> Option<Self> {
        let inner = HostBuffer::try_filled(len, fill)?;
        Some(HostString { inner })
    }

    /// Returns a reference to a borrowed host string.
    pub fn as_host_str(&self) -> &HostStr {
        // SAFETY: `HostStr` has a `transparent` representation and so has an
        // identical memory representation to a `HostBuf<u16>`.
        unsafe { &*(self.inner.as_buf() as *const HostBuf<u16>).cast() }
    }

    /// Leaks the string as a thin pointer suitable for handing to the host.
    pub fn into_raw(self) -> NonNull<HostStr> {
        HostBuffer::into_buf_ptr(self.inner).cast()
    }

    /// Reclaims a string previously leaked with [`HostString::into_raw`].
    ///
    /// # Safety
    ///
    /// `ptr` must come from `into_raw` and must not be reclaimed twice.
    pub unsafe fn from_raw(ptr: NonNull<HostStr>) -> Self {
        HostString {
            inner: HostBuffer::from_buf_ptr(ptr.cast()),
        }
    }
}

impl Deref for HostString {
    type Target = HostStr;

    fn deref(&self) -> &Self::Target {
        self.as_host_str()
    }
}

impl Debug for HostString {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Debug::fmt(self.as_host_str(), f)
    }
}
