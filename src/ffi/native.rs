//! Owned null-terminated native byte buffers.

use crate::{error::Error, sys};
use std::{
    ffi::CStr,
    fmt::{self, Debug, Formatter},
    os::raw::c_char,
    ptr::{self, NonNull},
    slice,
};

/// A null-terminated byte buffer allocated with the C allocator.
///
/// The buffer is released with `free` exactly once, when the guard is
/// dropped. This holds for buffers allocated by the bridge as well as for
/// buffers adopted from a native callee with [`NativeBuf::from_raw`].
pub struct NativeBuf {
    ptr: NonNull<c_char>,
}

impl NativeBuf {
    /// Allocates a buffer of `len + 1` bytes, lets `fill` write the first
    /// `len` bytes and terminates it with a zero byte.
    pub fn alloc_with(len: usize, fill: impl FnOnce(&mut [u8])) -> Result<Self, Error> {
        let size = len.checked_add(1).ok_or(Error::NativeAlloc(len))?;

        // SAFETY: `malloc` either fails with null or returns `size` writable
        // bytes. The guard is constructed before `fill` runs so that the
        // buffer is released if it panics.
        unsafe {
            let ptr = NonNull::new(sys::native::malloc(size).cast::<c_char>())
                .ok_or(Error::NativeAlloc(size))?;
            let buffer = Self { ptr };

            // NOTE: `malloc` returns uninitialized memory, which must not be
            // viewed as a slice before it is written. Zeroing it also writes
            // the terminator.
            ptr::write_bytes(ptr.as_ptr().cast::<u8>(), 0, size);
            let bytes = slice::from_raw_parts_mut(ptr.as_ptr().cast::<u8>(), len);
            fill(bytes);

            Ok(buffer)
        }
    }

    /// Copies `bytes` into a new native buffer and terminates it.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        Self::alloc_with(bytes.len(), |buf| buf.copy_from_slice(bytes))
    }

    /// Takes ownership of a buffer returned over FFI. A null pointer yields
    /// `None`.
    ///
    /// # Safety
    ///
    /// A non-null `ptr` must point to a null-terminated buffer allocated with
    /// the C allocator, and ownership must not be retained by anyone else.
    pub unsafe fn from_raw(ptr: *mut c_char) -> Option<Self> {
        NonNull::new(ptr).map(|ptr| Self { ptr })
    }

    /// Returns the FFI pointer to the buffer. The pointer is valid for as
    /// long as the guard is alive.
    pub fn as_ptr(&self) -> *const c_char {
        self.ptr.as_ptr()
    }

    /// Returns the buffer as a C string, up to its first zero byte.
    pub fn as_c_str(&self) -> &CStr {
        // SAFETY: The buffer is always null-terminated.
        unsafe { CStr::from_ptr(self.ptr.as_ptr()) }
    }

    /// Returns the bytes of the buffer without the terminator.
    pub fn as_bytes(&self) -> &[u8] {
        self.as_c_str().to_bytes()
    }
}

impl Drop for NativeBuf {
    fn drop(&mut self) {
        unsafe { sys::native::free(self.ptr.as_ptr().cast()) }
    }
}

impl Debug for NativeBuf {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Debug::fmt(self.as_c_str(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sys::mock;

    #[test]
    fn allocates_terminated_buffer() {
        let buffer = NativeBuf::from_bytes(b"abc").unwrap();
        assert_eq!(buffer.as_bytes(), b"abc");
        assert_eq!(mock::native_sizes(), [4]);

        drop(buffer);
        assert_eq!(mock::live_native(), 0);
    }

    #[test]
    fn allocation_failure() {
        mock::fail_native_alloc(1);
        assert!(matches!(
            NativeBuf::from_bytes(b"abc"),
            Err(Error::NativeAlloc(4))
        ));
        assert_eq!(mock::live_native(), 0);
    }

    #[test]
    fn adopts_and_releases_raw_buffer() {
        assert!(unsafe { NativeBuf::from_raw(std::ptr::null_mut()) }.is_none());

        let raw = mock::raw_native(b"response");
        let buffer = unsafe { NativeBuf::from_raw(raw) }.unwrap();
        assert_eq!(buffer.as_bytes(), b"response");
        assert_eq!(mock::live_native(), 1);

        drop(buffer);
        assert_eq!(mock::live_native(), 0);
        assert_eq!(mock::native_frees(), 1);
    }

    #[test]
    fn unwritten_bytes_are_zero() {
        let buffer = NativeBuf::alloc_with(4, |bytes| {
            assert!(bytes.iter().all(|&byte| byte == 0));
            bytes[0] = b'x';
        })
        .unwrap();
        assert_eq!(buffer.as_bytes(), b"x");
        assert_eq!(mock::native_sizes(), [5]);
    }

    #[test]
    fn released_when_fill_panics() {
        let result = std::panic::catch_unwind(|| {
            let _ = NativeBuf::alloc_with(2, |_| panic!("fill failed"));
        });
        assert!(result.is_err());
        assert_eq!(mock::live_native(), 0);
    }
}
