//! Length-prefixed host buffer implementation.

use std::{
    alloc::{self, Layout, LayoutError},
    fmt::{self, Debug, Formatter},
    ops::{Deref, DerefMut},
    ptr::{self, NonNull},
    slice,
};

/// Internal representation of a host buffer: a `usize` length header
/// immediately followed by the elements.
///
/// `Inner` is declared as a generic struct in order to take advantage of the
/// partial dynamically sized type (DST) support. For more information see:
/// <https://doc.rust-lang.org/nomicon/exotic-sizes.html#dynamically-sized-types-dsts>
#[repr(C)]
struct Inner<T: ?Sized> {
    len: usize,
    buf: T,
}

/// A borrowed host buffer with elements of type `T`.
///
/// This type is sized (its tail is a zero-length array) so references to it
/// are thin pointers and safe to pass over FFI.
#[repr(transparent)]
pub struct HostBuf<T> {
    inner: Inner<[T; 0]>,
}

impl<T> HostBuf<T> {
    /// Returns the number of elements in the buffer.
    pub fn len(&self) -> usize {
        self.inner.len
    }

    /// Returns `true` if the buffer has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the buffer as a Rust slice.
    pub fn as_slice(&self) -> &[T] {
        let Inner { len, buf } = &self.inner;

        // SAFETY: `HostBuf` can only be constructed from a `HostBuffer` which
        // correctly allocates the storage starting at `buf` to have `len`
        // elements. Additionally we *assume* that all `HostBuf` references
        // from host calls are valid in the same way.
        unsafe { slice::from_raw_parts(buf.as_ptr(), *len) }
    }

    /// Returns the buffer as a mutable Rust slice.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        let Inner { len, buf } = &mut self.inner;

        // SAFETY: See `as_slice`.
        unsafe { slice::from_raw_parts_mut(buf.as_mut_ptr(), *len) }
    }
}

impl<T> Debug for HostBuf<T>
where
    T: Debug,
{
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Debug::fmt(&self.as_slice(), f)
    }
}

/// An owned host buffer with elements of type `T`.
#[repr(transparent)]
pub struct HostBuffer<T> {
    inner: Inner<[T]>,
}

impl<T: Copy> HostBuffer<T> {
    /// Creates a new host buffer from the specified slice.
    pub fn new(slice: impl AsRef<[T]>) -> Box<Self> {
        let slice = slice.as_ref();
        let layout = buffer_layout::<T>(slice.len())
            .expect("attempted to allocate a buffer that is larger than the address space.");

        // SAFETY: The allocated buffer is completely initialized by `init`.
        unsafe {
            match alloc_buffer(slice.len()) {
                Some(buffer) => init(buffer, slice.len(), |buf| {
                    // NOTE: Use `ptr::copy` here since the allocated buffer
                    // contains unintialized memory. It is considered
                    // undefined behaviour to create a reference to
                    // uninitialized memory in Rust.
                    ptr::copy(slice.as_ptr(), buf, slice.len())
                }),
                None => alloc::handle_alloc_error(layout),
            }
        }
    }

    /// Creates a new host buffer of `len` copies of `fill`. Returns `None`
    /// if the allocation fails.
    pub fn try_filled(len: usize, fill: T) -> Option<Box<Self>> {
        // SAFETY: Every element is written before the buffer is returned.
        unsafe {
            let buffer = alloc_buffer(len)?;
            Some(init(buffer, len, |buf| {
                for i in 0..len {
                    buf.add(i).write(fill);
                }
            }))
        }
    }
}

impl<T> HostBuffer<T> {
    /// Returns a reference to a borrowed host buffer.
    pub fn as_buf(&self) -> &HostBuf<T> {
        // SAFETY: `HostBuf` shares the header layout and only exposes `len`
        // elements past it.
        unsafe { &*(&self.inner.len as *const usize).cast::<HostBuf<T>>() }
    }

    /// Returns a mutable reference to a borrowed host buffer.
    pub fn as_mut_buf(&mut self) -> &mut HostBuf<T> {
        unsafe { &mut *(&mut self.inner.len as *mut usize).cast::<HostBuf<T>>() }
    }

    /// Converts the owned buffer into an FFI-safe thin pointer. The buffer is
    /// leaked until reclaimed with [`HostBuffer::from_buf_ptr`].
    pub fn into_buf_ptr(this: Box<Self>) -> NonNull<HostBuf<T>> {
        // SAFETY: `Box::into_raw` never returns null.
        unsafe { NonNull::new_unchecked(Box::into_raw(this).cast()) }
    }

    /// Reclaims a buffer previously leaked with [`HostBuffer::into_buf_ptr`].
    ///
    /// # Safety
    ///
    /// `ptr` must come from `into_buf_ptr` and must not be reclaimed twice.
    pub unsafe fn from_buf_ptr(ptr: NonNull<HostBuf<T>>) -> Box<Self> {
        let len = ptr.as_ref().len();
        Box::from_raw(fat_ptr(ptr.as_ptr().cast(), len))
    }
}

impl<T> Deref for HostBuffer<T> {
    type Target = HostBuf<T>;

    fn deref(&self) -> &Self::Target {
        self.as_buf()
    }
}

impl<T> DerefMut for HostBuffer<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_buf()
    }
}

impl<T> Debug for HostBuffer<T>
where
    T: Debug,
{
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Debug::fmt(self.as_buf(), f)
    }
}

/// Returns the memory layout for a host buffer with the specified dynamic
/// length.
fn buffer_layout<T>(len: usize) -> Result<Layout, LayoutError> {
    let (layout, _) = Layout::new::<HostBuf<T>>().extend(Layout::array::<T>(len)?)?;
    // NOTE: Pad to alignment for C ABI compatibility. See
    // <https://doc.rust-lang.org/std/alloc/struct.Layout.html#method.extend>
    Ok(layout.pad_to_align())
}

/// Builds a fat `HostBuffer` pointer from the header address and the
/// element count.
fn fat_ptr<T>(ptr: *mut u8, len: usize) -> *mut HostBuffer<T> {
    // NOTE: A `*mut [T]` and a `*mut HostBuffer<T>` carry the same slice
    // length metadata, so the cast preserves it.
    ptr::slice_from_raw_parts_mut(ptr.cast::<T>(), len) as *mut HostBuffer<T>
}

/// Allocates an uninitialized host buffer with the specified dynamic length.
/// Returns `None` if the layout overflows or the allocator fails.
///
/// # Safety
///
/// The returned pointer refers to *uninitialized* memory and must be passed
/// to `init` before use.
unsafe fn alloc_buffer<T>(len: usize) -> Option<NonNull<HostBuffer<T>>> {
    let layout = buffer_layout::<T>(len).ok()?;
    let ptr = alloc::alloc(layout);
    if ptr.is_null() {
        return None;
    }
    NonNull::new(fat_ptr(ptr, len))
}

/// Writes the header of a freshly allocated buffer and lets `fill` write the
/// `len` elements starting at the provided pointer.
unsafe fn init<T>(
    buffer: NonNull<HostBuffer<T>>,
    len: usize,
    fill: impl FnOnce(*mut T),
) -> Box<HostBuffer<T>> {
    let raw = buffer.as_ptr();
    ptr::addr_of_mut!((*raw).inner.len).write(len);
    fill(ptr::addr_of_mut!((*raw).inner.buf).cast::<T>());
    Box::from_raw(raw)
}
