//! Module containing FFI utilities for mapping between the host runtime's
//! string ABI and the C ABI of the native callee.
//!
//! # Ownership
//!
//! Host strings passed in by the host are borrowed for the duration of a call
//! and never freed here. Host strings handed back are allocated with the host
//! runtime's allocator and belong to the host.
//!
//! Native buffers are always wrapped in a [`native::NativeBuf`] guard, which
//! frees them with the C allocator on every exit path. Buffers returned by
//! the callee are adopted into a guard immediately.

pub mod buffer;
pub mod native;
pub mod string;
