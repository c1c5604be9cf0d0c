//! Conversion between host strings and native buffers.

use crate::{
    config::Encoding,
    error::Error,
    ffi::{native::NativeBuf, string::HostStr},
    sys,
};
use std::{ffi::CStr, ptr::NonNull};

/// Encodes a host string into a new null-terminated native buffer owned by
/// the caller.
///
/// Absent and empty strings are rejected without allocating. With
/// [`Encoding::Latin1`] the buffer is exactly one byte per code unit plus the
/// terminator, and code units above 255 keep only their low 8 bits. A code
/// unit whose low 8 bits are zero ends the string early for the reader.
pub fn encode(host: Option<&HostStr>, encoding: Encoding) -> Result<NativeBuf, Error> {
    let host = host.ok_or(Error::Absent)?;
    if host.is_empty() {
        return Err(Error::Empty);
    }

    let code_units = host.code_units();
    match encoding {
        Encoding::Latin1 => {
            let truncated = code_units.iter().filter(|&&unit| unit > 0xff).count();
            if truncated > 0 {
                log::warn!(
                    "{} of {} code units are outside Latin-1 and were truncated",
                    truncated,
                    code_units.len(),
                );
            }
            // NOTE: Code units such as U+0100 or U+4E00 truncate to a zero
            // byte, which terminates the string early for the callee.
            if let Some(end) = code_units.iter().position(|&unit| unit as u8 == 0) {
                log::warn!(
                    "encoded string ends at code unit {} of {}, a zero byte cuts it short",
                    end,
                    code_units.len(),
                );
            }

            NativeBuf::alloc_with(code_units.len(), |bytes| {
                for (byte, unit) in bytes.iter_mut().zip(code_units) {
                    *byte = *unit as u8;
                }
            })
        }
        Encoding::Utf8 => NativeBuf::from_bytes(host.to_string_lossy().as_bytes()),
    }
}

/// Decodes a native buffer into a new host string allocated by the host
/// runtime. The native buffer is only borrowed.
pub fn decode(native: Option<&CStr>, encoding: Encoding) -> Result<NonNull<HostStr>, Error> {
    let bytes = native.ok_or(Error::Absent)?.to_bytes();

    match encoding {
        Encoding::Latin1 => make_string(bytes.len(), |units| {
            for (unit, byte) in units.iter_mut().zip(bytes) {
                *unit = u16::from(*byte);
            }
        }),
        Encoding::Utf8 => {
            let code_units = String::from_utf8_lossy(bytes)
                .encode_utf16()
                .collect::<Vec<_>>();
            make_string(code_units.len(), |units| units.copy_from_slice(&code_units))
        }
    }
}

/// Allocates a host string of `len` code units through the host runtime and
/// fills it.
fn make_string(len: usize, fill: impl FnOnce(&mut [u16])) -> Result<NonNull<HostStr>, Error> {
    // SAFETY: The host either fails with null or returns a string of exactly
    // `len` code units that is not yet shared with anyone.
    unsafe {
        let mut string =
            NonNull::new(sys::runtime::make_string(len, 0)).ok_or(Error::HostAlloc(len))?;
        fill(string.as_mut().code_units_mut());
        Ok(string)
    }
}
