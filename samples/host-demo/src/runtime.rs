//! Host runtime imports required by the bridge.

use http_bridge::{HostStr, HostString};
use std::{process, ptr, ptr::NonNull};

#[no_mangle]
pub extern "C" fn host_make_string(len: usize, fill: u16) -> *mut HostStr {
    match HostString::try_filled(len, fill) {
        Some(string) => string.into_raw().as_ptr(),
        None => ptr::null_mut(),
    }
}

#[no_mangle]
pub extern "C" fn host_log(level: u32, message: &HostStr) {
    let level = match level {
        1 => "ERROR",
        2 => "WARN",
        3 => "INFO",
        _ => "DEBUG",
    };
    eprintln!("{:<5} {}", level, message.to_string_lossy());
}

#[no_mangle]
pub extern "C" fn host_abort(
    message: &HostStr,
    file: Option<&HostStr>,
    line: u32,
    column: u32,
) -> ! {
    match file {
        Some(file) => eprintln!(
            "ABORT {} at {}:{}:{}",
            message.to_string_lossy(),
            file.to_string_lossy(),
            line,
            column,
        ),
        None => eprintln!("ABORT {}", message.to_string_lossy()),
    }
    process::abort()
}

/// Takes ownership of a string the bridge allocated through
/// [`host_make_string`].
pub fn take_string(ptr: NonNull<HostStr>) -> HostString {
    // SAFETY: The bridge only hands out strings from `host_make_string`, and
    // each of them exactly once.
    unsafe { HostString::from_raw(ptr) }
}
