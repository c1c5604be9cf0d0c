//! Module implementing panic handler that reports bridge panics through the
//! host's `abort` import.

use crate::{ffi::string::HostString, sys};
use std::{any::Any, panic};

/// Sets the panic hook to use the host provided `abort` call.
///
/// Panics carrying a string payload are reported with their location; any
/// other payload is reported with the formatted panic info and no location.
pub fn set_panic_hook() {
    panic::set_hook(Box::new(|info| {
        let (message, location) = match payload_message(info.payload()) {
            Some(message) => (HostString::new(message), info.location()),
            None => (HostString::new(info.to_string()), None),
        };
        let (file, line, column) = match location {
            Some(location) => (
                Some(HostString::new(location.file())),
                location.line(),
                location.column(),
            ),
            None => (None, 0, 0),
        };

        let file = file.as_ref().map(|f| f.as_host_str());
        unsafe {
            sys::abort(&message, file, line, column);
        }
    }));
}

/// Returns the message of a `panic!` payload, if it is a string.
fn payload_message(payload: &(dyn Any + Send)) -> Option<&str> {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
}
