//! Native HTTP callee implemented with libcurl.
//!
//! Each function performs a blocking transfer and returns the response body
//! as a `malloc`ed, null-terminated buffer owned by the caller, or null if the
//! transfer failed. Status codes and headers are not inspected.

use anyhow::{Context as _, Result};
use curl::easy::Easy;
use http_bridge::{log, Method};
use std::{ffi::CStr, os::raw::c_char, ptr};

#[no_mangle]
pub extern "C" fn native_http_get(url: *const c_char) -> *mut c_char {
    respond(Method::Get, url, ptr::null())
}

#[no_mangle]
pub extern "C" fn native_http_post(url: *const c_char, body: *const c_char) -> *mut c_char {
    respond(Method::Post, url, body)
}

#[no_mangle]
pub extern "C" fn native_http_put(url: *const c_char, body: *const c_char) -> *mut c_char {
    respond(Method::Put, url, body)
}

#[no_mangle]
pub extern "C" fn native_http_delete(url: *const c_char) -> *mut c_char {
    respond(Method::Delete, url, ptr::null())
}

fn respond(method: Method, url: *const c_char, body: *const c_char) -> *mut c_char {
    // SAFETY: The bridge passes null-terminated buffers that outlive the call.
    let (url, body) = unsafe {
        (
            (!url.is_null()).then(|| CStr::from_ptr(url)),
            (!body.is_null()).then(|| CStr::from_ptr(body)),
        )
    };

    match perform(method, url, body) {
        Ok(response) => to_malloc(&response),
        Err(err) => {
            log::warn!("{} transfer failed: {:?}", method, err);
            ptr::null_mut()
        }
    }
}

/// Performs the transfer and returns the response body.
fn perform(method: Method, url: Option<&CStr>, body: Option<&CStr>) -> Result<Vec<u8>> {
    let url = url.context("missing URL")?.to_str()?;

    let mut easy = Easy::new();
    easy.url(url)?;
    match method {
        Method::Get => easy.get(true)?,
        Method::Post => {
            easy.post(true)?;
            easy.post_fields_copy(body.context("missing POST body")?.to_bytes())?;
        }
        Method::Put => {
            easy.custom_request("PUT")?;
            easy.post_fields_copy(body.context("missing PUT body")?.to_bytes())?;
        }
        Method::Delete => easy.custom_request("DELETE")?,
    }

    let mut buffer = Vec::new();
    {
        let mut transfer = easy.transfer();
        transfer.write_function(|chunk| {
            buffer.extend_from_slice(chunk);
            Ok(chunk.len())
        })?;
        transfer.perform()?;
    }

    Ok(buffer)
}

/// Copies `bytes` into a null-terminated buffer allocated with `malloc`. A
/// zero byte inside `bytes` ends the string early for the reader. Returns
/// null if the allocation fails.
fn to_malloc(bytes: &[u8]) -> *mut c_char {
    unsafe {
        let buffer = libc::malloc(bytes.len() + 1).cast::<u8>();
        if buffer.is_null() {
            return ptr::null_mut();
        }
        ptr::copy_nonoverlapping(bytes.as_ptr(), buffer, bytes.len());
        *buffer.add(bytes.len()) = 0;
        buffer.cast()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malloc_copy_is_terminated() {
        let buffer = to_malloc(b"hello");
        assert_eq!(unsafe { CStr::from_ptr(buffer) }.to_bytes(), b"hello");
        unsafe { libc::free(buffer.cast()) };
    }

    #[test]
    fn invalid_arguments_return_null() {
        assert!(native_http_get(ptr::null()).is_null());

        let url = CStr::from_bytes_with_nul(b"http://localhost/\0").unwrap();
        assert!(native_http_post(url.as_ptr(), ptr::null()).is_null());
    }
}
