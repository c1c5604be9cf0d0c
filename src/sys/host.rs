//! Host runtime and native callee import function bindings.

use crate::ffi::string::HostStr;

extern "C" {
    #[link_name = "host_abort"]
    pub fn abort(message: &HostStr, file: Option<&HostStr>, line: u32, column: u32) -> !;
}

pub mod native {
    pub use libc::{free, malloc};
}

pub mod runtime {
    use super::*;

    extern "C" {
        /// Allocates a host string of `len` copies of `fill` with the host
        /// runtime's allocator. Returns null if the allocation fails.
        #[link_name = "host_make_string"]
        pub fn make_string(len: usize, fill: u16) -> *mut HostStr;
    }
}

pub mod log {
    use super::*;

    extern "C" {
        #[link_name = "host_log"]
        pub fn log(level: u32, message: &HostStr);
    }
}

pub mod callee {
    use std::os::raw::c_char;

    extern "C" {
        #[link_name = "native_http_get"]
        pub fn get(url: *const c_char) -> *mut c_char;

        #[link_name = "native_http_post"]
        pub fn post(url: *const c_char, body: *const c_char) -> *mut c_char;

        #[link_name = "native_http_put"]
        pub fn put(url: *const c_char, body: *const c_char) -> *mut c_char;

        #[link_name = "native_http_delete"]
        pub fn delete(url: *const c_char) -> *mut c_char;
    }
}
