//! Mock host runtime and native callee bindings.
//!
//! The mocks track every native and host allocation per test thread, can be
//! told to fail allocations and record the calls made to the callee.

use crate::{
    ffi::string::{HostStr, HostString},
    http::Method,
};
use std::{
    cell::RefCell,
    collections::HashSet,
    ffi::CStr,
    os::raw::{c_char, c_void},
    ptr::{self, NonNull},
};

/// A request received by the mocked callee.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Call {
    pub method: Method,
    pub url: Vec<u8>,
    pub body: Option<Vec<u8>>,
}

impl Call {
    pub fn url_str(&self) -> String {
        String::from_utf8_lossy(&self.url).into_owned()
    }
}

type Responder = Box<dyn FnMut(&Call) -> Option<Vec<u8>>>;

#[derive(Default)]
struct State {
    native_live: HashSet<usize>,
    native_sizes: Vec<usize>,
    native_frees: usize,
    native_fail_at: Option<usize>,
    native_attempts: usize,
    strings_live: usize,
    host_fail: bool,
    calls: Vec<Call>,
    responder: Option<Responder>,
    logged: Vec<(u32, String)>,
}

thread_local! {
    static STATE: RefCell<State> = RefCell::new(State::default());
}

fn with<T>(f: impl FnOnce(&mut State) -> T) -> T {
    STATE.with(|state| f(&mut state.borrow_mut()))
}

/// Makes the `n`-th next native allocation (starting at 1) fail.
pub fn fail_native_alloc(n: usize) {
    with(|state| state.native_fail_at = Some(state.native_attempts + n));
}

/// Returns the sizes of all successful native allocations.
pub fn native_sizes() -> Vec<usize> {
    with(|state| state.native_sizes.clone())
}

pub fn native_allocs() -> usize {
    with(|state| state.native_sizes.len())
}

pub fn native_frees() -> usize {
    with(|state| state.native_frees)
}

/// Returns the number of native buffers that have not been freed.
pub fn live_native() -> usize {
    with(|state| state.native_live.len())
}

/// Allocates a tracked native buffer holding `bytes`, the way a callee does.
pub fn raw_native(bytes: &[u8]) -> *mut c_char {
    unsafe {
        let ptr = native::malloc(bytes.len() + 1).cast::<u8>();
        assert!(!ptr.is_null(), "mocked callee allocation failed");
        ptr::copy_nonoverlapping(bytes.as_ptr(), ptr, bytes.len());
        *ptr.add(bytes.len()) = 0;
        ptr.cast()
    }
}

/// Makes the next host string allocation fail.
pub fn fail_host_alloc() {
    with(|state| state.host_fail = true);
}

/// Returns the number of host strings allocated and not yet taken back.
pub fn live_strings() -> usize {
    with(|state| state.strings_live)
}

/// Takes back ownership of a host string allocated by the mocked runtime.
pub fn take_string(ptr: NonNull<HostStr>) -> HostString {
    with(|state| state.strings_live -= 1);
    unsafe { HostString::from_raw(ptr) }
}

/// Sets the mocked callee's behaviour. `None` responses are returned as null.
pub fn respond(responder: impl FnMut(&Call) -> Option<Vec<u8>> + 'static) {
    with(|state| state.responder = Some(Box::new(responder)));
}

/// Returns the calls received by the mocked callee.
pub fn calls() -> Vec<Call> {
    with(|state| state.calls.clone())
}

/// Returns the messages sent to the mocked host log.
pub fn logged() -> Vec<(u32, String)> {
    with(|state| state.logged.clone())
}

pub unsafe fn abort(_: &HostStr, _: Option<&HostStr>, _: u32, _: u32) -> ! {
    unreachable!("mocked abort host method called");
}

pub mod native {
    use super::*;

    pub unsafe fn malloc(size: usize) -> *mut c_void {
        let fail = with(|state| {
            state.native_attempts += 1;
            state.native_fail_at == Some(state.native_attempts)
        });
        if fail {
            return ptr::null_mut();
        }

        let ptr = libc::malloc(size);
        if !ptr.is_null() {
            with(|state| {
                state.native_live.insert(ptr as usize);
                state.native_sizes.push(size);
            });
        }
        ptr
    }

    pub unsafe fn free(ptr: *mut c_void) {
        let known = with(|state| {
            state.native_frees += 1;
            state.native_live.remove(&(ptr as usize))
        });
        assert!(known, "freed unknown or already freed buffer {:?}", ptr);
        libc::free(ptr);
    }
}

pub mod runtime {
    use super::*;

    pub unsafe fn make_string(len: usize, fill: u16) -> *mut HostStr {
        if with(|state| std::mem::take(&mut state.host_fail)) {
            return ptr::null_mut();
        }

        match HostString::try_filled(len, fill) {
            Some(string) => {
                with(|state| state.strings_live += 1);
                string.into_raw().as_ptr()
            }
            None => ptr::null_mut(),
        }
    }
}

pub mod log {
    use super::*;

    pub unsafe fn log(level: u32, message: &HostStr) {
        with(|state| state.logged.push((level, message.to_string_lossy())));
    }
}

pub mod callee {
    use super::*;

    unsafe fn call(method: Method, url: *const c_char, body: *const c_char) -> *mut c_char {
        let call = Call {
            method,
            url: CStr::from_ptr(url).to_bytes().to_vec(),
            body: NonNull::new(body as *mut c_char)
                .map(|body| CStr::from_ptr(body.as_ptr()).to_bytes().to_vec()),
        };

        // NOTE: Take the responder out while it runs so that it may itself
        // use the mock state.
        let mut responder = with(|state| {
            state.calls.push(call.clone());
            state.responder.take()
        });
        let response = responder.as_mut().and_then(|respond| respond(&call));
        with(|state| state.responder = responder);

        match response {
            Some(bytes) => raw_native(&bytes),
            None => ptr::null_mut(),
        }
    }

    pub unsafe fn get(url: *const c_char) -> *mut c_char {
        call(Method::Get, url, ptr::null())
    }

    pub unsafe fn post(url: *const c_char, body: *const c_char) -> *mut c_char {
        call(Method::Post, url, body)
    }

    pub unsafe fn put(url: *const c_char, body: *const c_char) -> *mut c_char {
        call(Method::Put, url, body)
    }

    pub unsafe fn delete(url: *const c_char) -> *mut c_char {
        call(Method::Delete, url, ptr::null())
    }
}
