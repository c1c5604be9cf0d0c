//! Forwarding of HTTP requests to the native callee.

use crate::{
    codec,
    config::Encoding,
    error::Error,
    ffi::{native::NativeBuf, string::HostStr},
    sys,
};
use std::{
    fmt::{self, Display, Formatter},
    ptr::NonNull,
};

/// The HTTP verbs the native callee implements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// Returns `true` if requests with this method carry a body.
    pub fn has_body(self) -> bool {
        matches!(self, Method::Post | Method::Put)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Performs a request through the native callee and returns the response as
/// a host string.
///
/// The body is required for `POST` and `PUT` and ignored otherwise. If any
/// required argument fails to encode the callee is never invoked. Every
/// native buffer allocated or received here is released before returning.
pub fn request(
    method: Method,
    url: Option<&HostStr>,
    body: Option<&HostStr>,
    encoding: Encoding,
) -> Result<NonNull<HostStr>, Error> {
    let url = codec::encode(url, encoding)?;
    let body = if method.has_body() {
        Some(codec::encode(body, encoding)?)
    } else {
        None
    };

    log::debug!("{} {:?}", method, url.as_c_str());
    let response = call(method, &url, body.as_ref());
    drop(url);
    drop(body);

    let response = response.ok_or(Error::Callee(method))?;
    codec::decode(Some(response.as_c_str()), encoding)
}

/// Invokes the callee for `method` and adopts the buffer it returns.
fn call(method: Method, url: &NativeBuf, body: Option<&NativeBuf>) -> Option<NativeBuf> {
    let url = url.as_ptr();

    // SAFETY: The arguments are null-terminated and outlive the call. The
    // callee transfers ownership of the returned buffer to us.
    unsafe {
        let response = match (method, body) {
            (Method::Get, _) => sys::callee::get(url),
            (Method::Delete, _) => sys::callee::delete(url),
            (Method::Post, Some(body)) => sys::callee::post(url, body.as_ptr()),
            (Method::Put, Some(body)) => sys::callee::put(url, body.as_ptr()),
            (Method::Post, None) | (Method::Put, None) => {
                unreachable!("{} request without an encoded body", method)
            }
        };
        NativeBuf::from_raw(response)
    }
}
