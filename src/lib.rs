//! Bridge between a host runtime's UTF-16 strings and a native, blocking HTTP
//! callee taking null-terminated byte strings.

mod abort;
pub mod codec;
pub mod config;
mod error;
pub mod ffi;
pub mod http;
mod logger;
mod sys;

pub use self::{
    config::{Config, Encoding},
    error::Error,
    ffi::string::{HostStr, HostString},
    http::Method,
};
pub use log;

/// Module containing the exported C ABI.
///
/// Every request function returns null on failure, whatever the reason. The
/// reason is logged before it is discarded.
pub mod exports {
    use crate::{abort, http, logger, Config, Error, HostStr, Method};
    use std::ptr::NonNull;

    /// Initializes the bridge: installs the panic hook, the logger and the
    /// configuration read from the environment.
    #[export_name = "http_bridge_start"]
    pub extern "C" fn start() {
        abort::set_panic_hook();
        logger::init(Config::default().log_level);

        let config = Config::from_env();
        config.install();
        log::debug!("started with {:?}", config);
    }

    #[export_name = "http_get"]
    pub extern "C" fn get(url: Option<&HostStr>) -> Option<NonNull<HostStr>> {
        request(Method::Get, url, None)
    }

    #[export_name = "http_post"]
    pub extern "C" fn post(
        url: Option<&HostStr>,
        body: Option<&HostStr>,
    ) -> Option<NonNull<HostStr>> {
        request(Method::Post, url, body)
    }

    #[export_name = "http_put"]
    pub extern "C" fn put(
        url: Option<&HostStr>,
        body: Option<&HostStr>,
    ) -> Option<NonNull<HostStr>> {
        request(Method::Put, url, body)
    }

    #[export_name = "http_delete"]
    pub extern "C" fn delete(url: Option<&HostStr>) -> Option<NonNull<HostStr>> {
        request(Method::Delete, url, None)
    }

    fn request(
        method: Method,
        url: Option<&HostStr>,
        body: Option<&HostStr>,
    ) -> Option<NonNull<HostStr>> {
        let encoding = Config::current().encoding;
        http::request(method, url, body, encoding)
            .map_err(|err| report(method, err))
            .ok()
    }

    fn report(method: Method, err: Error) {
        if err.is_bad_input() {
            log::debug!("{} request not sent: {}", method, err);
        } else {
            log::warn!("{} request failed: {}", method, err);
        }
    }

}
