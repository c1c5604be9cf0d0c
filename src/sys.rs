//! Host runtime and native callee import bindings.

#[cfg(not(test))]
#[path = "sys/host.rs"]
mod bindings;

#[cfg(test)]
#[path = "sys/mock.rs"]
pub mod mock;

#[cfg(not(test))]
pub use self::bindings::*;

#[cfg(test)]
pub use self::mock::{abort, callee, log, native, runtime};
