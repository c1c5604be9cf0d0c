//! Module containing logger implementation.

use crate::{ffi::string::HostString, sys};
use log::{Level, LevelFilter, Log, Metadata, Record};

/// Logger forwarding `log` facade records to the host runtime's log sink.
pub struct Logger;

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let level = match record.level() {
            Level::Error => ERROR,
            Level::Warn => WARNING,
            Level::Info => INFO,
            Level::Debug | Level::Trace => DEBUG,
        };
        let message = HostString::new(format!("[{}] {}", record.target(), record.args()));

        unsafe {
            sys::log::log(level, &message);
        }
    }

    fn flush(&self) {}
}

/// Initialize logging. Calling this more than once only updates the maximum
/// level.
pub fn init(level: LevelFilter) {
    static LOGGER: Logger = Logger;
    if log::set_logger(&LOGGER).is_err() {
        log::debug!("logger already installed");
    }
    log::set_max_level(level);
}

const ERROR: u32 = 1;
const WARNING: u32 = 2;
const INFO: u32 = 3;
const DEBUG: u32 = 4;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sys::mock;

    #[test]
    fn forwards_records_to_host() {
        log::set_max_level(LevelFilter::Trace);
        for (level, message) in &[
            (Level::Error, "boom"),
            (Level::Warn, "careful"),
            (Level::Trace, "details"),
        ] {
            Logger.log(
                &Record::builder()
                    .level(*level)
                    .target("http_bridge::http")
                    .args(format_args!("{}", message))
                    .build(),
            );
        }

        assert_eq!(
            mock::logged(),
            [
                (ERROR, "[http_bridge::http] boom".to_owned()),
                (WARNING, "[http_bridge::http] careful".to_owned()),
                (DEBUG, "[http_bridge::http] details".to_owned()),
            ]
        );
    }
}
