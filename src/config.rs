//! Bridge configuration.

use log::LevelFilter;
use std::{
    env,
    str::FromStr,
    sync::atomic::{AtomicU8, Ordering},
};

/// Environment variable selecting the string [`Encoding`].
pub const ENCODING_VAR: &str = "HTTP_BRIDGE_ENCODING";
/// Environment variable selecting the maximum log level.
pub const LOG_VAR: &str = "HTTP_BRIDGE_LOG";

/// How host strings are narrowed into native buffers and widened back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Encoding {
    /// One byte per code unit. Code units above 255 are truncated to their
    /// low 8 bits when encoding; bytes are zero-extended when decoding.
    Latin1,
    /// UTF-16 is transcoded to UTF-8 and back. Invalid sequences are replaced
    /// with `U+FFFD`.
    Utf8,
}

impl Default for Encoding {
    fn default() -> Self {
        Encoding::Latin1
    }
}

impl FromStr for Encoding {
    type Err = UnknownEncoding;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "latin1" | "latin-1" | "iso-8859-1" => Ok(Encoding::Latin1),
            "utf8" | "utf-8" => Ok(Encoding::Utf8),
            _ => Err(UnknownEncoding(s.to_owned())),
        }
    }
}

/// Error parsing an [`Encoding`] name.
#[derive(Debug, thiserror::Error)]
#[error("unknown encoding '{0}'")]
pub struct UnknownEncoding(String);

/// Process-wide bridge configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    pub encoding: Encoding,
    pub log_level: LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            encoding: Encoding::default(),
            log_level: LevelFilter::Debug,
        }
    }
}

static ENCODING: AtomicU8 = AtomicU8::new(0);

impl Config {
    /// Reads the configuration from the environment. Unset variables keep
    /// their defaults; invalid ones are reported and ignored.
    pub fn from_env() -> Self {
        Self::from_vars(|name| env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(value) = var(ENCODING_VAR) {
            match value.parse() {
                Ok(encoding) => config.encoding = encoding,
                Err(err) => log::warn!("ignoring {}: {}", ENCODING_VAR, err),
            }
        }
        if let Some(value) = var(LOG_VAR) {
            match value.parse() {
                Ok(level) => config.log_level = level,
                Err(_) => log::warn!("ignoring {}: unknown level '{}'", LOG_VAR, value),
            }
        }

        config
    }

    /// Makes this configuration the one returned by [`Config::current`] and
    /// applies its log level.
    pub fn install(self) {
        let encoding = match self.encoding {
            Encoding::Latin1 => 0,
            Encoding::Utf8 => 1,
        };
        ENCODING.store(encoding, Ordering::Relaxed);
        log::set_max_level(self.log_level);
    }

    /// Returns the installed configuration.
    pub fn current() -> Self {
        let encoding = match ENCODING.load(Ordering::Relaxed) {
            1 => Encoding::Utf8,
            _ => Encoding::Latin1,
        };
        Self {
            encoding,
            log_level: log::max_level(),
        }
    }
}
