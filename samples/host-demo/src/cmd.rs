//! Command line interface of the sample host.

use crate::runtime;
use anyhow::{Context as _, Result};
use http_bridge::{exports, log::LevelFilter, Config, Encoding, HostString};
use structopt::StructOpt;
use url::Url;

#[derive(StructOpt)]
#[structopt(name = "host-demo", about = "Send HTTP requests through the bridge.")]
pub struct Options {
    #[structopt(
        long,
        default_value = "latin1",
        help = "String encoding used at the native boundary (latin1 or utf8)."
    )]
    encoding: Encoding,

    #[structopt(long, default_value = "info", help = "Maximum bridge log level.")]
    log_level: LevelFilter,

    #[structopt(subcommand)]
    request: Request,
}

#[derive(StructOpt)]
enum Request {
    #[structopt(about = "Send a GET request.")]
    Get { url: Url },
    #[structopt(about = "Send a POST request.")]
    Post { url: Url, body: String },
    #[structopt(about = "Send a PUT request.")]
    Put { url: Url, body: String },
    #[structopt(about = "Send a DELETE request.")]
    Delete { url: Url },
}

pub fn run() -> Result<()> {
    let options = Options::from_args();

    exports::start();
    Config {
        encoding: options.encoding,
        log_level: options.log_level,
    }
    .install();

    let url = HostString::new(options.request.url().as_str());
    let body = options.request.body().map(HostString::new);
    let (url, body) = (Some(url.as_host_str()), body.as_ref().map(|b| b.as_host_str()));

    let response = match options.request {
        Request::Get { .. } => exports::get(url),
        Request::Post { .. } => exports::post(url, body),
        Request::Put { .. } => exports::put(url, body),
        Request::Delete { .. } => exports::delete(url),
    }
    .context("request failed, see the bridge log for the reason")?;

    let response = runtime::take_string(response);
    println!("{}", response.to_string_lossy());

    Ok(())
}

impl Request {
    fn url(&self) -> &Url {
        match self {
            Request::Get { url }
            | Request::Post { url, .. }
            | Request::Put { url, .. }
            | Request::Delete { url } => url,
        }
    }

    fn body(&self) -> Option<&str> {
        match self {
            Request::Post { body, .. } | Request::Put { body, .. } => Some(body),
            Request::Get { .. } | Request::Delete { .. } => None,
        }
    }
}
