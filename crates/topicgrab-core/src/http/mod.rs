//! HTTP GET for listing pages, topic pages and image bodies.
//!
//! Uses the curl crate (libcurl) with a fixed browser-like header set and
//! bounded timeouts. Every call is a single attempt: failures come back as
//! [`FetchError`] values and the caller decides to skip the unit of work.
//! Runs in the current thread; call from `spawn_blocking` if used from async code.

mod decode;
mod error;

pub use decode::decode_page;
pub use error::{classify_curl_error, FailureKind, FetchError};

use crate::config::{ConfigError, CrawlConfig, HttpConfig};
use encoding_rs::Encoding;
use std::cell::Cell;
use std::io::Write;
use std::time::Duration;

const MAX_REDIRECTS: u32 = 10;

/// Page and image fetcher built once from the crawl configuration.
#[derive(Debug, Clone)]
pub struct Fetcher {
    user_agent: String,
    headers: Vec<String>,
    timeout: Duration,
    connect_timeout: Duration,
    encoding: &'static Encoding,
}

impl Fetcher {
    pub fn new(cfg: &CrawlConfig) -> Result<Self, ConfigError> {
        Ok(Self::with_http(&cfg.http, cfg.encoding()?))
    }

    pub fn with_http(http: &HttpConfig, encoding: &'static Encoding) -> Self {
        let mut headers = Vec::new();
        if !http.accept.trim().is_empty() {
            headers.push(format!("Accept: {}", http.accept.trim()));
        }
        if !http.accept_language.trim().is_empty() {
            headers.push(format!("Accept-Language: {}", http.accept_language.trim()));
        }
        Self {
            user_agent: http.user_agent.clone(),
            headers,
            timeout: http.timeout(),
            connect_timeout: http.connect_timeout(),
            encoding,
        }
    }

    /// GET `url` and decode the body with the site encoding.
    pub fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let mut body = Vec::new();
        self.stream_to(url, &mut body)?;
        Ok(decode_page(&body, self.encoding))
    }

    /// GET `url`, writing the body into `out` chunk by chunk as it arrives.
    ///
    /// Returns the number of body bytes written. Bodies of non-2xx responses are
    /// discarded rather than written, and reported as [`FetchError::Http`].
    pub fn stream_to<W: Write>(&self, url: &str, out: &mut W) -> Result<u64, FetchError> {
        let mut easy = self.easy(url)?;

        // Status of the most recent response head; redirects produce several.
        let status = Cell::new(0u32);
        let written = Cell::new(0u64);
        let mut sink_error: Option<std::io::Error> = None;

        let performed = {
            let mut transfer = easy.transfer();
            transfer.header_function(|line| {
                if let Some(code) = parse_status_line(line) {
                    status.set(code);
                }
                true
            })?;
            transfer.write_function(|data| {
                if !is_success(status.get()) {
                    return Ok(data.len());
                }
                match out.write_all(data) {
                    Ok(()) => {
                        written.set(written.get() + data.len() as u64);
                        Ok(data.len())
                    }
                    Err(e) => {
                        sink_error = Some(e);
                        // Short count makes curl abort with a write error.
                        Ok(0)
                    }
                }
            })?;
            transfer.perform()
        };

        if let Err(e) = performed {
            if let Some(io_err) = sink_error {
                return Err(FetchError::Sink(io_err));
            }
            return Err(FetchError::Transport(e));
        }

        let code = easy.response_code()?;
        if !is_success(code) {
            return Err(FetchError::Http(code));
        }
        out.flush().map_err(FetchError::Sink)?;
        Ok(written.get())
    }

    fn easy(&self, url: &str) -> Result<curl::easy::Easy, curl::Error> {
        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(MAX_REDIRECTS)?;
        easy.useragent(&self.user_agent)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;
        // Empty string = every encoding libcurl was built with.
        easy.accept_encoding("")?;

        let mut list = curl::easy::List::new();
        for header in &self.headers {
            list.append(header)?;
        }
        if !self.headers.is_empty() {
            easy.http_headers(list)?;
        }
        Ok(easy)
    }
}

fn is_success(code: u32) -> bool {
    (200..300).contains(&code)
}

/// Extracts the status code from an `HTTP/x.y NNN reason` header line.
fn parse_status_line(line: &[u8]) -> Option<u32> {
    let line = std::str::from_utf8(line).ok()?;
    if !line.starts_with("HTTP/") {
        return None;
    }
    line.split_whitespace().nth(1)?.parse().ok()
}
