//! HTTP document source
//!
//! Plain GET with a request timeout and a fixed pause after each successful
//! response. Failed requests are reported once; there is no retry.

use std::io;
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use tracing::{debug, instrument};

use crate::infrastructure::traits::DocumentSource;
use crate::infrastructure::{InfraError, InfraResult};

/// Fetches documents from the live API.
#[derive(Debug)]
pub struct HttpSource {
    client: Client,
    delay: Duration,
}

impl HttpSource {
    pub fn new(timeout: Duration, delay: Duration) -> InfraResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| InfraError::Http {
                message: e.to_string(),
            })?;
        Ok(Self { client, delay })
    }
}

fn to_io_error(e: reqwest::Error) -> io::Error {
    let kind = if e.is_timeout() {
        io::ErrorKind::TimedOut
    } else if e.status() == Some(StatusCode::NOT_FOUND) {
        io::ErrorKind::NotFound
    } else {
        io::ErrorKind::Other
    };
    io::Error::new(kind, e)
}

impl DocumentSource for HttpSource {
    #[instrument(level = "debug", skip(self))]
    fn fetch(&self, url: &str) -> io::Result<String> {
        let body = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
            .map_err(to_io_error)?;
        debug!("fetched {} bytes", body.len());

        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        Ok(body)
    }
}
