//! Document loading
//!
//! Fetches METS source text by URL. Externally referenced parent documents
//! (`mets:mptr`) are loaded through the same trait, so tests and embedders
//! can substitute their own source. Callers parse the text with
//! [`MetsDocument::parse`](super::document::MetsDocument::parse), which
//! borrows it.

use std::io::ErrorKind;
use std::path::Path;
use std::time::{Duration, Instant};

use url::Url;

use crate::config::ResolverConfig;

use super::error::{MetsError, Result};

/// Fetches the source of a document
pub trait DocumentLoader {
    fn load(&self, url: &Url) -> Result<String>;
}

/// Time left before `deadline`
///
/// An expired deadline is a retryable [`MetsError::Network`] naming `url`.
pub fn time_left(deadline: Option<Instant>, url: &Url) -> Result<Option<Duration>> {
    let Some(deadline) = deadline else {
        return Ok(None);
    };
    let left = deadline.saturating_duration_since(Instant::now());
    if left.is_zero() {
        return Err(MetsError::deadline_exceeded(url));
    }
    Ok(Some(left))
}

/// Loader for `file:` and `http(s):` URLs
///
/// Network fetches are blocking and bounded by the configured timeout, and
/// by the time left before the deadline if one is set. A timed-out fetch
/// surfaces as a retryable [`MetsError::Network`].
pub struct DefaultLoader {
    client: reqwest::blocking::Client,
    timeout: Duration,
    deadline: Option<Instant>,
    allow_file_urls: bool,
}

impl DefaultLoader {
    pub fn new(config: &ResolverConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.fetch_timeout)
            .user_agent(concat!("mets-resolver/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MetsError::Network {
                url: String::new(),
                message: format!("failed to build HTTP client: {}", e),
                retryable: false,
            })?;

        Ok(Self {
            client,
            timeout: config.fetch_timeout,
            deadline: None,
            allow_file_urls: config.allow_file_urls,
        })
    }

    /// Refuse to start fetches after `deadline` and cut running ones short
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    fn read_file(&self, url: &Url) -> Result<String> {
        let path = url
            .to_file_path()
            .map_err(|_| MetsError::malformed(format!("not a local file URL: {}", url)))?;
        std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => MetsError::not_found("document", url.as_str()),
            _ => MetsError::Network {
                url: url.to_string(),
                message: e.to_string(),
                retryable: false,
            },
        })
    }

    fn fetch(&self, url: &Url) -> Result<String> {
        let timeout = match time_left(self.deadline, url)? {
            Some(left) => left.min(self.timeout),
            None => self.timeout,
        };
        tracing::info!("Fetching {} (timeout {:?})", url, timeout);

        let response = self
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .map_err(|e| network_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MetsError::Network {
                url: url.to_string(),
                message: format!("HTTP {}", status),
                retryable: status.is_server_error(),
            });
        }

        response.text().map_err(|e| network_error(url, &e))
    }
}

fn network_error(url: &Url, err: &reqwest::Error) -> MetsError {
    MetsError::Network {
        url: url.to_string(),
        message: err.to_string(),
        retryable: err.is_timeout() || err.is_connect(),
    }
}

impl DocumentLoader for DefaultLoader {
    fn load(&self, url: &Url) -> Result<String> {
        time_left(self.deadline, url)?;
        match url.scheme() {
            "file" if self.allow_file_urls => self.read_file(url),
            "http" | "https" => self.fetch(url),
            other => Err(MetsError::UnsupportedLocationType {
                file_id: url.to_string(),
                loctype: other.to_string(),
            }),
        }
    }
}

/// Accept either an absolute URL or a filesystem path
pub fn parse_document_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    if let Ok(url) = Url::parse(raw) {
        // a Windows drive letter parses as a one-letter scheme
        if url.scheme().len() > 1 {
            return Ok(url);
        }
    }

    let path = Path::new(raw);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| MetsError::malformed(format!("cannot resolve {}: {}", raw, e)))?
            .join(path)
    };
    Url::from_file_path(&absolute)
        .map_err(|_| MetsError::malformed(format!("invalid document location: {}", raw)))
}
