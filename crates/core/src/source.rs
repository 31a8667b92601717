//! I/O seams: reading source text and probing imported URIs.
//!
//! [`SourceProvider`] keeps file access out of the pipeline so it can run
//! on in-memory text; [`UriProbe`] isolates the one network operation
//! (an HTTP HEAD on imported links) so tests never touch the network.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Trait that abstracts file reads for [`crate::elaborate::parse_file`].
pub trait SourceProvider {
    /// Read the source text for a given path.
    fn read_source(&self, path: &Path) -> Result<String, std::io::Error>;
}

/// Default filesystem-backed source provider.
pub struct FileSystemProvider;

impl SourceProvider for FileSystemProvider {
    fn read_source(&self, path: &Path) -> Result<String, std::io::Error> {
        std::fs::read_to_string(path)
    }
}

/// In-memory source provider for testing.
pub struct InMemoryProvider {
    files: HashMap<PathBuf, String>,
}

impl InMemoryProvider {
    pub fn new(files: HashMap<PathBuf, String>) -> Self {
        Self { files }
    }
}

impl SourceProvider for InMemoryProvider {
    fn read_source(&self, path: &Path) -> Result<String, std::io::Error> {
        self.files.get(path).cloned().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("file not found in memory: {}", path.display()),
            )
        })
    }
}

/// Checks that an imported URI is reachable and reports its content type.
pub trait UriProbe {
    /// `Ok(content_type)` (possibly empty) or a description of the failure.
    fn content_type(&self, uri: &str) -> Result<String, String>;
}

/// Probe that refuses every URI. Useful when network access is unwanted.
pub struct OfflineProbe;

impl UriProbe for OfflineProbe {
    fn content_type(&self, uri: &str) -> Result<String, String> {
        Err(format!("network access is disabled, cannot reach {}", uri))
    }
}

/// HEAD-request probe backed by `ureq`. Failures are not retried.
#[cfg(feature = "http")]
pub struct HttpProbe {
    agent: ureq::Agent,
}

#[cfg(feature = "http")]
impl HttpProbe {
    pub fn new() -> Self {
        Self {
            agent: ureq::Agent::new_with_defaults(),
        }
    }
}

#[cfg(feature = "http")]
impl Default for HttpProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "http")]
impl UriProbe for HttpProbe {
    fn content_type(&self, uri: &str) -> Result<String, String> {
        let response = self.agent.head(uri).call().map_err(|e| e.to_string())?;
        Ok(response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned())
    }
}

/// Canned responses keyed by URI; unknown URIs fail.
#[derive(Default)]
pub struct InMemoryProbe {
    responses: HashMap<String, Result<String, String>>,
}

impl InMemoryProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, uri: &str, content_type: &str) -> Self {
        self.responses
            .insert(uri.to_owned(), Ok(content_type.to_owned()));
        self
    }

    pub fn fail(mut self, uri: &str, reason: &str) -> Self {
        self.responses.insert(uri.to_owned(), Err(reason.to_owned()));
        self
    }
}

impl UriProbe for InMemoryProbe {
    fn content_type(&self, uri: &str) -> Result<String, String> {
        self.responses
            .get(uri)
            .cloned()
            .unwrap_or_else(|| Err(format!("no response registered for {}", uri)))
    }
}
