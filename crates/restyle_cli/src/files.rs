//! File-backed transport
//!
//! Theme URLs are plain paths (an optional `file://` prefix is stripped),
//! resolved against a root directory.

use restyle_theme::{Method, Transport, TransportError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Clone, Debug, Default)]
pub struct FileTransport {
    root: PathBuf,
}

impl FileTransport {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn resolve(&self, url: &str) -> PathBuf {
        let path = Path::new(url.strip_prefix("file://").unwrap_or(url));
        self.root.join(path)
    }
}

impl Transport for FileTransport {
    fn send(&mut self, method: Method, url: &str, body: &str) -> Result<(), TransportError> {
        if method == Method::Get {
            return Err(TransportError::Rejected {
                method,
                url: url.to_string(),
                reason: "file transport only writes with POST or PUT".to_string(),
            });
        }
        let path = self.resolve(url);
        let io_error = |source| TransportError::Io {
            url: url.to_string(),
            source,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        fs::write(&path, body).map_err(io_error)?;
        debug!("FileTransport: wrote {} bytes to {}", body.len(), path.display());
        Ok(())
    }

    fn load(&mut self, url: &str) -> Result<String, TransportError> {
        let path = self.resolve(url);
        fs::read_to_string(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => TransportError::NotFound(url.to_string()),
            _ => TransportError::Io {
                url: url.to_string(),
                source,
            },
        })
    }
}
