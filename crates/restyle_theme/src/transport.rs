//! Persistence transport
//!
//! The editor saves and loads theme files through a [`Transport`]. What a
//! URL means (HTTP endpoint, file path, in-memory key) is up to the
//! implementation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::TransportError;

/// Request method used by the save path
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    #[default]
    Post,
    Put,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
        })
    }
}

/// Request/response primitive used to save and load themes
pub trait Transport {
    /// Send `body` to `url`
    fn send(&mut self, method: Method, url: &str, body: &str) -> Result<(), TransportError>;

    /// Fetch the text stored at `url`
    fn load(&mut self, url: &str) -> Result<String, TransportError>;
}
