use std::io;
use thiserror::Error;

/// Failure to open or configure a capture interface
///
/// Always fatal: it is raised before any frame is captured.
#[derive(Debug, Error)]
pub enum InterfaceError {
    #[error("could not list network interfaces: {0}")]
    List(String),
    #[error("interface '{0}' not found")]
    NotFound(String),
    #[error("permission denied on interface '{name}': {reason} (are you running with CAP_NET_RAW?)")]
    PermissionDenied { name: String, reason: String },
    #[error("could not open interface '{name}': {reason}")]
    Open { name: String, reason: String },
    #[error("interface '{name}': unsupported link type {link_type} (only Ethernet is supported)")]
    UnsupportedLinkType { name: String, link_type: i32 },
    #[error("interface '{name}': invalid capture filter '{filter}': {reason}")]
    Filter {
        name: String,
        filter: String,
        reason: String,
    },
    #[error("invalid capture option: {0}")]
    InvalidOption(&'static str),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Generic(&'static str),
    #[error(transparent)]
    Interface(#[from] InterfaceError),
    #[error("capture failed: {0}")]
    Capture(String),
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),
}

impl From<&'static str> for Error {
    fn from(s: &'static str) -> Self {
        Error::Generic(s)
    }
}
