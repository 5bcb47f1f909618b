//! Error types for GeoJSON conversion jobs

use std::error::Error;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Everything that can go wrong while converting one file
#[derive(Debug)]
pub enum ConversionError {
    /// Input file does not exist
    FileNotFound(PathBuf),
    /// Reading or writing a file failed
    Io { path: PathBuf, source: io::Error },
    /// Input is not well-formed JSON
    Parse { path: PathBuf, source: serde_json::Error },
    /// Input is JSON but not something we can convert
    InvalidDocument(String),
    /// PROJ could not build the EPSG:28191 -> EPSG:4326 pipeline
    Projection(proj::ProjCreateError),
    /// PROJ rejected a coordinate
    Transform { x: f64, y: f64, reason: String },
}

impl ConversionError {
    /// Classifies an I/O failure on `path`, keeping "not found" distinct
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            ConversionError::FileNotFound(path.to_path_buf())
        } else {
            ConversionError::Io { path: path.to_path_buf(), source }
        }
    }
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionError::FileNotFound(path) => write!(f, "File not found: {}", path.display()),
            ConversionError::Io { path, source } => write!(f, "I/O error on {}: {}", path.display(), source),
            ConversionError::Parse { path, source } => {
                write!(f, "Invalid JSON in {}: {}", path.display(), source)
            }
            ConversionError::InvalidDocument(msg) => write!(f, "Invalid GeoJSON document: {}", msg),
            ConversionError::Projection(e) => write!(f, "Failed to create projection: {}", e),
            ConversionError::Transform { x, y, reason } => {
                write!(f, "Failed to transform coordinate ({}, {}): {}", x, y, reason)
            }
        }
    }
}

impl Error for ConversionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConversionError::Io { source, .. } => Some(source),
            ConversionError::Parse { source, .. } => Some(source),
            ConversionError::Projection(e) => Some(e),
            _ => None,
        }
    }
}

impl From<proj::ProjCreateError> for ConversionError {
    fn from(error: proj::ProjCreateError) -> Self {
        ConversionError::Projection(error)
    }
}

/// Result type for conversion operations
pub type ConversionResult<T> = Result<T, ConversionError>;

/// Renders an error followed by every `source()` below it, one per line
pub fn error_chain(error: &dyn Error) -> String {
    let mut out = error.to_string();
    let mut current = error.source();
    while let Some(cause) = current {
        out.push_str(&format!("\n  caused by: {}", cause));
        current = cause.source();
    }
    out
}
