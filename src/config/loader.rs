//! Policy loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::HeaderPolicy;

/// Error type for policy loading.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The named policy resource does not exist.
    #[error("policy file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The policy resource exists but could not be read.
    #[error("failed to read policy file: {0}")]
    Io(#[from] std::io::Error),

    /// The policy document is not valid TOML.
    #[error("failed to parse policy file: {0}")]
    ParseToml(#[from] toml::de::Error),

    /// The policy document is not valid JSON.
    #[error("failed to parse policy file: {0}")]
    ParseJson(#[from] serde_json::Error),

    /// The file extension names no supported policy format.
    #[error("unsupported policy file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
}

/// Load a header policy from a TOML or JSON file.
///
/// The format is chosen by file extension (`.toml` or `.json`). A missing
/// file is reported as [`PolicyError::NotFound`] rather than a bare IO
/// error so callers can distinguish "not configured" from "unreadable".
pub fn load_policy(path: &Path) -> Result<HeaderPolicy, PolicyError> {
    if !path.exists() {
        return Err(PolicyError::NotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path)?;
    let policy = match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => toml::from_str(&content)?,
        Some("json") => serde_json::from_str(&content)?,
        _ => return Err(PolicyError::UnsupportedFormat(path.to_path_buf())),
    };

    tracing::debug!(path = %path.display(), "Policy loaded");
    Ok(policy)
}
