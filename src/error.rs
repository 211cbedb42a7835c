//! Error types for filesystem operations

use rmcp::ErrorData as McpError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FsError {
    #[error("Access denied: {0} is outside the allowed directories")]
    AccessDenied(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not a file: {0}")]
    NotAFile(String),

    #[error("Not a directory: {0}")]
    NotADirectory(String),

    #[error("Destination already exists: {0}")]
    AlreadyExists(String),

    #[error("Directory not empty: {0} (use recursive=true to delete)")]
    DirectoryNotEmpty(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid ignore pattern: {0}")]
    InvalidPattern(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),
}

pub type FsResult<T> = Result<T, FsError>;

impl From<FsError> for McpError {
    fn from(err: FsError) -> Self {
        match &err {
            FsError::AccessDenied(_) | FsError::PermissionDenied(_) => {
                McpError::invalid_request(err.to_string(), None)
            }
            FsError::NotFound(_)
            | FsError::NotAFile(_)
            | FsError::NotADirectory(_)
            | FsError::AlreadyExists(_)
            | FsError::DirectoryNotEmpty(_)
            | FsError::InvalidPath(_)
            | FsError::InvalidArgument(_)
            | FsError::InvalidPattern(_) => McpError::invalid_params(err.to_string(), None),
            _ => McpError::internal_error(err.to_string(), None),
        }
    }
}

/// Map an IO error against a known path to the matching FsError variant.
pub fn io_error_for(path: &std::path::Path, err: std::io::Error) -> FsError {
    match err.kind() {
        std::io::ErrorKind::NotFound => FsError::NotFound(path.display().to_string()),
        std::io::ErrorKind::PermissionDenied => {
            FsError::PermissionDenied(path.display().to_string())
        }
        _ => FsError::Io(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_denied_maps_to_invalid_request() {
        let err: McpError = FsError::AccessDenied("/etc".to_string()).into();
        assert!(err.message.contains("/etc"));
    }

    #[test]
    fn not_found_names_the_path() {
        let err = io_error_for(
            std::path::Path::new("/tmp/missing"),
            std::io::Error::new(std::io::ErrorKind::NotFound, "nope"),
        );
        assert!(matches!(err, FsError::NotFound(p) if p == "/tmp/missing"));
    }
}
