//! Error types for volumefile
//!
//! Errors are structured: a kind, the config path being resolved when the
//! failure happened, the underlying cause and an actionable help message.

use std::fmt;

/// Result type alias for volumefile operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for volumefile operations
#[derive(Debug, Clone)]
pub struct Error {
    /// The kind of error that occurred
    pub kind: ErrorKind,
    /// Path in the config where the error occurred (e.g., "database.password")
    pub path: Option<String>,
    /// Actionable help message
    pub help: Option<String>,
    /// Underlying cause (as string for Clone compatibility)
    pub cause: Option<String>,
}

/// Categories of errors that can occur
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    /// The mount variable could not be resolved through the provider
    #[error("Volume mount not defined: {variable}")]
    Configuration { variable: String },
    /// Reading a referenced file from the mount failed
    #[error("Unable to read volume file '{file}' from {variable}")]
    Io {
        file: String,
        variable: String,
        reason: std::io::ErrorKind,
    },
    /// Malformed path expression
    #[error("Parse error")]
    Parse,
    /// Accessing a path that doesn't exist
    #[error("Path not found")]
    PathNotFound,
    /// Internal error (bug in volumefile)
    #[error("Internal error")]
    Internal,
}

impl Error {
    fn from_kind(kind: ErrorKind) -> Self {
        Self {
            kind,
            path: None,
            help: None,
            cause: None,
        }
    }

    /// Create a configuration error for an unresolvable mount variable
    pub fn configuration(variable: impl Into<String>) -> Self {
        let var = variable.into();
        Self {
            help: Some(format!(
                "Set {} to the directory where the volume is mounted",
                var
            )),
            ..Self::from_kind(ErrorKind::Configuration { variable: var })
        }
    }

    /// Create an I/O error for a failed volume file read
    pub fn io(file: impl Into<String>, variable: impl Into<String>, err: &std::io::Error) -> Self {
        let file = file.into();
        let variable = variable.into();
        let help = match err.kind() {
            std::io::ErrorKind::NotFound => format!(
                "Check that '{}' exists in the directory named by {}",
                file, variable
            ),
            std::io::ErrorKind::PermissionDenied => {
                format!("Check the permissions of '{}' on the volume", file)
            }
            std::io::ErrorKind::InvalidData => {
                "Volume files must contain UTF-8 text".to_string()
            }
            _ => format!("Check that the volume named by {} is readable", variable),
        };
        Self {
            help: Some(help),
            cause: Some(err.to_string()),
            ..Self::from_kind(ErrorKind::Io {
                file,
                variable,
                reason: err.kind(),
            })
        }
    }

    /// Create a parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            cause: Some(message.into()),
            ..Self::from_kind(ErrorKind::Parse)
        }
    }

    /// Create a path not found error
    pub fn path_not_found(path: impl Into<String>) -> Self {
        let path_str = path.into();
        Self {
            help: Some(format!(
                "Check that '{}' exists in the configuration",
                path_str
            )),
            path: Some(path_str),
            ..Self::from_kind(ErrorKind::PathNotFound)
        }
    }

    /// Create an internal error (bug in volumefile)
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            help: Some("This is likely a bug in volumefile. Please report it.".into()),
            cause: Some(message.into()),
            ..Self::from_kind(ErrorKind::Internal)
        }
    }

    /// Add path context to the error
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add help message to the error
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// True if this is a missing mount variable error
    pub fn is_configuration(&self) -> bool {
        matches!(self.kind, ErrorKind::Configuration { .. })
    }

    /// True if this is a volume file read error
    pub fn is_io(&self) -> bool {
        matches!(self.kind, ErrorKind::Io { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;

        if let Some(path) = &self.path {
            write!(f, "\n  Path: {}", path)?;
        }

        if let Some(cause) = &self.cause {
            write!(f, "\n  {}", cause)?;
        }

        if let Some(help) = &self.help {
            write!(f, "\n  Help: {}", help)?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {}
