//! # Cryptographic Error Types
//!
//! Structured errors for TRA signing and certificate inspection. Uses
//! `thiserror` for ergonomic error definitions with diagnostic context.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from signing and certificate operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// A credential file (certificate or private key) is missing or
    /// unreadable.
    #[error("credential file not readable: {path}")]
    CredentialNotReadable {
        /// The path that could not be opened.
        path: PathBuf,
    },

    /// The OpenSSL executable could not be launched.
    #[error("failed to launch {program:?}: {source}")]
    ToolUnavailable {
        /// Program name or path that was attempted.
        program: String,
        /// The underlying launch error.
        source: std::io::Error,
    },

    /// The OpenSSL invocation exited with a failure status.
    #[error("{program} exited with {status}: {stderr}")]
    ToolFailed {
        /// Program name or path that was run.
        program: String,
        /// Exit status description.
        status: String,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// The tool ran but its output was not in the expected shape.
    #[error("unexpected tool output: {0}")]
    MalformedOutput(String),

    /// I/O error talking to the child process.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_failed_display_includes_stderr() {
        let err = CryptoError::ToolFailed {
            program: "openssl".into(),
            status: "exit status: 1".into(),
            stderr: "unable to load certificate".into(),
        };
        assert!(format!("{err}").contains("unable to load certificate"));
    }

    #[test]
    fn credential_not_readable_display() {
        let err = CryptoError::CredentialNotReadable {
            path: PathBuf::from("/missing/emitter.crt"),
        };
        assert!(format!("{err}").contains("emitter.crt"));
    }
}
