//! Error types for the MLDSL language server.
//!
//! Unresolved references are not errors; they surface as `None` from the
//! resolver. These types cover the I/O edges: loading the API description
//! and invoking the external compiler.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to obtain an API description.
///
/// Callers normally degrade to an empty table instead of propagating this.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("API aliases path is not configured")]
    NotConfigured,

    #[error("API aliases file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Top-level API description in {} is not an object", path.display())]
    NotAnObject { path: PathBuf },
}

impl ApiError {
    /// True when the description is absent rather than broken.
    pub fn is_missing(&self) -> bool {
        matches!(self, ApiError::NotConfigured | ApiError::NotFound { .. })
    }
}

/// Errors from the compile commands.
#[derive(Error, Debug)]
pub enum CompileError {
    #[error("compiler not found. Set mldsl.compilerPath or open the workspace root containing tools/mldsl_compile.py")]
    CompilerNotFound,

    #[error("document is not a local file: {0}")]
    NotAFile(String),

    #[error("not an .mldsl file: {0}")]
    NotMldsl(String),

    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("compiler exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("compiler produced empty output")]
    EmptyOutput,
}
