use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all Kargo operations.
#[derive(Debug, Error, Diagnostic)]
pub enum KargoError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or malformed manifest (e.g. Kargo.toml).
    #[error("Manifest error: {message}")]
    #[diagnostic(help("Check your Kargo.toml for syntax errors"))]
    Manifest { message: String },

    /// Dependency resolution failed (version conflicts, missing deps, etc.).
    #[error("Dependency resolution failed: {message}")]
    Resolution { message: String },

    /// The third-party dependency model failed to merge (coordinate shape,
    /// version conflicts, replacement collisions — see `kargo-depmodel`).
    #[error("Dependency model error: {message}")]
    Model { message: String },

    /// Catch-all for miscellaneous errors.
    #[error("{message}")]
    Generic { message: String },
}

/// Convenience alias for `miette::Result<T>`.
pub type KargoResult<T> = miette::Result<T>;
