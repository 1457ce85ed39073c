//! Error types for envcascade.

use std::path::PathBuf;

/// Result type alias for envcascade operations.
pub type Result<T> = std::result::Result<T, ResolveError>;

/// Errors that can occur while resolving a configuration.
///
/// Every variant is fatal to the resolution call that produced it. The
/// pipeline fails fast: callers see the first error encountered in stage
/// order (environment selection, location, parsing, secret retrieval,
/// merging) and never a partial result.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The supplied environment name is not in the closed set.
    #[error("Unknown environment {0:?} (expected dev, test, ci, or production)")]
    UnknownEnvironment(String),

    /// `production` was selected without a backend/frontend variant.
    #[error("Environment \"production\" requires a variant (backend or frontend)")]
    MissingProductionVariant,

    /// No environment was supplied where one is required.
    #[error("No environment specified")]
    MissingEnvironment,

    /// A source flagged as required is absent from the base directory.
    #[error("Required configuration file {file_name} is missing (expected at {path})")]
    MissingRequiredSource {
        /// File name of the missing source (e.g. `.env.shared`)
        file_name: String,
        /// Full path that was checked
        path: PathBuf,
    },

    /// A line is neither blank, a comment, nor a `NAME=VALUE` assignment.
    ///
    /// The message carries the location only, never the line text, since a
    /// malformed line may still contain secret material.
    #[error("Malformed line {line} in {path}: expected NAME=VALUE, a comment, or a blank line")]
    MalformedLine {
        /// File containing the offending line
        path: PathBuf,
        /// 1-based line number
        line: usize,
    },

    /// The secret provider failed (or timed out) for one variable.
    #[error("Failed to resolve secret {name:?}: {reason}")]
    SecretResolutionFailed {
        /// The secret-bound variable that could not be fetched
        name: String,
        /// Provider-reported reason, or the timeout notice
        reason: String,
    },

    /// A secret-bound variable was found with a literal value on disk.
    #[error("Secret-bound variable {name:?} has a literal value in {file_name}; its value must come from the secret provider")]
    SecretLeakDetected {
        /// The secret-bound variable
        name: String,
        /// File name of the offending source
        file_name: String,
    },

    /// The base directory does not exist or is not a directory.
    #[error("Base directory unavailable: {path}")]
    BaseDirUnavailable {
        /// The path that was supplied as the base directory
        path: PathBuf,
    },

    /// IO error while reading a source file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
