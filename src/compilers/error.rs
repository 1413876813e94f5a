//! Compiler error types.

use thiserror::Error;

/// Result type for compiler operations.
pub type Result<T> = std::result::Result<T, CompilerError>;

/// Errors raised while generating arguments or probing a compiler.
#[derive(Debug, Error)]
pub enum CompilerError {
    /// The compiler (at this version, on this platform) lacks a capability.
    #[error("{compiler} compiler does not support {feature}")]
    UnsupportedFeature { compiler: String, feature: String },

    /// A feature request contained keys nobody consumed.
    #[error("unknown compiler feature(s) selected: {}", keys.join(", "))]
    UnknownFeature { keys: Vec<String> },

    /// The sanity check failed; the toolchain cannot be used.
    #[error("{compiler}: {reason}")]
    ToolchainBroken { compiler: String, reason: String },

    /// An argument had the wrong shape.
    #[error("malformed argument: {0}")]
    MalformedArgument(String),

    /// A probe process could not be started.
    #[error("failed to run `{command}`: {message}")]
    Spawn { command: String, message: String },

    /// IO error in the probe work directory.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CompilerError {
    pub(crate) fn unsupported(compiler: impl ToString, feature: impl ToString) -> Self {
        CompilerError::UnsupportedFeature {
            compiler: compiler.to_string(),
            feature: feature.to_string(),
        }
    }

    pub(crate) fn broken(compiler: impl Into<String>, reason: impl Into<String>) -> Self {
        CompilerError::ToolchainBroken {
            compiler: compiler.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_feature_lists_all_keys() {
        let err = CompilerError::UnknownFeature {
            keys: vec!["bogus".to_string(), "other".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "unknown compiler feature(s) selected: bogus, other"
        );
    }

    #[test]
    fn test_unsupported_names_compiler_and_feature() {
        let err = CompilerError::unsupported("gdc 9.2.0", "coverage");
        assert_eq!(err.to_string(), "gdc 9.2.0 compiler does not support coverage");
    }
}
