//! Error types for the shader bridge
//!
//! This module defines the error taxonomy of a `Compile` call. Every variant is
//! terminal for the call that raised it: there is no partial output.

use std::fmt;
use crate::shader::ShaderStage;

/// Result type for shader bridge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Shader bridge errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Source failed front-end validation for one stage
    ParseFailure {
        stage: ShaderStage,
        message: String,
    },

    /// Vertex and fragment stages do not agree on their shared interface
    LinkFailure(String),

    /// A stage could not be lowered to (or is not) a valid binary intermediate
    LoweringFailure {
        stage: ShaderStage,
        message: String,
    },

    /// The binary-to-target transpiler rejected the stage
    TranspileFailure {
        stage: ShaderStage,
        message: String,
    },

    /// A uniform-buffer member is neither a vec4 nor a mat4
    UnsupportedUniformShape {
        stage: ShaderStage,
        uniform: String,
        shape: String,
    },

    /// The stage does not declare exactly one uniform buffer
    UniformBufferCount {
        stage: ShaderStage,
        found: usize,
    },

    /// Another compiler already owns the process-wide toolchain
    ToolchainBusy,

    /// Toolchain initialization failed
    InitializationFailed(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ParseFailure { stage, message } => {
                write!(f, "Parse failure ({} stage): {}", stage, message)
            }
            Error::LinkFailure(msg) => write!(f, "Link failure: {}", msg),
            Error::LoweringFailure { stage, message } => {
                write!(f, "Lowering failure ({} stage): {}", stage, message)
            }
            Error::TranspileFailure { stage, message } => {
                write!(f, "Transpile failure ({} stage): {}", stage, message)
            }
            Error::UnsupportedUniformShape { stage, uniform, shape } => write!(
                f,
                "Unsupported uniform shape ({} stage): '{}' is {}, expected vec4 or mat4",
                stage, uniform, shape
            ),
            Error::UniformBufferCount { stage, found } => write!(
                f,
                "Expected exactly one uniform buffer ({} stage), found {}",
                stage, found
            ),
            Error::ToolchainBusy => write!(f, "Shader toolchain already in use"),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Stage the error belongs to, if it is stage-local
    pub fn stage(&self) -> Option<ShaderStage> {
        match self {
            Error::ParseFailure { stage, .. }
            | Error::LoweringFailure { stage, .. }
            | Error::TranspileFailure { stage, .. }
            | Error::UnsupportedUniformShape { stage, .. }
            | Error::UniformBufferCount { stage, .. } => Some(*stage),
            Error::LinkFailure(_) | Error::ToolchainBusy | Error::InitializationFailed(_) => None,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
