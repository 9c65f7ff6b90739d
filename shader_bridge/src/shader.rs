/// Shader data model: stages, binary intermediates, linked programs and outputs

use std::fmt;
use crate::error::{Error, Result};

/// SPIR-V magic number (first word of every module)
pub const SPIRV_MAGIC: u32 = 0x0723_0203;

/// Number of words in a SPIR-V module header
pub const SPIRV_HEADER_WORDS: usize = 5;

/// Shader pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex shader
    Vertex,
    /// Fragment shader
    Fragment,
}

impl ShaderStage {
    /// Both stages, in compilation order
    pub const ALL: [ShaderStage; 2] = [ShaderStage::Vertex, ShaderStage::Fragment];

    /// Name given to the uniform-buffer instance once its members are flattened
    ///
    /// Distinct per stage so both outputs can be linked into one program.
    pub fn unused_marker(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "UnusedVS",
            ShaderStage::Fragment => "UnusedFS",
        }
    }

    /// Lowercase stage name
    pub fn name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One stage lowered to the binary intermediate form (SPIR-V words)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryIntermediate {
    stage: ShaderStage,
    words: Vec<u32>,
}

impl BinaryIntermediate {
    /// Wrap lowered words, checking the module header
    ///
    /// # Errors
    ///
    /// Returns `Error::LoweringFailure` if the header is truncated or the magic
    /// number does not match.
    pub fn new(stage: ShaderStage, words: Vec<u32>) -> Result<Self> {
        if words.len() < SPIRV_HEADER_WORDS {
            return Err(Error::LoweringFailure {
                stage,
                message: format!("module has {} words, header needs {}", words.len(), SPIRV_HEADER_WORDS),
            });
        }
        if words[0] != SPIRV_MAGIC {
            return Err(Error::LoweringFailure {
                stage,
                message: format!("bad magic number 0x{:08x}", words[0]),
            });
        }
        Ok(Self { stage, words })
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// SPIR-V version as (major, minor)
    pub fn version(&self) -> (u8, u8) {
        let version = self.words[1];
        (((version >> 16) & 0xff) as u8, ((version >> 8) & 0xff) as u8)
    }
}

/// Vertex + fragment stages that passed the link check
///
/// Only constructed by `ShaderProgram::link`; lives for one compile call.
#[derive(Debug)]
pub struct ShaderProgram<S> {
    vertex: S,
    fragment: S,
}

impl<S> ShaderProgram<S> {
    /// Link two parsed stages with the supplied interface check
    pub fn link<F>(vertex: S, fragment: S, check: F) -> Result<Self>
    where
        F: FnOnce(&S, &S) -> Result<()>,
    {
        check(&vertex, &fragment)?;
        Ok(Self { vertex, fragment })
    }

    pub fn stage(&self, stage: ShaderStage) -> &S {
        match stage {
            ShaderStage::Vertex => &self.vertex,
            ShaderStage::Fragment => &self.fragment,
        }
    }
}

/// Compiled output of one stage
///
/// `model` is the semantic model the renderer queries for reflection; it is
/// moved to the caller through the completion callback.
#[derive(Debug)]
pub struct ShaderInfo<M> {
    /// Semantic model (reflection handle)
    pub model: M,
    /// Final target-dialect source
    pub source: String,
}

impl<M> ShaderInfo<M> {
    /// Source bytes
    pub fn bytes(&self) -> &[u8] {
        self.source.as_bytes()
    }
}

#[cfg(test)]
#[path = "shader_tests.rs"]
mod tests;
