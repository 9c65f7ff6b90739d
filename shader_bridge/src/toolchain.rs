/// ShaderToolchain trait - front-end, linker and lowering seam
///
/// Implemented by backends that own a real front-end (e.g. glslang). The
/// toolchain is created by `ShaderCompiler::new` once the process-wide claim is
/// held, and dropped before the claim is released.

use crate::config::{CompilerConfig, ResourceLimits};
use crate::error::Result;
use crate::model::CrossModel;
use crate::shader::{BinaryIntermediate, ShaderStage};

/// Translation toolchain
pub trait ShaderToolchain: Sized {
    /// Parsed representation of one stage
    type Stage;

    /// Semantic model re-parsed from a binary intermediate
    type Model: CrossModel;

    /// Initialize the process-wide toolchain state
    fn initialize(config: &CompilerConfig) -> Result<Self>;

    /// Parse one stage's source under the given limits
    ///
    /// # Errors
    ///
    /// `Error::ParseFailure` when the source is not a valid program for the stage.
    fn parse(&self, stage: ShaderStage, source: &str, limits: &ResourceLimits) -> Result<Self::Stage>;

    /// Check that the fragment stage's interface is satisfied by the vertex stage
    ///
    /// # Errors
    ///
    /// `Error::LinkFailure` on any interface mismatch.
    fn link(&self, vertex: &Self::Stage, fragment: &Self::Stage) -> Result<()>;

    /// Lower a linked stage to the binary intermediate form
    fn lower(&self, stage: &Self::Stage) -> Result<BinaryIntermediate>;

    /// Re-parse a binary intermediate into a semantic model
    fn load_model(&self, binary: BinaryIntermediate) -> Result<Self::Model>;
}
