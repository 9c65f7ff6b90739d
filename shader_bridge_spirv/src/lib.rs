/*!
# Shader Bridge - SPIR-V Backend

glslang / SPIRV-Cross implementation of the shader_bridge traits.

Sources are parsed and lowered to SPIR-V 1.0 by glslang (through shaderc),
the stage interface is reflected with spirq for linking and for the
renderer's binding reflection, and GLSL 430 / GLSL ES 300 is emitted by
SPIRV-Cross.
*/

mod spirv_model;
mod spirv_reflection;
mod spirv_toolchain;

pub use spirv_model::SpirvModel;
pub use spirv_reflection::{check_link, reflect_bindings, reflect_interface, StageInterface};
pub use spirv_toolchain::{ParsedStage, SpirvToolchain};

/// Shader compiler backed by glslang and SPIRV-Cross
///
/// # Example
///
/// ```no_run
/// use shader_bridge::shader_bridge::CompilerConfig;
/// use shader_bridge_spirv::SpirvShaderCompiler;
///
/// # fn main() -> shader_bridge::shader_bridge::Result<()> {
/// # let (vertex, fragment) = ("", "");
/// let mut compiler = SpirvShaderCompiler::new(CompilerConfig::default())?;
/// compiler.compile(vertex, fragment, |vs, fs| {
///     println!("{}\n{}", vs.source, fs.source);
/// })?;
/// # Ok(())
/// # }
/// ```
pub type SpirvShaderCompiler = shader_bridge::shader_bridge::ShaderCompiler<SpirvToolchain>;
