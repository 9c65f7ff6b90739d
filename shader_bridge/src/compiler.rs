/// ShaderCompiler - the public entry point of the translation pipeline
///
/// Each stage runs Parse -> Link (joint) -> Lower -> Re-parse -> Reconcile ->
/// Emit -> Patch. Any failure ends the whole call; the completion callback is
/// only invoked once both stages are done.

use crate::bridge::ToolchainClaim;
use crate::config::CompilerConfig;
use crate::error::{Error, Result};
use crate::model::CrossModel;
use crate::patch::{apply_patches, PatchContext};
use crate::reconcile::{flatten_uniform_buffer, remap_combined_samplers};
use crate::shader::{ShaderInfo, ShaderProgram, ShaderStage};
use crate::toolchain::ShaderToolchain;

const SOURCE: &str = "shader_bridge::Compiler";

/// Cross-dialect shader compiler
///
/// Owns the process-wide toolchain for its whole lifetime: constructing a
/// second compiler while one is alive fails with `Error::ToolchainBusy`.
///
/// # Example
///
/// ```ignore
/// use shader_bridge::shader_bridge::{CompilerConfig, ShaderCompiler};
///
/// let mut compiler = ShaderCompiler::<MyToolchain>::new(CompilerConfig::default())?;
/// compiler.compile(vertex_source, fragment_source, |vertex, fragment| {
///     upload(vertex.source, fragment.source);
/// })?;
/// ```
pub struct ShaderCompiler<T: ShaderToolchain> {
    toolchain: T,
    config: CompilerConfig,
    // Declared after `toolchain`: the toolchain shuts down before the claim is released.
    _claim: ToolchainClaim,
}

impl<T: ShaderToolchain> ShaderCompiler<T> {
    /// Log errors before returning them
    fn log_and_return_error(error: Error) -> Error {
        match &error {
            Error::ParseFailure { stage, message } => {
                crate::bridge_error!(SOURCE, "Failed to parse {} stage: {}", stage, message);
            }
            Error::LinkFailure(msg) => {
                crate::bridge_error!(SOURCE, "Failed to link program: {}", msg);
            }
            _ => {
                crate::bridge_error!(SOURCE, "Shader compilation error: {}", error);
            }
        }
        error
    }

    /// Claim and initialize the toolchain
    ///
    /// # Errors
    ///
    /// - `Error::ToolchainBusy` if another compiler is alive
    /// - any error returned by the toolchain's initialization
    pub fn new(config: CompilerConfig) -> Result<Self> {
        let claim = ToolchainClaim::acquire().map_err(Self::log_and_return_error)?;
        let toolchain = T::initialize(&config).map_err(Self::log_and_return_error)?;

        crate::bridge_info!(
            SOURCE,
            "Toolchain initialized (target GLSL {}{})",
            config.profile.glsl_version(),
            if config.profile.is_es() { " es" } else { "" }
        );

        Ok(Self { toolchain, config, _claim: claim })
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile a vertex/fragment pair and hand the results to `on_compiled`
    ///
    /// The callback runs before this returns. On error it is never called.
    pub fn compile<F>(&mut self, vertex_source: &str, fragment_source: &str, on_compiled: F) -> Result<()>
    where
        F: FnOnce(ShaderInfo<T::Model>, ShaderInfo<T::Model>),
    {
        let (vertex, fragment) = self.compile_pair(vertex_source, fragment_source)?;
        on_compiled(vertex, fragment);
        Ok(())
    }

    /// Compile a vertex/fragment pair and return both stages
    pub fn compile_pair(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<(ShaderInfo<T::Model>, ShaderInfo<T::Model>)> {
        self.compile_program(vertex_source, fragment_source)
            .map_err(Self::log_and_return_error)
    }

    fn compile_program(
        &self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<(ShaderInfo<T::Model>, ShaderInfo<T::Model>)> {
        let limits = &self.config.limits;
        let vertex = self.toolchain.parse(ShaderStage::Vertex, vertex_source, limits)?;
        let fragment = self.toolchain.parse(ShaderStage::Fragment, fragment_source, limits)?;

        let program = ShaderProgram::link(vertex, fragment, |v, f| self.toolchain.link(v, f))?;
        crate::bridge_debug!(SOURCE, "Program linked");

        let vertex = self.compile_stage(&program, ShaderStage::Vertex)?;
        let fragment = self.compile_stage(&program, ShaderStage::Fragment)?;
        Ok((vertex, fragment))
    }

    fn compile_stage(
        &self,
        program: &ShaderProgram<T::Stage>,
        stage: ShaderStage,
    ) -> Result<ShaderInfo<T::Model>> {
        let binary = self.toolchain.lower(program.stage(stage))?;
        let (major, minor) = binary.version();
        crate::bridge_debug!(
            SOURCE,
            "Lowered {} stage to {} words (SPIR-V {}.{})",
            stage,
            binary.words().len(),
            major,
            minor
        );

        let mut model = self.toolchain.load_model(binary)?;
        model.configure(&self.config.profile.emit_options())?;

        let combined = model.build_combined_samplers()?;
        let resources = model.resources()?;
        remap_combined_samplers(&mut model, &resources, &combined)?;
        let block = flatten_uniform_buffer(&mut model, &resources, stage)?;

        let emitted = model.emit()?;

        let output = match stage {
            ShaderStage::Fragment => resources.stage_outputs.first().map(|o| o.name.as_str()),
            ShaderStage::Vertex => None,
        };
        let context = PatchContext {
            stage,
            profile: self.config.profile,
            marker: block.marker,
            struct_name: &block.struct_name,
            output,
        };
        let source = apply_patches(&emitted, &context);

        crate::bridge_trace!(SOURCE, "{} stage output:\n{}", stage, source);

        Ok(ShaderInfo { model, source })
    }
}

#[cfg(test)]
#[path = "compiler_tests.rs"]
mod tests;
