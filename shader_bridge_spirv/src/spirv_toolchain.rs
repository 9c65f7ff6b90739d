/// SpirvToolchain - glslang front-end (through shaderc) and SPIR-V lowering

use shader_bridge::shader_bridge::{
    BinaryIntermediate, CompilerConfig, Error, ResourceLimits, Result, ShaderStage,
    ShaderToolchain, SOURCE_GLSL_VERSION,
};
use shader_bridge::{bridge_debug, bridge_warn};
use shaderc::{
    CompileOptions, Compiler, EnvVersion, GlslProfile, Limit, ShaderKind, SourceLanguage,
    SpirvVersion, TargetEnv,
};
use crate::spirv_model::SpirvModel;
use crate::spirv_reflection::{check_link, reflect_interface, StageInterface};

const SOURCE: &str = "shader_bridge_spirv::Toolchain";

/// One stage parsed by glslang
#[derive(Debug, Clone)]
pub struct ParsedStage {
    pub stage: ShaderStage,
    pub words: Vec<u32>,
    pub interface: StageInterface,
}

/// glslang-backed toolchain
pub struct SpirvToolchain {
    compiler: Compiler,
}

fn shader_kind(stage: ShaderStage) -> ShaderKind {
    match stage {
        ShaderStage::Vertex => ShaderKind::Vertex,
        ShaderStage::Fragment => ShaderKind::Fragment,
    }
}

fn file_name(stage: ShaderStage) -> &'static str {
    match stage {
        ShaderStage::Vertex => "shader.vert",
        ShaderStage::Fragment => "shader.frag",
    }
}

/// Front-end options for GLSL 450 sources targeting Vulkan 1.0 / SPIR-V 1.0
fn compile_options(limits: &ResourceLimits) -> Option<CompileOptions<'static>> {
    let mut options = CompileOptions::new()?;
    options.set_source_language(SourceLanguage::GLSL);
    options.set_forced_version_profile(SOURCE_GLSL_VERSION, GlslProfile::None);
    options.set_target_env(TargetEnv::Vulkan, EnvVersion::Vulkan1_0 as u32);
    options.set_target_spirv(SpirvVersion::V1_0);

    let table = [
        (Limit::MaxLights, limits.max_lights),
        (Limit::MaxClipPlanes, limits.max_clip_planes),
        (Limit::MaxTextureUnits, limits.max_texture_units),
        (Limit::MaxTextureCoords, limits.max_texture_coords),
        (Limit::MaxVertexAttribs, limits.max_vertex_attribs),
        (Limit::MaxVertexUniformComponents, limits.max_vertex_uniform_components),
        (Limit::MaxVaryingFloats, limits.max_varying_floats),
        (Limit::MaxVertexTextureImageUnits, limits.max_vertex_texture_image_units),
        (Limit::MaxCombinedTextureImageUnits, limits.max_combined_texture_image_units),
        (Limit::MaxTextureImageUnits, limits.max_texture_image_units),
        (Limit::MaxFragmentUniformComponents, limits.max_fragment_uniform_components),
        (Limit::MaxDrawBuffers, limits.max_draw_buffers),
        (Limit::MaxVertexUniformVectors, limits.max_vertex_uniform_vectors),
        (Limit::MaxVaryingVectors, limits.max_varying_vectors),
        (Limit::MaxFragmentUniformVectors, limits.max_fragment_uniform_vectors),
        (Limit::MaxVertexOutputVectors, limits.max_vertex_output_vectors),
        (Limit::MaxFragmentInputVectors, limits.max_fragment_input_vectors),
        (Limit::MaxClipDistances, limits.max_clip_distances),
    ];
    for (limit, value) in table {
        options.set_limit(limit, value.min(i32::MAX as u32) as i32);
    }

    Some(options)
}

impl ShaderToolchain for SpirvToolchain {
    type Stage = ParsedStage;
    type Model = SpirvModel;

    fn initialize(_config: &CompilerConfig) -> Result<Self> {
        let compiler = Compiler::new()
            .ok_or_else(|| Error::InitializationFailed("failed to initialize glslang".to_string()))?;
        bridge_debug!(SOURCE, "glslang initialized");
        Ok(Self { compiler })
    }

    fn parse(&self, stage: ShaderStage, source: &str, limits: &ResourceLimits) -> Result<ParsedStage> {
        let options = compile_options(limits).ok_or_else(|| Error::ParseFailure {
            stage,
            message: "failed to create front-end options".to_string(),
        })?;

        let artifact = self
            .compiler
            .compile_into_spirv(source, shader_kind(stage), file_name(stage), "main", Some(&options))
            .map_err(|e| Error::ParseFailure { stage, message: e.to_string() })?;

        if artifact.get_num_warnings() > 0 {
            bridge_warn!(
                SOURCE,
                "{} stage parsed with warnings:\n{}",
                stage,
                artifact.get_warning_messages()
            );
        }

        let words = artifact.as_binary().to_vec();
        let interface = reflect_interface(stage, &words)?;
        Ok(ParsedStage { stage, words, interface })
    }

    fn link(&self, vertex: &ParsedStage, fragment: &ParsedStage) -> Result<()> {
        check_link(&vertex.interface, &fragment.interface).map_err(Error::LinkFailure)
    }

    fn lower(&self, stage: &ParsedStage) -> Result<BinaryIntermediate> {
        BinaryIntermediate::new(stage.stage, stage.words.clone())
    }

    fn load_model(&self, binary: BinaryIntermediate) -> Result<SpirvModel> {
        SpirvModel::load(binary)
    }
}
