/// Compiler configuration: target presets and front-end resource limits

/// GLSL version every source is parsed as
pub const SOURCE_GLSL_VERSION: u32 = 450;

/// Output dialect preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetProfile {
    /// GLSL 430 core
    Desktop,
    /// GLSL ES 300 (version line and explicit fragment output are stripped)
    Mobile,
}

impl TargetProfile {
    /// Preset for the platform this crate was built for
    pub fn platform_default() -> Self {
        if cfg!(target_os = "android") {
            TargetProfile::Mobile
        } else {
            TargetProfile::Desktop
        }
    }

    pub fn glsl_version(self) -> u32 {
        match self {
            TargetProfile::Desktop => 430,
            TargetProfile::Mobile => 300,
        }
    }

    pub fn is_es(self) -> bool {
        matches!(self, TargetProfile::Mobile)
    }

    /// Emission options for this preset
    pub fn emit_options(self) -> EmitOptions {
        EmitOptions {
            version: self.glsl_version(),
            es: self.is_es(),
            plain_uniforms: true,
        }
    }
}

/// Options handed to the semantic model before emission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitOptions {
    /// Target GLSL version
    pub version: u32,
    /// Emit the ES profile
    pub es: bool,
    /// Emit uniform buffers as a struct-typed plain uniform instead of a block
    pub plain_uniforms: bool,
}

/// Hardware limits supplied to the front-end parser
///
/// Defaults follow glslang's default resource table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceLimits {
    pub max_lights: u32,
    pub max_clip_planes: u32,
    pub max_texture_units: u32,
    pub max_texture_coords: u32,
    pub max_vertex_attribs: u32,
    pub max_vertex_uniform_components: u32,
    pub max_varying_floats: u32,
    pub max_vertex_texture_image_units: u32,
    pub max_combined_texture_image_units: u32,
    pub max_texture_image_units: u32,
    pub max_fragment_uniform_components: u32,
    pub max_draw_buffers: u32,
    pub max_vertex_uniform_vectors: u32,
    pub max_varying_vectors: u32,
    pub max_fragment_uniform_vectors: u32,
    pub max_vertex_output_vectors: u32,
    pub max_fragment_input_vectors: u32,
    pub max_clip_distances: u32,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            max_lights: 32,
            max_clip_planes: 6,
            max_texture_units: 32,
            max_texture_coords: 32,
            max_vertex_attribs: 64,
            max_vertex_uniform_components: 4096,
            max_varying_floats: 64,
            max_vertex_texture_image_units: 32,
            max_combined_texture_image_units: 80,
            max_texture_image_units: 32,
            max_fragment_uniform_components: 4096,
            max_draw_buffers: 32,
            max_vertex_uniform_vectors: 128,
            max_varying_vectors: 8,
            max_fragment_uniform_vectors: 16,
            max_vertex_output_vectors: 16,
            max_fragment_input_vectors: 15,
            max_clip_distances: 8,
        }
    }
}

/// Compiler configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
    /// Output dialect preset
    pub profile: TargetProfile,
    /// Front-end resource limits
    pub limits: ResourceLimits,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            profile: TargetProfile::platform_default(),
            limits: ResourceLimits::default(),
        }
    }
}

impl CompilerConfig {
    pub fn with_profile(mut self, profile: TargetProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_limits(mut self, limits: ResourceLimits) -> Self {
        self.limits = limits;
        self
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
