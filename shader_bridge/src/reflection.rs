/// Reflection data the renderer builds its binding tables from

/// A value uniform declared in the stage's uniform buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectedUniform {
    /// Member name (also the flat uniform name in emitted text)
    pub name: String,
    /// Components per column
    pub vecsize: u32,
    /// Columns (1 for vectors)
    pub columns: u32,
}

/// A sampler binding, named after the original separate sampler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectedSampler {
    pub name: String,
    pub binding: u32,
}

/// A texture binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectedTexture {
    pub name: String,
    pub binding: u32,
}

/// Reflection of one compiled stage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderReflection {
    pub uniforms: Vec<ReflectedUniform>,
    pub samplers: Vec<ReflectedSampler>,
    pub textures: Vec<ReflectedTexture>,
}

impl ShaderReflection {
    /// Find a sampler by name
    pub fn sampler(&self, name: &str) -> Option<&ReflectedSampler> {
        self.samplers.iter().find(|s| s.name == name)
    }

    /// Find a uniform by name
    pub fn uniform(&self, name: &str) -> Option<&ReflectedUniform> {
        self.uniforms.iter().find(|u| u.name == name)
    }
}
