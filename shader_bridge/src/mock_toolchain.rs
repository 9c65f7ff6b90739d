/// Mock toolchain for unit tests (no native front-end required)
///
/// Understands a small single-line-declaration subset of GLSL 450:
///
/// ```text
/// layout(location = 0) in vec2 uv;
/// layout(location = 0) out vec4 glFragColor;
/// layout(binding = 0) uniform Frame { mat4 viewProjection; vec4 color; } frame;
/// layout(binding = 2) uniform texture2D albedoTexture;
/// layout(binding = 3) uniform sampler albedoSampler;
/// ```
///
/// Lowering packs the source into words after a SPIR-V header so the model is
/// rebuilt from the binary form, like a real backend.

use rustc_hash::FxHashMap;
use crate::config::{CompilerConfig, EmitOptions, ResourceLimits};
use crate::error::{Error, Result};
use crate::model::{
    CombinedSampler, CrossModel, MemberType, ModelResource, ModelResources, ResourceId,
    ScalarClass, StructMember,
};
use crate::reflection::{ReflectedSampler, ReflectedTexture, ReflectedUniform, ShaderReflection};
use crate::shader::{BinaryIntermediate, ShaderStage, SPIRV_MAGIC};
use crate::toolchain::ShaderToolchain;

const UBO_ID: ResourceId = 10;
const UBO_TYPE_ID: ResourceId = 11;
const SAMPLER_BASE_ID: ResourceId = 20;
const TEXTURE_BASE_ID: ResourceId = 30;
const OUTPUT_BASE_ID: ResourceId = 40;
const COMBINED_BASE_ID: ResourceId = 50;

// ============================================================================
// Parsed declarations
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockVarying {
    pub location: u32,
    pub ty: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockBlock {
    pub binding: u32,
    pub type_name: String,
    pub instance: String,
    pub members: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockBinding {
    pub binding: u32,
    pub name: String,
}

/// One parsed stage
#[derive(Debug, Clone, Default)]
pub struct MockStage {
    pub source: String,
    pub inputs: Vec<MockVarying>,
    pub outputs: Vec<MockVarying>,
    pub blocks: Vec<MockBlock>,
    pub samplers: Vec<MockBinding>,
    pub textures: Vec<MockBinding>,
}

/// Split `layout(key = value) rest` into (value, rest)
fn split_layout(line: &str) -> (Option<u32>, &str) {
    let Some(rest) = line.strip_prefix("layout(") else {
        return (None, line);
    };
    let Some(close) = rest.find(')') else {
        return (None, line);
    };
    let value = rest[..close]
        .split('=')
        .nth(1)
        .and_then(|v| v.trim().parse().ok());
    (value, rest[close + 1..].trim())
}

fn parse_failure(stage: ShaderStage, message: impl Into<String>) -> Error {
    Error::ParseFailure { stage, message: message.into() }
}

fn parse_stage(stage: ShaderStage, source: &str) -> Result<MockStage> {
    if !source.contains("void main") {
        return Err(parse_failure(stage, "missing entry point 'main'"));
    }

    let mut parsed = MockStage { source: source.to_string(), ..MockStage::default() };

    for line in source.lines().map(str::trim) {
        if line.starts_with("#error") {
            return Err(parse_failure(stage, line.to_string()));
        }

        let (layout, rest) = split_layout(line);
        let Some(decl) = rest.strip_suffix(';') else {
            continue;
        };
        let tokens: Vec<&str> = decl.split_whitespace().collect();

        match tokens.as_slice() {
            ["in", ty, name] | ["out", ty, name] => {
                let varying = MockVarying {
                    location: layout.ok_or_else(|| parse_failure(stage, format!("'{}' needs a location", name)))?,
                    ty: ty.to_string(),
                    name: name.to_string(),
                };
                if tokens[0] == "in" {
                    parsed.inputs.push(varying);
                } else {
                    parsed.outputs.push(varying);
                }
            }
            ["uniform", "sampler", name] => parsed.samplers.push(MockBinding {
                binding: layout.unwrap_or(0),
                name: name.to_string(),
            }),
            ["uniform", "texture2D", name] => parsed.textures.push(MockBinding {
                binding: layout.unwrap_or(0),
                name: name.to_string(),
            }),
            ["uniform", "float" | "vec2" | "vec3" | "vec4" | "mat4", name] => {
                return Err(parse_failure(
                    stage,
                    format!("non-opaque uniform '{}' must be declared in a block", name),
                ));
            }
            ["uniform", type_name, "{", ..] => {
                let open = decl.find('{').unwrap_or(0);
                let close = decl.rfind('}')
                    .ok_or_else(|| parse_failure(stage, "unterminated uniform block"))?;
                let members = decl[open + 1..close]
                    .split(';')
                    .filter_map(|m| {
                        let mut parts = m.split_whitespace();
                        Some((parts.next()?.to_string(), parts.next()?.to_string()))
                    })
                    .collect();
                parsed.blocks.push(MockBlock {
                    binding: layout.unwrap_or(0),
                    type_name: type_name.to_string(),
                    instance: decl[close + 1..].trim().to_string(),
                    members,
                });
            }
            _ => {}
        }
    }

    Ok(parsed)
}

fn member_type(glsl: &str) -> MemberType {
    let (base, array) = match glsl.find('[') {
        Some(open) => {
            let size = glsl[open + 1..].trim_end_matches(']').parse().unwrap_or(1);
            (&glsl[..open], vec![size])
        }
        None => (glsl, Vec::new()),
    };
    let (scalar, vecsize, columns) = match base {
        "float" => (ScalarClass::Float, 1, 1),
        "vec2" => (ScalarClass::Float, 2, 1),
        "vec3" => (ScalarClass::Float, 3, 1),
        "vec4" => (ScalarClass::Float, 4, 1),
        "mat3" => (ScalarClass::Float, 3, 3),
        "mat4" => (ScalarClass::Float, 4, 4),
        "int" => (ScalarClass::Int, 1, 1),
        "ivec4" => (ScalarClass::Int, 4, 1),
        "dvec4" => (ScalarClass::Double, 4, 1),
        _ => (ScalarClass::Other, 0, 0),
    };
    MemberType { scalar, vecsize, columns, array }
}

// Array suffixes sit on the member name in GLSL; move them onto the type.
fn split_member(ty: &str, name: &str) -> (String, String) {
    match name.find('[') {
        Some(open) => (format!("{}{}", ty, &name[open..]), name[..open].to_string()),
        None => (ty.to_string(), name.to_string()),
    }
}

// ============================================================================
// Mock Toolchain
// ============================================================================

/// Mock toolchain; records how many times each step ran
#[derive(Debug, Default)]
pub struct MockToolchain {
    pub parsed: std::cell::Cell<usize>,
    pub lowered: std::cell::Cell<usize>,
}

impl ShaderToolchain for MockToolchain {
    type Stage = (ShaderStage, MockStage);
    type Model = MockModel;

    fn initialize(_config: &CompilerConfig) -> Result<Self> {
        Ok(Self::default())
    }

    fn parse(&self, stage: ShaderStage, source: &str, limits: &ResourceLimits) -> Result<Self::Stage> {
        self.parsed.set(self.parsed.get() + 1);
        let parsed = parse_stage(stage, source)?;
        if parsed.textures.len() as u32 > limits.max_texture_image_units {
            return Err(parse_failure(
                stage,
                format!(
                    "{} textures exceed the limit of {}",
                    parsed.textures.len(),
                    limits.max_texture_image_units
                ),
            ));
        }
        Ok((stage, parsed))
    }

    fn link(&self, vertex: &Self::Stage, fragment: &Self::Stage) -> Result<()> {
        for input in &fragment.1.inputs {
            match vertex.1.outputs.iter().find(|o| o.location == input.location) {
                Some(output) if output.ty == input.ty => {}
                Some(output) => {
                    return Err(Error::LinkFailure(format!(
                        "location {}: vertex writes {} but fragment reads {}",
                        input.location, output.ty, input.ty
                    )));
                }
                None => {
                    return Err(Error::LinkFailure(format!(
                        "fragment input '{}' (location {}) has no vertex output",
                        input.name, input.location
                    )));
                }
            }
        }
        Ok(())
    }

    fn lower(&self, stage: &Self::Stage) -> Result<BinaryIntermediate> {
        self.lowered.set(self.lowered.get() + 1);
        let bytes = stage.1.source.as_bytes();
        let stage_word = match stage.0 {
            ShaderStage::Vertex => 0,
            ShaderStage::Fragment => 4,
        };
        let mut words = vec![SPIRV_MAGIC, 0x0001_0000, stage_word, 0, 0, bytes.len() as u32];
        words.extend(bytes.chunks(4).map(|chunk| {
            let mut word = [0u8; 4];
            word[..chunk.len()].copy_from_slice(chunk);
            u32::from_le_bytes(word)
        }));
        BinaryIntermediate::new(stage.0, words)
    }

    fn load_model(&self, binary: BinaryIntermediate) -> Result<Self::Model> {
        let stage = binary.stage();
        let words = binary.words();
        let len = words.get(5).copied().unwrap_or(0) as usize;
        let bytes: Vec<u8> = words[6..].iter().flat_map(|w| w.to_le_bytes()).take(len).collect();
        let source = String::from_utf8(bytes).map_err(|e| Error::TranspileFailure {
            stage,
            message: e.to_string(),
        })?;
        Ok(MockModel::new(stage, parse_stage(stage, &source)?))
    }
}

// ============================================================================
// Mock Model
// ============================================================================

/// Mock semantic model with a tiny deterministic emitter
#[derive(Debug)]
pub struct MockModel {
    pub stage: ShaderStage,
    pub parsed: MockStage,
    pub options: Option<EmitOptions>,
    pub names: FxHashMap<ResourceId, String>,
    pub bindings: FxHashMap<ResourceId, u32>,
    pub combined: Vec<CombinedSampler>,
    pub header_lines: Vec<String>,
}

impl MockModel {
    pub fn new(stage: ShaderStage, parsed: MockStage) -> Self {
        let mut names = FxHashMap::default();
        let mut bindings = FxHashMap::default();

        for (i, block) in parsed.blocks.iter().enumerate() {
            names.insert(UBO_TYPE_ID + 100 * i as u32, block.type_name.clone());
            names.insert(UBO_ID + 100 * i as u32, block.instance.clone());
            bindings.insert(UBO_ID + 100 * i as u32, block.binding);
        }
        for (i, sampler) in parsed.samplers.iter().enumerate() {
            names.insert(SAMPLER_BASE_ID + i as u32, sampler.name.clone());
            bindings.insert(SAMPLER_BASE_ID + i as u32, sampler.binding);
        }
        for (i, texture) in parsed.textures.iter().enumerate() {
            names.insert(TEXTURE_BASE_ID + i as u32, texture.name.clone());
            bindings.insert(TEXTURE_BASE_ID + i as u32, texture.binding);
        }
        for (i, output) in parsed.outputs.iter().enumerate() {
            names.insert(OUTPUT_BASE_ID + i as u32, output.name.clone());
        }

        Self {
            stage,
            parsed,
            options: None,
            names,
            bindings,
            combined: Vec::new(),
            header_lines: Vec::new(),
        }
    }

    fn name(&self, id: ResourceId) -> String {
        self.names.get(&id).cloned().unwrap_or_else(|| format!("_{}", id))
    }

    fn layout_binding(&self, id: ResourceId, es: bool) -> String {
        match self.bindings.get(&id) {
            Some(binding) if !es => format!("layout(binding = {}) ", binding),
            _ => String::new(),
        }
    }

    fn resource(&self, id: ResourceId, base_type_id: ResourceId) -> ModelResource {
        ModelResource { id, base_type_id, name: self.name(id) }
    }

    fn transpile_failure(&self, message: impl Into<String>) -> Error {
        Error::TranspileFailure { stage: self.stage, message: message.into() }
    }
}

impl CrossModel for MockModel {
    fn configure(&mut self, options: &EmitOptions) -> Result<()> {
        self.options = Some(*options);
        Ok(())
    }

    fn build_combined_samplers(&mut self) -> Result<Vec<CombinedSampler>> {
        self.combined = (0..self.parsed.samplers.len().min(self.parsed.textures.len()))
            .map(|i| {
                let i = i as u32;
                let combined = CombinedSampler {
                    combined_id: COMBINED_BASE_ID + i,
                    image_id: TEXTURE_BASE_ID + i,
                    sampler_id: SAMPLER_BASE_ID + i,
                };
                let auto_name = format!(
                    "SPIRV_Cross_Combined{}{}",
                    self.name(combined.image_id),
                    self.name(combined.sampler_id)
                );
                self.names.insert(combined.combined_id, auto_name);
                self.bindings.insert(combined.combined_id, 100 + i);
                combined
            })
            .collect();
        Ok(self.combined.clone())
    }

    fn resources(&mut self) -> Result<ModelResources> {
        Ok(ModelResources {
            uniform_buffers: (0..self.parsed.blocks.len())
                .map(|i| self.resource(UBO_ID + 100 * i as u32, UBO_TYPE_ID + 100 * i as u32))
                .collect(),
            separate_samplers: (0..self.parsed.samplers.len())
                .map(|i| self.resource(SAMPLER_BASE_ID + i as u32, SAMPLER_BASE_ID + i as u32))
                .collect(),
            stage_outputs: (0..self.parsed.outputs.len())
                .map(|i| self.resource(OUTPUT_BASE_ID + i as u32, OUTPUT_BASE_ID + i as u32))
                .collect(),
        })
    }

    fn binding(&mut self, id: ResourceId) -> Result<u32> {
        Ok(self.bindings.get(&id).copied().unwrap_or(0))
    }

    fn set_binding(&mut self, id: ResourceId, binding: u32) -> Result<()> {
        self.bindings.insert(id, binding);
        Ok(())
    }

    fn clear_binding(&mut self, id: ResourceId) -> Result<()> {
        self.bindings.remove(&id);
        Ok(())
    }

    fn set_name(&mut self, id: ResourceId, name: &str) -> Result<()> {
        self.names.insert(id, name.to_string());
        Ok(())
    }

    fn type_name(&mut self, type_id: ResourceId) -> Result<String> {
        self.names
            .get(&type_id)
            .cloned()
            .ok_or_else(|| self.transpile_failure(format!("unknown type {}", type_id)))
    }

    fn struct_members(&mut self, type_id: ResourceId) -> Result<Vec<StructMember>> {
        let index = ((type_id - UBO_TYPE_ID) / 100) as usize;
        let block = self
            .parsed
            .blocks
            .get(index)
            .ok_or_else(|| self.transpile_failure(format!("type {} is not a struct", type_id)))?;
        Ok(block
            .members
            .iter()
            .map(|(ty, name)| {
                let (ty, name) = split_member(ty, name);
                StructMember { name, ty: member_type(&ty) }
            })
            .collect())
    }

    fn add_header_line(&mut self, line: &str) -> Result<()> {
        self.header_lines.push(line.to_string());
        Ok(())
    }

    fn emit(&mut self) -> Result<String> {
        let options = self.options.ok_or_else(|| self.transpile_failure("compile options not set"))?;
        let es = options.es;
        let mut out = String::new();

        out.push_str(&format!("#version {}{}\n", options.version, if es { " es" } else { "" }));
        for line in &self.header_lines {
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');

        let block = self.parsed.blocks.first();
        if let Some(block) = block {
            out.push_str(&format!("struct {}\n{{\n", block.type_name));
            for (ty, name) in &block.members {
                out.push_str(&format!("    {} {};\n", ty, name));
            }
            out.push_str("};\n\n");
            out.push_str(&format!(
                "{}uniform {} {};\n",
                self.layout_binding(UBO_ID, es),
                block.type_name,
                self.name(UBO_ID)
            ));
        }
        for combined in &self.combined {
            out.push_str(&format!(
                "{}uniform sampler2D {};\n",
                self.layout_binding(combined.combined_id, es),
                self.name(combined.combined_id)
            ));
        }
        for (i, output) in self.parsed.outputs.iter().enumerate() {
            out.push_str(&format!(
                "layout(location = {}) out {}{} {};\n",
                output.location,
                if es { "highp " } else { "" },
                output.ty,
                self.name(OUTPUT_BASE_ID + i as u32)
            ));
        }

        out.push_str("\nvoid main()\n{\n");
        if let Some(block) = block {
            for (_, name) in &block.members {
                let (_, name) = split_member("", name);
                out.push_str(&format!("    consume({}.{});\n", self.name(UBO_ID), name));
            }
        }
        for combined in &self.combined {
            out.push_str(&format!(
                "    consume(texture({}, vec2(0.0)));\n",
                self.name(combined.combined_id)
            ));
        }
        for i in 0..self.parsed.outputs.len() {
            out.push_str(&format!("    {} = vec4(1.0);\n", self.name(OUTPUT_BASE_ID + i as u32)));
        }
        out.push_str("}\n");

        Ok(out)
    }

    fn reflect(&self) -> Result<ShaderReflection> {
        let uniforms = self
            .parsed
            .blocks
            .first()
            .map(|block| {
                block
                    .members
                    .iter()
                    .map(|(ty, name)| {
                        let (ty, name) = split_member(ty, name);
                        let ty = member_type(&ty);
                        ReflectedUniform { name, vecsize: ty.vecsize, columns: ty.columns }
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(ShaderReflection {
            uniforms,
            samplers: self
                .parsed
                .samplers
                .iter()
                .map(|s| ReflectedSampler { name: s.name.clone(), binding: s.binding })
                .collect(),
            textures: self
                .parsed
                .textures
                .iter()
                .map(|t| ReflectedTexture { name: t.name.clone(), binding: t.binding })
                .collect(),
        })
    }
}
