/// SpirvModel - CrossModel implementation over SPIRV-Cross
///
/// Wraps a `spirv::Ast<glsl::Target>` built from the lowered words. Binding
/// reflection is captured with spirq at load time, before reconciliation edits
/// names and decorations.

use shader_bridge::shader_bridge::{
    BinaryIntermediate, CombinedSampler, CrossModel, EmitOptions, Error, MemberType,
    ModelResource, ModelResources, ResourceId, Result, ScalarClass, ShaderReflection,
    ShaderStage, StructMember,
};
use spirv_cross::{glsl, spirv, ErrorCode};
use crate::spirv_reflection::reflect_bindings;

/// Semantic model of one stage
pub struct SpirvModel {
    stage: ShaderStage,
    ast: spirv::Ast<glsl::Target>,
    reflection: ShaderReflection,
}

impl std::fmt::Debug for SpirvModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpirvModel")
            .field("stage", &self.stage)
            .field("reflection", &self.reflection)
            .finish_non_exhaustive()
    }
}

fn glsl_version(options: &EmitOptions) -> Option<glsl::Version> {
    match (options.version, options.es) {
        (430, false) => Some(glsl::Version::V4_30),
        (300, true) => Some(glsl::Version::V3_00Es),
        _ => None,
    }
}

fn resource(r: &spirv::Resource) -> ModelResource {
    ModelResource { id: r.id, base_type_id: r.base_type_id, name: r.name.clone() }
}

fn member_type(ty: spirv::Type) -> MemberType {
    use spirv::Type;
    let (scalar, vecsize, columns, array) = match ty {
        Type::Float { vecsize, columns, array, .. } => (ScalarClass::Float, vecsize, columns, array),
        Type::Double { vecsize, columns, array, .. } => (ScalarClass::Double, vecsize, columns, array),
        Type::Int { vecsize, columns, array, .. } => (ScalarClass::Int, vecsize, columns, array),
        Type::UInt { vecsize, columns, array, .. } => (ScalarClass::UInt, vecsize, columns, array),
        Type::Boolean { vecsize, columns, array, .. } => (ScalarClass::Bool, vecsize, columns, array),
        Type::Struct { array, .. } => (ScalarClass::Struct, 0, 0, array),
        _ => (ScalarClass::Other, 0, 0, Vec::new()),
    };
    MemberType { scalar, vecsize, columns, array }
}

impl SpirvModel {
    /// Re-parse a binary intermediate into a model
    pub fn load(binary: BinaryIntermediate) -> Result<Self> {
        let stage = binary.stage();
        let reflection = reflect_bindings(stage, binary.words())?;

        let module = spirv::Module::from_words(binary.words());
        let ast = spirv::Ast::<glsl::Target>::parse(&module)
            .map_err(|e| Self::transpile_error(stage, e))?;

        Ok(Self { stage, ast, reflection })
    }

    fn transpile_error(stage: ShaderStage, error: ErrorCode) -> Error {
        let message = match error {
            ErrorCode::CompilationError(message) => message,
            other => format!("{:?}", other),
        };
        Error::TranspileFailure { stage, message }
    }

    fn check<T>(&self, result: std::result::Result<T, ErrorCode>) -> Result<T> {
        result.map_err(|e| Self::transpile_error(self.stage, e))
    }
}

impl CrossModel for SpirvModel {
    fn configure(&mut self, options: &EmitOptions) -> Result<()> {
        let version = glsl_version(options).ok_or_else(|| Error::TranspileFailure {
            stage: self.stage,
            message: format!(
                "unsupported target GLSL {}{}",
                options.version,
                if options.es { " es" } else { "" }
            ),
        })?;

        let mut compiler_options = glsl::CompilerOptions::default();
        compiler_options.version = version;
        compiler_options.vulkan_semantics = false;
        compiler_options.emit_uniform_buffer_as_plain_uniforms = options.plain_uniforms;

        let result = self.ast.set_compiler_options(&compiler_options);
        self.check(result)
    }

    fn build_combined_samplers(&mut self) -> Result<Vec<CombinedSampler>> {
        let result = self.ast.build_combined_image_samplers();
        self.check(result)?;
        let result = self.ast.get_combined_image_samplers();
        Ok(self
            .check(result)?
            .into_iter()
            .map(|c| CombinedSampler {
                combined_id: c.combined_id,
                image_id: c.image_id,
                sampler_id: c.sampler_id,
            })
            .collect())
    }

    fn resources(&mut self) -> Result<ModelResources> {
        let result = self.ast.get_shader_resources();
        let resources = self.check(result)?;
        Ok(ModelResources {
            uniform_buffers: resources.uniform_buffers.iter().map(resource).collect(),
            separate_samplers: resources.separate_samplers.iter().map(resource).collect(),
            stage_outputs: resources.stage_outputs.iter().map(resource).collect(),
        })
    }

    fn binding(&mut self, id: ResourceId) -> Result<u32> {
        let result = self.ast.get_decoration(id, spirv::Decoration::Binding);
        self.check(result)
    }

    fn set_binding(&mut self, id: ResourceId, binding: u32) -> Result<()> {
        let result = self.ast.set_decoration(id, spirv::Decoration::Binding, binding);
        self.check(result)
    }

    fn clear_binding(&mut self, id: ResourceId) -> Result<()> {
        let result = self.ast.unset_decoration(id, spirv::Decoration::Binding);
        self.check(result)
    }

    fn set_name(&mut self, id: ResourceId, name: &str) -> Result<()> {
        let result = self.ast.set_name(id, name);
        self.check(result)
    }

    fn type_name(&mut self, type_id: ResourceId) -> Result<String> {
        let result = self.ast.get_name(type_id);
        self.check(result)
    }

    fn struct_members(&mut self, type_id: ResourceId) -> Result<Vec<StructMember>> {
        let result = self.ast.get_type(type_id);
        let member_types = match self.check(result)? {
            spirv::Type::Struct { member_types, .. } => member_types,
            other => {
                return Err(Error::TranspileFailure {
                    stage: self.stage,
                    message: format!("type {} is not a struct: {:?}", type_id, other),
                });
            }
        };

        let mut members = Vec::with_capacity(member_types.len());
        for (index, member_type_id) in member_types.into_iter().enumerate() {
            let result = self.ast.get_member_name(type_id, index as u32);
            let name = self.check(result)?;
            let result = self.ast.get_type(member_type_id);
            let ty = member_type(self.check(result)?);
            members.push(StructMember { name, ty });
        }
        Ok(members)
    }

    fn add_header_line(&mut self, line: &str) -> Result<()> {
        let result = self.ast.add_header_line(line);
        self.check(result)
    }

    fn emit(&mut self) -> Result<String> {
        let result = self.ast.compile();
        self.check(result)
    }

    fn reflect(&self) -> Result<ShaderReflection> {
        Ok(self.reflection.clone())
    }
}
