/// SPIR-V reflection with spirq
///
/// Two views of a compiled stage: the varying interface used by the link
/// check, and the binding reflection handed to the renderer. Both are read
/// from the stage as the front-end produced it, before any model edit.

use shader_bridge::shader_bridge::{
    Error, ReflectedSampler, ReflectedTexture, ReflectedUniform, Result, ShaderReflection,
    ShaderStage,
};
use spirq::ty::{DescriptorType, Type};
use spirq::var::Variable;

/// A location-assigned stage input or output
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceVariable {
    pub name: String,
    pub location: u32,
    pub ty: Type,
}

/// A descriptor-bound resource
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDescriptor {
    pub name: String,
    pub set: u32,
    pub binding: u32,
    pub desc_ty: DescriptorType,
}

/// Everything a stage exposes to the other stage
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageInterface {
    pub inputs: Vec<InterfaceVariable>,
    pub outputs: Vec<InterfaceVariable>,
    pub descriptors: Vec<InterfaceDescriptor>,
}

fn entry_point_vars(words: &[u32]) -> std::result::Result<Vec<Variable>, String> {
    let entry_points = spirq::ReflectConfig::new()
        .spv(words)
        .ref_all_rscs(true)
        .reflect()
        .map_err(|e| format!("SPIR-V reflection failed: {:?}", e))?;

    Ok(entry_points.into_iter().flat_map(|entry_point| entry_point.vars).collect())
}

/// Reflect the stage interface
pub fn reflect_interface(stage: ShaderStage, words: &[u32]) -> Result<StageInterface> {
    let vars = entry_point_vars(words)
        .map_err(|message| Error::ParseFailure { stage, message })?;

    let mut interface = StageInterface::default();
    for var in vars {
        match var {
            Variable::Input { name, location, ty, .. } => interface.inputs.push(InterfaceVariable {
                name: name.unwrap_or_default(),
                location: location.loc(),
                ty,
            }),
            Variable::Output { name, location, ty, .. } => interface.outputs.push(InterfaceVariable {
                name: name.unwrap_or_default(),
                location: location.loc(),
                ty,
            }),
            Variable::Descriptor { name, desc_bind, desc_ty, .. } => {
                interface.descriptors.push(InterfaceDescriptor {
                    name: name.unwrap_or_default(),
                    set: desc_bind.set(),
                    binding: desc_bind.bind(),
                    desc_ty,
                })
            }
            _ => {}
        }
    }
    Ok(interface)
}

/// Check that the fragment interface is satisfied by the vertex interface
///
/// Every fragment input needs a vertex output at the same location with the
/// same type. Resources sharing a (set, binding) slot must be the same kind.
///
/// Uniform blocks are not compared: stages routinely declare the same block
/// name with different members, and flattening gives each stage its own
/// top-level uniforms anyway.
pub fn check_link(vertex: &StageInterface, fragment: &StageInterface) -> std::result::Result<(), String> {
    for input in &fragment.inputs {
        let Some(output) = vertex.outputs.iter().find(|o| o.location == input.location) else {
            return Err(format!(
                "fragment input '{}' (location {}) is not written by the vertex stage",
                input.name, input.location
            ));
        };
        if output.ty != input.ty {
            return Err(format!(
                "location {}: vertex output '{}' is {:?} but fragment input '{}' is {:?}",
                input.location, output.name, output.ty, input.name, input.ty
            ));
        }
    }

    for fs in &fragment.descriptors {
        for vs in &vertex.descriptors {
            if vs.set == fs.set && vs.binding == fs.binding && vs.desc_ty != fs.desc_ty {
                return Err(format!(
                    "'{}' (set={}, binding={}) has different kinds in vertex ({:?}) and fragment ({:?})",
                    fs.name, fs.set, fs.binding, vs.desc_ty, fs.desc_ty
                ));
            }
        }
    }

    Ok(())
}

/// Dimensions of a uniform member: (components per column, columns)
fn member_shape(ty: &Type) -> (u32, u32) {
    match ty {
        Type::Scalar(_) => (1, 1),
        Type::Vector(v) => (v.nscalar as u32, 1),
        Type::Matrix(m) => (m.vector_ty.nscalar as u32, m.nvector as u32),
        Type::Array(a) => member_shape(&a.element_ty),
        _ => (0, 0),
    }
}

/// Binding reflection of the stage as authored
pub fn reflect_bindings(stage: ShaderStage, words: &[u32]) -> Result<ShaderReflection> {
    let vars = entry_point_vars(words)
        .map_err(|message| Error::TranspileFailure { stage, message })?;

    let mut reflection = ShaderReflection::default();
    for var in vars {
        let Variable::Descriptor { name, desc_bind, desc_ty, ty, .. } = var else {
            continue;
        };
        let name = name.unwrap_or_default();
        match desc_ty {
            DescriptorType::UniformBuffer() => {
                if let Type::Struct(st) = &ty {
                    reflection.uniforms.extend(st.members.iter().map(|m| {
                        let (vecsize, columns) = member_shape(&m.ty);
                        ReflectedUniform {
                            name: m.name.clone().unwrap_or_default(),
                            vecsize,
                            columns,
                        }
                    }));
                }
            }
            DescriptorType::Sampler() => reflection.samplers.push(ReflectedSampler {
                name,
                binding: desc_bind.bind(),
            }),
            DescriptorType::SampledImage() => reflection.textures.push(ReflectedTexture {
                name,
                binding: desc_bind.bind(),
            }),
            _ => {}
        }
    }
    Ok(reflection)
}
