//! Resource reconciliation
//!
//! The source dialect binds textures and samplers separately and reads uniforms
//! through a struct-qualified block. The target dialect wants combined samplers
//! and flat uniforms. The functions here edit the semantic model so the emitted
//! text keeps the names and binding slots the renderer's reflection computes
//! independently from the original stage.

use std::fmt;
use crate::error::{Error, Result};
use crate::model::{CombinedSampler, CrossModel, MemberType, ModelResources, ScalarClass};
use crate::shader::ShaderStage;

// ============================================================================
// SAMPLER COMBINATION
// ============================================================================

/// Name and binding transferred from a separate sampler to its combined resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplerRemap {
    /// Resource that received the sampler identity
    pub target_id: u32,
    /// Original separate sampler
    pub sampler_id: u32,
    pub name: String,
    pub binding: u32,
}

/// Give every combined sampler the name and binding of its separate sampler
///
/// A sampler with no combined counterpart (declared but never used with a
/// texture) gets its own identity re-applied. A sampler combined with several
/// textures hands its identity to the first combination only.
pub fn remap_combined_samplers<M: CrossModel>(
    model: &mut M,
    resources: &ModelResources,
    combined: &[CombinedSampler],
) -> Result<Vec<SamplerRemap>> {
    let mut remaps = Vec::with_capacity(resources.separate_samplers.len());

    for sampler in &resources.separate_samplers {
        let binding = model.binding(sampler.id)?;

        let mut pairs = combined.iter().filter(|c| c.sampler_id == sampler.id);
        let target_id = pairs.next().map_or(sampler.id, |c| c.combined_id);

        let extra = pairs.count();
        if extra > 0 {
            crate::bridge_warn!(
                "shader_bridge::reconcile",
                "Sampler '{}' is combined with {} more texture(s); only the first keeps its name",
                sampler.name,
                extra
            );
        }

        model.set_name(target_id, &sampler.name)?;
        model.set_binding(target_id, binding)?;

        crate::bridge_trace!(
            "shader_bridge::reconcile",
            "Combined sampler {} -> '{}' (binding {})",
            target_id,
            sampler.name,
            binding
        );

        remaps.push(SamplerRemap {
            target_id,
            sampler_id: sampler.id,
            name: sampler.name.clone(),
            binding,
        });
    }

    Ok(remaps)
}

// ============================================================================
// UNIFORM FLATTENING
// ============================================================================

/// Type keyword of a flattened uniform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformKind {
    Vec4,
    Mat4,
}

impl UniformKind {
    /// Classify a member; `None` for every shape other than vec4 and mat4
    pub fn classify(ty: &MemberType) -> Option<Self> {
        if ty.scalar != ScalarClass::Float || !ty.array.is_empty() || ty.vecsize != 4 {
            return None;
        }
        match ty.columns {
            1 => Some(UniformKind::Vec4),
            4 => Some(UniformKind::Mat4),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            UniformKind::Vec4 => "vec4",
            UniformKind::Mat4 => "mat4",
        }
    }
}

impl fmt::Display for UniformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A top-level uniform synthesized from a uniform-buffer member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatUniform {
    pub name: String,
    pub kind: UniformKind,
}

impl FlatUniform {
    /// Declaration line added to the emitted header
    pub fn declaration(&self) -> String {
        format!("uniform {} {};", self.kind, self.name)
    }
}

/// Result of flattening the stage's uniform buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenedBlock {
    /// Struct type name of the buffer (kept in the emitted text)
    pub struct_name: String,
    /// New name of the struct instance
    pub marker: &'static str,
    pub uniforms: Vec<FlatUniform>,
}

/// Declare every uniform-buffer member as a flat uniform and retire the block
///
/// The struct instance is renamed to the stage marker and loses its binding so
/// it takes no slot. Fails before touching the model if any member is not a
/// vec4 or mat4, or if the stage does not declare exactly one uniform buffer.
pub fn flatten_uniform_buffer<M: CrossModel>(
    model: &mut M,
    resources: &ModelResources,
    stage: ShaderStage,
) -> Result<FlattenedBlock> {
    let buffer = match resources.uniform_buffers.as_slice() {
        [buffer] => buffer,
        other => {
            return Err(Error::UniformBufferCount { stage, found: other.len() });
        }
    };

    let members = model.struct_members(buffer.base_type_id)?;
    let uniforms = members
        .into_iter()
        .map(|member| match UniformKind::classify(&member.ty) {
            Some(kind) => Ok(FlatUniform { name: member.name, kind }),
            None => Err(Error::UnsupportedUniformShape {
                stage,
                uniform: member.name,
                shape: member.ty.to_string(),
            }),
        })
        .collect::<Result<Vec<_>>>()?;

    for uniform in &uniforms {
        model.add_header_line(&uniform.declaration())?;
    }

    let struct_name = model.type_name(buffer.base_type_id)?;
    let marker = stage.unused_marker();
    model.set_name(buffer.id, marker)?;
    model.clear_binding(buffer.id)?;

    crate::bridge_debug!(
        "shader_bridge::reconcile",
        "Flattened {} uniform(s) of '{}' ({} stage)",
        uniforms.len(),
        struct_name,
        stage
    );

    Ok(FlattenedBlock { struct_name, marker, uniforms })
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;
