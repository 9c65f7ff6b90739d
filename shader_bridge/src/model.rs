/// CrossModel trait - the semantic model re-parsed from a binary intermediate
///
/// Implemented by backend-specific transpilers (e.g. the spirv_cross model).
/// Reconciliation and flattening only talk to this trait, so they behave the
/// same for every backend.

use std::fmt;
use crate::config::EmitOptions;
use crate::error::Result;
use crate::reflection::ShaderReflection;

/// Identifier of a variable or type inside the model
pub type ResourceId = u32;

/// A declared resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelResource {
    /// Variable id
    pub id: ResourceId,
    /// Id of the underlying (non-array, non-pointer) type
    pub base_type_id: ResourceId,
    /// Variable name
    pub name: String,
}

/// Resources declared by one stage
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelResources {
    pub uniform_buffers: Vec<ModelResource>,
    pub separate_samplers: Vec<ModelResource>,
    pub stage_outputs: Vec<ModelResource>,
}

/// A texture/sampler pair merged into one combined resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CombinedSampler {
    pub combined_id: ResourceId,
    pub image_id: ResourceId,
    pub sampler_id: ResourceId,
}

/// Scalar class of a struct member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarClass {
    Float,
    Double,
    Int,
    UInt,
    Bool,
    Struct,
    Other,
}

/// Numeric shape of a struct member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberType {
    pub scalar: ScalarClass,
    /// Components per column (1 for scalars)
    pub vecsize: u32,
    /// Columns (1 for vectors and scalars)
    pub columns: u32,
    /// Array dimensions, outermost last; empty when not an array
    pub array: Vec<u32>,
}

impl MemberType {
    pub fn float(vecsize: u32, columns: u32) -> Self {
        Self { scalar: ScalarClass::Float, vecsize, columns, array: Vec::new() }
    }
}

impl fmt::Display for MemberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.scalar {
            ScalarClass::Float => "",
            ScalarClass::Double => "d",
            ScalarClass::Int => "i",
            ScalarClass::UInt => "u",
            ScalarClass::Bool => "b",
            ScalarClass::Struct => return write!(f, "struct{}", ArraySuffix(&self.array)),
            ScalarClass::Other => return write!(f, "opaque{}", ArraySuffix(&self.array)),
        };
        match (self.vecsize, self.columns) {
            (1, 1) => {
                let scalar = match self.scalar {
                    ScalarClass::Float => "float",
                    ScalarClass::Double => "double",
                    ScalarClass::Int => "int",
                    ScalarClass::UInt => "uint",
                    _ => "bool",
                };
                write!(f, "{}", scalar)?;
            }
            (n, 1) => write!(f, "{}vec{}", prefix, n)?,
            (rows, cols) if rows == cols => write!(f, "{}mat{}", prefix, cols)?,
            (rows, cols) => write!(f, "{}mat{}x{}", prefix, cols, rows)?,
        }
        write!(f, "{}", ArraySuffix(&self.array))
    }
}

struct ArraySuffix<'a>(&'a [u32]);

impl fmt::Display for ArraySuffix<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for size in self.0 {
            write!(f, "[{}]", size)?;
        }
        Ok(())
    }
}

/// A struct member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructMember {
    pub name: String,
    pub ty: MemberType,
}

/// Semantic model of one stage
///
/// Calls follow the order used by the compiler: `configure`, then
/// `build_combined_samplers`, then resource queries and edits, then `emit`.
pub trait CrossModel {
    /// Apply target dialect options
    fn configure(&mut self, options: &EmitOptions) -> Result<()>;

    /// Merge every (texture, sampler) pair used together into a combined resource
    fn build_combined_samplers(&mut self) -> Result<Vec<CombinedSampler>>;

    /// Resources currently declared
    fn resources(&mut self) -> Result<ModelResources>;

    /// Binding decoration of a resource
    fn binding(&mut self, id: ResourceId) -> Result<u32>;

    fn set_binding(&mut self, id: ResourceId, binding: u32) -> Result<()>;

    /// Remove the binding decoration of a resource
    fn clear_binding(&mut self, id: ResourceId) -> Result<()>;

    fn set_name(&mut self, id: ResourceId, name: &str) -> Result<()>;

    /// Name of a type (the struct name for uniform buffers)
    fn type_name(&mut self, type_id: ResourceId) -> Result<String>;

    /// Members of a struct type, in declaration order
    fn struct_members(&mut self, type_id: ResourceId) -> Result<Vec<StructMember>>;

    /// Add a raw line emitted right after the version header
    fn add_header_line(&mut self, line: &str) -> Result<()>;

    /// Emit target-dialect source
    fn emit(&mut self) -> Result<String>;

    /// Binding reflection for the renderer
    fn reflect(&self) -> Result<ShaderReflection>;
}
