/*!
# Shader Bridge

Cross-API shader translation for the engine's OpenGL paths.

Vertex and fragment stages are authored once in GLSL 450 (Vulkan flavour:
separate textures and samplers, uniforms grouped in one block per stage) and
re-emitted as GLSL 430 core (desktop) or GLSL ES 300 (mobile), keeping the
names and binding slots the renderer's reflection expects.

## Architecture

- **ShaderToolchain**: Front-end, linker and lowering to a binary intermediate
- **CrossModel**: Semantic model re-parsed from the binary, edited and emitted
- **ShaderCompiler**: Facade running the pipeline for a vertex/fragment pair
- **reconcile**: Combined-sampler renaming and uniform flattening
- **patch**: Data-driven textual patches applied to the emitted source

Backend crates provide concrete types that implement these traits.
*/

// Internal modules
mod error;
mod bridge;
mod compiler;
mod config;
mod model;
mod reflection;
mod shader;
mod toolchain;
pub mod log;
pub mod patch;
pub mod reconcile;

#[cfg(test)]
pub(crate) mod mock_toolchain;

// Main shader_bridge namespace module
pub mod shader_bridge {
    // Error types
    pub use crate::error::{Error, Result};

    // Process-wide state
    pub use crate::bridge::{ShaderBridge, ToolchainClaim};

    // Facade
    pub use crate::compiler::ShaderCompiler;

    // Backend seams
    pub use crate::toolchain::ShaderToolchain;
    pub use crate::model::*;

    pub use crate::config::*;
    pub use crate::shader::*;
    pub use crate::reflection::*;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }
}
