//! shaderkit: compose shader programs from reusable code parts.
//!
//! A shader is written once as a base, and variations are expressed as small
//! parts that replace pieces of it. Different parts with the same purpose
//! share a name, so switching e.g. the render style of a volume is a single
//! [`Composer::replace_part`] call.
//!
//! # Quick Start
//!
//! ```no_run
//! use shaderkit::*;
//!
//! fn main() -> Result<()> {
//!     init();
//!
//!     let mut fragment = Composer::new();
//!     fragment.add_part(
//!         CodePart::new("base", "", "void main() {\n    // --renderstyle--\n}"),
//!         Placement::Append,
//!     )?;
//!     fragment.add_part(
//!         CodePart::new("renderstyle", "mip", ">>--renderstyle--\ngl_FragColor = mip();"),
//!         Placement::Append,
//!     )?;
//!     fragment.set_uniform("th", 0.5_f32)?;
//!
//!     println!("{}", fragment.show_code(None)?);
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - [`CodePart`] - a named, versioned piece of code made of sections
//! - [`Composer`] - an ordered list of parts, merged lazily into one source
//! - [`ShaderProgram`] - a vertex and a fragment composer linked together
//! - [`ShaderLibrary`] - sources loaded from `<name>.<stage>.glsl` files

mod error;
mod init;
mod program;

pub use error::{Error, Result};
pub use init::init;
pub use program::{ProgramBackend, ShaderProgram};

// Re-export core types
pub use shaderkit_core::{
    merge_parts, parse_resource_name, BufferLine, CodePart, Composer, ComposerOptions,
    MergeBuffer, PartKey, Placement, ProgramCall, ProgramUniforms, RecordingProgram,
    ResolvedUniform, Section, ShaderKitError, ShaderLibrary, ShaderStage, UniformProducer,
    UniformTable, UniformTexture, UniformValue, UniformVec, MAX_UNIFORM_COMPONENTS,
    NEEDLE_MARKER,
};

// Re-export glam types for convenience
pub use shaderkit_core::{IVec2, IVec3, IVec4, Vec2, Vec3, Vec4};
