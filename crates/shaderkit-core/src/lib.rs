//! Core of shaderkit.
//!
//! This crate builds shader source out of small, named code parts:
//! - [`CodePart`] holds a named, versioned fragment of source and its sections
//! - [`merge_parts`] folds parts into a [`MergeBuffer`] of owner-tagged lines
//! - [`Composer`] manages an ordered part list, caches the merged code, and
//!   carries the [`UniformTable`] of the resulting program
//! - [`ShaderLibrary`] stores sources by stage and name

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Accessors return values that are fine to ignore
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

pub mod buffer;
pub mod composer;
pub mod error;
pub mod library;
pub mod merge;
pub mod options;
pub mod part;
pub mod program;
pub mod uniform;

pub use buffer::{BufferLine, MergeBuffer};
pub use composer::{Composer, Placement};
pub use error::{Result, ShaderKitError};
pub use library::{parse_resource_name, ShaderLibrary, ShaderStage};
pub use merge::merge_parts;
pub use options::ComposerOptions;
pub use part::{CodePart, PartKey, Section, NEEDLE_MARKER};
pub use program::{ProgramCall, RecordingProgram};
pub use uniform::{
    ProgramUniforms, ResolvedUniform, UniformProducer, UniformTable, UniformTexture, UniformValue,
    UniformVec, MAX_UNIFORM_COMPONENTS,
};

// Re-export glam types for convenience
pub use glam::{IVec2, IVec3, IVec4, Vec2, Vec3, Vec4};
