//! A headless program that records uniform calls.
//!
//! Useful in tests and tools that exercise composers without a graphics
//! context.

use std::collections::BTreeSet;

use crate::uniform::{ProgramUniforms, UniformTexture};

/// One call made on a [`RecordingProgram`].
#[derive(Debug, Clone, PartialEq)]
pub enum ProgramCall {
    /// `set_uniform_i`
    SetInt { name: String, values: Vec<i32> },
    /// `set_uniform_f`
    SetFloat { name: String, values: Vec<f32> },
    /// `enable_texture`, with the texture's label.
    EnableTexture { unit: u32, label: String },
    /// `disable_texture`
    DisableTexture { unit: u32 },
}

/// Records every call instead of talking to a GPU.
#[derive(Debug, Default)]
pub struct RecordingProgram {
    calls: Vec<ProgramCall>,
    active_units: BTreeSet<u32>,
}

impl RecordingProgram {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the calls recorded so far.
    pub fn calls(&self) -> &[ProgramCall] {
        &self.calls
    }

    /// Returns and forgets the recorded calls.
    pub fn take_calls(&mut self) -> Vec<ProgramCall> {
        std::mem::take(&mut self.calls)
    }

    /// Forgets the recorded calls. Bound texture units are kept.
    pub fn clear(&mut self) {
        self.calls.clear();
    }

    /// Returns the texture units currently bound.
    pub fn active_texture_units(&self) -> &BTreeSet<u32> {
        &self.active_units
    }
}

impl ProgramUniforms for RecordingProgram {
    fn set_uniform_i(&mut self, name: &str, values: &[i32]) {
        self.calls.push(ProgramCall::SetInt {
            name: name.to_string(),
            values: values.to_vec(),
        });
    }

    fn set_uniform_f(&mut self, name: &str, values: &[f32]) {
        self.calls.push(ProgramCall::SetFloat {
            name: name.to_string(),
            values: values.to_vec(),
        });
    }

    fn enable_texture(&mut self, unit: u32, texture: &dyn UniformTexture) {
        self.active_units.insert(unit);
        self.calls.push(ProgramCall::EnableTexture {
            unit,
            label: texture.label().to_string(),
        });
    }

    fn disable_texture(&mut self, unit: u32) {
        self.active_units.remove(&unit);
        self.calls.push(ProgramCall::DisableTexture { unit });
    }
}
