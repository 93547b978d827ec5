//! Uniform values and their application to a compiled program.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use glam::{IVec2, IVec3, IVec4, Vec2, Vec3, Vec4};

use crate::error::{Result, ShaderKitError};

/// Maximum number of components in a vector uniform.
pub const MAX_UNIFORM_COMPONENTS: usize = 4;

/// A texture-like resource that can be bound to a texture unit.
///
/// Program backends receive it as `&dyn UniformTexture` and can downcast
/// through [`UniformTexture::as_any`] to their own texture type.
pub trait UniformTexture: Send + Sync + fmt::Debug {
    /// Returns a label for logging and debugging.
    fn label(&self) -> &str;

    /// Returns this texture as [`Any`] for downcasting.
    fn as_any(&self) -> &dyn Any;
}

/// The uniform-setting side of a compiled program.
pub trait ProgramUniforms {
    /// Sets an integer uniform of 1 to 4 components.
    fn set_uniform_i(&mut self, name: &str, values: &[i32]);

    /// Sets a float uniform of 1 to 4 components.
    fn set_uniform_f(&mut self, name: &str, values: &[f32]);

    /// Binds a texture to a texture unit.
    fn enable_texture(&mut self, unit: u32, texture: &dyn UniformTexture);

    /// Unbinds whatever texture is bound to a texture unit.
    fn disable_texture(&mut self, unit: u32);
}

/// A vector of 1 to 4 numeric components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformVec<T> {
    values: [T; MAX_UNIFORM_COMPONENTS],
    len: usize,
}

impl<T: Copy + Default> UniformVec<T> {
    /// Creates a vector from a slice of 1 to 4 values.
    pub fn new(values: &[T]) -> Result<Self> {
        if values.is_empty() || values.len() > MAX_UNIFORM_COMPONENTS {
            return Err(ShaderKitError::InvalidUniformValue(format!(
                "expected 1 to {MAX_UNIFORM_COMPONENTS} components, got {}",
                values.len()
            )));
        }
        let mut data = [T::default(); MAX_UNIFORM_COMPONENTS];
        data[..values.len()].copy_from_slice(values);
        Ok(Self {
            values: data,
            len: values.len(),
        })
    }

    fn from_array<const N: usize>(values: [T; N]) -> Self {
        let mut data = [T::default(); MAX_UNIFORM_COMPONENTS];
        data[..N].copy_from_slice(&values);
        Self {
            values: data,
            len: N,
        }
    }

    /// Returns the components.
    pub fn as_slice(&self) -> &[T] {
        &self.values[..self.len]
    }

    /// Returns the number of components.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false: a uniform vector has at least one component.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// A closure producing a uniform value at apply time.
pub type UniformProducer = Arc<dyn Fn() -> UniformValue + Send + Sync>;

/// A value that can be passed to a program as a uniform.
#[derive(Clone)]
pub enum UniformValue {
    /// A single integer.
    Int(i32),
    /// 1 to 4 integers.
    IntVec(UniformVec<i32>),
    /// A single float.
    Float(f32),
    /// 1 to 4 floats.
    FloatVec(UniformVec<f32>),
    /// A texture, bound to the next free texture unit.
    Texture(Arc<dyn UniformTexture>),
    /// Computes the value each time uniforms are applied.
    Producer(UniformProducer),
}

impl UniformValue {
    /// Creates an integer vector value.
    pub fn int_vec(values: &[i32]) -> Result<Self> {
        UniformVec::new(values).map(Self::IntVec)
    }

    /// Creates a float vector value.
    pub fn float_vec(values: &[f32]) -> Result<Self> {
        UniformVec::new(values).map(Self::FloatVec)
    }

    /// Creates a texture value.
    pub fn texture(texture: impl UniformTexture + 'static) -> Self {
        Self::Texture(Arc::new(texture))
    }

    /// Creates a value computed by `f` each time uniforms are applied.
    pub fn producer<F>(f: F) -> Self
    where
        F: Fn() -> UniformValue + Send + Sync + 'static,
    {
        Self::Producer(Arc::new(f))
    }

    /// Returns true if this is a texture value.
    pub fn is_texture(&self) -> bool {
        matches!(self, Self::Texture(_))
    }

    /// Calls producers until a concrete value is obtained.
    ///
    /// At most `max_depth` producers are called.
    pub fn resolve(&self, name: &str, max_depth: usize) -> Result<ResolvedUniform> {
        let mut current = self.clone();
        let mut depth = 0;
        loop {
            current = match current {
                Self::Int(v) => return Ok(ResolvedUniform::Int(UniformVec::from_array([v]))),
                Self::IntVec(v) => return Ok(ResolvedUniform::Int(v)),
                Self::Float(v) => return Ok(ResolvedUniform::Float(UniformVec::from_array([v]))),
                Self::FloatVec(v) => return Ok(ResolvedUniform::Float(v)),
                Self::Texture(texture) => return Ok(ResolvedUniform::Texture(texture)),
                Self::Producer(f) => {
                    if depth == max_depth {
                        return Err(ShaderKitError::ProducerDepthExceeded {
                            name: name.to_string(),
                            depth: max_depth,
                        });
                    }
                    depth += 1;
                    f()
                }
            };
        }
    }
}

/// A uniform value with all producers called. Scalars are one-component vectors.
#[derive(Debug, Clone)]
pub enum ResolvedUniform {
    /// Integer components.
    Int(UniformVec<i32>),
    /// Float components.
    Float(UniformVec<f32>),
    /// A texture to bind.
    Texture(Arc<dyn UniformTexture>),
}

impl fmt::Debug for UniformValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Self::IntVec(v) => f.debug_tuple("IntVec").field(&v.as_slice()).finish(),
            Self::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Self::FloatVec(v) => f.debug_tuple("FloatVec").field(&v.as_slice()).finish(),
            Self::Texture(t) => f.debug_tuple("Texture").field(&t.label()).finish(),
            Self::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

impl From<i32> for UniformValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for UniformValue {
    fn from(value: bool) -> Self {
        Self::Int(i32::from(value))
    }
}

impl From<f32> for UniformValue {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<Vec2> for UniformValue {
    fn from(v: Vec2) -> Self {
        Self::FloatVec(UniformVec::from_array(v.to_array()))
    }
}

impl From<Vec3> for UniformValue {
    fn from(v: Vec3) -> Self {
        Self::FloatVec(UniformVec::from_array(v.to_array()))
    }
}

impl From<Vec4> for UniformValue {
    fn from(v: Vec4) -> Self {
        Self::FloatVec(UniformVec::from_array(v.to_array()))
    }
}

impl From<IVec2> for UniformValue {
    fn from(v: IVec2) -> Self {
        Self::IntVec(UniformVec::from_array(v.to_array()))
    }
}

impl From<IVec3> for UniformValue {
    fn from(v: IVec3) -> Self {
        Self::IntVec(UniformVec::from_array(v.to_array()))
    }
}

impl From<IVec4> for UniformValue {
    fn from(v: IVec4) -> Self {
        Self::IntVec(UniformVec::from_array(v.to_array()))
    }
}

/// Named uniform values, plus the texture units bound by the last apply.
#[derive(Debug, Clone, Default)]
pub struct UniformTable {
    values: BTreeMap<String, UniformValue>,
    bound_units: Vec<u32>,
}

impl UniformTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a uniform, replacing any previous value of that name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<UniformValue>) -> Result<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(ShaderKitError::InvalidUniformName);
        }
        self.values.insert(name, value.into());
        Ok(())
    }

    /// Gets a uniform by name.
    pub fn get(&self, name: &str) -> Option<&UniformValue> {
        self.values.get(name)
    }

    /// Removes a uniform by name.
    pub fn remove(&mut self, name: &str) -> Option<UniformValue> {
        self.values.remove(name)
    }

    /// Returns all uniform names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.values.keys().map(String::as_str).collect()
    }

    /// Returns the number of uniforms.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if there are no uniforms.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the texture units bound by the last [`apply`](Self::apply)
    /// that have not been released yet.
    pub fn bound_texture_units(&self) -> &[u32] {
        &self.bound_units
    }

    /// Pushes every uniform into `program`, in name order, and returns the
    /// first texture unit left free.
    ///
    /// Textures are bound to ascending units starting at `first_texture_unit`,
    /// and their uniform is set to the unit index. Textures bound before an
    /// error stay recorded, so [`release`](Self::release) still unbinds them.
    /// Units still bound from an unreleased apply are released first.
    pub fn apply(
        &mut self,
        program: &mut dyn ProgramUniforms,
        first_texture_unit: u32,
        max_producer_depth: usize,
    ) -> Result<u32> {
        if !self.bound_units.is_empty() {
            log::warn!(
                "applying uniforms while texture units {:?} are still bound",
                self.bound_units
            );
            self.release(program);
        }

        let mut next_unit = first_texture_unit;
        for (name, value) in &self.values {
            match value.resolve(name, max_producer_depth)? {
                ResolvedUniform::Int(v) => program.set_uniform_i(name, v.as_slice()),
                ResolvedUniform::Float(v) => program.set_uniform_f(name, v.as_slice()),
                ResolvedUniform::Texture(texture) => {
                    let index = i32::try_from(next_unit).map_err(|_| {
                        ShaderKitError::InvalidUniformValue(format!(
                            "texture unit {next_unit} out of range for '{name}'"
                        ))
                    })?;
                    program.enable_texture(next_unit, texture.as_ref());
                    self.bound_units.push(next_unit);
                    program.set_uniform_i(name, &[index]);
                    next_unit += 1;
                }
            }
        }
        Ok(next_unit)
    }

    /// Unbinds every texture unit bound by the last apply, last one first.
    pub fn release(&mut self, program: &mut dyn ProgramUniforms) {
        for unit in self.bound_units.drain(..).rev() {
            program.disable_texture(unit);
        }
    }
}
