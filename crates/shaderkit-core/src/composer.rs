//! The composer: an ordered set of code parts merged into one program source.
//!
//! The first part is the base code. Each following part is inserted into the
//! result of the parts before it, by replacing the code its needles name. Parts
//! with the same purpose share a name, so switching e.g. the render style of a
//! volume is a matter of replacing the part named `"renderstyle"`.
//!
//! By convention a base declares hook lines such as `// --uniforms--` or
//! `// --functions--` that later parts target, and a part that replaces a hook
//! writes it back so the parts after it can use it too:
//!
//! ```text
//! >>--uniforms--
//! uniform vec3 some_vector;
//! // --uniforms--
//! ```
//!
//! Merging is lazy: the merged code is computed the first time it is needed and
//! cached until the part list changes.

use std::sync::Arc;

use crate::buffer::MergeBuffer;
use crate::error::{Result, ShaderKitError};
use crate::merge::merge_parts;
use crate::options::ComposerOptions;
use crate::part::{CodePart, PartKey};
use crate::uniform::{ProgramUniforms, UniformTable, UniformValue};

/// Where to insert a part added with [`Composer::add_part`].
#[derive(Debug, Clone, Copy, Default)]
pub enum Placement<'a> {
    /// After all existing parts.
    #[default]
    Append,
    /// Directly before the given part.
    Before(PartKey<'a>),
    /// Directly after the given part.
    After(PartKey<'a>),
}

impl<'a> Placement<'a> {
    /// Places before `key`.
    pub fn before(key: impl Into<PartKey<'a>>) -> Self {
        Placement::Before(key.into())
    }

    /// Places after `key`.
    pub fn after(key: impl Into<PartKey<'a>>) -> Self {
        Placement::After(key.into())
    }

    /// Builds a placement from optional `before` and `after` anchors.
    ///
    /// Giving both is an error; giving neither means [`Placement::Append`].
    pub fn from_options(before: Option<PartKey<'a>>, after: Option<PartKey<'a>>) -> Result<Self> {
        match (before, after) {
            (Some(_), Some(_)) => Err(ShaderKitError::ConflictingPlacement),
            (Some(key), None) => Ok(Placement::Before(key)),
            (None, Some(key)) => Ok(Placement::After(key)),
            (None, None) => Ok(Placement::Append),
        }
    }
}

#[derive(Debug)]
struct Compiled {
    buffer: MergeBuffer,
    code: String,
}

/// An ordered, uniquely named collection of code parts plus the uniforms
/// the resulting program needs.
#[derive(Debug)]
pub struct Composer {
    parts: Vec<Arc<CodePart>>,
    uniforms: UniformTable,
    compiled: Option<Compiled>,
    dirty_for_program: bool,
    compile_count: u64,
    options: ComposerOptions,
}

impl Default for Composer {
    fn default() -> Self {
        Self::new()
    }
}

impl Composer {
    /// Creates an empty composer with default options.
    pub fn new() -> Self {
        Self::with_options(ComposerOptions::default())
    }

    /// Creates an empty composer with the given options.
    pub fn with_options(options: ComposerOptions) -> Self {
        Self {
            parts: Vec::new(),
            uniforms: UniformTable::new(),
            compiled: None,
            dirty_for_program: true,
            compile_count: 0,
            options,
        }
    }

    /// Returns the options.
    pub fn options(&self) -> &ComposerOptions {
        &self.options
    }

    /// Returns a snapshot of the parts, in composition order.
    pub fn parts(&self) -> Vec<Arc<CodePart>> {
        self.parts.clone()
    }

    /// Returns the part names, in composition order.
    pub fn part_names(&self) -> Vec<String> {
        self.parts.iter().map(|p| p.name().to_string()).collect()
    }

    /// Returns the number of parts.
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    /// Returns true if there are no parts.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Gets a part by name.
    pub fn part(&self, name: &str) -> Option<&Arc<CodePart>> {
        self.parts.iter().find(|p| p.name() == name)
    }

    /// Adds a part at the given placement.
    ///
    /// Fails if a part with the same name is present or the placement anchor
    /// is missing. On failure the part list is unchanged.
    pub fn add_part(
        &mut self,
        part: impl Into<Arc<CodePart>>,
        placement: Placement<'_>,
    ) -> Result<()> {
        let part = part.into();
        if self.index_of(PartKey::Name(part.name())).is_some() {
            return Err(ShaderKitError::PartExists(part.name().to_string()));
        }

        let index = match placement {
            Placement::Append => self.parts.len(),
            Placement::Before(key) => self.require_index(key)?,
            Placement::After(key) => self.require_index(key)? + 1,
        };

        log::debug!(
            "adding part '{}' ({}) at position {index}",
            part.name(),
            part.version()
        );
        self.parts.insert(index, part);
        self.invalidate();
        Ok(())
    }

    /// Replaces the part that has the same name as `part`, keeping its position.
    pub fn replace_part(&mut self, part: impl Into<Arc<CodePart>>) -> Result<()> {
        let part = part.into();
        let index = self.require_index(PartKey::Name(part.name()))?;
        log::debug!("replacing part '{}' with version '{}'", part.name(), part.version());
        self.parts[index] = part;
        self.invalidate();
        Ok(())
    }

    /// Replaces the part of the same name if present, otherwise adds it.
    pub fn add_or_replace(
        &mut self,
        part: impl Into<Arc<CodePart>>,
        placement: Placement<'_>,
    ) -> Result<()> {
        let part = part.into();
        if self.has_part(part.name()) {
            self.replace_part(part)
        } else {
            self.add_part(part, placement)
        }
    }

    /// Removes a part. Returns false if it was not present.
    pub fn remove_part<'a>(&mut self, key: impl Into<PartKey<'a>>) -> bool {
        let key = key.into();
        let Some(index) = self.index_of(key) else {
            return false;
        };
        let removed = self.parts.remove(index);
        log::debug!("removed part '{}'", removed.name());
        self.invalidate();
        true
    }

    /// Returns true if the part is present. A name matches any part of that
    /// name; a part matches only that exact instance.
    pub fn has_part<'a>(&self, key: impl Into<PartKey<'a>>) -> bool {
        self.index_of(key.into()).is_some()
    }

    /// Removes all parts.
    pub fn clear(&mut self) {
        self.parts.clear();
        self.invalidate();
    }

    /// Returns true if the merged code must be recomputed.
    pub fn is_dirty(&self) -> bool {
        self.compiled.is_none()
    }

    /// Returns true if the code changed since the last call, and resets the
    /// flag. A program uses this to decide whether to relink.
    pub fn take_dirty_for_program(&mut self) -> bool {
        std::mem::take(&mut self.dirty_for_program)
    }

    /// Returns how many times the parts have been merged.
    pub fn compile_count(&self) -> u64 {
        self.compile_count
    }

    /// Returns the merged code, merging first if needed.
    pub fn code(&mut self) -> &str {
        &self.compiled().code
    }

    /// Returns the merge buffer, merging first if needed.
    pub fn buffer(&mut self) -> &MergeBuffer {
        &self.compiled().buffer
    }

    /// Renders the merged code with line numbers, using the configured
    /// column limit.
    pub fn show_code(&mut self, part: Option<PartKey<'_>>) -> Result<String> {
        let limit = self.options.column_limit;
        self.show_code_with_limit(part, limit)
    }

    /// Renders the merged code with line numbers, each line cut to at most
    /// `column_limit` characters.
    ///
    /// With a part, only its lines are shown, under their original numbers.
    pub fn show_code_with_limit(
        &mut self,
        part: Option<PartKey<'_>>,
        column_limit: usize,
    ) -> Result<String> {
        let name = match part {
            Some(key) => {
                let name = key.name().to_string();
                if !self.has_part(name.as_str()) {
                    return Err(ShaderKitError::PartNotFound(name));
                }
                Some(name)
            }
            None => None,
        };

        let lines: Vec<String> = self
            .buffer()
            .lines()
            .iter()
            .enumerate()
            .filter(|(_, line)| name.as_deref().map_or(true, |n| line.owner() == n))
            .map(|(i, line)| truncate(format!("{:03}|{}", i + 1, line.text()), column_limit))
            .collect();

        Ok(lines.join("\n"))
    }

    /// Stores a uniform. Nothing is sent to a program until
    /// [`apply_uniforms`](Self::apply_uniforms).
    pub fn set_uniform(
        &mut self,
        name: impl Into<String>,
        value: impl Into<UniformValue>,
    ) -> Result<()> {
        self.uniforms.set(name, value)
    }

    /// Gets a uniform by name.
    pub fn uniform(&self, name: &str) -> Option<&UniformValue> {
        self.uniforms.get(name)
    }

    /// Removes a uniform by name.
    pub fn remove_uniform(&mut self, name: &str) -> Option<UniformValue> {
        self.uniforms.remove(name)
    }

    /// Returns the uniform names, sorted.
    pub fn uniform_names(&self) -> Vec<&str> {
        self.uniforms.names()
    }

    /// Returns the uniform table.
    pub fn uniforms(&self) -> &UniformTable {
        &self.uniforms
    }

    /// Pushes every uniform into `program` and binds texture uniforms,
    /// starting at the configured first texture unit. Returns the first
    /// texture unit left free.
    ///
    /// Pair every call with [`release_uniform_textures`](Self::release_uniform_textures)
    /// after drawing.
    pub fn apply_uniforms(&mut self, program: &mut dyn ProgramUniforms) -> Result<u32> {
        self.apply_uniforms_from(program, self.options.first_texture_unit)
    }

    /// Like [`apply_uniforms`](Self::apply_uniforms), with texture units
    /// counted from `first_texture_unit`. Used when another composer of the
    /// same program already holds the units below it.
    pub fn apply_uniforms_from(
        &mut self,
        program: &mut dyn ProgramUniforms,
        first_texture_unit: u32,
    ) -> Result<u32> {
        self.uniforms
            .apply(program, first_texture_unit, self.options.max_producer_depth)
    }

    /// Unbinds the textures bound by the last [`apply_uniforms`](Self::apply_uniforms).
    pub fn release_uniform_textures(&mut self, program: &mut dyn ProgramUniforms) {
        self.uniforms.release(program);
    }

    fn compiled(&mut self) -> &Compiled {
        let parts = &self.parts;
        let count = &mut self.compile_count;
        self.compiled.get_or_insert_with(|| {
            *count += 1;
            let buffer = merge_parts(parts);
            let code = buffer.code();
            Compiled { buffer, code }
        })
    }

    fn invalidate(&mut self) {
        self.compiled = None;
        self.dirty_for_program = true;
    }

    fn index_of(&self, key: PartKey<'_>) -> Option<usize> {
        self.parts.iter().position(|p| key.matches(p))
    }

    fn require_index(&self, key: PartKey<'_>) -> Result<usize> {
        self.index_of(key)
            .ok_or_else(|| ShaderKitError::PartNotFound(key.name().to_string()))
    }
}

fn truncate(line: String, column_limit: usize) -> String {
    if line.chars().count() <= column_limit {
        return line;
    }
    let mut cut: String = line.chars().take(column_limit.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}
