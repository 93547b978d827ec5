//! A shader program built from a vertex and a fragment composer.
//!
//! The program keeps track of whether either stage changed since the last
//! link, so the backend only relinks when the composed code is different.

use shaderkit_core::{Composer, ComposerOptions, ProgramUniforms};

use crate::error::{Error, Result};

/// A graphics backend that can link a program and receive its uniforms.
pub trait ProgramBackend: ProgramUniforms {
    /// Compiles and links the given stage sources.
    ///
    /// On failure returns the backend's log.
    fn link(&mut self, vertex: &str, fragment: &str) -> std::result::Result<(), String>;
}

/// Pairs a vertex and a fragment composer into one linkable program.
#[derive(Debug, Default)]
pub struct ShaderProgram {
    vertex: Composer,
    fragment: Composer,
    linked: bool,
    link_count: u64,
}

impl ShaderProgram {
    /// Creates a program with two empty stages.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a program whose stages both use `options`.
    pub fn with_options(options: &ComposerOptions) -> Self {
        Self {
            vertex: Composer::with_options(options.clone()),
            fragment: Composer::with_options(options.clone()),
            linked: false,
            link_count: 0,
        }
    }

    /// Returns the vertex stage.
    pub fn vertex(&self) -> &Composer {
        &self.vertex
    }

    /// Returns the vertex stage for editing.
    pub fn vertex_mut(&mut self) -> &mut Composer {
        &mut self.vertex
    }

    /// Returns the fragment stage.
    pub fn fragment(&self) -> &Composer {
        &self.fragment
    }

    /// Returns the fragment stage for editing.
    pub fn fragment_mut(&mut self) -> &mut Composer {
        &mut self.fragment
    }

    /// Returns true if the last link succeeded.
    pub fn is_linked(&self) -> bool {
        self.linked
    }

    /// Returns how many times the program was linked successfully.
    pub fn link_count(&self) -> u64 {
        self.link_count
    }

    /// Returns true if either stage changed since the last check, or the
    /// program is not linked. Consumes the change flags of both stages.
    pub fn needs_link(&mut self) -> bool {
        let vertex = self.vertex.take_dirty_for_program();
        let fragment = self.fragment.take_dirty_for_program();
        vertex || fragment || !self.linked
    }

    /// Links the program if needed. Returns true if a link happened.
    pub fn prepare(&mut self, backend: &mut dyn ProgramBackend) -> Result<bool> {
        if !self.needs_link() {
            return Ok(false);
        }

        let vertex = self.vertex.code();
        let fragment = self.fragment.code();
        if let Err(message) = backend.link(vertex, fragment) {
            self.linked = false;
            log::warn!("could not link program: {message}");
            return Err(Error::LinkFailed(message));
        }

        self.linked = true;
        self.link_count += 1;
        log::debug!("linked program (link #{})", self.link_count);
        Ok(true)
    }

    /// Prepares the program, applies the uniforms of both stages, then runs
    /// `draw`. Textures bound for the draw are released afterwards, whether
    /// or not `draw` succeeds.
    ///
    /// Fragment textures take units from the fragment stage's
    /// `first_texture_unit` up. Vertex textures take the units after those.
    pub fn draw_with<B, T, F>(&mut self, backend: &mut B, draw: F) -> Result<T>
    where
        B: ProgramBackend,
        F: FnOnce(&mut B) -> Result<T>,
    {
        self.prepare(backend)?;

        let result = self.apply_uniforms(backend).and_then(|()| draw(backend));

        self.vertex.release_uniform_textures(backend);
        self.fragment.release_uniform_textures(backend);
        result
    }

    /// Both stages share the program's texture units, so the vertex stage
    /// counts on from the units the fragment stage took.
    fn apply_uniforms<B: ProgramBackend>(&mut self, backend: &mut B) -> Result<()> {
        let next_unit = self.fragment.apply_uniforms(backend)?;
        let first_vertex_unit = next_unit.max(self.vertex.options().first_texture_unit);
        self.vertex.apply_uniforms_from(backend, first_vertex_unit)?;
        Ok(())
    }
}
