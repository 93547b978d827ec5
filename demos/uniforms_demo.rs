//! Demo showing uniforms applied to a program backend.
//!
//! Demonstrates:
//! - Scalars, glam vectors and textures as uniforms
//! - Producers that compute a value at every draw
//! - A backend that only relinks when the composed code changes

use std::any::Any;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use shaderkit::{
    CodePart, Placement, ProgramBackend, ProgramUniforms, RecordingProgram, ShaderProgram,
    UniformTexture, UniformValue, Vec3,
};

#[derive(Debug)]
struct Colormap(&'static str);

impl UniformTexture for Colormap {
    fn label(&self) -> &str {
        self.0
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Prints every call instead of talking to a GPU.
#[derive(Default)]
struct PrintingBackend {
    recorder: RecordingProgram,
}

impl ProgramUniforms for PrintingBackend {
    fn set_uniform_i(&mut self, name: &str, values: &[i32]) {
        println!("  set {name} = {values:?}");
        self.recorder.set_uniform_i(name, values);
    }

    fn set_uniform_f(&mut self, name: &str, values: &[f32]) {
        println!("  set {name} = {values:?}");
        self.recorder.set_uniform_f(name, values);
    }

    fn enable_texture(&mut self, unit: u32, texture: &dyn UniformTexture) {
        println!("  bind '{}' to unit {unit}", texture.label());
        self.recorder.enable_texture(unit, texture);
    }

    fn disable_texture(&mut self, unit: u32) {
        println!("  unbind unit {unit}");
        self.recorder.disable_texture(unit);
    }
}

impl ProgramBackend for PrintingBackend {
    fn link(&mut self, vertex: &str, fragment: &str) -> Result<(), String> {
        println!(
            "  link ({} vertex line(s), {} fragment line(s))",
            vertex.lines().count(),
            fragment.lines().count()
        );
        Ok(())
    }
}

fn main() -> shaderkit::Result<()> {
    shaderkit::init();

    let mut program = ShaderProgram::new();
    program.vertex_mut().add_part(
        CodePart::new("base", "", "void main() {\n    gl_Position = ftransform();\n}"),
        Placement::Append,
    )?;
    program.fragment_mut().add_part(
        CodePart::new(
            "base",
            "",
            "uniform sampler1D colormap;\nuniform float th;\nuniform vec3 light;\nuniform int frame;\nvoid main() {}",
        ),
        Placement::Append,
    )?;

    let frames = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&frames);
    let fragment = program.fragment_mut();
    fragment.set_uniform("colormap", UniformValue::texture(Colormap("jet")))?;
    fragment.set_uniform("th", 0.5_f32)?;
    fragment.set_uniform("light", Vec3::new(0.0, 1.0, 0.5))?;
    fragment.set_uniform(
        "frame",
        UniformValue::producer(move || {
            let frame = counter.fetch_add(1, Ordering::Relaxed);
            UniformValue::Int(i32::try_from(frame).unwrap_or(i32::MAX))
        }),
    )?;

    let mut backend = PrintingBackend::default();
    for frame in 0..3 {
        println!("frame {frame}:");
        program.draw_with(&mut backend, |_| Ok(()))?;
    }

    println!(
        "linked {} time(s), {} uniform call(s) recorded",
        program.link_count(),
        backend.recorder.calls().len()
    );
    Ok(())
}
