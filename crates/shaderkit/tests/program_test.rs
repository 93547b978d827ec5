//! Integration tests for linking programs and applying their uniforms.

use std::any::Any;

use shaderkit::*;

/// A backend that records uniform calls and the sources it was asked to link.
#[derive(Debug, Default)]
struct TestBackend {
    uniforms: RecordingProgram,
    linked: Vec<(String, String)>,
    fail_next_link: bool,
}

impl ProgramUniforms for TestBackend {
    fn set_uniform_i(&mut self, name: &str, values: &[i32]) {
        self.uniforms.set_uniform_i(name, values);
    }

    fn set_uniform_f(&mut self, name: &str, values: &[f32]) {
        self.uniforms.set_uniform_f(name, values);
    }

    fn enable_texture(&mut self, unit: u32, texture: &dyn UniformTexture) {
        self.uniforms.enable_texture(unit, texture);
    }

    fn disable_texture(&mut self, unit: u32) {
        self.uniforms.disable_texture(unit);
    }
}

impl ProgramBackend for TestBackend {
    fn link(&mut self, vertex: &str, fragment: &str) -> std::result::Result<(), String> {
        if std::mem::take(&mut self.fail_next_link) {
            return Err("0:1: syntax error".to_string());
        }
        self.linked.push((vertex.to_string(), fragment.to_string()));
        Ok(())
    }
}

#[derive(Debug)]
struct Colormap;

impl UniformTexture for Colormap {
    fn label(&self) -> &str {
        "colormap"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug)]
struct Heightmap;

impl UniformTexture for Heightmap {
    fn label(&self) -> &str {
        "heights"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn volume_program() -> ShaderProgram {
    let mut program = ShaderProgram::new();
    program
        .vertex_mut()
        .add_part(CodePart::new("base", "", "void main() { // --ray--\n}"), Placement::Append)
        .unwrap();
    program
        .fragment_mut()
        .add_part(
            CodePart::new("base", "", "void main() {\n    // --renderstyle--\n}"),
            Placement::Append,
        )
        .unwrap();
    program
        .fragment_mut()
        .add_part(
            CodePart::new("renderstyle", "mip", ">>--renderstyle--\nmip();"),
            Placement::Append,
        )
        .unwrap();
    program
}

#[test]
fn test_links_only_when_code_changes() {
    let mut program = volume_program();
    let mut backend = TestBackend::default();

    assert!(program.prepare(&mut backend).unwrap());
    assert!(!program.prepare(&mut backend).unwrap());
    assert_eq!(program.link_count(), 1);
    assert_eq!(backend.linked[0].1, "void main() {\n    mip();\n}");

    program
        .fragment_mut()
        .replace_part(CodePart::new("renderstyle", "iso", ">>--renderstyle--\niso();"))
        .unwrap();

    assert!(program.prepare(&mut backend).unwrap());
    assert_eq!(program.link_count(), 2);
    assert_eq!(backend.linked[1].1, "void main() {\n    iso();\n}");
    assert_eq!(backend.linked[1].0, backend.linked[0].0);
}

#[test]
fn test_uniform_changes_do_not_relink() {
    let mut program = volume_program();
    let mut backend = TestBackend::default();
    program.prepare(&mut backend).unwrap();

    program.fragment_mut().set_uniform("th", 0.5_f32).unwrap();

    assert!(!program.needs_link());
}

#[test]
fn test_failed_link_is_retried() {
    let mut program = volume_program();
    let mut backend = TestBackend {
        fail_next_link: true,
        ..TestBackend::default()
    };

    let err = program.prepare(&mut backend).unwrap_err();
    assert!(matches!(err, Error::LinkFailed(message) if message.contains("syntax error")));
    assert!(!program.is_linked());

    assert!(program.prepare(&mut backend).unwrap());
    assert!(program.is_linked());
    assert_eq!(backend.linked.len(), 1);
}

#[test]
fn test_draw_applies_and_releases_uniforms() {
    let mut program = volume_program();
    program.fragment_mut().set_uniform("th", 0.25_f32).unwrap();
    program
        .fragment_mut()
        .set_uniform("colormap", UniformValue::texture(Colormap))
        .unwrap();
    program.vertex_mut().set_uniform("shape", IVec3::new(4, 5, 6)).unwrap();

    let mut backend = TestBackend::default();
    let drawn = program
        .draw_with(&mut backend, |backend| {
            assert_eq!(
                backend.uniforms.active_texture_units().iter().copied().collect::<Vec<_>>(),
                vec![1]
            );
            Ok(42)
        })
        .unwrap();

    assert_eq!(drawn, 42);
    assert_eq!(
        backend.uniforms.calls(),
        &[
            ProgramCall::EnableTexture { unit: 1, label: "colormap".into() },
            ProgramCall::SetInt { name: "colormap".into(), values: vec![1] },
            ProgramCall::SetFloat { name: "th".into(), values: vec![0.25] },
            ProgramCall::SetInt { name: "shape".into(), values: vec![4, 5, 6] },
            ProgramCall::DisableTexture { unit: 1 },
        ]
    );
    assert!(backend.uniforms.active_texture_units().is_empty());
}

#[test]
fn test_stages_bind_textures_to_distinct_units() {
    let mut program = volume_program();
    program
        .fragment_mut()
        .set_uniform("colormap", UniformValue::texture(Colormap))
        .unwrap();
    program
        .vertex_mut()
        .set_uniform("heights", UniformValue::texture(Heightmap))
        .unwrap();

    let mut backend = TestBackend::default();
    program
        .draw_with(&mut backend, |backend| {
            assert_eq!(
                backend.uniforms.active_texture_units().iter().copied().collect::<Vec<_>>(),
                vec![1, 2]
            );
            Ok(())
        })
        .unwrap();

    assert_eq!(
        backend.uniforms.calls(),
        &[
            ProgramCall::EnableTexture { unit: 1, label: "colormap".into() },
            ProgramCall::SetInt { name: "colormap".into(), values: vec![1] },
            ProgramCall::EnableTexture { unit: 2, label: "heights".into() },
            ProgramCall::SetInt { name: "heights".into(), values: vec![2] },
            ProgramCall::DisableTexture { unit: 2 },
            ProgramCall::DisableTexture { unit: 1 },
        ]
    );
    assert!(backend.uniforms.active_texture_units().is_empty());
}

#[test]
fn test_textures_released_when_draw_fails() {
    let mut program = volume_program();
    program
        .fragment_mut()
        .set_uniform("colormap", UniformValue::texture(Colormap))
        .unwrap();

    let mut backend = TestBackend::default();
    let result: Result<()> = program.draw_with(&mut backend, |_| {
        Err(Error::LinkFailed("draw aborted".to_string()))
    });

    assert!(result.is_err());
    assert!(backend.uniforms.active_texture_units().is_empty());
}

#[test]
fn test_runaway_producer_is_reported() {
    fn forever() -> UniformValue {
        UniformValue::producer(forever)
    }

    let mut program = volume_program();
    program.fragment_mut().set_uniform("loop", forever()).unwrap();

    let mut backend = TestBackend::default();
    let result = program.draw_with(&mut backend, |_| Ok(()));

    assert!(matches!(
        result,
        Err(Error::Core(ShaderKitError::ProducerDepthExceeded { depth: 16, .. }))
    ));
}

#[test]
fn test_recording_works_without_a_program() {
    let mut composer = Composer::new();
    composer.set_uniform("n", 3).unwrap();
    composer.set_uniform("scale", Vec2::new(0.5, 2.0)).unwrap();

    let mut recorder = RecordingProgram::new();
    composer.apply_uniforms(&mut recorder).unwrap();

    assert_eq!(
        recorder.take_calls(),
        vec![
            ProgramCall::SetInt { name: "n".into(), values: vec![3] },
            ProgramCall::SetFloat { name: "scale".into(), values: vec![0.5, 2.0] },
        ]
    );
    assert!(recorder.calls().is_empty());
}
