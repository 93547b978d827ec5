//! Demo showing render styles swapped in and out of a volume shader.
//!
//! Demonstrates:
//! - A base fragment shader with `// --uniforms--` style hooks
//! - Render style parts sharing the name "renderstyle"
//! - Replacing one style with another and listing what each part wrote

use shaderkit::{CodePart, Composer, Placement, ShaderLibrary, ShaderStage};

const VOLUME: &str = "
    // --uniforms--
    uniform sampler3D texture;
    varying vec3 ray;

    // --functions--

    void main()
    {
        vec4 color = vec4(0.0, 0.0, 0.0, 0.0);
        for (int i=0; i<n; i++) {
            vec3 pos = ray * float(i);
            // --renderstyle--
        }
        gl_FragColor = color;
    }
";

const MIP: &str = "
    >>--renderstyle--
    float val = texture3D(texture, pos).r;
    color = max(color, vec4(val));
";

const ISO: &str = "
    >>--uniforms--
    uniform float th;
    // --uniforms--

    >>--functions--
    bool above(vec3 pos) { return texture3D(texture, pos).r > th; }
    // --functions--

    >>--renderstyle--
    if (above(pos)) {
        color = vec4(1.0);
        break;
    }
";

fn main() -> shaderkit::Result<()> {
    shaderkit::init();

    let mut library = ShaderLibrary::new();
    library.insert(ShaderStage::Fragment, "volume", VOLUME);
    library.insert(ShaderStage::Fragment, "mip", MIP);
    library.insert(ShaderStage::Fragment, "iso", ISO);

    let mut fragment = Composer::new();
    fragment.add_part(
        library.part(ShaderStage::Fragment, "volume", "base", "")?,
        Placement::Append,
    )?;

    for style in ["mip", "iso"] {
        let part = library.part(ShaderStage::Fragment, style, "renderstyle", style)?;
        fragment.add_or_replace(part, Placement::Append)?;

        println!("=== render style: {style} ===");
        println!("{}", fragment.show_code(None)?);
        println!("--- lines written by the render style ---");
        println!("{}\n", fragment.show_code(Some("renderstyle".into()))?);
    }

    // A tweak on top of whatever render style is active
    let tint = CodePart::new(
        "tint",
        "red",
        ">>gl_FragColor = color;\ngl_FragColor = color * vec4(1.0, 0.5, 0.5, 1.0);",
    );
    fragment.add_part(tint, Placement::after("renderstyle"))?;
    println!("=== with tint ===\n{}", fragment.code());
    println!("merged {} time(s)", fragment.compile_count());

    Ok(())
}
