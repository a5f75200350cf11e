use std::borrow::Cow;

use engine::{ProgramError, SlotRole};
use wgpu::naga::ShaderStage;

/// Compiles the static full-screen triangle vertex shader.
pub(crate) fn compile_vertex_shader(device: &wgpu::Device) -> Result<wgpu::ShaderModule, ProgramError> {
    with_validation(device, ProgramError::compile, || {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("fullscreen triangle vertex"),
            source: wgpu::ShaderSource::Glsl {
                shader: Cow::Borrowed(VERTEX_SHADER_GLSL),
                stage: ShaderStage::Vertex,
                defines: &[],
            },
        })
    })
}

/// Wraps editor fragment code with the prelude for `role` and compiles it.
///
/// Parse and validation failures come back as a compile-stage
/// [`ProgramError`] carrying the frontend's message.
pub(crate) fn compile_fragment_shader(
    device: &wgpu::Device,
    role: SlotRole,
    source: &str,
) -> Result<wgpu::ShaderModule, ProgramError> {
    let wrapped = wrap_fragment(role, source);
    with_validation(device, ProgramError::compile, || {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(match role {
                SlotRole::Primary => "primary fragment",
                SlotRole::PostProcess => "post fragment",
            }),
            source: wgpu::ShaderSource::Glsl {
                shader: Cow::Owned(wrapped),
                stage: ShaderStage::Fragment,
                defines: &[],
            },
        })
    })
}

/// Runs `build` inside a validation error scope, turning a captured error
/// into a [`ProgramError`] built by `stage`.
pub(crate) fn with_validation<T>(
    device: &wgpu::Device,
    stage: fn(String) -> ProgramError,
    build: impl FnOnce() -> T,
) -> Result<T, ProgramError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = build();
    match pollster::block_on(device.pop_error_scope()) {
        Some(err) => Err(stage(err.to_string())),
        None => Ok(value),
    }
}

/// Produces a self-contained GLSL 450 fragment shader from editor code.
///
/// The editor code supplies `mainImage`; any `#version` line and any
/// declaration of a uniform the prelude already provides are dropped so the
/// same file keeps working when it declares them itself.
fn wrap_fragment(role: SlotRole, source: &str) -> String {
    let mut sanitized = String::with_capacity(source.len());
    let mut skipped_version = false;
    for line in source.lines() {
        let trimmed = line.trim_start();
        if !skipped_version && trimmed.starts_with("#version") {
            skipped_version = true;
            continue;
        }
        let redeclares_builtin = trimmed.starts_with("uniform ")
            && PRELUDE_NAMES.iter().any(|name| trimmed.contains(name));
        if redeclares_builtin {
            continue;
        }
        sanitized.push_str(line);
        sanitized.push('\n');
    }

    let (scene, footer) = match role {
        SlotRole::Primary => ("", SCENE_FOOTER),
        SlotRole::PostProcess => (SCENE_BINDINGS, SURFACE_FOOTER),
    };
    format!("{HEADER}{scene}\n#line 1\n{sanitized}{footer}")
}

const PRELUDE_NAMES: [&str; 4] = ["iResolution", "iTime", "iSample", "iScene"];

/// Uniform block layout must match `FrameUniforms` in `gpu/uniforms.rs`.
const HEADER: &str = r"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 outColor;

layout(std140, set = 0, binding = 0) uniform FrameParams {
    vec2 _iResolution;
    float _iTime;
    int _iSample;
} frame;

#define iResolution frame._iResolution
#define iTime frame._iTime
#define iSample frame._iSample
";

/// Output of the primary pass, sampled by the post-process program.
const SCENE_BINDINGS: &str = r"
layout(set = 1, binding = 0) uniform texture2D leviathan_scene_texture;
layout(set = 1, binding = 1) uniform sampler leviathan_scene_sampler;
#define iScene sampler2D(leviathan_scene_texture, leviathan_scene_sampler)
";

/// Both passes see a bottom-left `fragCoord`. The primary pass writes
/// framebuffer row `y` with `fragCoord.y == y`, so the scene target is stored
/// bottom row first and `texture(iScene, fragCoord / iResolution.xy)` in the
/// post pass lines up with the screen.
const SCENE_FOOTER: &str = r"
void main() {
    vec2 fragCoord = gl_FragCoord.xy;
    vec4 color = vec4(0.0);
    mainImage(color, fragCoord);
    outColor = color;
}
";

/// The surface is presented top row first, so the post pass flips y.
const SURFACE_FOOTER: &str = r"
void main() {
    vec2 fragCoord = vec2(gl_FragCoord.x, iResolution.y - gl_FragCoord.y);
    vec4 color = vec4(0.0);
    mainImage(color, fragCoord);
    outColor = color;
}
";

const VERTEX_SHADER_GLSL: &str = r"#version 450
layout(location = 0) out vec2 v_uv;

const vec2 positions[3] = vec2[3](
    vec2(-1.0, -3.0),
    vec2(3.0, 1.0),
    vec2(-1.0, 1.0)
);

void main() {
    uint vertex_index = uint(gl_VertexIndex);
    vec2 pos = positions[vertex_index];
    v_uv = pos * 0.5 + vec2(0.5, 0.5);
    gl_Position = vec4(pos, 0.0, 1.0);
}
";

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = r#"
        #version 130
        uniform float iTime;
        void mainImage(out vec4 fragColor, in vec2 fragCoord) {
            fragColor = vec4(fract(iTime), fragCoord / iResolution, 1.0);
        }
    "#;

    #[test]
    fn wrap_strips_version_and_builtin_uniforms() {
        let wrapped = wrap_fragment(SlotRole::Primary, SCENE);
        assert!(!wrapped.contains("#version 130"));
        assert!(!wrapped.contains("uniform float iTime"));
        assert!(wrapped.starts_with("#version 450"));
        assert!(wrapped.contains("mainImage(color, fragCoord)"));
    }

    #[test]
    fn only_post_program_sees_the_scene() {
        let primary = wrap_fragment(SlotRole::Primary, SCENE);
        let post = wrap_fragment(SlotRole::PostProcess, SCENE);
        assert!(!primary.contains("leviathan_scene_texture"));
        assert!(post.contains("#define iScene"));
    }

    #[test]
    fn scene_is_stored_so_post_samples_it_upright() {
        let primary = wrap_fragment(SlotRole::Primary, SCENE);
        let post = wrap_fragment(SlotRole::PostProcess, SCENE);
        assert!(primary.contains("vec2 fragCoord = gl_FragCoord.xy;"));
        assert!(!primary.contains("iResolution.y - gl_FragCoord.y"));
        assert!(post.contains("iResolution.y - gl_FragCoord.y"));
    }

    #[test]
    fn user_code_starts_at_line_one() {
        let wrapped = wrap_fragment(SlotRole::Primary, "void mainImage(out vec4 c, in vec2 p) {}\n");
        let after = wrapped.split("#line 1\n").nth(1).expect("line directive");
        assert!(after.starts_with("void mainImage"));
    }
}
