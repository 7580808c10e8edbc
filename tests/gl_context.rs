//! Behavior that needs a live OpenGL 3.3 context.
//!
//! Run with `cargo test -- --ignored` on a machine with a display.

use std::sync::{Arc, Mutex};

use glam::{Vec2, Vec3, Vec4};
use glow::HasContext;
use hexagon_gl::{
    Error,
    abs::{
        Mesh, Platform, Shader, ShaderDiagnostic, ShaderProgram, ShaderStage, Texture,
        TexturedVertex, VertexLayout, Window, WindowConfig,
    },
};

/// SDL allows one platform per process, so the tests take turns.
static PLATFORM_LOCK: Mutex<()> = Mutex::new(());

const VERTEX_SRC: &str = "#version 330 core
layout (location = 0) in vec3 a_position;
void main() { gl_Position = vec4(a_position, 1.0); }
";

const FRAGMENT_SRC: &str = "#version 330 core
uniform float u_alpha;
out vec4 frag_color;
void main() { frag_color = vec4(1.0, 1.0, 1.0, u_alpha); }
";

const VECTOR_FRAGMENT_SRC: &str = "#version 330 core
uniform vec2 u_offset;
uniform vec3 u_color;
uniform vec4 u_tint;
out vec4 frag_color;
void main() { frag_color = vec4(u_color + vec3(u_offset, 0.0), 1.0) * u_tint; }
";

fn read_uniform<const N: usize>(gl: &glow::Context, program: &ShaderProgram, name: &str) -> [f32; N] {
    let mut values = [0.0; N];
    unsafe {
        let location = gl
            .get_uniform_location(program.id(), name)
            .expect("uniform is active");
        gl.get_uniform_f32(program.id(), &location, &mut values);
    }
    values
}

fn with_window(f: impl FnOnce(&Arc<glow::Context>)) {
    let _guard = PLATFORM_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let platform = Platform::init().unwrap();
    let config = WindowConfig {
        width: 64,
        height: 64,
        title: "hexagon-gl test".to_string(),
        ..WindowConfig::default()
    };
    let window = Window::new(&platform, &config).unwrap();
    f(window.gl());
}

#[test]
#[ignore = "needs a display with OpenGL 3.3"]
fn test_second_platform_and_bad_window_are_fatal() {
    let _guard = PLATFORM_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let platform = Platform::init().unwrap();
    assert!(Platform::is_alive());
    assert!(matches!(
        Platform::init(),
        Err(Error::PlatformAlreadyInitialized)
    ));

    let config = WindowConfig {
        width: 0,
        height: 0,
        ..WindowConfig::default()
    };
    assert!(matches!(
        Window::new(&platform, &config),
        Err(Error::InvalidWindowSize { .. })
    ));

    drop(platform);
    assert!(!Platform::is_alive());
}

#[test]
#[ignore = "needs a display with OpenGL 3.3"]
fn test_window_starts_open() {
    let _guard = PLATFORM_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let platform = Platform::init().unwrap();
    let mut window = Window::new(&platform, &WindowConfig::default()).unwrap();
    window.poll_events();
    assert!(!window.should_close());
    assert_eq!(window.title(), "Hello World");
    window.set_should_close(true);
    assert!(window.should_close());
    window.swap_buffers();
}

#[test]
#[ignore = "needs a display with OpenGL 3.3"]
fn test_broken_shaders_still_give_a_program() {
    with_window(|gl| {
        let program = ShaderProgram::from_sources(gl, "not glsl", "also not glsl").unwrap();
        let compile_failures: Vec<_> = program
            .diagnostics()
            .iter()
            .filter_map(|d| match d {
                ShaderDiagnostic::CompileFailed { stage, log } => {
                    assert!(!log.is_empty());
                    assert!(log.len() < 512);
                    Some(*stage)
                }
                _ => None,
            })
            .collect();
        assert_eq!(
            compile_failures,
            vec![ShaderStage::Vertex, ShaderStage::Fragment]
        );
        assert!(!program.is_linked());

        // Still usable, even though drawing with it is meaningless.
        program.use_program();
        program.set_float("u_alpha", 1.0);
        assert!(matches!(
            program.into_result(),
            Err(Error::Compile {
                stage: ShaderStage::Vertex,
                ..
            })
        ));
    });
}

#[test]
#[ignore = "needs a display with OpenGL 3.3"]
fn test_unreadable_source_is_not_reported_as_a_compile_error() {
    with_window(|gl| {
        let program =
            ShaderProgram::from_files(gl, "missing/vert.glsl", "missing/frag.glsl").unwrap();
        match program.into_result() {
            Err(Error::SourceUnreadable { stage, message }) => {
                assert_eq!(stage, ShaderStage::Vertex);
                assert!(message.contains("missing/vert.glsl"));
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("a program without sources should not be clean"),
        }
    });
}

#[test]
#[ignore = "needs a display with OpenGL 3.3"]
fn test_missing_shader_files_are_logged() {
    with_window(|gl| {
        let program =
            ShaderProgram::from_files(gl, "missing/vert.glsl", "missing/frag.glsl").unwrap();
        assert!(matches!(
            program.diagnostics()[0],
            ShaderDiagnostic::SourceUnreadable {
                stage: ShaderStage::Vertex,
                ..
            }
        ));
        assert!(matches!(
            program.diagnostics()[1],
            ShaderDiagnostic::SourceUnreadable {
                stage: ShaderStage::Fragment,
                ..
            }
        ));
    });
}

#[test]
#[ignore = "needs a display with OpenGL 3.3"]
fn test_unknown_uniforms_are_ignored() {
    with_window(|gl| {
        let program = ShaderProgram::from_sources(gl, VERTEX_SRC, FRAGMENT_SRC)
            .unwrap()
            .into_result()
            .unwrap();
        program.use_program();
        program.set_int("u_missing", 3);
        program.set_float("u_missing", 0.5);
        program.set_bool("u_missing", true);
        program.set_float("u_alpha", 0.5);
        assert_eq!(unsafe { gl.get_error() }, glow::NO_ERROR);
    });
}

#[test]
#[ignore = "needs a display with OpenGL 3.3"]
fn test_vector_uniforms_are_written() {
    with_window(|gl| {
        let program = ShaderProgram::from_sources(gl, VERTEX_SRC, VECTOR_FRAGMENT_SRC)
            .unwrap()
            .into_result()
            .unwrap();
        program.use_program();

        program.set_uniform("u_offset", Vec2::new(0.25, -0.5));
        program.set_uniform("u_color", Vec3::new(0.1, 0.2, 0.3));
        let tint = Vec4::new(1.0, 0.5, 0.25, 1.0);
        program.set_uniform("u_tint", &tint);
        assert_eq!(unsafe { gl.get_error() }, glow::NO_ERROR);

        assert_eq!(read_uniform::<2>(gl, &program, "u_offset"), [0.25, -0.5]);
        assert_eq!(read_uniform::<3>(gl, &program, "u_color"), [0.1, 0.2, 0.3]);
        assert_eq!(read_uniform::<4>(gl, &program, "u_tint"), [1.0, 0.5, 0.25, 1.0]);
    });
}

#[test]
#[ignore = "needs a display with OpenGL 3.3"]
fn test_mesh_reports_its_index_count() {
    with_window(|gl| {
        let vertices = [
            TexturedVertex::new([-0.5, -0.5, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0]),
            TexturedVertex::new([0.5, -0.5, 0.0], [0.0, 1.0, 0.0], [1.0, 0.0]),
            TexturedVertex::new([0.0, 0.5, 0.0], [0.0, 0.0, 1.0], [0.5, 1.0]),
        ];
        let mesh = Mesh::new(gl, &vertices, &[0, 1, 2]).unwrap();
        assert_eq!(mesh.index_count(), 3);

        let program = ShaderProgram::from_sources(gl, VERTEX_SRC, FRAGMENT_SRC).unwrap();
        program.use_program();
        mesh.draw();
        assert_eq!(unsafe { gl.get_error() }, glow::NO_ERROR);
    });
}

#[test]
#[ignore = "needs a display with OpenGL 3.3"]
fn test_out_of_range_indices_are_accepted() {
    with_window(|gl| {
        let floats = [0.0f32; 16];
        let mesh =
            Mesh::from_floats(gl, &floats, &[0, 1, 5], &VertexLayout::position_color_uv()).unwrap();
        assert_eq!(mesh.index_count(), 3);
    });
}

#[test]
#[ignore = "needs a display with OpenGL 3.3"]
fn test_missing_texture_is_not_a_crash() {
    with_window(|gl| {
        let texture = Texture::from_file(gl, "no/such/stone.png", 2).unwrap();
        assert!(!texture.is_loaded());
        assert_eq!(texture.unit(), 2);
        texture.bind();
        texture.unbind();
    });
}

#[test]
#[ignore = "needs a display with OpenGL 3.3"]
fn test_bundled_texture_loads() {
    with_window(|gl| {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/images/stone.png");
        let texture = Texture::from_file(gl, path, 0).unwrap();
        assert!(texture.is_loaded());
        assert_eq!((texture.width(), texture.height()), (64, 64));
        assert_eq!(texture.channels(), 3);
    });
}

#[test]
#[ignore = "needs a display with OpenGL 3.3"]
fn test_strict_constructors_fail_fast() {
    with_window(|gl| {
        assert!(matches!(
            Shader::new(gl, ShaderStage::Fragment, "void main() { oops }"),
            Err(Error::Compile {
                stage: ShaderStage::Fragment,
                ..
            })
        ));

        let vertex = Shader::new(gl, ShaderStage::Vertex, VERTEX_SRC).unwrap();
        let fragment = Shader::new(gl, ShaderStage::Fragment, FRAGMENT_SRC).unwrap();
        let program = ShaderProgram::new(gl, &[&vertex, &fragment]).unwrap();
        assert!(program.is_linked());
        assert!(program.diagnostics().is_empty());

        let image = image::DynamicImage::ImageRgba8(image::RgbaImage::new(3, 5));
        let texture = Texture::new(gl, &image, 1).unwrap();
        assert_eq!(texture.channels(), 4);
        assert_eq!((texture.width(), texture.height()), (3, 5));
    });
}

#[test]
#[ignore = "needs a display with OpenGL 3.3"]
fn test_new_texture_leaves_other_units_alone() {
    with_window(|gl| {
        let image = image::DynamicImage::ImageRgb8(image::RgbImage::new(2, 2));
        let first = Texture::new(gl, &image, 0).unwrap();
        first.bind();

        let second = Texture::new(gl, &image, 1).unwrap();
        unsafe {
            gl.active_texture(glow::TEXTURE0);
            assert_eq!(
                gl.get_parameter_i32(glow::TEXTURE_BINDING_2D),
                first.id().0.get() as i32
            );
        }

        second.bind();
        second.unbind();
        unsafe {
            gl.active_texture(glow::TEXTURE0);
            assert_eq!(
                gl.get_parameter_i32(glow::TEXTURE_BINDING_2D),
                first.id().0.get() as i32
            );
        }
    });
}
