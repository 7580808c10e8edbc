//! The textured hexagon scene and its render loop.

use std::{path::Path, sync::Arc, time::Instant};

use glam::{Mat4, Vec2, Vec3, Vec4};
use glow::HasContext;

use crate::{
    abs::{Mesh, ShaderProgram, Texture, TexturedVertex, Window},
    config::DemoConfig,
    error::Error,
    paths,
};

/// Center vertex followed by the rim, clockwise from the top.
pub const HEXAGON_VERTICES: [TexturedVertex; 7] = [
    TexturedVertex::new([0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [0.5, 0.5]),
    TexturedVertex::new([0.0, 0.5, 0.0], [1.0, 0.0, 0.0], [0.5, 1.0]),
    TexturedVertex::new([0.43, 0.25, 0.0], [0.0, 1.0, 0.0], [0.93, 0.75]),
    TexturedVertex::new([0.43, -0.25, 0.0], [0.0, 0.0, 1.0], [0.93, 0.25]),
    TexturedVertex::new([0.0, -0.5, 0.0], [1.0, 1.0, 0.0], [0.5, 0.0]),
    TexturedVertex::new([-0.43, -0.25, 0.0], [0.0, 1.0, 1.0], [0.07, 0.25]),
    TexturedVertex::new([-0.43, 0.25, 0.0], [1.0, 0.0, 1.0], [0.07, 0.75]),
];

/// Six triangles fanning out from the center.
pub const HEXAGON_INDICES: [u32; 18] = [
    0, 1, 2, //
    0, 2, 3, //
    0, 3, 4, //
    0, 4, 5, //
    0, 5, 6, //
    0, 6, 1, //
];

/// A texture together with the sampler uniform it is wired to.
struct BoundTexture {
    texture: Texture,
    uniform: String,
}

/// Everything needed to draw one frame of the demo.
pub struct Scene {
    gl: Arc<glow::Context>,
    program: ShaderProgram,
    mesh: Mesh,
    textures: Vec<BoundTexture>,
    clear_color: [f32; 4],
    tint: Vec4,
    pulse_color: Vec3,
    rotation_speed: f32,
}

impl Scene {
    /// Builds the program, the hexagon mesh and every configured texture.
    ///
    /// Broken shaders or images are logged and the scene is built anyway.
    pub fn load(gl: &Arc<glow::Context>, config: &DemoConfig, asset_root: &Path) -> Result<Self, Error> {
        let program = ShaderProgram::from_files(
            gl,
            paths::resolve(asset_root, &config.shaders.vertex),
            paths::resolve(asset_root, &config.shaders.fragment),
        )?;
        if !program.diagnostics().is_empty() {
            log::warn!(
                "continuing with a shader program that had {} problem(s)",
                program.diagnostics().len()
            );
        }

        let mesh = Mesh::new(gl, &HEXAGON_VERTICES, &HEXAGON_INDICES)?;

        let textures = config
            .textures
            .iter()
            .map(|tc| {
                let texture = Texture::from_file(gl, paths::resolve(asset_root, &tc.path), tc.unit)?;
                Ok(BoundTexture {
                    texture,
                    uniform: tc.uniform.clone(),
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        log::info!(
            "scene ready: {} indices, {} texture(s)",
            mesh.index_count(),
            textures.len()
        );

        Ok(Self {
            gl: Arc::clone(gl),
            program,
            mesh,
            textures,
            clear_color: config.clear_color,
            tint: Vec4::from_array(config.tint),
            pulse_color: Vec3::from_array(config.pulse_color),
            rotation_speed: config.rotation_speed,
        })
    }

    pub fn program(&self) -> &ShaderProgram {
        &self.program
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    /// Draws one frame, `time` seconds after the loop started, into a
    /// drawable of `size` pixels.
    pub fn render(&self, time: f32, size: (u32, u32)) {
        let [r, g, b, a] = self.clear_color;
        unsafe {
            self.gl.clear_color(r, g, b, a);
            self.gl.clear(glow::COLOR_BUFFER_BIT);
        }

        self.program.use_program();
        self.program.set_float("u_time", time);
        self.program.set_bool(
            "u_use_texture",
            self.textures.iter().any(|t| t.texture.is_loaded()),
        );
        self.program
            .set_uniform("u_transform", transform(self.rotation_speed, time));
        self.program.set_uniform("u_scale", aspect_correction(size));
        self.program.set_uniform("u_tint", &self.tint);
        self.program.set_uniform("u_pulse_color", self.pulse_color);

        for bound in &self.textures {
            self.program
                .set_int(&bound.uniform, bound.texture.unit() as i32);
            bound.texture.bind();
        }

        self.mesh.bind();
        unsafe {
            self.gl.draw_elements(
                glow::TRIANGLES,
                self.mesh.index_count() as i32,
                glow::UNSIGNED_INT,
                0,
            );
        }
        self.mesh.unbind();

        for bound in &self.textures {
            bound.texture.unbind();
        }
    }
}

/// Rotation about the view axis after `time` seconds.
pub fn transform(rotation_speed: f32, time: f32) -> Mat4 {
    Mat4::from_axis_angle(Vec3::Z, rotation_speed * time)
}

/// Scale that keeps the hexagon regular in a `size` drawable by shrinking
/// the longer axis.
pub fn aspect_correction(size: (u32, u32)) -> Vec2 {
    let (width, height) = (size.0 as f32, size.1 as f32);
    if width <= 0.0 || height <= 0.0 {
        Vec2::ONE
    } else if width > height {
        Vec2::new(height / width, 1.0)
    } else {
        Vec2::new(1.0, width / height)
    }
}

/// Runs the render loop until the window is asked to close.
pub fn run(window: &mut Window, scene: &Scene) {
    let start = Instant::now();
    let mut frames: u64 = 0;

    while !window.should_close() {
        window.process_input();
        scene.render(start.elapsed().as_secs_f32(), window.size());
        window.swap_buffers();
        window.poll_events();
        frames += 1;
    }

    let seconds = start.elapsed().as_secs_f64();
    log::info!(
        "rendered {frames} frames in {seconds:.1}s ({:.1} fps)",
        frames as f64 / seconds.max(f64::EPSILON)
    );
}
