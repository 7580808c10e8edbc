//! Mesh management module.
//!
//! This module defines the [`Mesh`] struct for managing mesh data on the GPU side.
//! The interleaved record format is described by a [`VertexLayout`]; typed vertices
//! implement the [`Vertex`] trait to report theirs.

use std::sync::Arc;

use glow::HasContext;

use crate::error::Error;

/// What a vertex attribute carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeSemantic {
    Position,
    Color,
    TexCoord,
}

/// One float attribute inside an interleaved vertex record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Shader input location.
    pub location: u32,
    pub semantic: AttributeSemantic,
    /// Number of `f32` components.
    pub components: i32,
    /// Byte offset from the start of the record.
    pub offset: i32,
}

/// Describes how an interleaved `f32` vertex record is laid out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexLayout {
    attributes: Vec<VertexAttribute>,
    stride: i32,
}

impl VertexLayout {
    /// Builds a tightly packed layout, assigning locations `0..` in order.
    pub fn interleaved(parts: &[(AttributeSemantic, i32)]) -> Self {
        let float_size = size_of::<f32>() as i32;
        let mut offset = 0;
        let attributes = parts
            .iter()
            .enumerate()
            .map(|(location, &(semantic, components))| {
                let attribute = VertexAttribute {
                    location: location as u32,
                    semantic,
                    components,
                    offset,
                };
                offset += components * float_size;
                attribute
            })
            .collect();

        Self {
            attributes,
            stride: offset,
        }
    }

    /// Position (3), color (3) and texture coordinate (2): eight floats per vertex.
    pub fn position_color_uv() -> Self {
        Self::interleaved(&[
            (AttributeSemantic::Position, 3),
            (AttributeSemantic::Color, 3),
            (AttributeSemantic::TexCoord, 2),
        ])
    }

    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    /// Size of one record in bytes.
    pub fn stride(&self) -> i32 {
        self.stride
    }

    pub fn floats_per_vertex(&self) -> usize {
        self.stride as usize / size_of::<f32>()
    }

    /// Number of whole records in `float_count` floats.
    pub fn vertex_count(&self, float_count: usize) -> usize {
        match self.floats_per_vertex() {
            0 => 0,
            n => float_count / n,
        }
    }

    /// Configures and enables the attribute pointers on the bound VAO and VBO.
    fn apply(&self, gl: &glow::Context) {
        unsafe {
            for attribute in &self.attributes {
                gl.vertex_attrib_pointer_f32(
                    attribute.location,
                    attribute.components,
                    glow::FLOAT,
                    false,
                    self.stride,
                    attribute.offset,
                );
                gl.enable_vertex_attrib_array(attribute.location);
            }
        }
    }
}

/// Counts indices that point past the last of `vertex_count` vertices.
pub fn out_of_range_indices(indices: &[u32], vertex_count: usize) -> usize {
    indices
        .iter()
        .filter(|&&index| index as usize >= vertex_count)
        .count()
}

/// Trait for plain vertex records that can be uploaded as-is.
pub trait Vertex: bytemuck::Pod {
    /// The layout of one record.
    fn layout() -> VertexLayout;
}

/// Vertex with a position, a color and a texture coordinate.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TexturedVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub uv: [f32; 2],
}

impl TexturedVertex {
    pub const fn new(position: [f32; 3], color: [f32; 3], uv: [f32; 2]) -> Self {
        Self {
            position,
            color,
            uv,
        }
    }
}

impl Vertex for TexturedVertex {
    fn layout() -> VertexLayout {
        VertexLayout::position_color_uv()
    }
}

/// Represents a mesh stored on the GPU side.
///
/// The vertex array, vertex buffer and index buffer are created together and
/// deleted together. The contents are never changed after construction.
pub struct Mesh {
    gl: Arc<glow::Context>,
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    ebo: glow::Buffer,
    index_count: usize,
}

impl Mesh {
    /// Creates a new mesh from the given vertex and index data.
    pub fn new<V: Vertex>(
        gl: &Arc<glow::Context>,
        vertices: &[V],
        indices: &[u32],
    ) -> Result<Self, Error> {
        let layout = V::layout();
        check_indices(indices, vertices.len());
        Self::upload(gl, bytemuck::cast_slice(vertices), indices, &layout)
    }

    /// Creates a new mesh from raw interleaved floats described by `layout`.
    pub fn from_floats(
        gl: &Arc<glow::Context>,
        vertices: &[f32],
        indices: &[u32],
        layout: &VertexLayout,
    ) -> Result<Self, Error> {
        let per_vertex = layout.floats_per_vertex();
        if per_vertex > 0 && vertices.len() % per_vertex != 0 {
            log::warn!(
                "{} floats is not a whole number of {per_vertex}-float vertices",
                vertices.len()
            );
        }
        check_indices(indices, layout.vertex_count(vertices.len()));
        Self::upload(gl, bytemuck::cast_slice(vertices), indices, layout)
    }

    fn upload(
        gl: &Arc<glow::Context>,
        vertex_bytes: &[u8],
        indices: &[u32],
        layout: &VertexLayout,
    ) -> Result<Self, Error> {
        unsafe {
            let vao = gl.create_vertex_array().map_err(Error::gl("vertex array"))?;
            let vbo = match gl.create_buffer() {
                Ok(vbo) => vbo,
                Err(e) => {
                    gl.delete_vertex_array(vao);
                    return Err(Error::gl("vertex buffer")(e));
                }
            };
            let ebo = match gl.create_buffer() {
                Ok(ebo) => ebo,
                Err(e) => {
                    gl.delete_buffer(vbo);
                    gl.delete_vertex_array(vao);
                    return Err(Error::gl("index buffer")(e));
                }
            };

            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, vertex_bytes, glow::STATIC_DRAW);

            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));
            gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                bytemuck::cast_slice(indices),
                glow::STATIC_DRAW,
            );

            layout.apply(gl);

            gl.bind_buffer(glow::ARRAY_BUFFER, None);
            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, None);

            log::debug!(
                "uploaded mesh: {} vertex bytes, {} indices",
                vertex_bytes.len(),
                indices.len()
            );

            Ok(Self {
                gl: Arc::clone(gl),
                vao,
                vbo,
                ebo,
                index_count: indices.len(),
            })
        }
    }

    /// Binds the vertex array.
    pub fn bind(&self) {
        unsafe {
            self.gl.bind_vertex_array(Some(self.vao));
        }
    }

    /// Binds the default (null) vertex array.
    pub fn unbind(&self) {
        unsafe {
            self.gl.bind_vertex_array(None);
        }
    }

    /// Draws the mesh as indexed triangles.
    pub fn draw(&self) {
        unsafe {
            self.gl.bind_vertex_array(Some(self.vao));
            self.gl.draw_elements(
                glow::TRIANGLES,
                self.index_count as i32,
                glow::UNSIGNED_INT,
                0,
            );
            self.gl.bind_vertex_array(None);
        }
    }

    /// Number of indices to pass to the draw call.
    pub fn index_count(&self) -> usize {
        self.index_count
    }
}

impl Drop for Mesh {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_buffer(self.vbo);
            self.gl.delete_buffer(self.ebo);
            self.gl.delete_vertex_array(self.vao);
        }
    }
}

/// Out-of-range indices are uploaded anyway; drawing them is undefined.
fn check_indices(indices: &[u32], vertex_count: usize) {
    let bad = out_of_range_indices(indices, vertex_count);
    if bad > 0 {
        log::warn!("{bad} of {} indices reference past vertex {vertex_count}", indices.len());
    }
}
