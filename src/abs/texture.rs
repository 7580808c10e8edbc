//! Structs and functions for handling textures.
//!
//! The module provides the [`Texture`] struct which is a CPU representation of a GPU texture
//! assigned to one texture unit. Wrapping is always `REPEAT` and filtering always `LINEAR`.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use glow::HasContext;
use image::{DynamicImage, GenericImageView};

use crate::error::Error;

/// Upload format chosen from the decoded channel count. Always 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Red,
    Rg,
    Rgb,
    Rgba,
}

impl PixelFormat {
    /// Picks the format for `channels` channels, if one exists.
    pub fn from_channels(channels: u8) -> Option<Self> {
        match channels {
            1 => Some(Self::Red),
            2 => Some(Self::Rg),
            3 => Some(Self::Rgb),
            4 => Some(Self::Rgba),
            _ => None,
        }
    }

    pub fn channels(self) -> u8 {
        match self {
            Self::Red => 1,
            Self::Rg => 2,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }

    /// The `format` argument of `glTexImage2D`.
    pub fn gl_format(self) -> u32 {
        match self {
            Self::Red => glow::RED,
            Self::Rg => glow::RG,
            Self::Rgb => glow::RGB,
            Self::Rgba => glow::RGBA,
        }
    }

    /// The sized `internalformat` argument of `glTexImage2D`.
    pub fn gl_internal_format(self) -> i32 {
        (match self {
            Self::Red => glow::R8,
            Self::Rg => glow::RG8,
            Self::Rgb => glow::RGB8,
            Self::Rgba => glow::RGBA8,
        }) as i32
    }

    /// Swizzle that presents luminance (and alpha) images as grey RGB(A).
    fn swizzle(self) -> Option<[u32; 4]> {
        match self {
            Self::Red => Some([glow::RED, glow::RED, glow::RED, glow::ONE]),
            Self::Rg => Some([glow::RED, glow::RED, glow::RED, glow::GREEN]),
            Self::Rgb | Self::Rgba => None,
        }
    }
}

/// Converts a decoded image to 8-bit pixels, keeping its channel count.
pub fn pixel_data(image: &DynamicImage) -> (PixelFormat, Vec<u8>) {
    match PixelFormat::from_channels(image.color().channel_count()) {
        Some(PixelFormat::Red) => (PixelFormat::Red, image.to_luma8().into_raw()),
        Some(PixelFormat::Rg) => (PixelFormat::Rg, image.to_luma_alpha8().into_raw()),
        Some(PixelFormat::Rgb) => (PixelFormat::Rgb, image.to_rgb8().into_raw()),
        Some(PixelFormat::Rgba) | None => (PixelFormat::Rgba, image.to_rgba8().into_raw()),
    }
}

/// Decodes an image file.
pub fn load_image(path: impl AsRef<Path>) -> Result<DynamicImage, Error> {
    let path = path.as_ref();
    image::open(path).map_err(|source| Error::Image {
        path: PathBuf::from(path),
        source,
    })
}

/// Represents a texture stored on the GPU side.
pub struct Texture {
    gl: Arc<glow::Context>,
    id: glow::Texture,
    unit: u32,
    width: u32,
    height: u32,
    format: Option<PixelFormat>,
}

impl Texture {
    /// Creates a new texture on `unit` from the given [`image::DynamicImage`].
    pub fn new(gl: &Arc<glow::Context>, image: &DynamicImage, unit: u32) -> Result<Self, Error> {
        let mut texture = Self::allocate(gl, unit)?;
        texture.upload(image);
        Ok(texture)
    }

    /// Creates a texture on `unit` and fills it from an image file.
    ///
    /// A file that cannot be decoded is logged and leaves the texture without
    /// image data; sampling it then gives driver-defined results. Only a failure
    /// to allocate the texture object is returned as an error.
    pub fn from_file(
        gl: &Arc<glow::Context>,
        path: impl AsRef<Path>,
        unit: u32,
    ) -> Result<Self, Error> {
        let mut texture = Self::allocate(gl, unit)?;
        match load_image(path) {
            Ok(image) => texture.upload(&image),
            Err(e) => log::error!("{e}"),
        }
        Ok(texture)
    }

    fn allocate(gl: &Arc<glow::Context>, unit: u32) -> Result<Self, Error> {
        unsafe {
            let texture = gl.create_texture().map_err(Error::gl("texture"))?;
            // Set up on our own unit so a texture bound on another unit stays put.
            gl.active_texture(glow::TEXTURE0 + unit);
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::REPEAT as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::REPEAT as i32);
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MIN_FILTER,
                glow::LINEAR as i32,
            );
            gl.tex_parameter_i32(
                glow::TEXTURE_2D,
                glow::TEXTURE_MAG_FILTER,
                glow::LINEAR as i32,
            );
            gl.bind_texture(glow::TEXTURE_2D, None);

            Ok(Self {
                gl: Arc::clone(gl),
                id: texture,
                unit,
                width: 0,
                height: 0,
                format: None,
            })
        }
    }

    fn upload(&mut self, image: &DynamicImage) {
        let (width, height) = image.dimensions();
        let (format, data) = pixel_data(image);
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + self.unit);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(self.id));
            // RGB and single-channel rows are not 4-byte aligned in general.
            self.gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                format.gl_internal_format(),
                width as i32,
                height as i32,
                0,
                format.gl_format(),
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(data.as_slice())),
            );
            self.gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 4);
            if let Some([r, g, b, a]) = format.swizzle() {
                self.gl
                    .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_SWIZZLE_R, r as i32);
                self.gl
                    .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_SWIZZLE_G, g as i32);
                self.gl
                    .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_SWIZZLE_B, b as i32);
                self.gl
                    .tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_SWIZZLE_A, a as i32);
            }
            self.gl.generate_mipmap(glow::TEXTURE_2D);
            self.gl.bind_texture(glow::TEXTURE_2D, None);
        }

        log::debug!(
            "uploaded {width}x{height} {format:?} texture to unit {}",
            self.unit
        );
        self.width = width;
        self.height = height;
        self.format = Some(format);
    }

    /// Returns the width of the texture, `0` if no image was uploaded.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the texture, `0` if no image was uploaded.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Channel count of the uploaded image, `0` if none.
    pub fn channels(&self) -> u8 {
        self.format.map_or(0, PixelFormat::channels)
    }

    pub fn format(&self) -> Option<PixelFormat> {
        self.format
    }

    /// The texture unit this texture binds to.
    pub fn unit(&self) -> u32 {
        self.unit
    }

    /// The GL name of the texture.
    pub fn id(&self) -> glow::Texture {
        self.id
    }

    /// Whether image data was uploaded.
    pub fn is_loaded(&self) -> bool {
        self.format.is_some()
    }

    /// Activates this texture's unit and binds the texture to it.
    pub fn bind(&self) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + self.unit);
            self.gl.bind_texture(glow::TEXTURE_2D, Some(self.id));
        }
    }

    /// Unbinds the 2D target of this texture's unit, leaving that unit active.
    pub fn unbind(&self) {
        unsafe {
            self.gl.active_texture(glow::TEXTURE0 + self.unit);
            self.gl.bind_texture(glow::TEXTURE_2D, None);
        }
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_texture(self.id);
        }
    }
}
