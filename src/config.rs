//! Demo configuration, read from an optional JSON file.
//!
//! Every field has a default, so an empty object (or no file at all) gives the
//! stock textured hexagon in an 800x600 window.

use std::{fs, path::Path};

use serde::Deserialize;

use crate::{abs::WindowConfig, error::Error};

/// File name looked up in the asset root.
pub const CONFIG_FILE: &str = "hexagon.json";

/// Paths of the two shader stages, relative to the asset root.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ShaderPaths {
    pub vertex: String,
    pub fragment: String,
}

impl Default for ShaderPaths {
    fn default() -> Self {
        Self {
            vertex: "shaders/hexagon/vert.glsl".to_string(),
            fragment: "shaders/hexagon/frag.glsl".to_string(),
        }
    }
}

/// One texture and the sampler uniform it feeds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TextureConfig {
    pub path: String,
    #[serde(default)]
    pub unit: u32,
    #[serde(default = "default_sampler")]
    pub uniform: String,
}

fn default_sampler() -> String {
    "u_texture".to_string()
}

fn default_textures() -> Vec<TextureConfig> {
    vec![TextureConfig {
        path: "images/stone.png".to_string(),
        unit: 0,
        uniform: default_sampler(),
    }]
}

fn default_clear_color() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

fn default_tint() -> [f32; 4] {
    [1.0, 1.0, 1.0, 1.0]
}

fn default_pulse_color() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

fn default_rotation_speed() -> f32 {
    0.5
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DemoConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub shaders: ShaderPaths,
    #[serde(default = "default_textures")]
    pub textures: Vec<TextureConfig>,
    #[serde(default = "default_clear_color")]
    pub clear_color: [f32; 4],
    /// Multiplied into every fragment.
    #[serde(default = "default_tint")]
    pub tint: [f32; 4],
    /// Color the vertex colors pulse towards over time.
    #[serde(default = "default_pulse_color")]
    pub pulse_color: [f32; 3],
    /// Radians per second around the view axis.
    #[serde(default = "default_rotation_speed")]
    pub rotation_speed: f32,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            shaders: ShaderPaths::default(),
            textures: default_textures(),
            clear_color: default_clear_color(),
            tint: default_tint(),
            pulse_color: default_pulse_color(),
            rotation_speed: default_rotation_speed(),
            log_level: default_log_level(),
        }
    }
}

impl DemoConfig {
    pub fn parse(s: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Loads `path`, falling back to the defaults when it is missing or invalid.
    ///
    /// A missing file is not a problem. A file that exists but cannot be read or
    /// parsed is handed back with the defaults so the caller can report it once
    /// logging is up.
    pub fn load_or_default(path: impl AsRef<Path>) -> (Self, Option<Error>) {
        let path = path.as_ref();
        if !path.exists() {
            return (Self::default(), None);
        }
        match Self::load(path) {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// The configured log level, `info` when it does not parse.
    pub fn level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}
