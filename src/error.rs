//! The crate-wide [`Error`] type.
//!
//! Only resource acquisition (platform, window, context, GL objects) is fatal in
//! the demo. Asset problems are logged and recorded as diagnostics on the
//! resource instead; the variants for them exist so callers can opt into a hard
//! failure through `into_result`-style helpers.

use std::path::PathBuf;

use crate::abs::ShaderStage;

/// Everything that can go wrong while setting up or loading resources.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to initialize SDL: {0}")]
    Platform(String),

    #[error("the platform is already initialized in this process")]
    PlatformAlreadyInitialized,

    #[error("invalid window size {width}x{height}")]
    InvalidWindowSize { width: u32, height: u32 },

    #[error("failed to create window: {0}")]
    Window(String),

    #[error("failed to set up the OpenGL context: {0}")]
    Context(String),

    #[error("OpenGL refused to allocate a {kind}: {message}")]
    GlAllocation { kind: &'static str, message: String },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("{stage} shader source could not be read: {message}")]
    SourceUnreadable { stage: ShaderStage, message: String },

    #[error("{stage} shader failed to compile: {log}")]
    Compile { stage: ShaderStage, log: String },

    #[error("shader program failed to link: {log}")]
    Link { log: String },

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("failed to install logger: {0}")]
    Logger(#[from] log::SetLoggerError),
}

impl Error {
    /// Shorthand for [`Error::GlAllocation`], used when mapping glow's `String` errors.
    pub(crate) fn gl(kind: &'static str) -> impl FnOnce(String) -> Self {
        move |message| Self::GlAllocation { kind, message }
    }
}
