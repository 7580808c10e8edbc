//! A small OpenGL demo: a window, a shader program, a mesh and a texture,
//! composed into a render loop that draws a textured hexagon.
//!
//! The wrappers in [`abs`] each own exactly one GPU or OS resource and release it
//! on drop. Only acquiring the platform, window, context or GL objects is fatal;
//! broken shader sources and images are logged and leave a degraded resource.

pub mod abs;
pub mod config;
pub mod demo;
pub mod error;
pub mod logging;
pub mod paths;

pub use error::Error;
