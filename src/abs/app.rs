//! SDL2 and OpenGL application management.
//!
//! This module defines the [`Platform`] handle, which owns the process-wide SDL2
//! library state, and the [`Window`] struct which encapsulates the window and
//! OpenGL context created from it.

use std::{
    marker::PhantomData,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use glow::HasContext;
use sdl2::{
    event::{Event, WindowEvent},
    keyboard::Scancode,
};
use serde::Deserialize;

use crate::error::Error;

static PLATFORM_ALIVE: AtomicBool = AtomicBool::new(false);

/// The initialized SDL2 library and its video subsystem.
///
/// SDL keeps global state, so only one [`Platform`] may be alive per process.
/// Dropping it shuts SDL down; every [`Window`] borrows the platform and is
/// therefore gone by then.
pub struct Platform {
    sdl: sdl2::Sdl,
    video: sdl2::VideoSubsystem,
}

impl Platform {
    /// Initializes SDL2 and its video subsystem.
    ///
    /// Fails with [`Error::PlatformAlreadyInitialized`] while another
    /// [`Platform`] is alive.
    pub fn init() -> Result<Self, Error> {
        if PLATFORM_ALIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::PlatformAlreadyInitialized);
        }

        let platform = sdl2::init().and_then(|sdl| {
            let video = sdl.video()?;
            Ok(Self { sdl, video })
        });

        match platform {
            Ok(platform) => {
                log::info!("SDL {} initialized", sdl2::version::version());
                Ok(platform)
            }
            Err(e) => {
                PLATFORM_ALIVE.store(false, Ordering::Release);
                Err(Error::Platform(e))
            }
        }
    }

    /// Returns whether a [`Platform`] is currently alive in this process.
    pub fn is_alive() -> bool {
        PLATFORM_ALIVE.load(Ordering::Acquire)
    }
}

impl Drop for Platform {
    fn drop(&mut self) {
        log::info!("shutting down SDL");
        PLATFORM_ALIVE.store(false, Ordering::Release);
    }
}

fn default_width() -> u32 {
    800
}

fn default_height() -> u32 {
    600
}

fn default_title() -> String {
    "Hello World".to_string()
}

fn default_gl_version() -> (u8, u8) {
    (3, 3)
}

fn default_resizable() -> bool {
    true
}

/// Parameters for creating a [`Window`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_title")]
    pub title: String,
    /// Requested core profile version as `(major, minor)`.
    #[serde(default = "default_gl_version")]
    pub gl_version: (u8, u8),
    #[serde(default = "default_resizable")]
    pub resizable: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            title: default_title(),
            gl_version: default_gl_version(),
            resizable: default_resizable(),
        }
    }
}

impl WindowConfig {
    /// Checks the parameters before anything is handed to SDL.
    pub fn validate(&self) -> Result<(), Error> {
        let fits = |v: u32| v > 0 && i32::try_from(v).is_ok();
        if !fits(self.width) || !fits(self.height) {
            return Err(Error::InvalidWindowSize {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }
}

/// The [`Window`] struct encapsulates an SDL2 window and its current OpenGL context.
pub struct Window<'p> {
    gl: Arc<glow::Context>,
    event_pump: sdl2::EventPump,
    _gl_context: sdl2::video::GLContext,
    window: sdl2::video::Window,
    title: String,
    size: (u32, u32),
    should_close: bool,
    _platform: PhantomData<&'p Platform>,
}

impl<'p> Window<'p> {
    /// Creates the window, makes its OpenGL context current and loads the GL
    /// function table. Any failure here is fatal for the caller.
    pub fn new(platform: &'p Platform, config: &WindowConfig) -> Result<Self, Error> {
        config.validate()?;

        let gl_attr = platform.video.gl_attr();
        gl_attr.set_context_profile(sdl2::video::GLProfile::Core);
        gl_attr.set_context_version(config.gl_version.0, config.gl_version.1);

        let mut builder = platform
            .video
            .window(&config.title, config.width, config.height);
        builder.opengl();
        if config.resizable {
            builder.resizable();
        }
        let window = builder.build().map_err(|e| Error::Window(e.to_string()))?;

        let gl_context = window.gl_create_context().map_err(Error::Context)?;
        window.gl_make_current(&gl_context).map_err(Error::Context)?;
        let gl = unsafe {
            glow::Context::from_loader_function(|s| {
                platform.video.gl_get_proc_address(s) as *const _
            })
        };
        let event_pump = platform.sdl.event_pump().map_err(Error::Platform)?;

        let size = window.drawable_size();
        unsafe {
            gl.viewport(0, 0, size.0 as i32, size.1 as i32);
            log::info!(
                "created window \"{}\" ({}x{}) with OpenGL {}",
                config.title,
                size.0,
                size.1,
                gl.get_parameter_string(glow::VERSION)
            );
        }

        Ok(Self {
            gl: Arc::new(gl),
            event_pump,
            _gl_context: gl_context,
            window,
            title: config.title.clone(),
            size,
            should_close: false,
            _platform: PhantomData,
        })
    }

    /// The OpenGL function table of this window's context.
    pub fn gl(&self) -> &Arc<glow::Context> {
        &self.gl
    }

    /// Whether a close has been requested.
    pub fn should_close(&self) -> bool {
        self.should_close
    }

    pub fn set_should_close(&mut self, value: bool) {
        self.should_close = value;
    }

    /// Presents the back buffer.
    pub fn swap_buffers(&self) {
        self.window.gl_swap_window();
    }

    /// Drains pending events. Quit requests set the close flag and size
    /// changes resize the viewport to the new drawable size.
    pub fn poll_events(&mut self) {
        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => self.should_close = true,
                Event::Window {
                    win_event: WindowEvent::SizeChanged(..),
                    ..
                } => {
                    self.size = self.window.drawable_size();
                    log::debug!("viewport resized to {}x{}", self.size.0, self.size.1);
                    unsafe {
                        self.gl
                            .viewport(0, 0, self.size.0 as i32, self.size.1 as i32);
                    }
                }
                _ => {}
            }
        }
    }

    /// Requests a close while Escape is held.
    pub fn process_input(&mut self) {
        if self
            .event_pump
            .keyboard_state()
            .is_scancode_pressed(Scancode::Escape)
        {
            self.should_close = true;
        }
    }

    /// The current drawable size in pixels.
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn title(&self) -> &str {
        &self.title
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_window_config() {
        let config = WindowConfig::default();
        assert_eq!((config.width, config.height), (800, 600));
        assert_eq!(config.title, "Hello World");
        assert_eq!(config.gl_version, (3, 3));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_sized_window_is_rejected() {
        let config = WindowConfig {
            width: 0,
            ..WindowConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidWindowSize { width: 0, height: 600 })
        ));
    }

    #[test]
    fn test_oversized_window_is_rejected() {
        let config = WindowConfig {
            height: u32::MAX,
            ..WindowConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_window_config_uses_defaults() {
        let config: WindowConfig = serde_json::from_str(r#"{ "title": "hex" }"#).unwrap();
        assert_eq!(config.title, "hex");
        assert_eq!(config.width, 800);
        assert!(config.resizable);
    }
}
