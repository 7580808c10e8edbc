//! Logger setup.
//!
//! Messages go to stderr and, when the platform has a local data directory, to
//! `hexagon-gl/hexagon-gl.log` inside it.

use std::path::PathBuf;

use crate::error::Error;

/// Where the log file goes, if anywhere.
pub fn log_file_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("hexagon-gl").join("hexagon-gl.log"))
}

/// Installs the global logger. Can only succeed once per process.
pub fn init(level: log::LevelFilter) -> Result<(), Error> {
    let mut dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{} {:<5} {}] {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .chain(std::io::stderr());

    let file = log_file_path().and_then(|path| {
        let parent = path.parent()?;
        std::fs::create_dir_all(parent).ok()?;
        fern::log_file(&path).ok()
    });
    if let Some(file) = file {
        dispatch = dispatch.chain(file);
    }

    dispatch.apply()?;
    Ok(())
}
