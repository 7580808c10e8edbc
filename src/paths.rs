//! Locating assets at runtime.

use std::path::{Path, PathBuf};

/// Environment variable that points the demo at a different asset directory.
pub const ASSETS_ENV: &str = "HEXAGON_GL_ASSETS";

/// Directory containing the running executable.
pub fn executable_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
}

/// Directory the demo loads shaders, images and its config from.
///
/// `$HEXAGON_GL_ASSETS` wins, then an `assets` directory beside the executable,
/// then the crate's own `assets` directory.
pub fn asset_root() -> PathBuf {
    if let Some(dir) = std::env::var_os(ASSETS_ENV) {
        return PathBuf::from(dir);
    }
    executable_dir()
        .map(|dir| dir.join("assets"))
        .filter(|dir| dir.is_dir())
        .unwrap_or_else(|| Path::new(env!("CARGO_MANIFEST_DIR")).join("assets"))
}

/// Joins a relative asset path onto `root`. Absolute paths are returned unchanged.
pub fn resolve(root: &Path, path: impl AsRef<Path>) -> PathBuf {
    root.join(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_paths_are_joined() {
        let root = Path::new("/opt/demo/assets");
        assert_eq!(
            resolve(root, "shaders/hexagon/vert.glsl"),
            Path::new("/opt/demo/assets/shaders/hexagon/vert.glsl")
        );
    }

    #[test]
    fn test_absolute_paths_are_kept() {
        let root = Path::new("/opt/demo/assets");
        assert_eq!(resolve(root, "/tmp/stone.png"), Path::new("/tmp/stone.png"));
    }

    #[test]
    fn test_executable_dir_exists() {
        let dir = executable_dir().unwrap();
        assert!(dir.is_dir());
    }

    #[test]
    fn test_bundled_assets_are_present() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets");
        assert!(root.join("shaders/hexagon/vert.glsl").is_file());
        assert!(root.join("shaders/hexagon/frag.glsl").is_file());
        assert!(root.join("images/stone.png").is_file());
    }
}
