use std::process::ExitCode;

use hexagon_gl::{
    abs::{Platform, Window},
    config::{CONFIG_FILE, DemoConfig},
    demo::{self, Scene},
    logging, paths,
};

fn main() -> ExitCode {
    let asset_root = paths::asset_root();
    let (config, config_error) = DemoConfig::load_or_default(asset_root.join(CONFIG_FILE));

    if let Err(e) = logging::init(config.level_filter()) {
        eprintln!("{e}");
    }
    if let Some(e) = config_error {
        log::warn!("{e}; using default configuration");
    }
    log::info!("loading assets from {}", asset_root.display());

    match run(&config, &asset_root) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &DemoConfig, asset_root: &std::path::Path) -> Result<(), hexagon_gl::Error> {
    let platform = Platform::init()?;
    let mut window = Window::new(&platform, &config.window)?;
    let scene = Scene::load(window.gl(), config, asset_root)?;

    demo::run(&mut window, &scene);
    Ok(())
}
