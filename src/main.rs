mod app;
mod backend;
mod config;
mod error;
mod render_engine;
mod scheduler;
mod source;
mod uniforms;

use app::ShaderApp;
use config::Config;

use std::process::ExitCode;

pub const WINDOW_TITLE: &str = "shader viewer.";
pub const RELOAD_KEY: egui::Key = egui::Key::R;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_args();
    log::debug!("{:?}", config);

    let native_options = eframe::NativeOptions {
        renderer: eframe::Renderer::Glow,
        initial_window_size: Some(egui::vec2(config.width as f32, config.height as f32)),
        fullscreen: config.fullscreen,
        ..Default::default()
    };

    let result = eframe::run_native(
        WINDOW_TITLE,
        native_options,
        Box::new(move |cc| -> Box<dyn eframe::App> {
            match ShaderApp::new(cc, config) {
                Ok(app) => Box::new(app),
                Err(e) => {
                    log::error!("{}", e);
                    std::process::exit(1);
                }
            }
        }),
    );

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Failed to run eframe: {}", e);
            ExitCode::FAILURE
        }
    }
}
