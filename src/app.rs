mod watcher;

use crate::RELOAD_KEY;
use crate::config::Config;
use crate::error::StartupError;
use crate::render_engine::ShaderRenderer;
use crate::scheduler::{ReloadPolicy, Trigger};
use crate::uniforms::FrameUniforms;

use watcher::ShaderWatcher;

use std::sync::Arc;
use std::time::Instant;

use eframe::egui_glow;
use egui::mutex::Mutex;

pub struct ShaderApp {
    gl: Arc<glow::Context>,
    shader_renderer: Arc<Mutex<ShaderRenderer>>,
    config: Config,
    policy: ReloadPolicy,
    watcher: Option<ShaderWatcher>,
    start: Instant,
    cursor: egui::Pos2,
}

impl ShaderApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: Config) -> Result<Self, StartupError> {
        let gl = cc.gl.as_ref().ok_or(StartupError::NoContext)?.clone();

        let shader_renderer = ShaderRenderer::new(&gl, &config.shader_path)?;

        let watcher = if config.watch {
            match ShaderWatcher::new(&config.shader_path) {
                Ok(watcher) => Some(watcher),
                Err(e) => {
                    log::warn!("Could not watch {:?}: {}", config.shader_path, e);
                    None
                }
            }
        } else {
            None
        };

        if config.reload_interval.is_zero() {
            log::info!("Auto reload disabled, press {:?} to reload", RELOAD_KEY);
        } else {
            log::info!("Auto reload every {:?}", config.reload_interval);
        }

        let now = Instant::now();
        Ok(Self {
            gl,
            shader_renderer: Arc::new(Mutex::new(shader_renderer)),
            policy: ReloadPolicy::new(config.reload_interval, config.verbose, now),
            config,
            watcher,
            start: now,
            cursor: egui::Pos2::ZERO,
        })
    }

    /// Runs one reload attempt to completion. Failures are logged and dropped.
    fn reload(&self, verbose: bool) {
        let result = self
            .shader_renderer
            .lock()
            .reload(&self.gl, &self.config.shader_path, verbose);

        match result {
            Ok(()) if verbose => log::info!("Shader reloaded successfully!"),
            Ok(()) => {}
            Err(e) => e.report(verbose),
        }
    }

    fn custom_painting(&mut self, ui: &mut egui::Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), egui::Sense::hover());

        // Like a windowing cursor query, keep the last position once the pointer leaves.
        if let Some(pos) = response.hover_pos() {
            self.cursor = pos;
        }

        let pixels_per_point = ui.ctx().pixels_per_point();
        let size = rect.size() * pixels_per_point;
        let cursor = (self.cursor - rect.min) * pixels_per_point;
        let frame = FrameUniforms::new(
            [size.x, size.y],
            [cursor.x, cursor.y],
            self.start.elapsed().as_secs_f32(),
        );

        let shader_renderer = self.shader_renderer.clone();
        let cb = egui_glow::CallbackFn::new(move |_info, painter| {
            shader_renderer.lock().paint(painter.gl(), &frame);
        });

        let callback = egui::PaintCallback {
            rect,
            callback: Arc::new(cb),
        };
        ui.painter().add(callback);
    }
}

impl eframe::App for ShaderApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let key_down = ctx.input(|i| i.key_down(RELOAD_KEY));
        let file_changed = self.watcher.as_ref().is_some_and(ShaderWatcher::changed);

        if let Some(request) = self.policy.poll(Instant::now(), key_down, file_changed) {
            match request.trigger {
                Trigger::Manual => log::info!("Reloading shader."),
                Trigger::FileChanged => log::debug!("Shader file changed, reloading"),
                Trigger::Timer => {}
            }
            self.reload(request.verbose);
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                self.custom_painting(ui);
            });

        ctx.request_repaint();
    }

    fn on_exit(&mut self, gl: Option<&glow::Context>) {
        if let Some(gl) = gl {
            self.shader_renderer.lock().destroy(gl);
        }
    }
}
