//! Main application state and UI

use std::path::PathBuf;
use std::time::Instant;

use egui::{TopBottomPanel, CentralPanel, SidePanel};

use super::camera::OrbitCamera;
use super::panel;
use super::settings::Settings;
use super::viewport::Viewport;
use crate::asset::{AssetLoader, AssetState};
use crate::params::DispersionParams;
use crate::scene::{compose_scene, Scene, SceneConfig};

/// Format FPS for display (hide decimals for whole numbers)
fn format_fps(fps: f32) -> String {
    if (fps - fps.round()).abs() < 0.001 {
        format!("{:.0}", fps)
    } else {
        format!("{:.1}", fps)
    }
}

pub struct DispersionApp {
    scene: Scene,
    params: DispersionParams,
    loader: Option<AssetLoader>,
    mesh_name: String,
    viewport: Viewport,
    initialized: bool,
    settings: Settings,
    start: Instant,
    status_message: String,
    is_fullscreen: bool,
    _trace_guard: Option<tracing_chrome::FlushGuard>,
}

impl DispersionApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        settings: Settings,
        model: PathBuf,
        mesh_name: String,
        trace_guard: Option<tracing_chrome::FlushGuard>,
    ) -> Self {
        let mut scene = compose_scene(&SceneConfig::default());
        let stars = scene.stars_node();
        scene.set_visible(stars, settings.show_stars);
        let camera = OrbitCamera::from_scene(&scene).unwrap_or_default();

        Self {
            scene,
            params: DispersionParams::default(),
            loader: Some(AssetLoader::spawn(model, mesh_name.clone())),
            mesh_name,
            viewport: Viewport::new(camera),
            initialized: false,
            settings,
            start: Instant::now(),
            status_message: "Ready".into(),
            is_fullscreen: false,
            _trace_guard: trace_guard,
        }
    }

    /// Create the renderer and restore the saved camera, once
    fn initialize(&mut self, frame: &eframe::Frame) {
        if self.initialized {
            return;
        }
        let Some(render_state) = frame.wgpu_render_state() else {
            return;
        };
        self.viewport.init_renderer(
            &render_state.device,
            &render_state.queue,
            render_state.target_format,
        );
        // Saved orbit wins over the scene camera once there is one
        if let Some(distance) = self.settings.camera_distance {
            self.viewport.camera.set_distance(distance);
        }
        if let (Some(yaw), Some(pitch)) = (self.settings.camera_yaw, self.settings.camera_pitch) {
            self.viewport.camera.set_angles(yaw, pitch);
        }

        self.initialized = true;
        self.status_message = "Viewport ready".into();
    }

    fn poll_loader(&mut self) {
        let Some(loader) = &mut self.loader else {
            return;
        };
        if let Some(state) = loader.poll() {
            if let AssetState::Ready(mesh) = &state {
                self.status_message = format!(
                    "{}: {} vertices, {} triangles",
                    loader.path().display(),
                    mesh.vertex_count(),
                    mesh.triangle_count()
                );
            }
            self.scene.set_asset_state(state);
            self.loader = None;
        }
    }

    fn load_model(&mut self, path: PathBuf) {
        tracing::info!("Opening {}", path.display());
        self.scene.set_asset_state(AssetState::Loading);
        self.loader = Some(AssetLoader::spawn(path.clone(), self.mesh_name.clone()));
        self.settings.last_model = Some(path);
        self.settings.save();
    }

    fn open_file_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("glTF", &["glb", "gltf"])
            .pick_file()
        {
            self.load_model(path);
        }
    }

    fn menu_bar(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        egui::MenuBar::new().ui(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Open...").clicked() {
                    self.open_file_dialog();
                    ui.close();
                }
                ui.separator();
                if ui.button("Exit").clicked() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            ui.menu_button("View", |ui| {
                if ui.checkbox(&mut self.settings.show_stars, "Show Stars").changed() {
                    let stars = self.scene.stars_node();
                    self.scene.set_visible(stars, self.settings.show_stars);
                    self.settings.save();
                }
                ui.separator();
                if ui.button("Reset Camera").clicked() {
                    self.viewport.camera.reset();
                    ui.close();
                }
            });

            ui.menu_button("Help", |ui| {
                if ui.button("About").clicked() {
                    self.status_message = format!(
                        "Dispersion v{} ({})",
                        env!("CARGO_PKG_VERSION"),
                        env!("DISPERSION_BUILD_DATE")
                    );
                    ui.close();
                }
            });
        });
    }

    fn status_bar(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(self.scene.asset_state().status());
            ui.separator();
            ui.label(&self.status_message);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let fps = ui.ctx().input(|i| 1.0 / i.stable_dt.max(1e-6));
                ui.label(format!("FPS: {}", format_fps(fps)));
                let stats = self.viewport.last_stats;
                ui.label(format!(
                    "passes {}+{} | draws {}",
                    stats.offscreen_passes, stats.visible_passes, stats.draw_calls
                ));
            });
        });
    }
}

impl eframe::App for DispersionApp {
    fn on_exit(&mut self) {
        self.settings.camera_distance = Some(self.viewport.camera.distance());
        let (yaw, pitch) = self.viewport.camera.angles();
        self.settings.camera_yaw = Some(yaw);
        self.settings.camera_pitch = Some(pitch);
        self.settings.save();
    }

    fn update(&mut self, ctx: &egui::Context, frame: &mut eframe::Frame) {
        let _span = tracing::info_span!("viewer_update").entered();
        self.initialize(frame);
        self.poll_loader();

        // Esc leaves fullscreen first, then quits
        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            if self.is_fullscreen {
                self.is_fullscreen = false;
                ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(false));
            } else {
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
        }
        if ctx.input(|i| i.key_pressed(egui::Key::Z)) {
            self.is_fullscreen = !self.is_fullscreen;
            ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(self.is_fullscreen));
        }
        if ctx.input(|i| i.key_pressed(egui::Key::H)) {
            self.viewport.camera.reset();
        }

        TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            self.menu_bar(ctx, ui);
        });

        TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            self.status_bar(ui);
        });

        let response = SidePanel::right("side_panel")
            .default_width(self.settings.side_panel_width)
            .min_width(200.0)
            .max_width(400.0)
            .resizable(true)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    panel::show(ui, &mut self.params);
                });
            });
        if response.response.rect.width() != self.settings.side_panel_width {
            self.settings.side_panel_width = response.response.rect.width();
        }

        let elapsed = self.start.elapsed().as_secs_f32();
        CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let render_state = frame.wgpu_render_state();
                self.viewport.show(ui, render_state, &self.scene, &self.params, elapsed);
            });

        // Track window size and position for saving on exit
        ctx.input(|i| {
            if let Some(rect) = i.viewport().inner_rect {
                self.settings.window_width = rect.width();
                self.settings.window_height = rect.height();
            }
            if let Some(pos) = i.viewport().outer_rect {
                self.settings.window_x = Some(pos.min.x);
                self.settings.window_y = Some(pos.min.y);
            }
        });

        // The background grid spins continuously
        ctx.request_repaint();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_fps() {
        assert_eq!(format_fps(60.0), "60");
        assert_eq!(format_fps(59.94), "59.9");
    }
}
