//! 3D viewport widget for egui

use egui::{Response, Sense, Ui, Vec2};

use super::camera::OrbitCamera;
use crate::frame::{physical_resolution, FrameSnapshot, Resolution};
use crate::params::DispersionParams;
use crate::render::{needs_rebuild, FrameStats, Renderer};
use crate::scene::Scene;

/// 3D viewport state
pub struct Viewport {
    pub camera: OrbitCamera,
    pub renderer: Option<Renderer>,
    texture_id: Option<egui::TextureId>,
    render_texture: Option<RenderTexture>,
    /// Stats of the last rendered frame
    pub last_stats: FrameStats,
}

struct RenderTexture {
    #[allow(dead_code)]
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    size: Resolution,
}

impl Viewport {
    pub fn new(camera: OrbitCamera) -> Self {
        Self {
            camera,
            renderer: None,
            texture_id: None,
            render_texture: None,
            last_stats: FrameStats::default(),
        }
    }

    /// Initialize renderer (call once when wgpu context is available)
    pub fn init_renderer(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
    ) {
        self.renderer = Some(Renderer::new(
            std::sync::Arc::new(device.clone()),
            std::sync::Arc::new(queue.clone()),
            format,
        ));
    }

    /// Show viewport, handle input and render one frame of `scene`
    pub fn show(
        &mut self,
        ui: &mut Ui,
        wgpu_render_state: Option<&egui_wgpu::RenderState>,
        scene: &Scene,
        params: &DispersionParams,
        elapsed: f32,
    ) -> Response {
        let _span = tracing::info_span!("viewport_show").entered();
        let available = ui.available_size();
        let size = Vec2::new(available.x.max(64.0), available.y.max(64.0));

        let (rect, response) = ui.allocate_exact_size(size, Sense::click_and_drag());

        self.handle_input(ui, &response);
        self.camera.update(ui.input(|i| i.stable_dt));

        let Some(render_state) = wgpu_render_state else {
            ui.painter().rect_filled(rect, 0.0, egui::Color32::from_rgb(30, 30, 35));
            ui.painter().text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "Initializing...",
                egui::FontId::default(),
                egui::Color32::GRAY,
            );
            return response;
        };

        let resolution = physical_resolution(
            glam::Vec2::new(size.x, size.y),
            ui.ctx().pixels_per_point(),
        );
        self.ensure_render_texture(render_state, resolution);

        let camera = self.camera.view(resolution.aspect());
        let snapshot = FrameSnapshot::new(params, elapsed, resolution, camera);

        if let (Some(renderer), Some(rt)) = (&mut self.renderer, &self.render_texture) {
            self.last_stats = renderer.render_frame(scene, &snapshot, &rt.view);
        }

        if let Some(tex_id) = self.texture_id {
            ui.painter().image(
                tex_id,
                rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        }

        response
    }

    fn ensure_render_texture(&mut self, render_state: &egui_wgpu::RenderState, size: Resolution) {
        if !needs_rebuild(self.render_texture.as_ref().map(|rt| rt.size), size) {
            return;
        }

        let device = &render_state.device;
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("viewport_render_texture"),
            size: wgpu::Extent3d {
                width: size.width,
                height: size.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: render_state.target_format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let tex_id = render_state.renderer.write().register_native_texture(
            device,
            &view,
            wgpu::FilterMode::Linear,
        );
        if let Some(old_id) = self.texture_id.take() {
            render_state.renderer.write().free_texture(&old_id);
        }

        self.texture_id = Some(tex_id);
        self.render_texture = Some(RenderTexture { texture, view, size });
    }

    fn handle_input(&mut self, ui: &Ui, response: &Response) {
        let (scroll, home) = ui.input(|i| (i.raw_scroll_delta.y, i.key_pressed(egui::Key::Home)));

        if response.dragged_by(egui::PointerButton::Primary) {
            let delta = response.drag_delta();
            self.camera.orbit(delta.x, delta.y);
        }

        if response.dragged_by(egui::PointerButton::Middle) {
            let delta = response.drag_delta();
            self.camera.pan(delta.x, delta.y);
        }

        if response.dragged_by(egui::PointerButton::Secondary) {
            let delta = response.drag_delta();
            self.camera.zoom(delta.y * 0.1);
        }

        if response.hovered() && scroll.abs() > 0.0 {
            self.camera.zoom(scroll * 0.1);
        }

        if response.has_focus() && home {
            self.camera.reset();
        }
    }
}
