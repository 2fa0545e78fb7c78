//! Recording of a single planned pass.

use super::{FrameContents, Renderer};
use crate::frame::{FramePlan, PassPlan, PassTarget};

impl Renderer {
    /// Record `pass` into `encoder`. Returns the number of draw calls.
    pub(super) fn record_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        pass: &PassPlan,
        plan: &FramePlan,
        contents: &FrameContents,
        output: &wgpu::TextureView,
    ) -> u32 {
        let Some(targets) = &self.targets else {
            return 0;
        };

        let (label, color_view) = match pass.target {
            PassTarget::Back => ("back_pass", &targets.back.view),
            PassTarget::Main => ("main_pass", &targets.main.view),
            PassTarget::Screen => ("screen_pass", output),
        };
        tracing::debug!(
            "{}: mesh_visible={} side={:?} input={:?}",
            label,
            pass.mesh_visible,
            pass.side,
            pass.input
        );

        let clear = plan.clear_color;
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: clear.x as f64,
                        g: clear.y as f64,
                        b: clear.z as f64,
                        a: 1.0,
                    }),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &targets.depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if plan.gated {
            return 0;
        }

        let mut draws = 0;
        rpass.set_bind_group(0, &self.camera_bind_group, &[]);

        // Icosahedron grid
        if let Some(instances) = &self.instance_buffer {
            rpass.set_pipeline(&self.pipelines.background);
            rpass.set_bind_group(1, &self.background_bind_group, &[]);
            rpass.set_vertex_buffer(1, instances.slice(..));
            for batch in &contents.batches {
                let Some(mesh) = self.geometries.get(batch.geometry.0) else {
                    continue;
                };
                rpass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                rpass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(0..mesh.index_count, 0, batch.first..batch.first + batch.count);
                draws += 1;
            }
        }

        // Dispersive mesh, sampling the pass input
        if pass.mesh_visible && contents.mesh_world.is_some() {
            let sampled = match pass.input {
                Some(PassTarget::Back) => Some(&targets.sample_back),
                Some(PassTarget::Main) => Some(&targets.sample_main),
                _ => None,
            };
            if let (Some(mesh), Some(side), Some(bind_group)) = (&self.asset_mesh, pass.side, sampled) {
                rpass.set_pipeline(self.pipelines.dispersion(side));
                rpass.set_bind_group(1, &self.model_bind_group, &[]);
                rpass.set_bind_group(2, bind_group, &[]);
                rpass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                rpass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
                draws += 1;
            }
        }

        // Stars last: blended, no depth write
        if contents.stars {
            if let Some(stars) = &self.star_buffer {
                rpass.set_pipeline(&self.pipelines.stars);
                rpass.set_vertex_buffer(0, stars.slice(..));
                rpass.draw(0..6, 0..self.star_count);
                draws += 1;
            }
        }

        draws
    }
}
