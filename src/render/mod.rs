//! wgpu executor for frame plans
//!
//! The [`Renderer`] owns every GPU resource of the scene. Each call to
//! [`Renderer::render_frame`] plans the frame with [`plan_frame`], uploads
//! the per-frame uniforms and records all passes into one command encoder.

use std::sync::Arc;

use glam::Mat4;
use wgpu::util::DeviceExt;

mod passes;
mod pipelines;
mod targets;

pub use pipelines::cull_mode_for;
pub use targets::{needs_rebuild, DepthTexture, FrameTargets, OffscreenTarget};

use pipelines::{create_pipelines, Pipelines};

use dispersion_material::{
    BackgroundUniform, BindGroupLayouts, CameraUniform, DispersionUniform, MeshInstance,
    ModelUniform, StarInstance, Vertex,
};

use crate::frame::{plan_frame, FrameSnapshot, MaterialUniforms, PassTarget, Resolution};
use crate::scene::{GeometryId, Material, MeshData, MeshNode, NodeKind, Scene, StarField};

/// Passes recorded for one frame
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub offscreen_passes: u32,
    pub visible_passes: u32,
    pub draw_calls: u32,
}

/// GPU mesh data
pub struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    pub fn new(device: &wgpu::Device, label: &str, mesh: &MeshData) -> Self {
        let vertices = interleave(mesh);
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{}_vertices", label)),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{}_indices", label)),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        }
    }
}

fn interleave(mesh: &MeshData) -> Vec<Vertex> {
    mesh.positions
        .iter()
        .zip(&mesh.normals)
        .map(|(&position, &normal)| Vertex { position, normal })
        .collect()
}

/// Shader-side layout of the material uniforms
pub fn dispersion_uniform(u: &MaterialUniforms) -> DispersionUniform {
    let [ior_r, ior_y, ior_g, ior_c, ior_b, ior_p] = u.iors;
    DispersionUniform {
        light: u.light.extend(0.0).to_array(),
        resolution: u.resolution.to_array(),
        diffuseness: u.diffuseness,
        shininess: u.shininess,
        fresnel_power: u.fresnel_power,
        ior_r,
        ior_y,
        ior_g,
        ior_c,
        ior_b,
        ior_p,
        saturation: u.saturation,
        chromatic_aberration: u.chromatic_aberration,
        refract_power: u.refract_power,
        _pad: [0.0; 2],
    }
}

fn star_instances(field: &StarField) -> Vec<StarInstance> {
    field
        .stars
        .iter()
        .map(|s| StarInstance {
            position: s.position.to_array(),
            size: s.size,
            color: s.color.to_array(),
            _pad: 0.0,
        })
        .collect()
}

/// Instances of one built-in geometry inside the instance buffer
#[derive(Clone, Copy, Debug)]
struct InstanceBatch {
    geometry: GeometryId,
    first: u32,
    count: u32,
}

/// What the traversal reached this frame
#[derive(Default)]
struct FrameContents {
    batches: Vec<InstanceBatch>,
    mesh_world: Option<Mat4>,
    stars: bool,
}

/// Main renderer state
pub struct Renderer {
    pub device: Arc<wgpu::Device>,
    pub queue: Arc<wgpu::Queue>,
    format: wgpu::TextureFormat,
    layouts: BindGroupLayouts,
    pipelines: Pipelines,

    // Uniforms
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    model_buffer: wgpu::Buffer,
    model_bind_group: wgpu::BindGroup,
    dispersion_buffer: wgpu::Buffer,
    last_dispersion: Option<DispersionUniform>,
    background_buffer: wgpu::Buffer,
    background_bind_group: wgpu::BindGroup,
    sampler: wgpu::Sampler,

    // Geometry
    geometries: Vec<GpuMesh>,
    instance_buffer: Option<wgpu::Buffer>,
    instance_capacity: usize,
    star_buffer: Option<wgpu::Buffer>,
    star_count: u32,
    asset_mesh: Option<GpuMesh>,
    asset_generation: Option<u64>,

    // Sized to the output
    targets: Option<FrameTargets>,
}

impl Renderer {
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        format: wgpu::TextureFormat,
    ) -> Self {
        let layouts = dispersion_material::create_bind_group_layouts(&device);
        let pipelines = create_pipelines(&device, &layouts, format);

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("camera_buffer"),
            contents: bytemuck::bytes_of(&CameraUniform::new(
                Mat4::IDENTITY,
                Mat4::IDENTITY,
                glam::Vec3::ZERO,
            )),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera_bind_group"),
            layout: &layouts.camera,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let model_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("model_buffer"),
            contents: bytemuck::bytes_of(&ModelUniform::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let model_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("model_bind_group"),
            layout: &layouts.model,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: model_buffer.as_entire_binding(),
            }],
        });

        let dispersion_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("dispersion_buffer"),
            contents: bytemuck::bytes_of(&DispersionUniform::default()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let background_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("background_material_buffer"),
            contents: bytemuck::bytes_of(&BackgroundUniform::new(
                glam::Vec3::ONE,
                glam::Vec3::ONE,
                1.0,
            )),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let background_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("background_material_bind_group"),
            layout: &layouts.background,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: background_buffer.as_entire_binding(),
            }],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("backdrop_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            device,
            queue,
            format,
            layouts,
            pipelines,
            camera_buffer,
            camera_bind_group,
            model_buffer,
            model_bind_group,
            dispersion_buffer,
            last_dispersion: None,
            background_buffer,
            background_bind_group,
            sampler,
            geometries: Vec::new(),
            instance_buffer: None,
            instance_capacity: 0,
            star_buffer: None,
            star_count: 0,
            asset_mesh: None,
            asset_generation: None,
            targets: None,
        }
    }

    /// Upload whatever the scene has that the GPU does not yet: built-in
    /// geometry and stars once, the asset mesh whenever its state changes.
    pub fn prepare(&mut self, scene: &Scene) {
        if self.geometries.len() != scene.geometries().len() {
            let _span = tracing::info_span!("upload_geometry").entered();
            self.geometries = scene
                .geometries()
                .iter()
                .enumerate()
                .map(|(i, mesh)| GpuMesh::new(&self.device, &format!("geometry_{}", i), mesh))
                .collect();

            let ambient = scene.ambient_light();
            let color = scene
                .nodes()
                .iter()
                .find_map(|n| match &n.kind {
                    NodeKind::Mesh(MeshNode {
                        material: Material::Standard { color },
                        ..
                    }) => Some(*color),
                    _ => None,
                })
                .unwrap_or(glam::Vec3::ONE);
            self.queue.write_buffer(
                &self.background_buffer,
                0,
                bytemuck::bytes_of(&BackgroundUniform::new(color, ambient, 1.0)),
            );
        }

        if self.star_buffer.is_none() {
            if let Some(field) = scene.star_field().filter(|f| !f.is_empty()) {
                let stars = star_instances(field);
                self.star_buffer = Some(self.device.create_buffer_init(
                    &wgpu::util::BufferInitDescriptor {
                        label: Some("star_instances"),
                        contents: bytemuck::cast_slice(&stars),
                        usage: wgpu::BufferUsages::VERTEX,
                    },
                ));
                self.star_count = stars.len() as u32;
                tracing::debug!("Uploaded {} stars", self.star_count);
            }
        }

        if self.asset_generation != Some(scene.asset_generation()) {
            self.asset_generation = Some(scene.asset_generation());
            self.asset_mesh = scene
                .asset_state()
                .mesh()
                .map(|mesh| GpuMesh::new(&self.device, "asset_mesh", mesh));
            if self.asset_mesh.is_some() {
                tracing::info!("Uploaded dispersive mesh");
            }
        }
    }

    /// Make sure offscreen targets match `size`. Nothing is recreated when
    /// the size is unchanged.
    pub fn resize(&mut self, size: Resolution) {
        if !needs_rebuild(self.targets.as_ref().map(|t| t.size), size) {
            return;
        }
        tracing::debug!("Recreating frame targets at {}x{}", size.width, size.height);
        self.targets = Some(FrameTargets::new(
            &self.device,
            &self.layouts.dispersion,
            &self.dispersion_buffer,
            &self.sampler,
            size,
            self.format,
        ));
    }

    fn upload_instances(&mut self, scene: &Scene, elapsed: f32) -> Vec<InstanceBatch> {
        let mut instances = scene.background_instances(elapsed);
        instances.sort_by_key(|(geometry, _)| geometry.0);

        let mut batches: Vec<InstanceBatch> = Vec::new();
        for (i, (geometry, _)) in instances.iter().enumerate() {
            match batches.last_mut() {
                Some(batch) if batch.geometry == *geometry => batch.count += 1,
                _ => batches.push(InstanceBatch {
                    geometry: *geometry,
                    first: i as u32,
                    count: 1,
                }),
            }
        }

        if instances.is_empty() {
            return batches;
        }

        let data: Vec<MeshInstance> = instances
            .iter()
            .map(|(_, world)| MeshInstance::from_matrix(*world))
            .collect();
        if self.instance_buffer.is_none() || self.instance_capacity < data.len() {
            self.instance_buffer = Some(self.device.create_buffer_init(
                &wgpu::util::BufferInitDescriptor {
                    label: Some("background_instances"),
                    contents: bytemuck::cast_slice(&data),
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                },
            ));
            self.instance_capacity = data.len();
        } else if let Some(buffer) = &self.instance_buffer {
            self.queue.write_buffer(buffer, 0, bytemuck::cast_slice(&data));
        }
        batches
    }

    fn collect_contents(&mut self, scene: &Scene, elapsed: f32) -> FrameContents {
        let visited = scene.traverse(elapsed);
        let mesh_world = visited
            .iter()
            .find(|v| v.id() == scene.dispersive_mesh())
            .map(|v| v.world);
        let stars = visited.iter().any(|v| v.id() == scene.stars_node());
        FrameContents {
            batches: self.upload_instances(scene, elapsed),
            mesh_world,
            stars,
        }
    }

    /// Plan and record one displayed frame into `output`, which must be
    /// `snapshot.resolution` in size.
    pub fn render_frame(
        &mut self,
        scene: &Scene,
        snapshot: &FrameSnapshot,
        output: &wgpu::TextureView,
    ) -> FrameStats {
        let _span = tracing::info_span!("render_frame").entered();

        self.prepare(scene);
        self.resize(snapshot.resolution);
        let plan = plan_frame(scene, snapshot);

        let cam = &snapshot.camera;
        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::bytes_of(&CameraUniform::new(cam.view, cam.proj, cam.position)),
        );

        let uniform = dispersion_uniform(&plan.uniforms);
        if self.last_dispersion != Some(uniform) {
            self.queue
                .write_buffer(&self.dispersion_buffer, 0, bytemuck::bytes_of(&uniform));
            self.last_dispersion = Some(uniform);
        }

        let contents = if plan.gated {
            FrameContents::default()
        } else {
            self.collect_contents(scene, snapshot.elapsed)
        };
        if let Some(world) = contents.mesh_world {
            self.queue.write_buffer(
                &self.model_buffer,
                0,
                bytemuck::bytes_of(&ModelUniform::from_matrix(world)),
            );
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });

        let mut stats = FrameStats::default();
        for pass in &plan.passes {
            stats.draw_calls += self.record_pass(&mut encoder, pass, &plan, &contents, output);
            match pass.target {
                PassTarget::Screen => stats.visible_passes += 1,
                PassTarget::Back | PassTarget::Main => stats.offscreen_passes += 1,
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{CameraView, FrameSnapshot};
    use crate::params::DispersionParams;

    #[test]
    fn test_dispersion_uniform_layout() {
        let mut params = DispersionParams::default();
        params.ior_y = 1.9;
        params.refraction = 0.75;
        let snap = FrameSnapshot::new(&params, 0.0, Resolution::new(640, 480), CameraView::default());
        let u = dispersion_uniform(&MaterialUniforms::from_snapshot(&snap));
        assert_eq!(u.light, [-1.0, 1.0, 1.0, 0.0]);
        assert_eq!(u.resolution, [640.0, 480.0]);
        assert_eq!(u.ior_r, 1.15);
        assert_eq!(u.ior_y, 1.9);
        assert_eq!(u.ior_p, 1.22);
        assert_eq!(u.refract_power, 0.75);
        assert_eq!(u.chromatic_aberration, 0.6);
    }

    #[test]
    fn test_interleave() {
        let mesh = crate::scene::icosahedron(1.0, 0);
        let vertices = interleave(&mesh);
        assert_eq!(vertices.len(), mesh.vertex_count());
        assert_eq!(vertices[5].position, mesh.positions[5]);
        assert_eq!(vertices[5].normal, mesh.normals[5]);
    }
}
