//! Refraction and chromatic dispersion material for wgpu
//!
//! WGSL shaders plus the uniform layouts and pipeline factories that go
//! with them. The dispersion pipeline samples a previously rendered
//! backdrop texture, so it is always used together with an offscreen
//! render target owned by the caller.
//!
//! ## Usage
//!
//! ```ignore
//! use dispersion_material::{create_bind_group_layouts, create_dispersion_pipeline, PipelineConfig};
//!
//! let layouts = create_bind_group_layouts(&device);
//! let back_faces = create_dispersion_pipeline(&device, &layouts, &PipelineConfig {
//!     label: Some("dispersion_back_faces"),
//!     format,
//!     cull_mode: Some(wgpu::Face::Front),
//!     ..Default::default()
//! });
//! ```

mod params;

pub use params::{
    BackgroundUniform, CameraUniform, DispersionUniform, MeshInstance, ModelUniform, StarInstance,
};

/// Dispersion shader source
pub const DISPERSION_SHADER_SOURCE: &str = include_str!("shaders/dispersion.wgsl");

/// Ambient-lit background mesh shader source
pub const BACKGROUND_SHADER_SOURCE: &str = include_str!("shaders/background.wgsl");

/// Star billboard shader source
pub const STARS_SHADER_SOURCE: &str = include_str!("shaders/stars.wgsl");

/// Depth format shared by every pipeline in this crate
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Standard vertex format
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Vertex buffer layout for standard mesh
pub fn vertex_buffer_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            // normal
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
        ],
    }
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

/// Create bind group layouts shared by all pipelines
pub fn create_bind_group_layouts(device: &wgpu::Device) -> BindGroupLayouts {
    let camera_uniform_size = std::num::NonZeroU64::new(std::mem::size_of::<CameraUniform>() as u64);

    // Group 0: Camera
    let camera = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("dispersion_camera"),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: camera_uniform_size,
            },
            count: None,
        }],
    });

    // Group 1: Model transform
    let model = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("dispersion_model"),
        entries: &[uniform_entry(0, wgpu::ShaderStages::VERTEX)],
    });

    // Group 2: Optical params + backdrop texture
    let dispersion = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("dispersion_params"),
        entries: &[
            uniform_entry(0, wgpu::ShaderStages::FRAGMENT),
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    });

    // Background material (group 1 of the background pipeline)
    let background = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("background_material"),
        entries: &[uniform_entry(0, wgpu::ShaderStages::FRAGMENT)],
    });

    BindGroupLayouts {
        camera,
        model,
        dispersion,
        background,
    }
}

/// Bind group layouts for the scene pipelines
pub struct BindGroupLayouts {
    /// Group 0 everywhere: camera uniform
    pub camera: wgpu::BindGroupLayout,
    /// Dispersion group 1: model transform
    pub model: wgpu::BindGroupLayout,
    /// Dispersion group 2: optical params, backdrop texture, sampler
    pub dispersion: wgpu::BindGroupLayout,
    /// Background group 1: material uniform
    pub background: wgpu::BindGroupLayout,
}

/// Pipeline configuration
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Debug label for the pipeline
    pub label: Option<&'static str>,
    /// Color target format
    pub format: wgpu::TextureFormat,
    /// Cull mode. The dispersion material renders back faces only with
    /// `Some(Face::Front)` and front faces only with `Some(Face::Back)`.
    pub cull_mode: Option<wgpu::Face>,
    /// Write to depth buffer
    pub depth_write: bool,
    /// Enable alpha blending
    pub blend: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            label: None,
            format: wgpu::TextureFormat::Bgra8Unorm,
            cull_mode: Some(wgpu::Face::Back),
            depth_write: true,
            blend: false,
        }
    }
}

fn color_target(config: &PipelineConfig) -> [Option<wgpu::ColorTargetState>; 1] {
    [Some(wgpu::ColorTargetState {
        format: config.format,
        blend: if config.blend {
            Some(wgpu::BlendState::ALPHA_BLENDING)
        } else {
            Some(wgpu::BlendState::REPLACE)
        },
        write_mask: wgpu::ColorWrites::ALL,
    })]
}

fn depth_state(config: &PipelineConfig) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: config.depth_write,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}

fn primitive_state(cull_mode: Option<wgpu::Face>) -> wgpu::PrimitiveState {
    wgpu::PrimitiveState {
        topology: wgpu::PrimitiveTopology::TriangleList,
        strip_index_format: None,
        front_face: wgpu::FrontFace::Ccw,
        cull_mode,
        polygon_mode: wgpu::PolygonMode::Fill,
        unclipped_depth: false,
        conservative: false,
    }
}

/// Create the dispersion pipeline for one face side
pub fn create_dispersion_pipeline(
    device: &wgpu::Device,
    layouts: &BindGroupLayouts,
    config: &PipelineConfig,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("dispersion_shader"),
        source: wgpu::ShaderSource::Wgsl(DISPERSION_SHADER_SOURCE.into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("dispersion_pipeline_layout"),
        bind_group_layouts: &[&layouts.camera, &layouts.model, &layouts.dispersion],
        push_constant_ranges: &[],
    });

    let targets = color_target(config);
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: config.label.or(Some("dispersion_pipeline")),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[vertex_buffer_layout()],
        },
        primitive: primitive_state(config.cull_mode),
        depth_stencil: Some(depth_state(config)),
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &targets,
        }),
        multiview: None,
        cache: None,
    })
}

/// Create the instanced background mesh pipeline
pub fn create_background_pipeline(
    device: &wgpu::Device,
    layouts: &BindGroupLayouts,
    config: &PipelineConfig,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("background_shader"),
        source: wgpu::ShaderSource::Wgsl(BACKGROUND_SHADER_SOURCE.into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("background_pipeline_layout"),
        bind_group_layouts: &[&layouts.camera, &layouts.background],
        push_constant_ranges: &[],
    });

    let targets = color_target(config);
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: config.label.or(Some("background_pipeline")),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[vertex_buffer_layout(), MeshInstance::buffer_layout()],
        },
        primitive: primitive_state(config.cull_mode),
        depth_stencil: Some(depth_state(config)),
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &targets,
        }),
        multiview: None,
        cache: None,
    })
}

/// Create the star billboard pipeline (6 vertices per instance, no vertex buffer)
pub fn create_stars_pipeline(
    device: &wgpu::Device,
    layouts: &BindGroupLayouts,
    config: &PipelineConfig,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("stars_shader"),
        source: wgpu::ShaderSource::Wgsl(STARS_SHADER_SOURCE.into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("stars_pipeline_layout"),
        bind_group_layouts: &[&layouts.camera],
        push_constant_ranges: &[],
    });

    let targets = color_target(config);
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: config.label.or(Some("stars_pipeline")),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            compilation_options: Default::default(),
            buffers: &[StarInstance::buffer_layout()],
        },
        primitive: primitive_state(None),
        depth_stencil: Some(depth_state(config)),
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            compilation_options: Default::default(),
            targets: &targets,
        }),
        multiview: None,
        cache: None,
    })
}
