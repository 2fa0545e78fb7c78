//! GPU-side uniform and instance layouts
//!
//! Every struct here maps 1:1 onto a WGSL struct in `shaders/`.
//! Scalars are kept as plain `f32` so the WGSL side never has to
//! reason about vec3 alignment.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Camera uniform data
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    /// Combined view-projection matrix
    pub view_proj: [[f32; 4]; 4],
    /// View matrix only
    pub view: [[f32; 4]; 4],
    /// Projection matrix only (star billboards expand in view space)
    pub proj: [[f32; 4]; 4],
    /// Camera world position
    pub position: Vec3,
    pub _pad: f32,
}

impl CameraUniform {
    pub fn new(view: Mat4, proj: Mat4, position: Vec3) -> Self {
        Self {
            view_proj: (proj * view).to_cols_array_2d(),
            view: view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            position,
            _pad: 0.0,
        }
    }
}

/// Model transform uniform
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct ModelUniform {
    /// Model matrix (world transform)
    pub model: [[f32; 4]; 4],
    /// Normal matrix (inverse transpose of model)
    pub normal_matrix: [[f32; 4]; 4],
}

impl ModelUniform {
    pub fn from_matrix(model: Mat4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            normal_matrix: model.inverse().transpose().to_cols_array_2d(),
        }
    }
}

impl Default for ModelUniform {
    fn default() -> Self {
        Self::from_matrix(Mat4::IDENTITY)
    }
}

/// Optical parameters consumed by `dispersion.wgsl`.
///
/// `resolution` is the render target size in physical pixels; the fragment
/// shader divides the fragment position by it to find the screen-space UV
/// of the backdrop texel behind the surface.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct DispersionUniform {
    /// Light vector (xyz), w unused
    pub light: [f32; 4],
    pub resolution: [f32; 2],
    pub diffuseness: f32,
    pub shininess: f32,
    pub fresnel_power: f32,
    pub ior_r: f32,
    pub ior_y: f32,
    pub ior_g: f32,
    pub ior_c: f32,
    pub ior_b: f32,
    pub ior_p: f32,
    pub saturation: f32,
    pub chromatic_aberration: f32,
    pub refract_power: f32,
    pub _pad: [f32; 2],
}

impl Default for DispersionUniform {
    fn default() -> Self {
        Self {
            light: [-1.0, 1.0, 1.0, 0.0],
            resolution: [1.0, 1.0],
            diffuseness: 0.2,
            shininess: 40.0,
            fresnel_power: 8.0,
            ior_r: 1.0,
            ior_y: 1.0,
            ior_g: 1.0,
            ior_c: 1.0,
            ior_b: 1.0,
            ior_p: 1.0,
            saturation: 0.0,
            chromatic_aberration: 1.0,
            refract_power: 0.2,
            _pad: [0.0; 2],
        }
    }
}

/// Ambient-lit standard material for the background meshes
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct BackgroundUniform {
    /// Base color (rgb), a unused
    pub color: [f32; 4],
    /// Ambient light color premultiplied by intensity (rgb), a unused
    pub ambient: [f32; 4],
}

impl BackgroundUniform {
    pub fn new(color: Vec3, ambient_color: Vec3, ambient_intensity: f32) -> Self {
        Self {
            color: color.extend(1.0).to_array(),
            ambient: (ambient_color * ambient_intensity).extend(1.0).to_array(),
        }
    }
}

/// Per-instance world matrix for the background icosahedra.
///
/// WGSL `mat4x4` is assembled from columns, so the columns are uploaded.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct MeshInstance {
    pub model_0: [f32; 4],
    pub model_1: [f32; 4],
    pub model_2: [f32; 4],
    pub model_3: [f32; 4],
}

impl MeshInstance {
    pub fn from_matrix(model: Mat4) -> Self {
        Self {
            model_0: model.col(0).to_array(),
            model_1: model.col(1).to_array(),
            model_2: model.col(2).to_array(),
            model_3: model.col(3).to_array(),
        }
    }

    /// Instance buffer layout (locations 2..=5, after the mesh vertex)
    pub fn buffer_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: 16,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: 32,
                    shader_location: 4,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: 48,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// One star billboard
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct StarInstance {
    pub position: [f32; 3],
    /// Billboard half-extent factor
    pub size: f32,
    pub color: [f32; 3],
    pub _pad: f32,
}

impl StarInstance {
    pub fn buffer_layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<StarInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                // position
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // size
                wgpu::VertexAttribute {
                    offset: 12,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32,
                },
                // color
                wgpu::VertexAttribute {
                    offset: 16,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_sizes_match_wgsl() {
        // WGSL struct sizes are rounded up to 16-byte alignment
        assert_eq!(std::mem::size_of::<CameraUniform>(), 208);
        assert_eq!(std::mem::size_of::<ModelUniform>(), 128);
        assert_eq!(std::mem::size_of::<DispersionUniform>(), 80);
        assert_eq!(std::mem::size_of::<BackgroundUniform>(), 32);
        assert_eq!(std::mem::size_of::<MeshInstance>(), 64);
        assert_eq!(std::mem::size_of::<StarInstance>(), 32);
    }

    #[test]
    fn test_mesh_instance_columns() {
        let m = Mat4::from_translation(Vec3::new(2.5, -5.0, -4.0));
        let inst = MeshInstance::from_matrix(m);
        assert_eq!(inst.model_3, [2.5, -5.0, -4.0, 1.0]);
        assert_eq!(inst.model_0, [1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_background_ambient_premultiplied() {
        let u = BackgroundUniform::new(Vec3::ONE, Vec3::ONE, 5.0);
        assert_eq!(u.ambient, [5.0, 5.0, 5.0, 1.0]);
    }
}
