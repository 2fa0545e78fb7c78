//! Offscreen color targets and the shared depth buffer.

use crate::frame::Resolution;

fn extent(size: Resolution) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width: size.width,
        height: size.height,
        depth_or_array_layers: 1,
    }
}

/// True when targets of size `current` cannot serve a frame of `requested`.
/// Anything sized to the output is rebuilt at exactly `requested`.
pub fn needs_rebuild(current: Option<Resolution>, requested: Resolution) -> bool {
    current != Some(requested)
}

/// Color texture a pass renders into and a later pass samples
#[derive(Debug)]
pub struct OffscreenTarget {
    #[allow(dead_code)]
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub size: Resolution,
}

impl OffscreenTarget {
    pub fn new(
        device: &wgpu::Device,
        label: &str,
        size: Resolution,
        format: wgpu::TextureFormat,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: extent(size),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            size,
        }
    }
}

#[derive(Debug)]
pub struct DepthTexture {
    #[allow(dead_code)]
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub size: Resolution,
}

impl DepthTexture {
    pub fn new(device: &wgpu::Device, size: Resolution) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: extent(size),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: dispersion_material::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            size,
        }
    }
}

/// Everything sized to the output resolution, rebuilt together on resize
pub struct FrameTargets {
    /// Scene without the dispersive mesh
    pub back: OffscreenTarget,
    /// Scene with the mesh's back faces
    pub main: OffscreenTarget,
    /// Shared by all three passes, cleared per pass
    pub depth: DepthTexture,
    /// Dispersion bind group sampling `back`
    pub sample_back: wgpu::BindGroup,
    /// Dispersion bind group sampling `main`
    pub sample_main: wgpu::BindGroup,
    pub size: Resolution,
}

impl FrameTargets {
    pub fn new(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        uniform: &wgpu::Buffer,
        sampler: &wgpu::Sampler,
        size: Resolution,
        format: wgpu::TextureFormat,
    ) -> Self {
        let back = OffscreenTarget::new(device, "back_target", size, format);
        let main = OffscreenTarget::new(device, "main_target", size, format);
        let depth = DepthTexture::new(device, size);

        let sampling = |label: &str, view: &wgpu::TextureView| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: uniform.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(sampler),
                    },
                ],
            })
        };
        let sample_back = sampling("dispersion_sample_back", &back.view);
        let sample_main = sampling("dispersion_sample_main", &main.view);

        Self {
            back,
            main,
            depth,
            sample_back,
            sample_main,
            size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rebuild_only_on_size_change() {
        let size = Resolution::new(1600, 1200);
        assert!(needs_rebuild(None, size));
        assert!(!needs_rebuild(Some(size), size));
        assert!(needs_rebuild(Some(size), Resolution::new(1600, 1201)));
        assert!(needs_rebuild(Some(Resolution::new(800, 600)), size));
    }

    #[test]
    fn test_resize_sequence_never_keeps_stale_size() {
        let mut current = None;
        for requested in [
            Resolution::new(800, 600),
            Resolution::new(800, 600),
            Resolution::new(1920, 1080),
            Resolution::new(1, 1),
        ] {
            if needs_rebuild(current, requested) {
                current = Some(requested);
            }
            assert_eq!(current, Some(requested));
        }
    }
}
