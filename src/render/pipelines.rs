//! Scene pipelines (dispersion per face side, background, stars).

use dispersion_material::{BindGroupLayouts, PipelineConfig};

use crate::frame::FaceSide;

pub struct Pipelines {
    /// Draws only back faces (front faces culled)
    pub dispersion_back_faces: wgpu::RenderPipeline,
    /// Draws only front faces (back faces culled)
    pub dispersion_front_faces: wgpu::RenderPipeline,
    pub background: wgpu::RenderPipeline,
    pub stars: wgpu::RenderPipeline,
}

impl Pipelines {
    pub fn dispersion(&self, side: FaceSide) -> &wgpu::RenderPipeline {
        match side {
            FaceSide::Back => &self.dispersion_back_faces,
            FaceSide::Front => &self.dispersion_front_faces,
        }
    }
}

/// Cull mode that leaves only `side` visible
pub fn cull_mode_for(side: FaceSide) -> wgpu::Face {
    match side {
        FaceSide::Back => wgpu::Face::Front,
        FaceSide::Front => wgpu::Face::Back,
    }
}

pub fn create_pipelines(
    device: &wgpu::Device,
    layouts: &BindGroupLayouts,
    format: wgpu::TextureFormat,
) -> Pipelines {
    let config = PipelineConfig {
        label: Some("dispersion_front_faces"),
        format,
        cull_mode: Some(cull_mode_for(FaceSide::Front)),
        depth_write: true,
        blend: false,
    };
    let dispersion_front_faces =
        dispersion_material::create_dispersion_pipeline(device, layouts, &config);

    let back_faces_config = PipelineConfig {
        label: Some("dispersion_back_faces"),
        cull_mode: Some(cull_mode_for(FaceSide::Back)),
        ..config.clone()
    };
    let dispersion_back_faces =
        dispersion_material::create_dispersion_pipeline(device, layouts, &back_faces_config);

    let background_config = PipelineConfig {
        label: Some("background_pipeline"),
        cull_mode: Some(wgpu::Face::Back),
        ..config.clone()
    };
    let background = dispersion_material::create_background_pipeline(device, layouts, &background_config);

    let stars_config = PipelineConfig {
        label: Some("stars_pipeline"),
        cull_mode: None,
        depth_write: false,
        blend: true,
        ..config
    };
    let stars = dispersion_material::create_stars_pipeline(device, layouts, &stars_config);

    Pipelines {
        dispersion_back_faces,
        dispersion_front_faces,
        background,
        stars,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cull_mode_keeps_requested_side() {
        assert_eq!(cull_mode_for(FaceSide::Back), wgpu::Face::Front);
        assert_eq!(cull_mode_for(FaceSide::Front), wgpu::Face::Back);
    }
}
