//! # Dispersion
//!
//! A single interactive scene: a refractive, chromatically dispersive mesh
//! floating in front of a spinning grid of icosahedra and a star field,
//! rendered with two offscreen passes and one visible pass per frame.
//!
//! ## Modules
//!
//! - [`util`] - Errors and small math helpers
//! - [`params`] - Optical parameters with defaults and panel ranges
//! - [`scene`] - Typed scene tree, composer, built-in geometry, stars
//! - [`frame`] - Per-frame snapshot and the three-pass plan
//! - [`asset`] - Background glTF loading and the asset state machine
//! - [`render`] - wgpu executor for frame plans (feature `viewer`)
//! - [`viewer`] - eframe window, parameter panel, orbit camera (feature `viewer`)
//!
//! ## Example
//!
//! ```ignore
//! use dispersion::prelude::*;
//!
//! let mut scene = compose_scene(&SceneConfig::default());
//! scene.set_asset_state(load_named_mesh("suzanne.glb".as_ref(), "Suzanne").into());
//!
//! let snapshot = FrameSnapshot::new(
//!     &DispersionParams::default(),
//!     1.5,
//!     Resolution::new(1600, 1200),
//!     CameraView::default(),
//! );
//! let plan = plan_frame(&scene, &snapshot);
//! assert_eq!(plan.passes.len(), 3);
//! ```

pub mod util;
pub mod params;
pub mod scene;
pub mod frame;
pub mod asset;

// GPU renderer and window (optional, enabled with "viewer" feature)
#[cfg(feature = "viewer")]
pub mod render;
#[cfg(feature = "viewer")]
pub mod viewer;

// Re-export commonly used types
pub use util::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::asset::{load_named_mesh, AssetLoader, AssetState};
    pub use crate::frame::{
        physical_resolution, plan_frame, CameraView, FaceSide, FramePlan, FrameSnapshot,
        PassPlan, PassTarget, Resolution,
    };
    pub use crate::params::DispersionParams;
    pub use crate::scene::{compose_scene, NodeId, Scene, SceneConfig};
    pub use crate::util::{Error, Result};
}
