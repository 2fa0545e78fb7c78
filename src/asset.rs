//! Background loading of the dispersive mesh.
//!
//! The glTF import runs on its own thread; the UI thread polls for the
//! single result every frame and feeds it into [`crate::scene::Scene`].

use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, error, info, warn};

use crate::scene::{compute_vertex_normals, MeshData};
use crate::util::{Error, Result};

/// Node (or mesh) name looked up in the model file
pub const DEFAULT_MESH_NAME: &str = "Suzanne";

/// Default model path, relative to the working directory
pub const DEFAULT_MODEL_PATH: &str = "assets/models/suzanne.glb";

/// Load state of the external mesh
#[derive(Clone, Debug, PartialEq)]
pub enum AssetState {
    Loading,
    Ready(Arc<MeshData>),
    Failed(String),
}

impl AssetState {
    pub fn is_ready(&self) -> bool {
        matches!(self, AssetState::Ready(_))
    }

    pub fn mesh(&self) -> Option<&Arc<MeshData>> {
        match self {
            AssetState::Ready(mesh) => Some(mesh),
            _ => None,
        }
    }

    /// Short status line for the UI
    pub fn status(&self) -> String {
        match self {
            AssetState::Loading => "Loading model...".to_string(),
            AssetState::Ready(mesh) => format!(
                "{} verts, {} tris",
                mesh.vertex_count(),
                mesh.triangle_count()
            ),
            AssetState::Failed(msg) => format!("Load failed: {}", msg),
        }
    }
}

impl From<Result<MeshData>> for AssetState {
    fn from(result: Result<MeshData>) -> Self {
        match result {
            Ok(mesh) => AssetState::Ready(Arc::new(mesh)),
            Err(e) => AssetState::Failed(e.to_string()),
        }
    }
}

/// Import `path` and return the geometry of the node or mesh called `name`.
///
/// Node names are searched first, then mesh names. All triangle primitives
/// of the mesh are merged; the node's own transform is ignored. Missing
/// normals are computed and missing indices are generated sequentially.
pub fn load_named_mesh(path: &Path, name: &str) -> Result<MeshData> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let (document, buffers, _images) = gltf::import(path)?;

    let mesh = document
        .nodes()
        .find(|n| n.name() == Some(name))
        .and_then(|n| n.mesh())
        .or_else(|| document.meshes().find(|m| m.name() == Some(name)))
        .ok_or_else(|| Error::MeshNotFound(name.to_string()))?;

    let mut out = MeshData::default();
    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            warn!("Skipping {:?} primitive of '{}'", primitive.mode(), name);
            continue;
        }

        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| d.0.as_slice()));

        let positions: Vec<[f32; 3]> = reader
            .read_positions()
            .ok_or_else(|| Error::MissingPositions(name.to_string()))?
            .collect();

        let indices: Vec<u32> = reader
            .read_indices()
            .map(|iter| iter.into_u32().collect())
            .unwrap_or_else(|| (0..positions.len() as u32).collect());

        let normals: Vec<[f32; 3]> = match reader.read_normals() {
            Some(iter) => iter.collect(),
            None => {
                debug!("'{}' primitive {} has no normals, computing", name, primitive.index());
                compute_vertex_normals(&positions, &indices)?
            }
        };

        let base = out.positions.len() as u32;
        out.positions.extend(positions);
        out.normals.extend(normals);
        out.indices.extend(indices.into_iter().map(|i| i + base));
    }

    if out.positions.is_empty() {
        return Err(Error::MissingPositions(name.to_string()));
    }
    out.validate()?;
    Ok(out)
}

/// Handle to a model load running on a background thread.
pub struct AssetLoader {
    path: PathBuf,
    rx: Receiver<AssetState>,
    handle: Option<JoinHandle<()>>,
}

impl AssetLoader {
    /// Start loading `mesh_name` from `path`.
    pub fn spawn(path: impl Into<PathBuf>, mesh_name: impl Into<String>) -> Self {
        let path = path.into();
        let mesh_name = mesh_name.into();
        let (tx, rx) = channel();

        let thread_path = path.clone();
        let handle = thread::spawn(move || {
            info!("Loading '{}' from {}", mesh_name, thread_path.display());
            let state = AssetState::from(load_named_mesh(&thread_path, &mesh_name));
            match &state {
                AssetState::Ready(mesh) => info!(
                    "Loaded '{}': {} verts, {} tris",
                    mesh_name,
                    mesh.vertex_count(),
                    mesh.triangle_count()
                ),
                AssetState::Failed(msg) => error!("Failed to load {}: {}", thread_path.display(), msg),
                AssetState::Loading => {}
            }
            // Receiver gone means the app moved on
            let _ = tx.send(state);
        });

        Self {
            path,
            rx,
            handle: Some(handle),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Non-blocking check for the load result. Yields at most one state.
    pub fn poll(&mut self) -> Option<AssetState> {
        self.handle.as_ref()?;
        let state = match self.rx.try_recv() {
            Ok(state) => state,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => {
                AssetState::Failed("loader thread exited without a result".to_string())
            }
        };
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        Some(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file() {
        let err = load_named_mesh(Path::new("/nonexistent/suzanne.glb"), "Suzanne").unwrap_err();
        assert!(matches!(err, Error::FileNotFound(_)));
    }

    #[test]
    fn test_state_from_result() {
        let failed = AssetState::from(Err(Error::MeshNotFound("Suzanne".into())));
        assert!(matches!(failed, AssetState::Failed(ref m) if m.contains("Suzanne")));
        assert!(!failed.is_ready());

        let ready = AssetState::from(Ok(MeshData::default()));
        assert!(ready.is_ready());
        assert!(ready.mesh().is_some());
    }

    #[test]
    fn test_loader_reports_failure_once() {
        let mut loader = AssetLoader::spawn("/nonexistent/suzanne.glb", DEFAULT_MESH_NAME);
        let state = loop {
            if let Some(state) = loader.poll() {
                break state;
            }
            thread::sleep(std::time::Duration::from_millis(5));
        };
        assert!(matches!(state, AssetState::Failed(_)));
        assert_eq!(loader.poll(), None);
    }
}
