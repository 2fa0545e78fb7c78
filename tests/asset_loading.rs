//! Loading the dispersive mesh from glTF files on disk.

use std::path::{Path, PathBuf};
use std::time::Duration;

use dispersion::asset::{load_named_mesh, AssetLoader, AssetState};
use dispersion::Error;

/// Write a one-triangle glTF (node "Suzanne" -> mesh "Head") with an
/// external buffer and no normals. Returns the .gltf path.
fn write_triangle_gltf(dir: &Path) -> PathBuf {
    let mut bin = Vec::new();
    for p in [[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
        for c in p {
            bin.extend_from_slice(&c.to_le_bytes());
        }
    }
    for i in [0u16, 1, 2] {
        bin.extend_from_slice(&i.to_le_bytes());
    }
    bin.extend_from_slice(&[0, 0]);
    assert_eq!(bin.len(), 44);
    std::fs::write(dir.join("mesh.bin"), &bin).unwrap();

    let json = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [ { "nodes": [0] } ],
        "nodes": [ { "name": "Suzanne", "mesh": 0 } ],
        "meshes": [ {
            "name": "Head",
            "primitives": [ { "attributes": { "POSITION": 0 }, "indices": 1 } ]
        } ],
        "buffers": [ { "uri": "mesh.bin", "byteLength": 44 } ],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 },
            { "buffer": 0, "byteOffset": 36, "byteLength": 6, "target": 34963 }
        ],
        "accessors": [
            {
                "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
                "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]
            },
            { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }
        ]
    }"#;
    let path = dir.join("triangle.gltf");
    std::fs::write(&path, json).unwrap();
    path
}

#[test]
fn test_load_by_node_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_triangle_gltf(dir.path());

    let mesh = load_named_mesh(&path, "Suzanne").unwrap();
    assert_eq!(mesh.vertex_count(), 3);
    assert_eq!(mesh.triangle_count(), 1);
    assert_eq!(mesh.indices, vec![0, 1, 2]);

    // Normals were computed from the counter-clockwise triangle
    for n in &mesh.normals {
        assert!((n[2] - 1.0).abs() < 1e-5, "normal {:?}", n);
    }
}

#[test]
fn test_load_by_mesh_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_triangle_gltf(dir.path());
    let by_mesh = load_named_mesh(&path, "Head").unwrap();
    let by_node = load_named_mesh(&path, "Suzanne").unwrap();
    assert_eq!(by_mesh, by_node);
}

#[test]
fn test_unknown_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_triangle_gltf(dir.path());
    match load_named_mesh(&path, "Teapot") {
        Err(Error::MeshNotFound(name)) => assert_eq!(name, "Teapot"),
        other => panic!("expected MeshNotFound, got {:?}", other),
    }
}

#[test]
fn test_missing_file() {
    let result = load_named_mesh(Path::new("/definitely/not/here.glb"), "Suzanne");
    assert!(matches!(result, Err(Error::FileNotFound(_))));
}

#[test]
fn test_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.glb");
    std::fs::write(&path, b"this is not a glb file").unwrap();
    assert!(matches!(load_named_mesh(&path, "Suzanne"), Err(Error::Gltf(_))));
}

#[test]
fn test_background_loader_delivers_ready_mesh() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_triangle_gltf(dir.path());

    let mut loader = AssetLoader::spawn(path.clone(), "Suzanne");
    assert_eq!(loader.path(), path.as_path());

    let mut state = None;
    for _ in 0..1000 {
        if let Some(s) = loader.poll() {
            state = Some(s);
            break;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    match state {
        Some(AssetState::Ready(mesh)) => assert_eq!(mesh.triangle_count(), 1),
        other => panic!("expected a ready mesh, got {:?}", other),
    }
    assert_eq!(loader.poll(), None);
}
