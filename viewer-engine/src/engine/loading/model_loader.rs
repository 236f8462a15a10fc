use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use std::path::Path;
use thiserror::Error;

use super::gltf::{GltfError, ParsedPrimitive, parse_glb, parse_gltf_json};
use crate::engine::assets::model::{
    CurrentModel, LoadedModel, ModelFormat, ModelSource,
};
use crate::engine::assets::share_link::{ShareLinkError, decode_share_link};
use crate::engine::systems::hud::StatusLine;
use crate::geometry::normalize::{Aabb, NormalizeError, normalize_bounds};
use crate::geometry::raycast::PickMesh;
use crate::tools::measure::{MeasureMarker, MeasureTool};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported file type: {name} (expected .glb or .gltf)")]
    UnsupportedFileType { name: String },
    #[error("could not read {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: GltfError,
    },
    #[error(transparent)]
    EmptyGeometry(#[from] NormalizeError),
    #[error(transparent)]
    ShareLink(#[from] ShareLinkError),
}

/// A model payload ready for parsing and installation.
#[derive(Event, Debug)]
pub struct LoadModelRequest {
    pub source: ModelSource,
}

/// Root entity of the displayed model; carries the normalization transform.
#[derive(Component)]
pub struct ModelRoot;

/// Gate a file path on its extension and read it.
pub fn source_from_path(path: &Path) -> Result<ModelSource, LoadError> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let format = ModelFormat::from_file_name(&name)
        .ok_or_else(|| LoadError::UnsupportedFileType { name: name.clone() })?;
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        name: name.clone(),
        source,
    })?;
    Ok(ModelSource { name, format, bytes })
}

/// Accept a model path or share link from the command line at startup.
pub fn queue_startup_model(
    mut requests: EventWriter<LoadModelRequest>,
    mut status: ResMut<StatusLine>,
) {
    let Some(arg) = std::env::args().nth(1) else {
        return;
    };

    let result = if arg.contains("model=") {
        decode_share_link(&arg).map_err(LoadError::from)
    } else {
        source_from_path(Path::new(&arg))
    };

    match result {
        Ok(source) => {
            requests.write(LoadModelRequest { source });
        }
        Err(err) => {
            warn!("Startup load rejected: {err}");
            status.set(format!("Load failed: {err}"));
        }
    }
}

/// Native drag-and-drop intake, gated on the file extension before any
/// bytes are read.
pub fn handle_dropped_files(
    mut drop_events: EventReader<FileDragAndDrop>,
    mut requests: EventWriter<LoadModelRequest>,
    mut status: ResMut<StatusLine>,
) {
    for event in drop_events.read() {
        let FileDragAndDrop::DroppedFile { path_buf, .. } = event else {
            continue;
        };
        match source_from_path(path_buf) {
            Ok(source) => {
                requests.write(LoadModelRequest { source });
            }
            Err(err) => {
                warn!("Dropped file rejected: {err}");
                status.set(format!("Load failed: {err}"));
            }
        }
    }
}

/// Parse, normalize, and install requested models. Replacing the model
/// and invalidating the measurement session happen in the same pass so
/// no system ever observes stale pick geometry.
pub fn handle_load_requests(
    mut commands: Commands,
    mut requests: EventReader<LoadModelRequest>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut current_model: ResMut<CurrentModel>,
    mut measure_tool: ResMut<MeasureTool>,
    markers: Query<Entity, With<MeasureMarker>>,
    mut status: ResMut<StatusLine>,
) {
    for request in requests.read() {
        match install_model(
            &request.source,
            &mut commands,
            &mut meshes,
            &mut materials,
        ) {
            Ok(model) => {
                let triangle_count = model.pick_mesh.triangles.len();
                info!(
                    "Loaded {} ({} triangles, scale factor {:.3})",
                    model.name, triangle_count, model.scale_factor
                );
                status.set(format!("Loaded {} — {triangle_count} triangles", model.name));

                // Stale measurements must not outlive the geometry they
                // were picked on.
                measure_tool.clear_all();
                for entity in &markers {
                    commands.entity(entity).despawn();
                }
                if let Some(previous) = current_model.replace(model) {
                    commands.entity(previous.root).despawn();
                }
            }
            Err(err) => {
                warn!("Load failed: {err}");
                status.set(format!("Load failed: {err}"));
            }
        }
    }
}

fn install_model(
    source: &ModelSource,
    commands: &mut Commands,
    meshes: &mut ResMut<Assets<Mesh>>,
    materials: &mut ResMut<Assets<StandardMaterial>>,
) -> Result<LoadedModel, LoadError> {
    let primitives = match source.format {
        ModelFormat::Glb => parse_glb(&source.bytes),
        ModelFormat::Gltf => parse_gltf_json(&source.bytes),
    }
    .map_err(|parse_error| LoadError::Parse {
        name: source.name.clone(),
        source: parse_error,
    })?;

    let bounds = Aabb::from_points(
        primitives
            .iter()
            .flat_map(|primitive| primitive.positions.iter().copied()),
    )
    .ok_or(NormalizeError::EmptyGeometry)?;
    let normalization = normalize_bounds(&bounds)?;

    let mut pick_mesh = PickMesh::default();
    for primitive in &primitives {
        for triangle in primitive.indices.chunks_exact(3) {
            pick_mesh.triangles.push([
                normalization.apply(primitive.positions[triangle[0] as usize]),
                normalization.apply(primitive.positions[triangle[1] as usize]),
                normalization.apply(primitive.positions[triangle[2] as usize]),
            ]);
        }
    }

    let material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.72, 0.72, 0.76),
        perceptual_roughness: 0.6,
        metallic: 0.1,
        // Arbitrary uploads mix winding orders; render both faces.
        double_sided: true,
        cull_mode: None,
        ..default()
    });

    let root = commands
        .spawn((normalization.to_transform(), Visibility::default(), ModelRoot))
        .with_children(|parent| {
            for primitive in &primitives {
                parent.spawn((
                    Mesh3d(meshes.add(build_render_mesh(primitive))),
                    MeshMaterial3d(material.clone()),
                ));
            }
        })
        .id();

    Ok(LoadedModel {
        name: source.name.clone(),
        format: source.format,
        bytes: source.bytes.clone(),
        scale_factor: normalization.scale_factor,
        original_size: normalization.original_size,
        root,
        pick_mesh,
    })
}

fn build_render_mesh(primitive: &ParsedPrimitive) -> Mesh {
    let positions: Vec<[f32; 3]> = primitive.positions.iter().map(|p| p.to_array()).collect();
    let mut mesh = Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::default(),
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_indices(Indices::U32(primitive.indices.clone()));
    mesh.compute_smooth_normals();
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_intake_gates_on_extension() {
        let err = source_from_path(Path::new("/tmp/model.stl")).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFileType { .. }));

        // Right extension, missing file: the error is I/O, not format.
        let err = source_from_path(Path::new("/nonexistent/model.glb")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn load_errors_render_user_facing_messages() {
        let err = LoadError::UnsupportedFileType { name: "scan.obj".into() };
        assert_eq!(
            err.to_string(),
            "unsupported file type: scan.obj (expected .glb or .gltf)"
        );

        let err = LoadError::from(NormalizeError::EmptyGeometry);
        assert_eq!(err.to_string(), "model contains no renderable geometry");
    }
}
