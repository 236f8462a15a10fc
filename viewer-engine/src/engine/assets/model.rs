use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::geometry::raycast::PickMesh;

/// Supported scene file formats, detected from the file extension before
/// any bytes reach the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFormat {
    Glb,
    Gltf,
}

impl ModelFormat {
    pub fn from_file_name(name: &str) -> Option<Self> {
        let extension = Path::new(name).extension()?.to_str()?;
        match extension.to_ascii_lowercase().as_str() {
            "glb" => Some(Self::Glb),
            "gltf" => Some(Self::Gltf),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Glb => "glb",
            Self::Gltf => "gltf",
        }
    }
}

/// A named model payload on its way into the load pipeline, whether it
/// came from a file on disk or a decoded share link.
#[derive(Debug, Clone)]
pub struct ModelSource {
    pub name: String,
    pub format: ModelFormat,
    pub bytes: Vec<u8>,
}

/// The loaded and normalized model. Immutable for the session: loading a
/// new model replaces the whole value and invalidates any in-progress
/// measurement.
#[derive(Debug)]
pub struct LoadedModel {
    pub name: String,
    pub format: ModelFormat,
    /// Raw file bytes, kept so the model can be re-exported as a share link.
    pub bytes: Vec<u8>,
    /// Uniform scale applied during normalization.
    pub scale_factor: f32,
    /// Pre-normalization extents, in source units (meters).
    pub original_size: Vec3,
    /// Scene root entity carrying the normalization transform.
    pub root: Entity,
    /// Normalized-space triangles for measurement picking.
    pub pick_mesh: PickMesh,
}

/// Single owner of the viewer's model state. Systems read it through
/// [`CurrentModel::get`]; only the load pipeline replaces it.
#[derive(Resource, Default)]
pub struct CurrentModel {
    model: Option<LoadedModel>,
}

impl CurrentModel {
    pub fn get(&self) -> Option<&LoadedModel> {
        self.model.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    pub fn replace(&mut self, model: LoadedModel) -> Option<LoadedModel> {
        self.model.replace(model)
    }
}
