//! Minimal glTF 2.0 geometry extraction.
//!
//! Parses just enough of the format to pull triangle meshes out of a
//! `.glb` (binary container) or `.gltf` (JSON with embedded data URIs)
//! payload: node hierarchy, accessors, and buffer views. Materials,
//! animations, skins, and textures are ignored; the viewer renders with
//! its own material.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use bevy::prelude::*;
use serde::Deserialize;
use thiserror::Error;

const GLB_MAGIC: u32 = 0x4654_6C67;
const CHUNK_JSON: u32 = 0x4E4F_534A;
const CHUNK_BIN: u32 = 0x004E_4942;

const COMPONENT_U8: u32 = 5121;
const COMPONENT_U16: u32 = 5123;
const COMPONENT_U32: u32 = 5125;
const COMPONENT_F32: u32 = 5126;

/// Triangle-list primitives. glTF only. Primitive modes other than
/// triangles (points, lines, strips) are skipped.
const MODE_TRIANGLES: u32 = 4;

#[derive(Debug, Error)]
pub enum GltfError {
    #[error("binary container is truncated")]
    TruncatedGlb,
    #[error("not a glb container (bad magic)")]
    BadMagic,
    #[error("malformed scene JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("buffer references an external file, which share payloads cannot carry")]
    ExternalBuffer,
    #[error("malformed embedded buffer data")]
    BadDataUri,
    #[error("accessor {0} is out of range or inconsistent")]
    BadAccessor(usize),
    #[error("unsupported accessor component type {0}")]
    UnsupportedComponent(u32),
}

/// One renderable primitive with its node transform baked into the
/// positions (pre-normalization model space).
#[derive(Debug, Clone)]
pub struct ParsedPrimitive {
    pub positions: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl ParsedPrimitive {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Parse a binary `.glb` payload.
pub fn parse_glb(bytes: &[u8]) -> Result<Vec<ParsedPrimitive>, GltfError> {
    let (json, bin) = split_glb(bytes)?;
    let root: GltfRoot = serde_json::from_slice(json)?;
    extract_primitives(&root, bin)
}

/// Parse a text `.gltf` payload. Buffers must be embedded as data URIs;
/// sidecar `.bin` files cannot travel through a share link.
pub fn parse_gltf_json(bytes: &[u8]) -> Result<Vec<ParsedPrimitive>, GltfError> {
    let root: GltfRoot = serde_json::from_slice(bytes)?;
    extract_primitives(&root, None)
}

fn split_glb(bytes: &[u8]) -> Result<(&[u8], Option<&[u8]>), GltfError> {
    if bytes.len() < 12 {
        return Err(GltfError::TruncatedGlb);
    }
    if read_u32(bytes, 0)? != GLB_MAGIC {
        return Err(GltfError::BadMagic);
    }

    let total_len = read_u32(bytes, 8)? as usize;
    let end = total_len.min(bytes.len());

    let mut json = None;
    let mut bin = None;
    let mut offset = 12;
    while offset + 8 <= end {
        let chunk_len = read_u32(bytes, offset)? as usize;
        let chunk_type = read_u32(bytes, offset + 4)?;
        let data_start = offset + 8;
        let data_end = data_start
            .checked_add(chunk_len)
            .ok_or(GltfError::TruncatedGlb)?;
        if data_end > end {
            return Err(GltfError::TruncatedGlb);
        }

        match chunk_type {
            CHUNK_JSON => json = Some(&bytes[data_start..data_end]),
            CHUNK_BIN => bin = Some(&bytes[data_start..data_end]),
            _ => {}
        }

        // Chunks are padded to 4-byte alignment.
        offset = data_end + (4 - chunk_len % 4) % 4;
    }

    json.map(|j| (j, bin)).ok_or(GltfError::TruncatedGlb)
}

fn read_u32(bytes: &[u8], offset: usize) -> Result<u32, GltfError> {
    let slice = bytes
        .get(offset..offset + 4)
        .ok_or(GltfError::TruncatedGlb)?;
    Ok(u32::from_le_bytes(slice.try_into().unwrap_or([0; 4])))
}

fn extract_primitives(
    root: &GltfRoot,
    glb_bin: Option<&[u8]>,
) -> Result<Vec<ParsedPrimitive>, GltfError> {
    let buffers = resolve_buffers(root, glb_bin)?;

    let mut primitives = Vec::new();
    for (node_index, transform) in flatten_nodes(root) {
        let node = &root.nodes[node_index];
        let Some(mesh_index) = node.mesh else { continue };
        let Some(mesh) = root.meshes.get(mesh_index) else { continue };

        for primitive in &mesh.primitives {
            if primitive.mode.unwrap_or(MODE_TRIANGLES) != MODE_TRIANGLES {
                continue;
            }
            let Some(position_accessor) = primitive.attributes.position else {
                continue;
            };

            let positions = read_vec3_accessor(root, &buffers, position_accessor)?
                .into_iter()
                .map(|p| transform.transform_point3(p))
                .collect::<Vec<_>>();

            let indices = match primitive.indices {
                Some(accessor) => read_index_accessor(root, &buffers, accessor)?,
                // Non-indexed: consecutive vertices form triangles.
                None => (0..positions.len() as u32).collect(),
            };
            if positions.is_empty() || indices.len() < 3 {
                continue;
            }
            if indices.iter().any(|&i| i as usize >= positions.len()) {
                return Err(GltfError::BadAccessor(position_accessor));
            }

            primitives.push(ParsedPrimitive { positions, indices });
        }
    }

    Ok(primitives)
}

/// Walk the scene graph depth-first, composing node transforms so every
/// returned node carries its model-space matrix.
fn flatten_nodes(root: &GltfRoot) -> Vec<(usize, Mat4)> {
    let roots: Vec<usize> = match root.scenes.get(root.scene.unwrap_or(0)) {
        Some(scene) => scene.nodes.clone(),
        // Some exporters omit the scene list; fall back to every node
        // that is not referenced as a child.
        None => {
            let mut is_child = vec![false; root.nodes.len()];
            for node in &root.nodes {
                for &child in &node.children {
                    if let Some(flag) = is_child.get_mut(child) {
                        *flag = true;
                    }
                }
            }
            (0..root.nodes.len()).filter(|&i| !is_child[i]).collect()
        }
    };

    let mut flattened = Vec::new();
    let mut stack: Vec<(usize, Mat4)> = roots
        .into_iter()
        .filter(|&i| i < root.nodes.len())
        .map(|i| (i, Mat4::IDENTITY))
        .collect();

    while let Some((index, parent)) = stack.pop() {
        let node = &root.nodes[index];
        let matrix = parent * node.local_matrix();
        flattened.push((index, matrix));
        for &child in &node.children {
            if child < root.nodes.len() {
                stack.push((child, matrix));
            }
        }
    }

    flattened
}

fn resolve_buffers(
    root: &GltfRoot,
    glb_bin: Option<&[u8]>,
) -> Result<Vec<Vec<u8>>, GltfError> {
    root.buffers
        .iter()
        .map(|buffer| match &buffer.uri {
            None => glb_bin
                .map(<[u8]>::to_vec)
                .ok_or(GltfError::TruncatedGlb),
            Some(uri) if uri.starts_with("data:") => {
                let encoded = uri.split_once(',').ok_or(GltfError::BadDataUri)?.1;
                BASE64.decode(encoded).map_err(|_| GltfError::BadDataUri)
            }
            Some(_) => Err(GltfError::ExternalBuffer),
        })
        .collect()
}

struct AccessorView<'a> {
    data: &'a [u8],
    offset: usize,
    stride: usize,
    count: usize,
}

fn accessor_view<'a>(
    root: &'a GltfRoot,
    buffers: &'a [Vec<u8>],
    index: usize,
    element_size: usize,
) -> Result<(&'a GltfAccessorData, AccessorView<'a>), GltfError> {
    let accessor = root
        .accessors
        .get(index)
        .ok_or(GltfError::BadAccessor(index))?;
    let view = root
        .buffer_views
        .get(accessor.buffer_view.ok_or(GltfError::BadAccessor(index))?)
        .ok_or(GltfError::BadAccessor(index))?;
    let data = buffers
        .get(view.buffer)
        .ok_or(GltfError::BadAccessor(index))?;

    // Offsets, strides, and counts come straight from untrusted JSON;
    // any overflow here means the accessor cannot fit its buffer.
    let offset = view
        .byte_offset
        .unwrap_or(0)
        .checked_add(accessor.byte_offset.unwrap_or(0))
        .ok_or(GltfError::BadAccessor(index))?;
    let stride = view.byte_stride.unwrap_or(element_size);
    let last = accessor
        .count
        .saturating_sub(1)
        .checked_mul(stride)
        .and_then(|span| span.checked_add(offset))
        .and_then(|end| end.checked_add(element_size))
        .ok_or(GltfError::BadAccessor(index))?;
    if accessor.count > 0 && last > data.len() {
        return Err(GltfError::BadAccessor(index));
    }

    Ok((
        accessor,
        AccessorView { data, offset, stride, count: accessor.count },
    ))
}

fn read_vec3_accessor(
    root: &GltfRoot,
    buffers: &[Vec<u8>],
    index: usize,
) -> Result<Vec<Vec3>, GltfError> {
    let (accessor, view) = accessor_view(root, buffers, index, 12)?;
    if accessor.component_type != COMPONENT_F32 || accessor.accessor_type != "VEC3" {
        return Err(GltfError::UnsupportedComponent(accessor.component_type));
    }

    let mut values = Vec::with_capacity(view.count);
    for i in 0..view.count {
        let base = view.offset + i * view.stride;
        let component = |c: usize| {
            let start = base + c * 4;
            f32::from_le_bytes(view.data[start..start + 4].try_into().unwrap_or([0; 4]))
        };
        values.push(Vec3::new(component(0), component(1), component(2)));
    }
    Ok(values)
}

fn read_index_accessor(
    root: &GltfRoot,
    buffers: &[Vec<u8>],
    index: usize,
) -> Result<Vec<u32>, GltfError> {
    let element_size = {
        let accessor = root
            .accessors
            .get(index)
            .ok_or(GltfError::BadAccessor(index))?;
        match accessor.component_type {
            COMPONENT_U8 => 1,
            COMPONENT_U16 => 2,
            COMPONENT_U32 => 4,
            other => return Err(GltfError::UnsupportedComponent(other)),
        }
    };
    let (accessor, view) = accessor_view(root, buffers, index, element_size)?;

    let mut indices = Vec::with_capacity(view.count);
    for i in 0..view.count {
        let base = view.offset + i * view.stride;
        let value = match accessor.component_type {
            COMPONENT_U8 => u32::from(view.data[base]),
            COMPONENT_U16 => u32::from(u16::from_le_bytes(
                view.data[base..base + 2].try_into().unwrap_or([0; 2]),
            )),
            _ => u32::from_le_bytes(
                view.data[base..base + 4].try_into().unwrap_or([0; 4]),
            ),
        };
        indices.push(value);
    }
    Ok(indices)
}

#[derive(Debug, Default, Deserialize)]
struct GltfRoot {
    #[serde(default)]
    scene: Option<usize>,
    #[serde(default)]
    scenes: Vec<GltfScene>,
    #[serde(default)]
    nodes: Vec<GltfNode>,
    #[serde(default)]
    meshes: Vec<GltfMesh>,
    #[serde(default)]
    accessors: Vec<GltfAccessorData>,
    #[serde(default, rename = "bufferViews")]
    buffer_views: Vec<GltfBufferView>,
    #[serde(default)]
    buffers: Vec<GltfBuffer>,
}

#[derive(Debug, Deserialize)]
struct GltfScene {
    #[serde(default)]
    nodes: Vec<usize>,
}

#[derive(Debug, Deserialize)]
struct GltfNode {
    #[serde(default)]
    mesh: Option<usize>,
    #[serde(default)]
    children: Vec<usize>,
    #[serde(default)]
    matrix: Option<[f32; 16]>,
    #[serde(default)]
    translation: Option<[f32; 3]>,
    #[serde(default)]
    rotation: Option<[f32; 4]>,
    #[serde(default)]
    scale: Option<[f32; 3]>,
}

impl GltfNode {
    fn local_matrix(&self) -> Mat4 {
        if let Some(matrix) = self.matrix {
            return Mat4::from_cols_array(&matrix);
        }
        let translation = Vec3::from_array(self.translation.unwrap_or([0.0; 3]));
        let rotation = Quat::from_array(self.rotation.unwrap_or([0.0, 0.0, 0.0, 1.0]));
        let scale = Vec3::from_array(self.scale.unwrap_or([1.0; 3]));
        Mat4::from_scale_rotation_translation(scale, rotation, translation)
    }
}

#[derive(Debug, Deserialize)]
struct GltfMesh {
    #[serde(default)]
    primitives: Vec<GltfPrimitive>,
}

#[derive(Debug, Deserialize)]
struct GltfPrimitive {
    attributes: GltfAttributes,
    #[serde(default)]
    indices: Option<usize>,
    #[serde(default)]
    mode: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GltfAttributes {
    #[serde(default, rename = "POSITION")]
    position: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct GltfAccessorData {
    #[serde(default, rename = "bufferView")]
    buffer_view: Option<usize>,
    #[serde(default, rename = "byteOffset")]
    byte_offset: Option<usize>,
    #[serde(rename = "componentType")]
    component_type: u32,
    count: usize,
    #[serde(rename = "type")]
    accessor_type: String,
}

#[derive(Debug, Deserialize)]
struct GltfBufferView {
    #[serde(default)]
    buffer: usize,
    #[serde(default, rename = "byteOffset")]
    byte_offset: Option<usize>,
    #[serde(default, rename = "byteStride")]
    byte_stride: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct GltfBuffer {
    #[serde(default)]
    uri: Option<String>,
}
