use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::model::{ModelFormat, ModelSource};

/// Page the generated link points at; the payload rides in the single
/// `model` query parameter.
const SHARE_LINK_BASE: &str = "viewer.html";
const MODEL_PARAM: &str = "model=";

#[derive(Debug, Error)]
pub enum ShareLinkError {
    #[error("link does not carry a model parameter")]
    MissingParameter,
    #[error("payload is not valid base64")]
    BadEncoding,
    #[error("payload JSON is malformed: {0}")]
    BadPayload(#[from] serde_json::Error),
    #[error("embedded model data is not valid base64")]
    BadModelData,
}

/// Wire form of an embedded model: the raw file bytes as base64 plus
/// enough metadata to route them through the load pipeline. The whole
/// JSON object is base64-encoded again into the query parameter, so the
/// link survives being pasted anywhere plain text does.
#[derive(Debug, Serialize, Deserialize)]
struct SharePayload {
    name: String,
    data: String,
    #[serde(rename = "type")]
    format: ModelFormat,
}

/// Pack a model into a shareable link. Size-unbounded and uncompressed;
/// consumers decode with [`decode_share_link`].
pub fn encode_share_link(name: &str, format: ModelFormat, bytes: &[u8]) -> String {
    let payload = SharePayload {
        name: name.to_string(),
        data: BASE64.encode(bytes),
        format,
    };
    // Serializing a struct of strings cannot fail.
    let json = serde_json::to_string(&payload).unwrap_or_default();
    format!("{SHARE_LINK_BASE}?{MODEL_PARAM}{}", BASE64.encode(json))
}

/// Decode a share link (or a bare payload blob) back into a load request.
pub fn decode_share_link(link: &str) -> Result<ModelSource, ShareLinkError> {
    // Everything after '?' is the query string; parameter names only
    // match whole `&`-separated pairs, so `remodel=` is not `model=`.
    let query = link.split_once('?').map_or(link, |(_, q)| q);
    let blob = match query
        .split('&')
        .find_map(|pair| pair.strip_prefix(MODEL_PARAM))
    {
        Some(blob) => blob,
        None if link.contains('?') => {
            return Err(ShareLinkError::MissingParameter);
        }
        None => link,
    };

    let json = BASE64
        .decode(blob.trim())
        .map_err(|_| ShareLinkError::BadEncoding)?;
    let payload: SharePayload = serde_json::from_slice(&json)?;
    let bytes = BASE64
        .decode(payload.data.as_bytes())
        .map_err(|_| ShareLinkError::BadModelData)?;

    Ok(ModelSource {
        name: payload.name,
        format: payload.format,
        bytes,
    })
}
