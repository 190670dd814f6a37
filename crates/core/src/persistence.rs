//! Per-page stroke blob codec
//!
//! Each page's strokes serialize to an independent byte blob, so one
//! corrupt page never prevents the rest of a document from loading. The
//! document store decides where blobs live (document metadata or a sidecar).
//!
//! Blob layout (JSON):
//! ```text
//! { "version": 1, "page_anchored": [Stroke...], "margin_anchored": [Stroke...] }
//! ```
//! A bare JSON array of strokes is the legacy single-space format.

use crate::error::{EngineError, EngineResult};
use crate::store::{PageStrokeSet, PerPageStrokeStore};
use crate::stroke::Stroke;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Current blob schema version
pub const BLOB_VERSION: u32 = 1;

#[derive(Serialize)]
struct BlobEnvelopeRef<'a> {
    version: u32,
    page_anchored: &'a [Stroke],
    margin_anchored: &'a [Stroke],
}

#[derive(Deserialize)]
struct BlobEnvelope {
    version: u32,
    #[serde(default)]
    page_anchored: Vec<Stroke>,
    #[serde(default)]
    margin_anchored: Vec<Stroke>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AnyBlob {
    Current(BlobEnvelope),
    Legacy(Vec<Stroke>),
}

/// A decoded page blob
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedPage {
    /// Dual-space set
    Current(PageStrokeSet),
    /// Flat stroke list in page points, to be migrated as page-anchored
    Legacy(Vec<Stroke>),
}

/// Serialize one page's strokes
pub fn encode_page(set: &PageStrokeSet) -> EngineResult<Vec<u8>> {
    let envelope = BlobEnvelopeRef {
        version: BLOB_VERSION,
        page_anchored: &set.page_anchored,
        margin_anchored: &set.margin_anchored,
    };
    Ok(serde_json::to_vec(&envelope)?)
}

/// Deserialize one page blob
pub fn decode_page(bytes: &[u8]) -> EngineResult<DecodedPage> {
    match serde_json::from_slice::<AnyBlob>(bytes)? {
        AnyBlob::Current(envelope) if envelope.version > BLOB_VERSION => {
            Err(EngineError::UnsupportedBlobVersion(envelope.version))
        }
        AnyBlob::Current(envelope) => Ok(DecodedPage::Current(PageStrokeSet::new(
            envelope.page_anchored,
            envelope.margin_anchored,
        ))),
        AnyBlob::Legacy(strokes) => Ok(DecodedPage::Legacy(strokes)),
    }
}

/// Serialize every non-empty page in the store, keyed by page index
pub fn encode_store(store: &PerPageStrokeStore) -> EngineResult<BTreeMap<usize, Vec<u8>>> {
    store
        .pages()
        .filter(|(_, set)| !set.is_empty())
        .map(|(index, set)| Ok((index, encode_page(set)?)))
        .collect()
}
