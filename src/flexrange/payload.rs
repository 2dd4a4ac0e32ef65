//! Tagged payload records and the decoder registry used to read them back.
//!
//! A stored payload looks like `{"type": "<tag>", "property": <json>}`. Decoding looks the tag up
//! in a [`PayloadRegistry`] that the caller builds and passes in explicitly.

use crate::error::{AlgebraError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Serialized payload: variant tag plus its JSON body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtendData {
    #[serde(rename = "type")]
    pub kind: String,
    pub property: serde_json::Value,
}

/// Serialized interval. Bounds are decimal strings so 128-bit values survive any JSON reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub low: String,
    pub high: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ExtendData>,
}

/// Serialized interval set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataRangeRecord {
    pub size: u32,
    pub base: String,
    #[serde(default)]
    pub list: Vec<EntryRecord>,
}

/// A value that can ride on an interval and be stored as a tagged record.
pub trait Payload: Clone {
    /// Tag written to the `type` field.
    fn tag(&self) -> &str;

    /// JSON body written to the `property` field.
    fn to_property(&self) -> Result<serde_json::Value>;

    fn to_extend_data(&self) -> Result<ExtendData> {
        Ok(ExtendData {
            kind: self.tag().to_string(),
            property: self.to_property()?,
        })
    }
}

/// Decoder signature stored per tag.
pub type Decoder<P> = fn(&serde_json::Value) -> Result<P>;

/// Tag to decoder map.
pub struct PayloadRegistry<P> {
    decoders: HashMap<String, Decoder<P>>,
}

impl<P> PayloadRegistry<P> {
    pub fn new() -> Self {
        PayloadRegistry {
            decoders: HashMap::new(),
        }
    }

    /// Builder form of [`PayloadRegistry::register`].
    pub fn with(mut self, tag: &str, decoder: Decoder<P>) -> Self {
        self.register(tag, decoder);
        self
    }

    pub fn register(&mut self, tag: &str, decoder: Decoder<P>) {
        self.decoders.insert(tag.to_string(), decoder);
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.decoders.contains_key(tag)
    }

    /// Decode one record.
    ///
    /// # Returns
    /// * `Err(UnknownVariantTag)` - if no decoder is registered for the record's tag
    pub fn decode(&self, data: &ExtendData) -> Result<P> {
        match self.decoders.get(&data.kind) {
            Some(decoder) => decoder(&data.property),
            None => Err(AlgebraError::UnknownVariantTag(data.kind.clone())),
        }
    }
}

impl<P> Default for PayloadRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}

/// The unit payload is stored as an empty tag and never appears in records in practice, since
/// plain sets carry `None`.
impl Payload for () {
    fn tag(&self) -> &str {
        "Unit"
    }

    fn to_property(&self) -> Result<serde_json::Value> {
        Ok(serde_json::Value::Null)
    }
}
