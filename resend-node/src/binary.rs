//! Access to binary input data by named slot.
//!
//! Attachments reference binary content by slot name (`data` by default).
//! The workflow host owns that data; these types are the seam to it.

use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::debug;

use crate::error::{ResendError, Result};

/// Binary content plus the metadata the host keeps alongside it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BinaryData {
    pub data: Vec<u8>,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
}

/// Source of binary input data.
pub trait BinarySource {
    /// Fetch the content of a slot. `Ok(None)` means the slot does not exist.
    fn binary(&self, slot: &str) -> impl Future<Output = Result<Option<BinaryData>>> + Send;
}

/// Binary slots held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryBinarySource {
    slots: HashMap<String, BinaryData>,
}

impl MemoryBinarySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_slot(mut self, slot: &str, data: BinaryData) -> Self {
        self.slots.insert(slot.to_string(), data);
        self
    }
}

impl BinarySource for MemoryBinarySource {
    async fn binary(&self, slot: &str) -> Result<Option<BinaryData>> {
        Ok(self.slots.get(slot).cloned())
    }
}

/// A slot backed by a file on disk.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinaryFile {
    pub path: PathBuf,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
}

/// Binary slots read from files, as described by a step's `binary` manifest.
///
/// ```json
/// {"data": {"path": "./invoice.pdf", "mimeType": "application/pdf"}}
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct FileBinarySource {
    slots: HashMap<String, BinaryFile>,
}

impl BinarySource for FileBinarySource {
    async fn binary(&self, slot: &str) -> Result<Option<BinaryData>> {
        let Some(file) = self.slots.get(slot) else {
            return Ok(None);
        };

        let data = tokio::fs::read(&file.path)
            .await
            .map_err(|source| ResendError::BinaryData {
                slot: slot.to_string(),
                source,
            })?;

        // Fall back to the file's own name when the manifest does not give one.
        let file_name = file.file_name.clone().or_else(|| {
            file.path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
        });

        debug!(slot = slot, size = data.len(), "binary_slot_read");

        Ok(Some(BinaryData {
            data,
            file_name,
            mime_type: file.mime_type.clone(),
        }))
    }
}
