//! Attachment processing for Send Email.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::binary::BinarySource;
use crate::error::{ResendError, Result};

/// Resend's limit on the total decoded size of an email's attachments.
pub const ATTACHMENT_MAX_BYTES: usize = 40 * 1024 * 1024;

const DEFAULT_SLOT: &str = "data";
const FALLBACK_FILENAME: &str = "file";

/// One attachment entry from the field bag.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AttachmentEntry {
    /// Binary slot holding the file content
    pub binary_property_name: String,
    pub filename: String,
    pub content_type: String,
    /// Content-ID for inline images referenced as `cid:...`
    pub content_id: String,
}

impl Default for AttachmentEntry {
    fn default() -> Self {
        Self {
            binary_property_name: DEFAULT_SLOT.to_string(),
            filename: String::new(),
            content_type: String::new(),
            content_id: String::new(),
        }
    }
}

/// Attachment as sent to the API.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attachment {
    /// Base64 file content
    pub content: String,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_id: Option<String>,
}

/// Encode attachments against the default 40 MB limit.
pub async fn process_attachments<B: BinarySource>(
    entries: &[AttachmentEntry],
    binaries: &B,
) -> Result<Vec<Attachment>> {
    process_attachments_with_limit(entries, binaries, ATTACHMENT_MAX_BYTES).await
}

/// Encode attachments, failing once their running decoded size passes `max_bytes`.
///
/// The check runs after each attachment that produced content, so the
/// attachment that crosses the limit counts toward the reported total.
/// Entries whose slot is empty or missing are dropped silently.
pub async fn process_attachments_with_limit<B: BinarySource>(
    entries: &[AttachmentEntry],
    binaries: &B,
    max_bytes: usize,
) -> Result<Vec<Attachment>> {
    let mut attachments = Vec::with_capacity(entries.len());
    let mut total_size = 0usize;

    for entry in entries {
        if entry.binary_property_name.is_empty() {
            continue;
        }

        let Some(binary) = binaries.binary(&entry.binary_property_name).await? else {
            debug!(slot = %entry.binary_property_name, "attachment_slot_missing");
            continue;
        };

        if binary.data.is_empty() {
            debug!(slot = %entry.binary_property_name, "attachment_slot_empty");
            continue;
        }

        total_size += binary.data.len();
        if total_size > max_bytes {
            warn!(
                total_size = total_size,
                max_bytes = max_bytes,
                "attachment_size_limit_exceeded"
            );
            return Err(ResendError::limit(format!(
                "Total attachment size ({:.2}MB) exceeds the {}MB limit",
                total_size as f64 / 1024.0 / 1024.0,
                max_bytes / 1024 / 1024
            )));
        }

        let filename = first_non_empty(&entry.filename, binary.file_name.as_deref())
            .unwrap_or(FALLBACK_FILENAME)
            .to_string();
        let content_type =
            first_non_empty(&entry.content_type, binary.mime_type.as_deref()).map(str::to_string);

        attachments.push(Attachment {
            content: STANDARD.encode(&binary.data),
            filename,
            content_type,
            content_id: Some(entry.content_id.clone()).filter(|c| !c.is_empty()),
        });
    }

    debug!(
        count = attachments.len(),
        total_size = total_size,
        "attachments_processed"
    );

    Ok(attachments)
}

fn first_non_empty<'a>(explicit: &'a str, fallback: Option<&'a str>) -> Option<&'a str> {
    Some(explicit)
        .filter(|s| !s.is_empty())
        .or(fallback.filter(|s| !s.is_empty()))
}
