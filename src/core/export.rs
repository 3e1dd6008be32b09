//! Streamed CSV export.
//!
//! The export is a pull-based stream: one header chunk, then one chunk per
//! device row. Records are fetched from the repository in bounded pages, so
//! the full collection is never serialized in memory at once. Backpressure
//! falls out of the pull model, and dropping the stream (client disconnect)
//! stops further fetching.

use std::collections::VecDeque;
use std::sync::Arc;

use bytes::Bytes;
use futures::Stream;

use crate::core::error::RegistryError;
use crate::core::models::Device;
use crate::core::repository::DeviceRepository;

/// Fixed column order of the export file.
pub const EXPORT_COLUMNS: [&str; 11] = [
    "id",
    "name",
    "manufacturer",
    "model",
    "eos_date",
    "eol_date",
    "life_status",
    "approval_state",
    "created_by",
    "notes",
    "photo",
];

/// Rows fetched from the repository per round-trip.
pub const PAGE_SIZE: u32 = 256;

struct ExportCursor {
    repo: Arc<dyn DeviceRepository>,
    cursor: Option<i64>,
    pending: VecDeque<Bytes>,
    header_sent: bool,
    exhausted: bool,
}

/// Produce the CSV export as a stream of byte chunks.
///
/// A mid-stream repository failure ends the stream with
/// `StorageReadFailure`; chunks already emitted stand.
pub fn export_csv(
    repo: Arc<dyn DeviceRepository>,
) -> impl Stream<Item = Result<Bytes, RegistryError>> + Send + 'static {
    let state = ExportCursor {
        repo,
        cursor: None,
        pending: VecDeque::new(),
        header_sent: false,
        exhausted: false,
    };

    futures::stream::try_unfold(state, |mut state| async move {
        if !state.header_sent {
            state.header_sent = true;
            let header = encode_record(&EXPORT_COLUMNS)?;
            return Ok(Some((header, state)));
        }

        loop {
            if let Some(chunk) = state.pending.pop_front() {
                return Ok(Some((chunk, state)));
            }
            if state.exhausted {
                return Ok(None);
            }

            let page = state.repo.scan_page(state.cursor, PAGE_SIZE).await?;
            if (page.len() as u32) < PAGE_SIZE {
                state.exhausted = true;
            }
            if let Some((last, _)) = page.last() {
                state.cursor = Some(*last);
            }
            for (_, device) in &page {
                state.pending.push_back(encode_row(device)?);
            }
        }
    })
}

/// Encode a single device as one CSV line. Absent optional fields render
/// as empty strings.
pub fn encode_row(device: &Device) -> Result<Bytes, RegistryError> {
    encode_record(&[
        device.id.as_str(),
        device.name.as_str(),
        device.manufacturer.as_str(),
        device.model.as_str(),
        device.eos_date.as_deref().unwrap_or(""),
        device.eol_date.as_deref().unwrap_or(""),
        device.life_status.as_deref().unwrap_or(""),
        device.approval_state.as_str(),
        device.created_by.as_str(),
        device.notes.as_str(),
        device.photo.as_deref().unwrap_or(""),
    ])
}

fn encode_record(fields: &[&str]) -> Result<Bytes, RegistryError> {
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
    writer
        .write_record(fields)
        .map_err(|e| RegistryError::StorageReadFailure(anyhow::anyhow!("csv encoding: {e}")))?;
    writer
        .flush()
        .map_err(|e| RegistryError::StorageReadFailure(anyhow::anyhow!("csv encoding: {e}")))?;
    let buf = writer
        .into_inner()
        .map_err(|e| RegistryError::StorageReadFailure(anyhow::anyhow!("csv encoding: {e}")))?;
    Ok(Bytes::from(buf))
}
