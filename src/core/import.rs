//! Bulk CSV import.
//!
//! Rows are matched to columns by header name, so column order does not
//! matter. The import is tolerant by policy: a row that cannot be turned
//! into a device is skipped and the batch continues. Only the aggregate
//! count is reported back.

use csv::StringRecord;
use serde::Serialize;
use uuid::Uuid;

use crate::core::error::RegistryError;
use crate::core::models::{ApprovalState, Device, Identity};
use crate::core::repository::DeviceRepository;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
}

/// Parse the payload and persist every well-formed row as a single batch.
///
/// Fails with `InvalidEncoding` for non-UTF-8 payloads and
/// `PersistenceFailure` if the batch commit fails; malformed rows never
/// fail the import.
pub async fn import_csv(
    repo: &dyn DeviceRepository,
    payload: &[u8],
    acting: &Identity,
) -> Result<ImportSummary, RegistryError> {
    let text = std::str::from_utf8(payload).map_err(|_| RegistryError::InvalidEncoding)?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let columns = match reader.headers() {
        Ok(headers) => ColumnMap::from_headers(headers),
        Err(err) => {
            tracing::warn!(error = %err, "csv header row unreadable, importing nothing");
            return Ok(ImportSummary { imported: 0 });
        }
    };

    let mut staged = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                tracing::debug!(row, error = %err, "skipping unreadable csv row");
                continue;
            }
        };

        match build_row(&columns, &record, acting) {
            RowOutcome::Valid(device) => staged.push(*device),
            RowOutcome::Skip(reason) => {
                tracing::debug!(row, ?reason, "skipping csv row");
            }
        }
    }

    let imported = staged.len();
    repo.insert_batch(staged).await?;
    tracing::info!(imported, user = %acting.username, "csv import committed");

    Ok(ImportSummary { imported })
}

/// Column indices resolved once from the header row.
struct ColumnMap {
    name: Option<usize>,
    manufacturer: Option<usize>,
    model: Option<usize>,
    eos_date: Option<usize>,
    eol_date: Option<usize>,
    life_status: Option<usize>,
    notes: Option<usize>,
    photo: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Self {
        let find = |column: &str| headers.iter().position(|h| h == column);

        Self {
            name: find("name"),
            manufacturer: find("manufacturer"),
            model: find("model"),
            eos_date: find("eos_date"),
            eol_date: find("eol_date"),
            life_status: find("life_status"),
            notes: find("notes"),
            photo: find("photo"),
        }
    }
}

enum RowOutcome {
    Valid(Box<Device>),
    Skip(SkipReason),
}

#[derive(Debug)]
enum SkipReason {
    MissingColumn(&'static str),
}

fn build_row(columns: &ColumnMap, record: &StringRecord, acting: &Identity) -> RowOutcome {
    // A required column absent from the header, or a short row missing the
    // field, both count as "missing". Empty values are accepted as-is.
    let required = |index: Option<usize>, column: &'static str| {
        index
            .and_then(|i| record.get(i))
            .ok_or(SkipReason::MissingColumn(column))
    };

    let name = match required(columns.name, "name") {
        Ok(v) => v,
        Err(reason) => return RowOutcome::Skip(reason),
    };
    let manufacturer = match required(columns.manufacturer, "manufacturer") {
        Ok(v) => v,
        Err(reason) => return RowOutcome::Skip(reason),
    };
    let model = match required(columns.model, "model") {
        Ok(v) => v,
        Err(reason) => return RowOutcome::Skip(reason),
    };
    let eos_date = match required(columns.eos_date, "eos_date") {
        Ok(v) => v,
        Err(reason) => return RowOutcome::Skip(reason),
    };
    let eol_date = match required(columns.eol_date, "eol_date") {
        Ok(v) => v,
        Err(reason) => return RowOutcome::Skip(reason),
    };
    let life_status = match required(columns.life_status, "life_status") {
        Ok(v) => v,
        Err(reason) => return RowOutcome::Skip(reason),
    };

    let optional = |index: Option<usize>| index.and_then(|i| record.get(i)).unwrap_or("");

    RowOutcome::Valid(Box::new(Device {
        id: Uuid::now_v7().to_string(),
        name: name.to_string(),
        manufacturer: manufacturer.to_string(),
        model: model.to_string(),
        eos_date: opt(eos_date),
        eol_date: opt(eol_date),
        life_status: opt(life_status),
        notes: optional(columns.notes).to_string(),
        photo: opt(optional(columns.photo)),
        approval_state: ApprovalState::Published,
        created_by: acting.username.clone(),
    }))
}

fn opt(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
