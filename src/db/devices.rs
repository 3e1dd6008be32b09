use async_trait::async_trait;
use tokio_rusqlite::{Connection, params, rusqlite};

use crate::core::error::RegistryError;
use crate::core::models::{ApprovalState, Device};
use crate::core::repository::DeviceRepository;

const DEVICE_COLUMNS: &str = "id, name, manufacturer, model, eos_date, eol_date, \
     life_status, notes, photo, approval_state, created_by";

/// SQLite-backed device repository. All access goes through the connection's
/// dedicated task, so callers never block the runtime.
#[derive(Clone)]
pub struct SqliteDeviceRepository {
    conn: Connection,
}

impl SqliteDeviceRepository {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl DeviceRepository for SqliteDeviceRepository {
    async fn get(&self, id: &str) -> Result<Option<Device>, RegistryError> {
        use tokio_rusqlite::rusqlite::OptionalExtension;

        let id = id.to_string();
        self.conn
            .call(move |c| {
                let mut stmt = c.prepare(&format!(
                    "SELECT {DEVICE_COLUMNS} FROM devices WHERE id = ?1"
                ))?;
                stmt.query_row(params![id], |row| device_from_row(row, 0))
                    .optional()
            })
            .await
            .map_err(|e| RegistryError::StorageReadFailure(e.into()))
    }

    async fn insert_batch(&self, devices: Vec<Device>) -> Result<(), RegistryError> {
        self.conn
            .call(move |c| {
                let tx = c.transaction()?;

                for device in &devices {
                    tx.execute(
                        &format!(
                            "INSERT INTO devices ({DEVICE_COLUMNS})
                             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
                        ),
                        params![
                            &device.id,
                            &device.name,
                            &device.manufacturer,
                            &device.model,
                            &device.eos_date,
                            &device.eol_date,
                            &device.life_status,
                            &device.notes,
                            &device.photo,
                            device.approval_state.as_str(),
                            &device.created_by,
                        ],
                    )?;
                }

                tx.commit()?;
                Ok::<(), rusqlite::Error>(())
            })
            .await
            .map_err(|e| RegistryError::PersistenceFailure(e.into()))
    }

    async fn delete(&self, id: &str) -> Result<(), RegistryError> {
        let id = id.to_string();
        let affected = self
            .conn
            .call(move |c| c.execute("DELETE FROM devices WHERE id = ?1", params![id]))
            .await
            .map_err(|e| RegistryError::PersistenceFailure(e.into()))?;

        if affected == 0 {
            return Err(RegistryError::NotFound);
        }
        Ok(())
    }

    async fn scan_page(
        &self,
        cursor: Option<i64>,
        limit: u32,
    ) -> Result<Vec<(i64, Device)>, RegistryError> {
        self.conn
            .call(move |c| {
                let mut stmt = c.prepare(&format!(
                    "SELECT rowid, {DEVICE_COLUMNS} FROM devices
                     WHERE rowid > ?1 ORDER BY rowid LIMIT ?2"
                ))?;
                let rows = stmt.query_map(params![cursor.unwrap_or(0), limit], |row| {
                    let rowid: i64 = row.get(0)?;
                    Ok((rowid, device_from_row(row, 1)?))
                })?;
                rows.collect::<rusqlite::Result<Vec<_>>>()
            })
            .await
            .map_err(|e| RegistryError::StorageReadFailure(e.into()))
    }
}

fn device_from_row(row: &rusqlite::Row<'_>, base: usize) -> rusqlite::Result<Device> {
    let state: String = row.get(base + 9)?;
    let approval_state = ApprovalState::parse(&state).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            base + 9,
            rusqlite::types::Type::Text,
            format!("invalid approval_state: {state}").into(),
        )
    })?;

    Ok(Device {
        id: row.get(base)?,
        name: row.get(base + 1)?,
        manufacturer: row.get(base + 2)?,
        model: row.get(base + 3)?,
        eos_date: row.get(base + 4)?,
        eol_date: row.get(base + 5)?,
        life_status: row.get(base + 6)?,
        notes: row.get(base + 7)?,
        photo: row.get(base + 8)?,
        approval_state,
        created_by: row.get(base + 10)?,
    })
}
