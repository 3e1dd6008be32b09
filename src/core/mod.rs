pub mod deletion;
pub mod error;
pub mod export;
pub mod import;
pub mod models;
pub mod repository;

pub use deletion::delete_device;
pub use error::RegistryError;
pub use export::{EXPORT_COLUMNS, PAGE_SIZE, export_csv};
pub use import::{ImportSummary, import_csv};
pub use models::{ApprovalState, Device, Identity};
pub use repository::DeviceRepository;
