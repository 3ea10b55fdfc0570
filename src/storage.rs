mod decode;
mod document;
/// Loading the stock catalog and department list.
pub mod lists;
/// The XML requisition log.
pub mod store;
mod workspace;

pub use decode::{DecodeError, TextDecoder};
pub use lists::{ListError, load_catalog, load_departments, try_load_catalog, try_load_departments};
pub use store::{LoadMode, LookupError, RequisitionStore, StoreError, UpdateResult, find_by_id};
pub use workspace::{CONFIG_DIR, Workspace};
