//! Offline stock requisition tracking
//!
//! Requisitions are kept in a single XML log. Stock items and departments are
//! read from CSV files, which may be in any common encoding.

pub mod domain;
pub use domain::{Config, Item, RecordId, Requisition, RequisitionId, Status};

/// Filesystem storage for the requisition log and its lists.
pub mod storage;
pub use storage::{RequisitionStore, Workspace};
