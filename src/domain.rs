//! Domain models for requisition tracking.
//!
//! This module contains the core domain types: requisitions and their items,
//! identifiers, status, the catalog and department lists, form assembly, and
//! configuration.

/// Requisition domain model.
pub mod requisition;
pub use requisition::{DATE_FORMAT, Item, Requisition, format_date};

/// Requisition identifiers.
pub mod id;
pub use id::{InvalidIdError, RecordId, RequisitionId};

mod status;
pub use status::{ParseStatusError, Status};

/// Stock item catalog and department lists.
pub mod catalog;
pub use catalog::{Catalog, Departments};

pub mod draft;
pub use draft::{CustomItemSource, Draft, DraftError, Selection};

mod config;
pub use config::Config;
