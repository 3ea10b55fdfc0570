//! Loading the stock catalog and department list from CSV files.
//!
//! Both files only contribute their first column. The catalog has a header
//! row, the department list does not. Loading never fails outright: the
//! tolerant entry points log the problem and return an empty list.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::{
    domain::{Catalog, Departments},
    storage::decode::{DecodeError, TextDecoder},
};

/// Load the stock catalog, returning an empty catalog on any failure.
#[must_use]
pub fn load_catalog(path: &Path, decoder: &TextDecoder) -> Catalog {
    try_load_catalog(path, decoder).unwrap_or_else(|e| {
        tracing::warn!("Error loading stock items: {e}");
        Catalog::default()
    })
}

/// Load the stock catalog.
///
/// The first row is a header and is skipped. Names are trimmed and blank
/// names are skipped; order and duplicates are preserved.
///
/// # Errors
///
/// Returns an error if the file cannot be read, cannot be decoded under any
/// candidate encoding, or is not valid CSV.
pub fn try_load_catalog(path: &Path, decoder: &TextDecoder) -> Result<Catalog, ListError> {
    let items = read_first_column(path, decoder, true)?;
    tracing::debug!("Loaded {} stock items from {}", items.len(), path.display());
    Ok(Catalog::new(items))
}

/// Load the department list, returning an empty list on any failure.
///
/// A missing file is expected and only logged at debug level.
#[must_use]
pub fn load_departments(path: &Path, decoder: &TextDecoder) -> Departments {
    match try_load_departments(path, decoder) {
        Ok(departments) => departments,
        Err(ListError::NotFound(path)) => {
            tracing::debug!("No department list at {}", path.display());
            Departments::default()
        }
        Err(e) => {
            tracing::warn!("Error loading departments: {e}");
            Departments::default()
        }
    }
}

/// Load the department list.
///
/// Every row is a department; there is no header.
///
/// # Errors
///
/// Returns an error if the file cannot be read, decoded, or parsed.
pub fn try_load_departments(path: &Path, decoder: &TextDecoder) -> Result<Departments, ListError> {
    let names = read_first_column(path, decoder, false)?;
    tracing::debug!("Loaded {} departments from {}", names.len(), path.display());
    Ok(Departments::new(names))
}

fn read_first_column(
    path: &Path,
    decoder: &TextDecoder,
    has_header: bool,
) -> Result<Vec<String>, ListError> {
    let bytes = fs::read(path).map_err(|error| match error.kind() {
        io::ErrorKind::NotFound => ListError::NotFound(path.to_path_buf()),
        io::ErrorKind::PermissionDenied => ListError::PermissionDenied(path.to_path_buf()),
        _ => ListError::Io(error),
    })?;

    let text = decoder.decode(&bytes)?;
    first_column(&text, has_header)
}

fn first_column(text: &str, has_header: bool) -> Result<Vec<String>, ListError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(has_header)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut values = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(value) = record.get(0).map(str::trim).filter(|v| !v.is_empty()) {
            values.push(value.to_string());
        }
    }
    Ok(values)
}

/// Errors that can occur when loading a CSV list.
#[derive(Debug, thiserror::Error)]
pub enum ListError {
    /// The file does not exist.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// The file exists but may not be read.
    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),
    /// Some other I/O error occurred.
    #[error(transparent)]
    Io(io::Error),
    /// The bytes could not be decoded as text.
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// The text is not valid CSV.
    #[error("invalid CSV: {0}")]
    Csv(#[from] csv::Error),
}
