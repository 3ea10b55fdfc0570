//! A file backed store of requisitions
//!
//! The [`RequisitionStore`] owns a single XML document. Every write reads the
//! whole file, splices the change into its text and writes the whole file
//! back. This is fine for the few hundred records a stores office produces, but
//! there is no locking: two processes writing at once can lose updates.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use tracing::instrument;

use crate::{
    domain::{ParseStatusError, RecordId, Requisition, RequisitionId},
    storage::document::{self, LogDocument, RecordElement, RecordError},
};

/// How to treat a record that is missing a required field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadMode {
    /// Any bad record makes the whole log unreadable.
    #[default]
    Strict,
    /// Bad records are logged and skipped; the rest are returned.
    SkipMalformed,
}

/// The outcome of [`RequisitionStore::update_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateResult {
    /// The record at `position` (in document order) was updated.
    Updated {
        /// Index of the updated record.
        position: usize,
    },
    /// No record matched; the log was left untouched.
    NoMatch,
}

/// A requisition log stored as a single XML file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequisitionStore {
    path: PathBuf,
    mode: LoadMode,
}

impl RequisitionStore {
    /// Opens the log at the given path.
    ///
    /// The file does not need to exist yet; it is created by the first
    /// [`append`](Self::append).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mode: LoadMode::default(),
        }
    }

    /// Set how malformed records are handled when loading.
    #[must_use]
    pub const fn with_mode(mut self, mode: LoadMode) -> Self {
        self.mode = mode;
        self
    }

    /// The path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The configured [`LoadMode`].
    #[must_use]
    pub const fn mode(&self) -> LoadMode {
        self.mode
    }

    /// Load all requisitions, in document order.
    ///
    /// A missing or unreadable log yields an empty list. The failure is
    /// logged, not returned; use [`try_load`](Self::try_load) to see it.
    #[must_use]
    pub fn load(&self) -> Vec<Requisition> {
        match self.try_load() {
            Ok(requisitions) => requisitions,
            Err(StoreError::NotFound(path)) => {
                tracing::info!("File not found: {}", path.display());
                Vec::new()
            }
            Err(e) => {
                tracing::warn!("Failed to load requisitions: {e}");
                Vec::new()
            }
        }
    }

    /// Load all requisitions, in document order.
    ///
    /// Records stored without an id are given a synthesized one, derived from
    /// their position, requester and date. It is not written back.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, cannot be read, is not a valid
    /// log document, or (in [`LoadMode::Strict`]) contains a record that is
    /// missing a required field or has an unknown status.
    #[instrument(level = "debug", skip(self), fields(path = %self.path.display()))]
    pub fn try_load(&self) -> Result<Vec<Requisition>, StoreError> {
        let document = self.read_document()?;

        let mut requisitions = Vec::with_capacity(document.records.len());
        for (position, record) in document.records.iter().enumerate() {
            match record.to_requisition(position) {
                Ok(requisition) => requisitions.push(requisition),
                Err(error) => {
                    let error = StoreError::from_record(position, error);
                    if self.mode == LoadMode::SkipMalformed {
                        tracing::warn!("Skipping record: {error}");
                    } else {
                        return Err(error);
                    }
                }
            }
        }

        tracing::debug!("Loaded {} requisitions", requisitions.len());
        Ok(requisitions)
    }

    /// Append a requisition to the log.
    ///
    /// The record is always written with a newly minted id, whatever id
    /// `requisition` carries. The persisted requisition is returned so that
    /// callers can continue with the id that is actually on disk.
    ///
    /// The record is added as the last child of the root; the rest of the file
    /// is left as it was. If the log does not exist, or exists but is not a
    /// valid document, a new document is started. In the second case the old
    /// content is lost.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing log cannot be read (for example,
    /// permission denied), or if the log cannot be written.
    #[instrument(level = "debug", skip_all, fields(path = %self.path.display()))]
    pub fn append(&self, requisition: &Requisition) -> Result<Requisition, StoreError> {
        let text = match self.read_text() {
            Ok(text) => match self.parse(&text) {
                Ok(_) => text,
                Err(error) => {
                    tracing::warn!("{error}; starting a new log");
                    document::empty_log()
                }
            },
            Err(StoreError::NotFound(_)) => document::empty_log(),
            Err(error) => return Err(error),
        };

        let id = RequisitionId::generate();
        let record = document::render_record(&RecordElement::new(requisition, &id))?;
        let text = document::insert_record(&text, &record).map_err(|e| self.malformed(e))?;
        self.write_text(&text)?;

        tracing::info!("Requisition {id} saved to {}", self.path.display());

        let mut persisted = requisition.clone();
        persisted.id = RecordId::Stored(id);
        Ok(persisted)
    }

    /// Write `requisition`'s status to its record in the log.
    ///
    /// Records are scanned in document order. A record matches when both it
    /// and `requisition` have a stored id and the ids are equal; otherwise
    /// when requester and date are equal. Only the first match is updated,
    /// and only the text of its `<Status>` element changes.
    ///
    /// In [`LoadMode::SkipMalformed`], records too broken to compare are
    /// passed over, just as [`load`](Self::load) passes over them.
    ///
    /// # Errors
    ///
    /// Unlike [`load`](Self::load), a missing or malformed log is an error.
    /// In [`LoadMode::Strict`], a record scanned before the match that lacks a
    /// requester or date is also an error.
    #[instrument(level = "debug", skip_all, fields(path = %self.path.display()))]
    pub fn update_status(&self, requisition: &Requisition) -> Result<UpdateResult, StoreError> {
        let text = self.read_text()?;
        let document = self.parse(&text)?;
        let target_id = requisition.id().stored();

        let mut matched = None;
        for (position, record) in document.records.iter().enumerate() {
            match record.refers_to(target_id, requisition.requester(), requisition.date()) {
                Ok(true) => {
                    matched = Some(position);
                    break;
                }
                Ok(false) => {}
                Err(error) => {
                    let error = StoreError::from_record(position, error);
                    if self.mode == LoadMode::SkipMalformed {
                        tracing::warn!("Skipping record: {error}");
                    } else {
                        return Err(error);
                    }
                }
            }
        }

        let Some(position) = matched else {
            tracing::warn!(
                "No record matches requisition {} ({} at {})",
                requisition.id(),
                requisition.requester(),
                requisition.date()
            );
            return Ok(UpdateResult::NoMatch);
        };

        let text = document::replace_status(&text, position, requisition.status().as_str())
            .map_err(|e| self.malformed(e))?;
        self.write_text(&text)?;
        tracing::info!(
            "Requisition status updated to {} in {}",
            requisition.status(),
            self.path.display()
        );
        Ok(UpdateResult::Updated { position })
    }

    fn read_text(&self) -> Result<String, StoreError> {
        fs::read_to_string(&self.path).map_err(|error| StoreError::from_io(&self.path, error))
    }

    fn read_document(&self) -> Result<LogDocument, StoreError> {
        self.parse(&self.read_text()?)
    }

    fn parse(&self, text: &str) -> Result<LogDocument, StoreError> {
        quick_xml::de::from_str(text).map_err(|source| self.malformed(source))
    }

    fn malformed(&self, source: quick_xml::DeError) -> StoreError {
        StoreError::Malformed {
            path: self.path.clone(),
            source,
        }
    }

    fn write_text(&self, text: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|error| StoreError::from_io(parent, error))?;
        }

        fs::write(&self.path, text).map_err(|error| StoreError::from_io(&self.path, error))
    }
}

/// Find a requisition by its displayed id.
///
/// An exact match wins; otherwise `query` may be an unambiguous prefix of an
/// id. Comparison ignores ASCII case.
///
/// # Errors
///
/// Returns [`LookupError`] if nothing matches or the prefix is ambiguous.
pub fn find_by_id<'a>(
    requisitions: &'a [Requisition],
    query: &str,
) -> Result<&'a Requisition, LookupError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(LookupError::NotFound(query.to_string()));
    }

    if let Some(exact) = requisitions
        .iter()
        .find(|r| r.id().display().eq_ignore_ascii_case(query))
    {
        return Ok(exact);
    }

    let query_lower = query.to_ascii_lowercase();
    let candidates: Vec<_> = requisitions
        .iter()
        .filter(|r| r.id().display().to_ascii_lowercase().starts_with(&query_lower))
        .collect();

    match candidates.as_slice() {
        [] => Err(LookupError::NotFound(query.to_string())),
        [only] => Ok(only),
        many => Err(LookupError::Ambiguous {
            query: query.to_string(),
            candidates: many.iter().map(|r| r.id().to_string()).collect(),
        }),
    }
}

/// Errors from [`find_by_id`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LookupError {
    /// No requisition has the given id.
    #[error("no requisition with id '{0}'")]
    NotFound(String),
    /// More than one id starts with the given prefix.
    #[error("'{query}' matches more than one requisition: {}", candidates.join(", "))]
    Ambiguous {
        /// The prefix that was looked up.
        query: String,
        /// The ids it matched.
        candidates: Vec<String>,
    },
}

/// Errors that can occur reading or writing the requisition log.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The log file does not exist.
    #[error("requisition log not found: {}", .0.display())]
    NotFound(PathBuf),
    /// The log file, or its directory, may not be accessed.
    #[error("permission denied: {}", .0.display())]
    PermissionDenied(PathBuf),
    /// Any other I/O error.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// The file or directory involved.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },
    /// The log is not a well-formed requisition document.
    #[error("error parsing {}: {source}", path.display())]
    Malformed {
        /// The log file.
        path: PathBuf,
        /// The parser error.
        #[source]
        source: quick_xml::DeError,
    },
    /// A record lacks a required field.
    #[error("record {position} is missing its {field} field")]
    MissingField {
        /// Index of the record in document order.
        position: usize,
        /// The missing element.
        field: &'static str,
    },
    /// A record's status is neither pending nor completed.
    #[error("record {position} has an invalid status: {source}")]
    InvalidStatus {
        /// Index of the record in document order.
        position: usize,
        /// The parse failure.
        #[source]
        source: ParseStatusError,
    },
    /// The document could not be serialized.
    #[error("failed to encode requisition log: {0}")]
    Encode(#[from] quick_xml::SeError),
}

impl StoreError {
    fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    fn from_record(position: usize, error: RecordError) -> Self {
        match error {
            RecordError::MissingField(field) => Self::MissingField { position, field },
            RecordError::InvalidStatus(source) => Self::InvalidStatus { position, source },
        }
    }
}
