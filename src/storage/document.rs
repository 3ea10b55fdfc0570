//! The on-disk shape of the requisition log.
//!
//! Reading goes through serde: every element is optional at this level, and
//! whether a record is usable is decided when converting it into a
//! [`Requisition`].
//!
//! Writing never re-serializes the whole document. New records are spliced in
//! before the closing root tag and status changes replace the text of a single
//! `<Status>` element, so comments and elements this crate does not know about
//! survive every write.

use non_empty_string::NonEmptyString;
use quick_xml::{DeError, SeError, escape::escape, events::Event, reader::Reader};
use serde::{Deserialize, Serialize};

use crate::domain::{RecordId, Requisition, RequisitionId, Status};

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n";

/// The root `<requisitions>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename = "requisitions")]
pub(crate) struct LogDocument {
    #[serde(rename = "requisition", default)]
    pub(crate) records: Vec<RecordElement>,
}

/// A single `<requisition>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct RecordElement {
    #[serde(rename = "ID", default, skip_serializing_if = "Option::is_none")]
    pub(crate) id: Option<String>,
    #[serde(rename = "Requester", default, skip_serializing_if = "Option::is_none")]
    pub(crate) requester: Option<String>,
    #[serde(rename = "Date", default, skip_serializing_if = "Option::is_none")]
    pub(crate) date: Option<String>,
    #[serde(rename = "Status", default, skip_serializing_if = "Option::is_none")]
    pub(crate) status: Option<String>,
    #[serde(rename = "Department", default, skip_serializing_if = "Option::is_none")]
    pub(crate) department: Option<String>,
    #[serde(rename = "Items", default, skip_serializing_if = "Option::is_none")]
    pub(crate) items: Option<ItemsElement>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ItemsElement {
    #[serde(rename = "Item", default)]
    pub(crate) items: Vec<ItemElement>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ItemElement {
    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub(crate) name: Option<String>,
    #[serde(rename = "Quantity", default, skip_serializing_if = "Option::is_none")]
    pub(crate) quantity: Option<String>,
}

/// Why a record could not become a [`Requisition`].
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum RecordError {
    MissingField(&'static str),
    InvalidStatus(crate::domain::ParseStatusError),
}

impl RecordElement {
    /// Build the element for a newly appended requisition.
    pub(crate) fn new(requisition: &Requisition, id: &RequisitionId) -> Self {
        Self {
            id: Some(id.to_string()),
            requester: Some(requisition.requester().to_string()),
            date: Some(requisition.date().to_string()),
            status: Some(requisition.status().to_string()),
            department: Some(requisition.department().to_string()),
            items: Some(ItemsElement {
                items: requisition
                    .items()
                    .iter()
                    .map(|item| ItemElement {
                        name: Some(item.name.clone()),
                        quantity: Some(item.quantity.clone()),
                    })
                    .collect(),
            }),
        }
    }

    /// The record's id, if it has a non-blank one.
    pub(crate) fn stored_id(&self) -> Option<RequisitionId> {
        self.id
            .as_deref()
            .and_then(|id| RequisitionId::new(id).ok())
    }

    /// Whether this record is the one `target` refers to.
    ///
    /// Ids are compared when both sides have a stored one; otherwise the
    /// requester and date must both be equal.
    pub(crate) fn refers_to(
        &self,
        target_id: Option<&RequisitionId>,
        requester: &str,
        date: &str,
    ) -> Result<bool, RecordError> {
        if let (Some(own), Some(target)) = (self.stored_id(), target_id) {
            return Ok(&own == target);
        }

        let own_requester = required(self.requester.as_deref(), "Requester")?;
        let own_date = required(self.date.as_deref(), "Date")?;
        Ok(own_requester.trim() == requester.trim() && own_date.trim() == date.trim())
    }

    /// Convert into a [`Requisition`].
    ///
    /// `position` is the record's index in the document; it seeds the
    /// synthesized id of records stored without one.
    pub(crate) fn to_requisition(&self, position: usize) -> Result<Requisition, RecordError> {
        let requester = required(self.requester.as_deref(), "Requester")?.trim();
        let requester = NonEmptyString::new(requester.to_string())
            .map_err(|_| RecordError::MissingField("Requester"))?;
        let date = required(self.date.as_deref(), "Date")?.trim().to_string();
        let status: Status = required(self.status.as_deref(), "Status")?
            .parse()
            .map_err(RecordError::InvalidStatus)?;
        let department = self
            .department
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string();

        let items = self
            .items
            .as_ref()
            .ok_or(RecordError::MissingField("Items"))?
            .items
            .iter()
            .map(|item| {
                Ok(crate::domain::Item::new(
                    required(item.name.as_deref(), "Name")?,
                    required(item.quantity.as_deref(), "Quantity")?,
                ))
            })
            .collect::<Result<Vec<_>, RecordError>>()?;

        let id = self.stored_id().map_or_else(
            || RecordId::Synthesized(RequisitionId::synthesize(position, requester.as_str(), &date)),
            RecordId::Stored,
        );

        Ok(Requisition::from_parts(
            id, requester, date, status, department, items,
        ))
    }
}

fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, RecordError> {
    value.ok_or(RecordError::MissingField(field))
}

/// An empty log, ready for [`insert_record`].
pub(crate) fn empty_log() -> String {
    format!("{XML_DECLARATION}<requisitions>\n</requisitions>\n")
}

/// Render a single `<requisition>` element, indented for a place directly
/// below the root.
pub(crate) fn render_record(record: &RecordElement) -> Result<String, SeError> {
    let mut xml = String::new();
    let mut serializer = quick_xml::se::Serializer::with_root(&mut xml, Some("requisition"))?;
    serializer.indent(' ', 2);
    record.serialize(serializer)?;
    Ok(format!("  {}\n", xml.replace('\n', "\n  ")))
}

/// Byte offset of the reader in its input.
fn offset<R>(reader: &Reader<R>) -> usize {
    usize::try_from(reader.buffer_position()).unwrap_or(usize::MAX)
}

/// Insert a rendered record as the last child of the root element.
///
/// Everything else in `text` is kept byte for byte.
pub(crate) fn insert_record(text: &str, record: &str) -> Result<String, DeError> {
    let mut reader = Reader::from_str(text);
    let mut depth = 0_usize;

    loop {
        let before = offset(&reader);
        match reader.read_event()? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    let separator = if text[..before].ends_with('\n') { "" } else { "\n" };
                    return Ok(format!(
                        "{}{separator}{record}{}",
                        &text[..before],
                        &text[before..]
                    ));
                }
            }
            Event::Empty(root) if depth == 0 => {
                let name = String::from_utf8_lossy(root.name().as_ref()).into_owned();
                let after = offset(&reader);
                return Ok(format!(
                    "{}<{name}>\n{record}</{name}>{}",
                    &text[..before],
                    &text[after..]
                ));
            }
            Event::Eof => return Err(DeError::Custom("log has no root element".to_string())),
            _ => {}
        }
    }
}

fn splice(text: &str, start: usize, end: usize, with: &str) -> String {
    format!("{}{with}{}", &text[..start], &text[end..])
}

/// Set the `<Status>` text of the record at `position`.
///
/// Only that element's content changes. A record without a `<Status>` gets
/// one appended.
pub(crate) fn replace_status(text: &str, position: usize, status: &str) -> Result<String, DeError> {
    const RECORD: &[u8] = b"requisition";
    const STATUS: &[u8] = b"Status";

    let element = format!("<Status>{}</Status>", escape(status));

    let mut reader = Reader::from_str(text);
    let mut depth = 0_usize;
    let mut seen = 0_usize;
    let mut in_target = false;
    let mut content_start = None;

    loop {
        let before = offset(&reader);
        match reader.read_event()? {
            Event::Start(e) => {
                if depth == 1 && e.name().as_ref() == RECORD {
                    in_target = seen == position;
                    seen += 1;
                } else if in_target && depth == 2 && e.name().as_ref() == STATUS {
                    content_start = Some(offset(&reader));
                }
                depth += 1;
            }
            Event::End(e) => {
                depth = depth.saturating_sub(1);
                if in_target && depth == 2 && e.name().as_ref() == STATUS {
                    if let Some(start) = content_start {
                        return Ok(splice(text, start, before, &escape(status)));
                    }
                } else if in_target && depth == 1 && e.name().as_ref() == RECORD {
                    return Ok(splice(text, before, before, &element));
                }
            }
            Event::Empty(e) => {
                if depth == 1 && e.name().as_ref() == RECORD {
                    if seen == position {
                        let record = format!("<requisition>{element}</requisition>");
                        return Ok(splice(text, before, offset(&reader), &record));
                    }
                    seen += 1;
                } else if in_target && depth == 2 && e.name().as_ref() == STATUS {
                    return Ok(splice(text, before, offset(&reader), &element));
                }
            }
            Event::Eof => {
                return Err(DeError::Custom(format!("log has no record {position}")));
            }
            _ => {}
        }
    }
}
