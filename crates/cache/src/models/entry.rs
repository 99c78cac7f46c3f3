use crate::error::{Error, ErrorKind};
use exn::ResultExt;
use rjren_catalog::models::{WorkCode, WorkMetadata};
use time::UtcDateTime;

/// A cached metadata record, together with the moment it was stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub metadata: WorkMetadata,
    pub cached_at: UtcDateTime,
}
impl Entry {
    pub fn code(&self) -> &WorkCode {
        &self.metadata.code
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct EntryRow {
    pub(crate) code: String,
    pub(crate) metadata: String,
    pub(crate) cached_at: i64,
}
impl TryFrom<&Entry> for EntryRow {
    type Error = Error;
    fn try_from(entry: &Entry) -> Result<Self, Self::Error> {
        Ok(Self {
            code: entry.metadata.code.to_string(),
            metadata: serde_json::to_string_pretty(&entry.metadata).or_raise(|| ErrorKind::InvalidData("metadata"))?,
            cached_at: entry.cached_at.unix_timestamp(),
        })
    }
}
impl TryFrom<EntryRow> for Entry {
    type Error = Error;
    fn try_from(row: EntryRow) -> Result<Self, Self::Error> {
        let metadata: WorkMetadata =
            serde_json::from_str(&row.metadata).or_raise(|| ErrorKind::InvalidData("metadata"))?;
        if metadata.code.as_str() != row.code {
            exn::bail!(ErrorKind::InvalidData("code"));
        }
        Ok(Self {
            metadata,
            cached_at: UtcDateTime::from_unix_timestamp(row.cached_at)
                .or_raise(|| ErrorKind::InvalidData("cache date"))?,
        })
    }
}
