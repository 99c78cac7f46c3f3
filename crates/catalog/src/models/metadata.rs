use super::{AgeCategory, WorkCode};
use serde::{Deserialize, Serialize};
use time::Date;

/// Everything known about a work, as resolved from the remote catalog.
///
/// Records are immutable once created and may be cached indefinitely under
/// their [`WorkCode`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkMetadata {
    pub code: WorkCode,
    /// Display name of the work.
    pub work_name: String,
    pub maker_id: String,
    pub maker_name: String,
    #[serde(with = "iso_date")]
    pub release_date: Date,
    #[serde(default)]
    pub series_id: Option<String>,
    #[serde(default)]
    pub series_name: Option<String>,
    pub age_category: AgeCategory,
    /// Descriptive tags in source order, without duplicates.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Voice credits, in source order.
    #[serde(default)]
    pub voice_actors: Vec<String>,
    pub cover_url: String,
}

/// Dates are stored as plain `YYYY-MM-DD` strings.
mod iso_date {
    use crate::consts::ISO_DATE;
    use serde::de::Error as _;
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use time::Date;

    pub(super) fn serialize<S: Serializer>(date: &Date, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(ISO_DATE).map_err(S::Error::custom)?)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Date, D::Error> {
        let s = String::deserialize(deserializer)?;
        Date::parse(&s, ISO_DATE).map_err(D::Error::custom)
    }
}
