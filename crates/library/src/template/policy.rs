use crate::error::{Error, ErrorKind, Result};
use exn::ResultExt;
use rjren_catalog::models::AgeCategory;
use serde::{Deserialize, Serialize};
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::str::FromStr;
use time::Date;
use time::format_description::{self, OwnedFormatItem};

/// Which template a name is compiled from, and what happens to the folder.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    /// Rename the folder in place, using the rename template.
    #[default]
    #[serde(alias = "rename")]
    Rename,
    /// Move the folder below a destination root, using the move template.
    #[serde(alias = "move")]
    Move,
    /// Link the folder from below a destination root, using the move template.
    #[serde(alias = "link")]
    Link,
}
impl Mode {
    /// Whether compiled names are relative paths rather than a single name.
    pub fn is_path(self) -> bool {
        matches!(self, Self::Move | Self::Link)
    }
}
impl FromStr for Mode {
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RENAME" => Ok(Self::Rename),
            "MOVE" => Ok(Self::Move),
            "LINK" => Ok(Self::Link),
            _ => exn::bail!(ErrorKind::Compile(format!("unknown mode {s:?}"))),
        }
    }
}

/// What to do with characters that are reserved in file names.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum IllegalCharacters {
    #[default]
    Strip,
    /// Replace with the full-width lookalike.
    FullWidth,
}

/// Text placed either side of a substituted value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brackets {
    pub left: String,
    pub right: String,
}
impl Brackets {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self { left: left.into(), right: right.into() }
    }

    pub(crate) fn wrap(&self, value: &str) -> String {
        format!("{}{value}{}", self.left, self.right)
    }
}

/// Labels printed for each age category. An empty label prints nothing,
/// brackets included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeLabels {
    pub general: String,
    pub r15: String,
    pub adult: String,
}
impl Default for AgeLabels {
    fn default() -> Self {
        Self { general: "全年龄".to_string(), r15: "R15".to_string(), adult: "R18".to_string() }
    }
}
impl AgeLabels {
    pub fn label(&self, category: AgeCategory) -> &str {
        match category {
            AgeCategory::General => &self.general,
            AgeCategory::R15 => &self.r15,
            AgeCategory::Adult => &self.adult,
        }
    }
}

/// One entry of the tag priority list: either a tag to keep as-is, or an
/// `[original, replacement]` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagRule {
    Keep(String),
    Replace(String, String),
}
impl TagRule {
    pub(crate) fn original(&self) -> &str {
        match self {
            Self::Keep(tag) | Self::Replace(tag, _) => tag,
        }
    }

    pub(crate) fn output(&self) -> &str {
        match self {
            Self::Keep(tag) | Self::Replace(_, tag) => tag,
        }
    }
}

/// A parsed release date format, in the `time` crate's format description
/// syntax (`[year repr:last_two][month][day]`, for example).
#[derive(Clone, PartialEq, Eq)]
pub struct DateFormat {
    source: String,
    items: OwnedFormatItem,
}
impl DateFormat {
    pub const DEFAULT: &str = "[year repr:last_two][month][day]";

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub(crate) fn format(&self, date: Date) -> Result<String> {
        date.format(&self.items).or_raise(|| ErrorKind::DateFormat(self.source.clone()))
    }
}
impl FromStr for DateFormat {
    type Err = Error;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.contains('%') {
            exn::bail!(ErrorKind::DateFormat(s.to_string()));
        }
        let items = format_description::parse_owned::<2>(s).or_raise(|| ErrorKind::DateFormat(s.to_string()))?;
        Ok(Self { source: s.to_string(), items })
    }
}
impl Default for DateFormat {
    fn default() -> Self {
        // Safety: the default is a valid version 2 format description.
        Self::DEFAULT.parse().unwrap()
    }
}
impl Debug for DateFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_tuple("DateFormat").field(&self.source).finish()
    }
}

/// Every knob that shapes a compiled name besides the template itself.
///
/// Immutable once built; compilation borrows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattingPolicy {
    pub date_format: DateFormat,
    /// Joins voice credits and tags.
    pub delimiter: String,
    pub cv_brackets: Brackets,
    pub series_brackets: Brackets,
    pub age_brackets: Brackets,
    pub age_labels: AgeLabels,
    /// Adult works print no age label at all.
    pub ignore_r18: bool,
    pub illegal_characters: IllegalCharacters,
    /// Remove `【…】` segments from the work name.
    pub strip_bracketed_name: bool,
    /// Tags listed here come first, in this order.
    pub tag_rules: Vec<TagRule>,
    /// `0` keeps every tag.
    pub max_tags: usize,
}
impl Default for FormattingPolicy {
    fn default() -> Self {
        Self {
            date_format: DateFormat::default(),
            delimiter: " ".to_string(),
            cv_brackets: Brackets::new("(CV ", ")"),
            series_brackets: Brackets::new("[", "]"),
            age_brackets: Brackets::new("(", ")"),
            age_labels: AgeLabels::default(),
            ignore_r18: true,
            illegal_characters: IllegalCharacters::Strip,
            strip_bracketed_name: true,
            tag_rules: Vec::new(),
            max_tags: 5,
        }
    }
}
