use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Age classification of a work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeCategory {
    /// All ages.
    #[serde(rename = "GEN")]
    General,
    #[serde(rename = "R15")]
    R15,
    /// The most restrictive category.
    #[serde(rename = "R18")]
    Adult,
}
impl AgeCategory {
    /// Maps the catalog's numeric classification. Anything other than `1`
    /// or `2` is treated as the most restrictive category.
    pub fn from_catalog(value: u8) -> Self {
        match value {
            1 => Self::General,
            2 => Self::R15,
            _ => Self::Adult,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "GEN",
            Self::R15 => "R15",
            Self::Adult => "R18",
        }
    }
}

impl Display for AgeCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
