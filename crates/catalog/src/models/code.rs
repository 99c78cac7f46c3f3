use crate::consts;
use crate::error::{Error, ErrorKind};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// A normalized (uppercase) work code such as `RJ123456` or `RJ01234567`.
///
/// Either constructed strictly through [`FromStr`] (the whole string must be a
/// code), or discovered inside arbitrary text with [`WorkCode::find`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WorkCode(String);

impl WorkCode {
    /// Finds the first work code embedded in `text`, case-insensitively.
    ///
    /// ```
    /// use rjren_catalog::models::WorkCode;
    ///
    /// let code = WorkCode::find("[Circle] rj123456 Title").unwrap();
    /// assert_eq!(code.as_str(), "RJ123456");
    /// // Seven digits is neither a six- nor an eight-digit code.
    /// assert!(WorkCode::find("RJ1234567").is_none());
    /// ```
    pub fn find(text: impl AsRef<str>) -> Option<Self> {
        let upper = text.as_ref().to_uppercase();
        consts::CODE_SEARCH_REGEX.captures_iter(&upper).find_map(|captures| {
            if !matches!(captures.get(1)?.len(), 6 | 8) {
                return None;
            }
            Some(Self(captures.get(0)?.as_str().to_string()))
        })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for WorkCode {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();
        if !consts::CODE_EXACT_REGEX.is_match(&normalized) {
            exn::bail!(ErrorKind::InvalidCode(s.to_string()));
        }
        Ok(Self(normalized))
    }
}
impl TryFrom<String> for WorkCode {
    type Error = Error;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
impl From<WorkCode> for String {
    fn from(code: WorkCode) -> Self {
        code.0
    }
}
impl AsRef<str> for WorkCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
impl Display for WorkCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.0)
    }
}
