use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Locale sent with every catalog lookup; decides the language of names and
/// tags in the returned record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    #[default]
    JaJp,
    EnUs,
    KoKr,
    ZhCn,
    ZhTw,
}
impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JaJp => "ja_jp",
            Self::EnUs => "en_us",
            Self::KoKr => "ko_kr",
            Self::ZhCn => "zh_cn",
            Self::ZhTw => "zh_tw",
        }
    }
}

impl Display for Locale {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
