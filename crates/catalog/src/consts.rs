use regex::Regex;
use std::sync::LazyLock;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

/// Product lookup endpoint of the remote catalog.
pub const DEFAULT_ENDPOINT: &str = "https://www.dlsite.com/maniax/api/=/product.json";

// The regex crate has no look-around, so the digit run is captured greedily
// and its length checked afterwards (6 or 8 digits, never more).
regex!(CODE_SEARCH_REGEX, r"RJ([0-9]+)");
regex!(CODE_EXACT_REGEX, r"^RJ(?:[0-9]{6}|[0-9]{8})$");

/// `YYYY-MM-DD`, used both for the remote record and the cache.
pub(crate) const ISO_DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
