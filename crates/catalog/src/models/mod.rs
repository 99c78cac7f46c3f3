mod age;
mod code;
mod locale;
mod metadata;

pub use self::age::AgeCategory;
pub use self::code::WorkCode;
pub use self::locale::Locale;
pub use self::metadata::WorkMetadata;
