mod entry;

pub use self::entry::Entry;
pub(crate) use self::entry::EntryRow;
