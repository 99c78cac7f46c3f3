//! Discovery, naming and the rename pass.
//!
//! [`scan`] finds work folders below a root, [`CachingSource`] resolves their
//! metadata through the cache, a [`NameCompiler`] turns that metadata into a
//! name or relative path, and a [`Renamer`] ties it all together into a stream
//! of [`RenameEvent`]s.

pub mod error;
mod fetch;
mod rename;
pub mod scan;
mod template;

pub use crate::fetch::CachingSource;
pub use crate::rename::{Operation, RenameEvent, Renamer, Summary};
pub use crate::template::{
    AgeLabels, Brackets, DEFAULT_MOVE_TEMPLATE, DEFAULT_TEMPLATE, DateFormat, FormattingPolicy, IllegalCharacters,
    Mode, NameCompiler, NameTemplate, RESERVED, TagRule, compile,
};
