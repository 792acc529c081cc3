//! Archive inspection without extraction.
//!
//! Used by the builder to read back suspiciously small archives, and by
//! callers that want to check packaged content without walking the
//! filesystem again.

pub mod list;

pub use list::list_entries;
pub use list::list_entries_as;
