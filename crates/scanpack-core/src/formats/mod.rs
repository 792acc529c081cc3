//! Archive format handling.

pub mod detect;
pub mod traits;

pub use detect::ArchiveFormat;
pub use detect::detect_existing_format;
pub use detect::detect_format;
pub use traits::EntrySink;
