//! Subcommand implementations.

pub mod checksum;
pub mod completion;
pub mod create;
pub mod list;
