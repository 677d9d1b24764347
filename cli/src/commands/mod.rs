//! CLI command implementations

pub mod ask;

pub use ask::ask_command;
