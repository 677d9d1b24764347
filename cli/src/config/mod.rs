//! Configuration handling for the CLI

pub mod loader;

pub use loader::CliConfigLoader;
