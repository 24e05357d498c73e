//! CLI utilities and helpers

pub mod args;
pub mod error;
pub mod setup;

pub use args::build_cli;
