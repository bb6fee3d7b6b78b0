//! Command line interface

pub mod commands;
pub mod display;
pub mod tools;

pub use self::commands::{CliArgs, Commands};
