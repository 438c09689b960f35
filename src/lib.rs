#![warn(clippy::all, rust_2018_idioms)]

pub mod config;
pub mod emulator;

pub use config::{ConfigError, EmulatorConfig};
pub use emulator::Emulator;
