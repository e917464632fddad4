//! Library interface for the layoutgen CLI

pub mod commands;
pub mod config;

pub use config::{ProjectConfig, CONFIG_FILE_NAME};
