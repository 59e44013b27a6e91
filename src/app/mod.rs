pub mod config;
pub mod instructions;

pub use config::{language_prefix, Config, ConfigStore, ModeConfig, ModeOverrides};
