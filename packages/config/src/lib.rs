// ABOUTME: Configuration and environment variable management for the customizer
// ABOUTME: Decides which control types the host framework can render

pub mod config;
pub mod constants;

pub use config::{ConfigError, ControlTypePolicy, CustomizerConfig, HostVersion};
