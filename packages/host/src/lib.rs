// ABOUTME: Host framework adapter for the customizer
// ABOUTME: Surfaces registered settings as controls and sanitizes values before persistence

pub mod adapter;
pub mod customizer;

pub use adapter::{
    sanitize_option_hook, theme_mods_option, ControlArgs, ControlKind, CustomizerHost,
    OptionFilter, SettingArgs,
};
pub use customizer::{Customizer, SharedRegistry};
