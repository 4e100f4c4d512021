// ABOUTME: Library side of the customizer CLI
// ABOUTME: Manifest loading and subcommand logic shared by the binary and its tests

pub mod commands;
pub mod manifest;

pub use commands::{
    check, log_filter, sanitize, CheckReport, CommandContext, SanitizeReport, SettingRow,
};
pub use manifest::{build_customizer, load_batch, load_manifest, ManifestError, Rejection};
