// ABOUTME: Environment variable name constants
// ABOUTME: Centralized definitions of all environment variable names used by the customizer

// Host Framework Compatibility
pub const CUSTOMIZER_HOST_VERSION: &str = "CUSTOMIZER_HOST_VERSION";
pub const CUSTOMIZER_LEGACY_CONTROL_TYPES: &str = "CUSTOMIZER_LEGACY_CONTROL_TYPES";

// Theme Identification
pub const CUSTOMIZER_STYLESHEET: &str = "CUSTOMIZER_STYLESHEET";

// Logging
pub const RUST_LOG: &str = "RUST_LOG";

/// Log filter used when `RUST_LOG` is unset or invalid
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Stylesheet assumed when none is configured
pub const DEFAULT_STYLESHEET: &str = "default";

/// First host release (major, minor) that supports every control type
pub const MIN_MODERN_HOST_VERSION: (u32, u32) = (4, 0);
