// ABOUTME: Setting registration and value sanitization for theme customization panels
// ABOUTME: Registry of validated setting descriptors plus a type-keyed sanitizer

pub mod registry;
pub mod rules;
pub mod sanitize;
pub mod types;
pub mod validation;

// Re-export main types
pub use registry::SettingRegistry;
pub use sanitize::{sanitize, SanitizeError, SanitizeRule, Sanitizer};
pub use types::{
    ActiveCallback, BoxError, Choices, ControlType, InputAttrs, RawSettingSpec,
    SanitizeCallback, SettingDescriptor, SettingsBatch,
};
pub use validation::{validate_setting, RegistrationError};

// Re-export the policy so callers need not depend on the config package directly
pub use customizer_config::ControlTypePolicy;
