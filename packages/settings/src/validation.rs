// ABOUTME: Registration validation for customizer settings
// ABOUTME: Turns loosely-typed registration input into a validated descriptor

use customizer_config::ControlTypePolicy;
use thiserror::Error;

use crate::types::{ControlType, RawSettingSpec, SettingDescriptor};

#[derive(Debug, Error, PartialEq)]
pub enum RegistrationError {
    #[error("Setting is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Setting '{id}' of type '{control_type}' requires at least one choice")]
    MissingChoices {
        id: String,
        control_type: ControlType,
    },
}

/// Validate a registration and build the descriptor that will be stored.
///
/// `id`, `label` and `section` must be present and non-blank. The control type
/// defaults to `text`, is coerced to `text` under the legacy policy when the host
/// cannot render it, and radio/select settings must carry a choice set.
pub fn validate_setting(
    spec: RawSettingSpec,
    policy: ControlTypePolicy,
) -> Result<SettingDescriptor, RegistrationError> {
    let id = require(spec.id, "id")?;
    let label = require(spec.label, "label")?;
    let section = require(spec.section, "section")?;

    let mut control_type = spec.control_type.unwrap_or_default();
    if policy == ControlTypePolicy::Legacy && !control_type.is_legacy_safe() {
        tracing::debug!(
            "Coercing setting '{}' from '{}' to 'text' for legacy host",
            id,
            control_type
        );
        control_type = ControlType::Text;
    }

    let choices = spec.choices.unwrap_or_default();
    if control_type.requires_choices() && choices.is_empty() {
        return Err(RegistrationError::MissingChoices { id, control_type });
    }

    Ok(SettingDescriptor {
        id,
        label,
        section,
        control_type,
        choices,
        default: spec.default,
        description: spec.description,
        active_callback: spec.active_callback,
        input_attrs: spec.input_attrs.unwrap_or_default(),
        weight: spec.weight,
        sanitize_callback: spec.sanitize_callback,
    })
}

fn require(value: Option<String>, field: &'static str) -> Result<String, RegistrationError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(RegistrationError::MissingField(field))
}
