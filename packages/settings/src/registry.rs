// ABOUTME: Registry of customizer settings keyed by setting id
// ABOUTME: Validates registrations and preserves declaration order for the host

use customizer_config::ControlTypePolicy;
use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::types::{RawSettingSpec, SettingDescriptor};
use crate::validation::{validate_setting, RegistrationError};

/// Owned mapping from setting id to its validated descriptor
#[derive(Debug, Default)]
pub struct SettingRegistry {
    settings: IndexMap<String, SettingDescriptor>,
    policy: ControlTypePolicy,
}

impl SettingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: ControlTypePolicy) -> Self {
        Self {
            settings: IndexMap::new(),
            policy,
        }
    }

    pub fn policy(&self) -> ControlTypePolicy {
        self.policy
    }

    /// Register a setting, ignoring invalid input.
    ///
    /// Rejected registrations are logged and leave the registry untouched.
    pub fn add_setting(&mut self, spec: RawSettingSpec) {
        if let Err(e) = self.register(spec) {
            warn!("Ignoring setting registration: {}", e);
        }
    }

    /// Register a setting, reporting why invalid input was rejected.
    ///
    /// Re-registering an id replaces the stored descriptor in its original position.
    pub fn register(
        &mut self,
        spec: RawSettingSpec,
    ) -> Result<&SettingDescriptor, RegistrationError> {
        let descriptor = validate_setting(spec, self.policy)?;
        let id = descriptor.id.clone();

        debug!(
            "Registering setting '{}' ({}) in section '{}'",
            id, descriptor.control_type, descriptor.section
        );

        let (index, replaced) = self.settings.insert_full(id, descriptor);
        if replaced.is_some() {
            debug!("Replaced existing setting at position {}", index);
        }

        Ok(&self.settings[index])
    }

    pub fn get(&self, id: &str) -> Option<&SettingDescriptor> {
        self.settings.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.settings.contains_key(id)
    }

    /// Iterate settings in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SettingDescriptor)> {
        self.settings.iter().map(|(id, s)| (id.as_str(), s))
    }

    /// Settings ordered by weight; unweighted settings follow weighted ones.
    /// Ties keep registration order.
    pub fn sorted_by_weight(&self) -> Vec<&SettingDescriptor> {
        let mut sorted: Vec<&SettingDescriptor> = self.settings.values().collect();
        sorted.sort_by_key(|s| (s.weight.is_none(), s.weight.unwrap_or_default()));
        sorted
    }

    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }
}
