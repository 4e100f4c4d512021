// ABOUTME: Customizer session object owning the setting registry
// ABOUTME: Registers settings and the persistence sanitization filter with the host

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use customizer_config::{ControlTypePolicy, CustomizerConfig};
use customizer_settings::{
    RawSettingSpec, RegistrationError, SanitizeError, Sanitizer, SettingRegistry, SettingsBatch,
};
use tracing::{debug, info};

use crate::adapter::{sanitize_option_hook, ControlArgs, CustomizerHost, SettingArgs};

/// Registry shared between the customizer and the filter it installs on the host
pub type SharedRegistry = Arc<RwLock<SettingRegistry>>;

/// Entry point theme code talks to.
///
/// Settings are declared with [`Customizer::add_setting`] during setup; the
/// host later calls back through [`Customizer::install`] to render controls and
/// to sanitize values before they are saved.
#[derive(Debug, Clone, Default)]
pub struct Customizer {
    registry: SharedRegistry,
    sanitizer: Arc<Sanitizer>,
}

impl Customizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: ControlTypePolicy) -> Self {
        Self {
            registry: Arc::new(RwLock::new(SettingRegistry::with_policy(policy))),
            sanitizer: Arc::new(Sanitizer::default()),
        }
    }

    pub fn from_config(config: &CustomizerConfig) -> Self {
        Self::with_policy(config.control_type_policy())
    }

    /// Replace the rule table used for built-in sanitization
    pub fn with_sanitizer(mut self, sanitizer: Sanitizer) -> Self {
        self.sanitizer = Arc::new(sanitizer);
        self
    }

    pub fn add_setting(&self, spec: RawSettingSpec) {
        self.write_registry().add_setting(spec);
    }

    pub fn register(&self, spec: RawSettingSpec) -> Result<(), RegistrationError> {
        self.write_registry().register(spec).map(|_| ())
    }

    pub fn registry(&self) -> RwLockReadGuard<'_, SettingRegistry> {
        self.registry.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_registry(&self) -> RwLockWriteGuard<'_, SettingRegistry> {
        self.registry.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn sanitize(&self, batch: SettingsBatch) -> Result<SettingsBatch, SanitizeError> {
        sanitize_shared(&self.registry, &self.sanitizer, batch)
    }

    /// Declare every registered setting and its control with the host.
    ///
    /// The registry lock is released before the host is called, so host
    /// callbacks may register further settings.
    pub fn register_settings(&self, host: &mut dyn CustomizerHost) {
        let declarations: Vec<(String, SettingArgs, ControlArgs)> = self
            .registry()
            .iter()
            .map(|(id, setting)| {
                let args = SettingArgs {
                    default: setting.default.clone(),
                };
                (id.to_string(), args, ControlArgs::from_descriptor(setting))
            })
            .collect();

        let count = declarations.len();
        for (id, args, control) in declarations {
            host.add_setting(&id, args);

            debug!("Adding {:?} control for '{}'", control.kind, id);
            host.add_control(control);
        }

        info!("Registered {} settings with host", count);
    }

    /// Hook sanitization into the host's save path for the active stylesheet
    pub fn enqueue_sanitization(&self, host: &mut dyn CustomizerHost) {
        let hook = sanitize_option_hook(&host.stylesheet());
        let registry = Arc::clone(&self.registry);
        let sanitizer = Arc::clone(&self.sanitizer);

        host.add_filter(
            &hook,
            Box::new(move |batch| sanitize_shared(&registry, &sanitizer, batch)),
        );

        info!("Installed sanitization filter on '{}'", hook);
    }

    /// Run both host integration steps
    pub fn install(&self, host: &mut dyn CustomizerHost) {
        self.register_settings(host);
        self.enqueue_sanitization(host);
    }
}

fn sanitize_shared(
    registry: &SharedRegistry,
    sanitizer: &Sanitizer,
    batch: SettingsBatch,
) -> Result<SettingsBatch, SanitizeError> {
    let registry = registry.read().unwrap_or_else(PoisonError::into_inner);
    sanitizer.sanitize(&registry, batch)
}
