// ABOUTME: Interface the host customization framework implements
// ABOUTME: Setting and control arguments, control kind selection and option hook names

use customizer_settings::{
    ActiveCallback, Choices, ControlType, InputAttrs, SanitizeError, SettingDescriptor,
    SettingsBatch,
};
use serde::Serialize;
use serde_json::Value;

/// Filter invoked by the host with the full option batch right before it is persisted
pub type OptionFilter =
    Box<dyn Fn(SettingsBatch) -> Result<SettingsBatch, SanitizeError> + Send + Sync>;

/// Host framework capabilities the customizer calls into
pub trait CustomizerHost {
    /// Identifier of the active theme stylesheet
    fn stylesheet(&self) -> String;

    fn add_setting(&mut self, id: &str, args: SettingArgs);

    fn add_control(&mut self, control: ControlArgs);

    fn add_filter(&mut self, hook: &str, filter: OptionFilter);
}

/// Name of the option the host persists theme settings under
pub fn theme_mods_option(stylesheet: &str) -> String {
    format!("theme_mods_{}", stylesheet)
}

/// Filter hook run by the host before persisting the theme settings option
pub fn sanitize_option_hook(stylesheet: &str) -> String {
    format!("sanitize_option_{}", theme_mods_option(stylesheet))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SettingArgs {
    pub default: Option<Value>,
}

/// Widget the host renders for a setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ControlKind {
    Color,
    FileUpload,
    ImageUpload,
    /// Host's built-in control, selected by the type tag
    Generic,
}

impl ControlKind {
    pub fn for_type(control_type: &ControlType) -> Self {
        match control_type {
            ControlType::Color => ControlKind::Color,
            ControlType::File => ControlKind::FileUpload,
            ControlType::Image => ControlKind::ImageUpload,
            _ => ControlKind::Generic,
        }
    }
}

/// Everything the host needs to render one control
#[derive(Clone)]
pub struct ControlArgs {
    pub id: String,
    pub kind: ControlKind,
    pub label: String,
    pub section: String,
    pub description: Option<String>,
    pub input_attrs: InputAttrs,
    pub priority: Option<i64>,
    pub active_callback: Option<ActiveCallback>,
    /// Setting the control edits
    pub settings: String,
    /// Only set for generic controls
    pub control_type: Option<ControlType>,
    /// Only populated for generic controls
    pub choices: Choices,
}

impl ControlArgs {
    pub fn from_descriptor(setting: &SettingDescriptor) -> Self {
        let kind = ControlKind::for_type(&setting.control_type);
        let generic = kind == ControlKind::Generic;

        Self {
            id: setting.id.clone(),
            kind,
            label: setting.label.clone(),
            section: setting.section.clone(),
            description: setting.description.clone(),
            input_attrs: setting.input_attrs.clone(),
            priority: setting.weight,
            active_callback: setting.active_callback.clone(),
            settings: setting.id.clone(),
            control_type: generic.then(|| setting.control_type.clone()),
            choices: if generic {
                setting.choices.clone()
            } else {
                Choices::new()
            },
        }
    }

    pub fn is_active(&self) -> bool {
        self.active_callback.as_ref().map_or(true, |cb| cb())
    }
}

impl std::fmt::Debug for ControlArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlArgs")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("label", &self.label)
            .field("section", &self.section)
            .field("description", &self.description)
            .field("input_attrs", &self.input_attrs)
            .field("priority", &self.priority)
            .field("active_callback", &self.active_callback.is_some())
            .field("settings", &self.settings)
            .field("control_type", &self.control_type)
            .field("choices", &self.choices)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use customizer_settings::{validate_setting, ControlTypePolicy, RawSettingSpec};

    fn descriptor(spec: RawSettingSpec) -> SettingDescriptor {
        validate_setting(spec, ControlTypePolicy::Modern).unwrap()
    }

    #[test]
    fn test_hook_names() {
        assert_eq!(theme_mods_option("twentyfourteen"), "theme_mods_twentyfourteen");
        assert_eq!(
            sanitize_option_hook("twentyfourteen"),
            "sanitize_option_theme_mods_twentyfourteen"
        );
    }

    #[test]
    fn test_control_kind_mapping() {
        assert_eq!(ControlKind::for_type(&ControlType::Color), ControlKind::Color);
        assert_eq!(ControlKind::for_type(&ControlType::File), ControlKind::FileUpload);
        assert_eq!(ControlKind::for_type(&ControlType::Image), ControlKind::ImageUpload);
        assert_eq!(ControlKind::for_type(&ControlType::Select), ControlKind::Generic);
        assert_eq!(ControlKind::for_type(&ControlType::Url), ControlKind::Generic);
        assert_eq!(
            ControlKind::for_type(&ControlType::from("range")),
            ControlKind::Generic
        );
    }

    #[test]
    fn test_generic_control_carries_choices_and_type() {
        let setting = descriptor(
            RawSettingSpec::new("layout", "Layout", "general")
                .control_type("select")
                .choice("wide", "Wide")
                .description("Page width")
                .weight(5),
        );

        let control = ControlArgs::from_descriptor(&setting);
        assert_eq!(control.kind, ControlKind::Generic);
        assert_eq!(control.control_type, Some(ControlType::Select));
        assert_eq!(control.choices.get("wide").map(String::as_str), Some("Wide"));
        assert_eq!(control.priority, Some(5));
        assert_eq!(control.description.as_deref(), Some("Page width"));
        assert_eq!(control.settings, "layout");
        assert!(control.is_active());
    }

    #[test]
    fn test_specialized_control_omits_choices() {
        let setting = descriptor(
            RawSettingSpec::new("logo", "Logo", "branding")
                .control_type("image")
                .choice("unused", "Unused")
                .active_callback(|| false),
        );

        let control = ControlArgs::from_descriptor(&setting);
        assert_eq!(control.kind, ControlKind::ImageUpload);
        assert_eq!(control.control_type, None);
        assert!(control.choices.is_empty());
        assert!(!control.is_active());
    }
}
