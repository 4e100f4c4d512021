// ABOUTME: Type definitions for customizer settings
// ABOUTME: Control types, raw registration input and validated setting descriptors

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Batch of setting values keyed by setting id, as handed over by the host before persistence
pub type SettingsBatch = Map<String, Value>;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Visibility predicate evaluated by the host when rendering a control
pub type ActiveCallback = Arc<dyn Fn() -> bool + Send + Sync>;

/// Caller-supplied sanitizer used instead of the built-in rule for the setting's type
pub type SanitizeCallback = Arc<dyn Fn(&Value) -> Result<Value, BoxError> + Send + Sync>;

/// Choice value -> choice label, in declaration order
pub type Choices = IndexMap<String, String>;

/// Auxiliary attributes passed through to the rendered input element
pub type InputAttrs = IndexMap<String, Value>;

/// Control type tag declared for a setting
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ControlType {
    Checkbox,
    Color,
    DropdownPages,
    File,
    Image,
    Radio,
    Select,
    #[default]
    Text,
    Textarea,
    Url,
    /// Unrecognized tag, sanitized as a generic text field
    Other(String),
}

impl ControlType {
    pub fn as_str(&self) -> &str {
        match self {
            ControlType::Checkbox => "checkbox",
            ControlType::Color => "color",
            ControlType::DropdownPages => "dropdown-pages",
            ControlType::File => "file",
            ControlType::Image => "image",
            ControlType::Radio => "radio",
            ControlType::Select => "select",
            ControlType::Text => "text",
            ControlType::Textarea => "textarea",
            ControlType::Url => "url",
            ControlType::Other(tag) => tag,
        }
    }

    /// Radio and select settings are meaningless without a choice set
    pub fn requires_choices(&self) -> bool {
        matches!(self, ControlType::Radio | ControlType::Select)
    }

    /// Types every host release can render
    pub fn is_legacy_safe(&self) -> bool {
        matches!(
            self,
            ControlType::Checkbox
                | ControlType::Color
                | ControlType::DropdownPages
                | ControlType::File
                | ControlType::Image
                | ControlType::Radio
                | ControlType::Select
                | ControlType::Text
        )
    }
}

impl From<&str> for ControlType {
    fn from(tag: &str) -> Self {
        match tag {
            "checkbox" => ControlType::Checkbox,
            "color" => ControlType::Color,
            "dropdown-pages" => ControlType::DropdownPages,
            "file" => ControlType::File,
            "image" => ControlType::Image,
            "radio" => ControlType::Radio,
            "select" => ControlType::Select,
            "text" => ControlType::Text,
            "textarea" => ControlType::Textarea,
            "url" => ControlType::Url,
            other => ControlType::Other(other.to_string()),
        }
    }
}

impl From<String> for ControlType {
    fn from(tag: String) -> Self {
        ControlType::from(tag.as_str())
    }
}

impl From<ControlType> for String {
    fn from(control_type: ControlType) -> Self {
        control_type.as_str().to_string()
    }
}

impl fmt::Display for ControlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registration input as declared by theme code or a JSON manifest.
///
/// Every field is optional here; [`crate::validation::validate_setting`] decides
/// whether the input describes a usable setting.
#[derive(Clone, Default, Deserialize)]
pub struct RawSettingSpec {
    pub id: Option<String>,
    pub label: Option<String>,
    pub section: Option<String>,
    #[serde(rename = "type")]
    pub control_type: Option<ControlType>,
    pub choices: Option<Choices>,
    pub default: Option<Value>,
    pub description: Option<String>,
    #[serde(alias = "atts")]
    pub input_attrs: Option<InputAttrs>,
    pub weight: Option<i64>,
    #[serde(skip)]
    pub active_callback: Option<ActiveCallback>,
    #[serde(skip)]
    pub sanitize_callback: Option<SanitizeCallback>,
}

impl RawSettingSpec {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        section: impl Into<String>,
    ) -> Self {
        Self {
            id: Some(id.into()),
            label: Some(label.into()),
            section: Some(section.into()),
            ..Default::default()
        }
    }

    pub fn control_type(mut self, control_type: impl Into<ControlType>) -> Self {
        self.control_type = Some(control_type.into());
        self
    }

    /// Append one entry to the choice set
    pub fn choice(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.choices
            .get_or_insert_with(Choices::new)
            .insert(value.into(), label.into());
        self
    }

    pub fn choices<I, K, V>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.choices = Some(
            choices
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn input_attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.input_attrs
            .get_or_insert_with(InputAttrs::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn weight(mut self, weight: i64) -> Self {
        self.weight = Some(weight);
        self
    }

    pub fn active_callback<F>(mut self, f: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.active_callback = Some(Arc::new(f));
        self
    }

    pub fn sanitize_callback<F>(mut self, f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, BoxError> + Send + Sync + 'static,
    {
        self.sanitize_callback = Some(Arc::new(f));
        self
    }
}

impl fmt::Debug for RawSettingSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawSettingSpec")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("section", &self.section)
            .field("control_type", &self.control_type)
            .field("choices", &self.choices)
            .field("default", &self.default)
            .field("description", &self.description)
            .field("input_attrs", &self.input_attrs)
            .field("weight", &self.weight)
            .field("active_callback", &self.active_callback.is_some())
            .field("sanitize_callback", &self.sanitize_callback.is_some())
            .finish()
    }
}

/// Validated, normalized representation of a registered setting
#[derive(Clone)]
pub struct SettingDescriptor {
    pub id: String,
    pub label: String,
    pub section: String,
    pub control_type: ControlType,
    pub choices: Choices,
    pub default: Option<Value>,
    pub description: Option<String>,
    pub active_callback: Option<ActiveCallback>,
    pub input_attrs: InputAttrs,
    pub weight: Option<i64>,
    pub sanitize_callback: Option<SanitizeCallback>,
}

impl SettingDescriptor {
    /// Evaluate the visibility predicate; settings without one are always active
    pub fn is_active(&self) -> bool {
        self.active_callback.as_ref().map_or(true, |cb| cb())
    }
}

impl fmt::Debug for SettingDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingDescriptor")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("section", &self.section)
            .field("control_type", &self.control_type)
            .field("choices", &self.choices)
            .field("default", &self.default)
            .field("description", &self.description)
            .field("active_callback", &self.active_callback.is_some())
            .field("input_attrs", &self.input_attrs)
            .field("weight", &self.weight)
            .field("sanitize_callback", &self.sanitize_callback.is_some())
            .finish()
    }
}
