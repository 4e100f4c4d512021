// ABOUTME: Sanitization dispatch for batches of setting values
// ABOUTME: Custom callbacks first, then a type-keyed rule table with a plain text fallback

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::registry::SettingRegistry;
use crate::rules;
use crate::types::{BoxError, ControlType, SettingDescriptor, SettingsBatch};

#[derive(Debug, Error)]
pub enum SanitizeError {
    #[error("Sanitize callback for setting '{id}' failed: {source}")]
    Callback {
        id: String,
        #[source]
        source: BoxError,
    },
}

/// A sanitization strategy for one control type
pub trait SanitizeRule: Send + Sync {
    fn apply(&self, raw: &Value, setting: &SettingDescriptor) -> Value;
}

impl<F> SanitizeRule for F
where
    F: Fn(&Value, &SettingDescriptor) -> Value + Send + Sync,
{
    fn apply(&self, raw: &Value, setting: &SettingDescriptor) -> Value {
        self(raw, setting)
    }
}

/// Rule table mapping control type tags to sanitization strategies
#[derive(Clone)]
pub struct Sanitizer {
    rules: HashMap<String, Arc<dyn SanitizeRule>>,
    fallback: Arc<dyn SanitizeRule>,
}

impl Default for Sanitizer {
    fn default() -> Self {
        let builtin: [(ControlType, Arc<dyn SanitizeRule>); 10] = [
            (ControlType::Checkbox, Arc::new(rules::checkbox)),
            (ControlType::Color, Arc::new(rules::color)),
            (ControlType::DropdownPages, Arc::new(rules::page_id)),
            (ControlType::File, Arc::new(rules::url)),
            (ControlType::Image, Arc::new(rules::url)),
            (ControlType::Url, Arc::new(rules::url)),
            (ControlType::Radio, Arc::new(rules::choice)),
            (ControlType::Select, Arc::new(rules::choice)),
            (ControlType::Text, Arc::new(rules::post_content)),
            (ControlType::Textarea, Arc::new(rules::post_content)),
        ];

        Self {
            rules: builtin
                .into_iter()
                .map(|(control_type, rule)| (control_type.as_str().to_string(), rule))
                .collect(),
            fallback: Arc::new(rules::text_field),
        }
    }
}

impl Sanitizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the rule for a control type tag
    pub fn with_rule<R>(mut self, control_type: impl Into<ControlType>, rule: R) -> Self
    where
        R: SanitizeRule + 'static,
    {
        let tag = control_type.into().as_str().to_string();
        self.rules.insert(tag, Arc::new(rule));
        self
    }

    /// Replace the rule used for unrecognized control types
    pub fn with_fallback<R>(mut self, rule: R) -> Self
    where
        R: SanitizeRule + 'static,
    {
        self.fallback = Arc::new(rule);
        self
    }

    pub fn rule_for(&self, control_type: &ControlType) -> &dyn SanitizeRule {
        self.rules
            .get(control_type.as_str())
            .unwrap_or(&self.fallback)
            .as_ref()
    }

    /// Sanitize a single value for a registered setting
    pub fn sanitize_value(
        &self,
        setting: &SettingDescriptor,
        raw: &Value,
    ) -> Result<Value, SanitizeError> {
        match &setting.sanitize_callback {
            Some(callback) => callback(raw).map_err(|source| {
                warn!("Sanitize callback for '{}' failed: {}", setting.id, source);
                SanitizeError::Callback {
                    id: setting.id.clone(),
                    source,
                }
            }),
            None => Ok(self.rule_for(&setting.control_type).apply(raw, setting)),
        }
    }

    /// Sanitize every registered key present in the batch.
    ///
    /// Keys the registry does not know pass through untouched. A failing custom
    /// callback aborts the whole batch.
    pub fn sanitize(
        &self,
        registry: &SettingRegistry,
        mut batch: SettingsBatch,
    ) -> Result<SettingsBatch, SanitizeError> {
        for (id, setting) in registry.iter() {
            let Some(raw) = batch.get(id) else {
                continue;
            };

            let sanitized = self.sanitize_value(setting, raw)?;
            debug!("Sanitized '{}' as {}", id, setting.control_type);
            batch.insert(id.to_string(), sanitized);
        }

        Ok(batch)
    }
}

impl fmt::Debug for Sanitizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        tags.sort_unstable();
        f.debug_struct("Sanitizer").field("rules", &tags).finish()
    }
}

/// Sanitize a batch with the built-in rule table
pub fn sanitize(
    registry: &SettingRegistry,
    batch: SettingsBatch,
) -> Result<SettingsBatch, SanitizeError> {
    Sanitizer::default().sanitize(registry, batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawSettingSpec;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn batch(value: Value) -> SettingsBatch {
        match value {
            Value::Object(map) => map,
            _ => panic!("batch must be a JSON object"),
        }
    }

    #[test]
    fn test_unregistered_keys_pass_through() {
        let mut registry = SettingRegistry::new();
        registry.add_setting(
            RawSettingSpec::new("count", "Count", "general").control_type("dropdown-pages"),
        );

        let raw = batch(json!({ "count": "7 pages", "other": "<b>raw" }));
        let out = sanitize(&registry, raw).unwrap();
        assert_eq!(out, batch(json!({ "count": 7, "other": "<b>raw" })));
    }

    #[test]
    fn test_missing_keys_are_not_added() {
        let mut registry = SettingRegistry::new();
        registry.add_setting(RawSettingSpec::new("a", "A", "general"));
        registry.add_setting(RawSettingSpec::new("b", "B", "general").control_type("checkbox"));

        let out = sanitize(&registry, batch(json!({ "b": "1" }))).unwrap();
        assert_eq!(out, batch(json!({ "b": 1 })));
    }

    #[test]
    fn test_custom_callback_takes_precedence() {
        let mut registry = SettingRegistry::new();
        registry.add_setting(
            RawSettingSpec::new("shout", "Shout", "general")
                .control_type("color")
                .sanitize_callback(|raw| {
                    Ok(Value::String(raw.as_str().unwrap_or_default().to_uppercase()))
                }),
        );

        let out = sanitize(&registry, batch(json!({ "shout": "hello" }))).unwrap();
        assert_eq!(out["shout"], json!("HELLO"));
    }

    #[test]
    fn test_custom_callback_failure_propagates() {
        let mut registry = SettingRegistry::new();
        registry.add_setting(
            RawSettingSpec::new("strict", "Strict", "general")
                .sanitize_callback(|_| Err("value rejected".into())),
        );

        let err = sanitize(&registry, batch(json!({ "strict": "x" }))).unwrap_err();
        let SanitizeError::Callback { id, source } = err;
        assert_eq!(id, "strict");
        assert_eq!(source.to_string(), "value rejected");
    }

    #[test]
    fn test_unrecognized_type_uses_text_field_rule() {
        let mut registry = SettingRegistry::new();
        registry.add_setting(
            RawSettingSpec::new("tagline", "Tagline", "general").control_type("range"),
        );

        let raw = batch(json!({ "tagline": "  <i>Just</i>\n another  site " }));
        let out = sanitize(&registry, raw).unwrap();
        assert_eq!(out["tagline"], json!("Just another site"));
    }

    #[test]
    fn test_rule_table_is_extensible() {
        let mut registry = SettingRegistry::new();
        registry.add_setting(
            RawSettingSpec::new("volume", "Volume", "audio").control_type("range"),
        );
        registry.add_setting(RawSettingSpec::new("title", "Title", "general"));

        let sanitizer = Sanitizer::new()
            .with_rule("range", |raw: &Value, _: &SettingDescriptor| {
                Value::from(rules::intval(raw).clamp(0, 100))
            })
            .with_rule("text", rules::text_field);

        let out = sanitizer
            .sanitize(&registry, batch(json!({ "volume": "250", "title": "<b>Hi</b>" })))
            .unwrap();
        assert_eq!(out, batch(json!({ "volume": 100, "title": "Hi" })));
    }

    #[test]
    fn test_file_image_url_share_url_rule() {
        let mut registry = SettingRegistry::new();
        for (id, tag) in [("logo", "image"), ("font", "file"), ("home", "url")] {
            registry.add_setting(RawSettingSpec::new(id, id, "media").control_type(tag));
        }

        let out = sanitize(
            &registry,
            batch(json!({
                "logo": "example.com/logo.png",
                "font": "javascript:alert(1)",
                "home": "https://example.org/"
            })),
        )
        .unwrap();

        assert_eq!(
            out,
            batch(json!({
                "logo": "http://example.com/logo.png",
                "font": "",
                "home": "https://example.org/"
            }))
        );
    }

    #[test]
    fn test_debug_lists_rule_tags() {
        let rendered = format!("{:?}", Sanitizer::default());
        assert!(rendered.contains("dropdown-pages"));
        assert!(rendered.contains("textarea"));
    }
}
