//! Host integration tests driven by a recording host

use std::collections::HashMap;

use customizer_host::{
    ControlArgs, ControlKind, Customizer, CustomizerHost, OptionFilter, SettingArgs,
};
use customizer_settings::{ControlType, RawSettingSpec, SettingsBatch};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

/// Host that records every call the customizer makes
#[derive(Default)]
struct RecordingHost {
    stylesheet: String,
    settings: Vec<(String, SettingArgs)>,
    controls: Vec<ControlArgs>,
    filters: HashMap<String, OptionFilter>,
}

impl RecordingHost {
    fn new(stylesheet: &str) -> Self {
        Self {
            stylesheet: stylesheet.to_string(),
            ..Default::default()
        }
    }

    /// Simulate the host saving its theme option
    fn save(&self, option: &str, batch: SettingsBatch) -> SettingsBatch {
        let hook = format!("sanitize_option_{}", option);
        match self.filters.get(&hook) {
            Some(filter) => filter(batch).expect("filter should succeed"),
            None => batch,
        }
    }
}

impl CustomizerHost for RecordingHost {
    fn stylesheet(&self) -> String {
        self.stylesheet.clone()
    }

    fn add_setting(&mut self, id: &str, args: SettingArgs) {
        self.settings.push((id.to_string(), args));
    }

    fn add_control(&mut self, control: ControlArgs) {
        self.controls.push(control);
    }

    fn add_filter(&mut self, hook: &str, filter: OptionFilter) {
        self.filters.insert(hook.to_string(), filter);
    }
}

fn batch(value: Value) -> SettingsBatch {
    match value {
        Value::Object(map) => map,
        _ => panic!("batch must be a JSON object"),
    }
}

fn theme_customizer() -> Customizer {
    let customizer = Customizer::new();
    customizer.add_setting(
        RawSettingSpec::new("header_color", "Header Color", "colors")
            .control_type("color")
            .default_value("#ffffff")
            .weight(10),
    );
    customizer.add_setting(
        RawSettingSpec::new("logo", "Logo", "branding")
            .control_type("image")
            .description("Shown in the header"),
    );
    customizer.add_setting(
        RawSettingSpec::new("font_file", "Font File", "typography").control_type("file"),
    );
    customizer.add_setting(
        RawSettingSpec::new("layout", "Layout", "general")
            .control_type("select")
            .choices([("wide", "Wide"), ("narrow", "Narrow")])
            .input_attr("data-preview", true),
    );
    customizer.add_setting(
        RawSettingSpec::new("footer_text", "Footer Text", "general")
            .control_type("textarea")
            .active_callback(|| false),
    );
    customizer
}

#[test]
fn test_register_settings_adds_setting_and_control_per_descriptor() {
    let customizer = theme_customizer();
    let mut host = RecordingHost::new("twentyfourteen");

    customizer.register_settings(&mut host);

    let ids: Vec<&str> = host.settings.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["header_color", "logo", "font_file", "layout", "footer_text"]
    );
    assert_eq!(host.settings[0].1.default, Some(json!("#ffffff")));
    assert_eq!(host.settings[1].1.default, None);

    let kinds: Vec<ControlKind> = host.controls.iter().map(|c| c.kind).collect();
    assert_eq!(
        kinds,
        vec![
            ControlKind::Color,
            ControlKind::ImageUpload,
            ControlKind::FileUpload,
            ControlKind::Generic,
            ControlKind::Generic,
        ]
    );

    let header = &host.controls[0];
    assert_eq!(header.label, "Header Color");
    assert_eq!(header.section, "colors");
    assert_eq!(header.priority, Some(10));
    assert_eq!(header.settings, "header_color");

    let logo = &host.controls[1];
    assert_eq!(logo.description.as_deref(), Some("Shown in the header"));

    let layout = &host.controls[3];
    assert_eq!(layout.control_type, Some(ControlType::Select));
    assert_eq!(layout.choices.len(), 2);
    assert_eq!(layout.input_attrs["data-preview"], json!(true));

    let footer = &host.controls[4];
    assert_eq!(footer.control_type, Some(ControlType::Textarea));
    assert!(!footer.is_active());
}

#[test]
fn test_enqueue_sanitization_uses_stylesheet_option() {
    let customizer = theme_customizer();
    let mut host = RecordingHost::new("twentyfourteen");

    customizer.enqueue_sanitization(&mut host);

    assert_eq!(host.filters.len(), 1);
    assert!(host
        .filters
        .contains_key("sanitize_option_theme_mods_twentyfourteen"));
}

#[test]
fn test_installed_filter_sanitizes_on_save() {
    let customizer = theme_customizer();
    let mut host = RecordingHost::new("twentyfourteen");
    customizer.install(&mut host);

    let saved = host.save(
        "theme_mods_twentyfourteen",
        batch(json!({
            "header_color": "red",
            "layout": "wide",
            "footer_text": "<script>x</script>&copy; <b>Me",
            "nav_menu_locations": { "primary": 3 }
        })),
    );

    assert_eq!(
        saved,
        batch(json!({
            "header_color": null,
            "layout": "wide",
            "footer_text": "© <b>Me</b>",
            "nav_menu_locations": { "primary": 3 }
        }))
    );
}

#[test]
fn test_filter_sees_settings_added_after_install() {
    let customizer = Customizer::new();
    let mut host = RecordingHost::new("child-theme");
    customizer.enqueue_sanitization(&mut host);

    customizer.add_setting(
        RawSettingSpec::new("posts_page", "Posts Page", "reading").control_type("dropdown-pages"),
    );

    let saved = host.save("theme_mods_child-theme", batch(json!({ "posts_page": "12" })));
    assert_eq!(saved, batch(json!({ "posts_page": 12 })));
}

#[test]
fn test_other_stylesheet_is_not_filtered() {
    let customizer = theme_customizer();
    let mut host = RecordingHost::new("twentyfourteen");
    customizer.install(&mut host);

    let raw = batch(json!({ "header_color": "red" }));
    let saved = host.save("theme_mods_twentyfifteen", raw.clone());
    assert_eq!(saved, raw);
}
