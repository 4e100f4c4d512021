// ABOUTME: Logic behind the check and sanitize subcommands
// ABOUTME: Resolves policy and target option, builds reports and the settings table

use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use customizer_config::constants::{DEFAULT_LOG_FILTER, RUST_LOG};
use customizer_config::{ControlTypePolicy, CustomizerConfig};
use customizer_host::{sanitize_option_hook, theme_mods_option, ControlKind};
use customizer_settings::{RawSettingSpec, SanitizeError, SettingsBatch};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::manifest::{build_customizer, Rejection};

/// Log filter from `RUST_LOG`, falling back to the default level
pub fn log_filter() -> EnvFilter {
    EnvFilter::try_from_env(RUST_LOG).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Settings shared by every subcommand
#[derive(Debug, Clone, PartialEq)]
pub struct CommandContext {
    pub policy: ControlTypePolicy,
    pub stylesheet: String,
}

impl CommandContext {
    /// `--legacy` forces the legacy policy; otherwise the configuration decides
    pub fn resolve(legacy: bool, config: &CustomizerConfig) -> Self {
        let policy = if legacy {
            ControlTypePolicy::Legacy
        } else {
            config.control_type_policy()
        };
        debug!("Using {:?} control types for '{}'", policy, config.stylesheet);

        Self {
            policy,
            stylesheet: config.stylesheet.clone(),
        }
    }

    /// Option the host persists the sanitized values under
    pub fn option_name(&self) -> String {
        theme_mods_option(&self.stylesheet)
    }

    pub fn filter_hook(&self) -> String {
        sanitize_option_hook(&self.stylesheet)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SettingRow {
    pub id: String,
    pub control_type: String,
    pub control: &'static str,
    pub section: String,
    pub weight: Option<i64>,
}

#[derive(Debug)]
pub struct CheckReport {
    pub option: String,
    pub hook: String,
    /// Entries in the manifest, accepted or not
    pub total: usize,
    /// Accepted settings in host display order
    pub rows: Vec<SettingRow>,
    pub rejections: Vec<Rejection>,
}

impl CheckReport {
    pub fn registered(&self) -> usize {
        self.rows.len()
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_content_arrangement(ContentArrangement::Dynamic);

        table.set_header(vec!["ID", "Type", "Control", "Section", "Weight"]);

        for row in &self.rows {
            table.add_row(vec![
                row.id.clone(),
                row.control_type.clone(),
                row.control.to_string(),
                row.section.clone(),
                row.weight
                    .map(|w| w.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ]);
        }

        table
    }
}

#[derive(Debug)]
pub struct SanitizeReport {
    pub option: String,
    pub values: SettingsBatch,
    pub rejections: Vec<Rejection>,
}

pub fn control_label(kind: ControlKind) -> &'static str {
    match kind {
        ControlKind::Color => "color",
        ControlKind::FileUpload => "file upload",
        ControlKind::ImageUpload => "image upload",
        ControlKind::Generic => "generic",
    }
}

/// Register a manifest and describe what the host would render
pub fn check(specs: Vec<RawSettingSpec>, context: &CommandContext) -> CheckReport {
    let total = specs.len();
    let (customizer, rejections) = build_customizer(specs, context.policy);

    let rows = customizer
        .registry()
        .sorted_by_weight()
        .into_iter()
        .map(|setting| SettingRow {
            id: setting.id.clone(),
            control_type: setting.control_type.to_string(),
            control: control_label(ControlKind::for_type(&setting.control_type)),
            section: setting.section.clone(),
            weight: setting.weight,
        })
        .collect();

    CheckReport {
        option: context.option_name(),
        hook: context.filter_hook(),
        total,
        rows,
        rejections,
    }
}

/// Sanitize a raw value batch against a manifest
pub fn sanitize(
    specs: Vec<RawSettingSpec>,
    batch: SettingsBatch,
    context: &CommandContext,
) -> Result<SanitizeReport, SanitizeError> {
    let (customizer, rejections) = build_customizer(specs, context.policy);
    let values = customizer.sanitize(batch)?;

    Ok(SanitizeReport {
        option: context.option_name(),
        values,
        rejections,
    })
}
