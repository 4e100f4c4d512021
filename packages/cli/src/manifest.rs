// ABOUTME: Loading of JSON setting manifests and raw value batches
// ABOUTME: Builds a customizer from a manifest and reports rejected entries

use std::fs;
use std::path::{Path, PathBuf};

use customizer_config::ControlTypePolicy;
use customizer_host::Customizer;
use customizer_settings::{RawSettingSpec, RegistrationError, SettingsBatch};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Expected a JSON object of setting values in {0}")]
    NotAnObject(PathBuf),
}

/// A manifest entry the registry refused
#[derive(Debug, PartialEq)]
pub struct Rejection {
    /// Zero-based position in the manifest
    pub index: usize,
    pub id: Option<String>,
    pub error: RegistrationError,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ManifestError> {
    let content = fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| ManifestError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a manifest: a JSON array of setting declarations.
///
/// Choices and input attributes keep the order they are written in.
pub fn load_manifest(path: &Path) -> Result<Vec<RawSettingSpec>, ManifestError> {
    read_json(path)
}

/// Load a batch of raw setting values: a JSON object keyed by setting id
pub fn load_batch(path: &Path) -> Result<SettingsBatch, ManifestError> {
    match read_json::<Value>(path)? {
        Value::Object(map) => Ok(map),
        _ => Err(ManifestError::NotAnObject(path.to_path_buf())),
    }
}

/// Register every manifest entry, collecting the ones that were rejected
pub fn build_customizer(
    specs: Vec<RawSettingSpec>,
    policy: ControlTypePolicy,
) -> (Customizer, Vec<Rejection>) {
    let customizer = Customizer::with_policy(policy);
    let mut rejections = Vec::new();

    for (index, spec) in specs.into_iter().enumerate() {
        let id = spec.id.clone();
        if let Err(error) = customizer.register(spec) {
            warn!("Manifest entry {} rejected: {}", index, error);
            rejections.push(Rejection { index, id, error });
        }
    }

    (customizer, rejections)
}
