//! Durable storage of the funnel and editor configuration.
//!
//! Layout in the key-value store:
//! - `funnel_config`: the funnel document plus a `schemaVersion` sentinel
//! - `editor_config`: [`EditorConfig`], round-tripped as-is
//! - `funnel_snapshot`: `{ funnel, config, timestamp }` for the rendering
//!   runtime, written best-effort
//!
//! Restoring never fails. Missing, stale or corrupt state falls back to
//! [`Funnel::starter`] and the reason is logged.

use crate::validation::Validator;
use crate::Funnel;
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

pub const FUNNEL_KEY: &str = "funnel_config";
pub const EDITOR_CONFIG_KEY: &str = "editor_config";
pub const SNAPSHOT_KEY: &str = "funnel_snapshot";

/// Version written into every stored funnel; anything else is discarded on load
pub const SCHEMA_VERSION: u64 = 2;

const SCHEMA_FIELD: &str = "schemaVersion";

/// Synchronous string key-value storage
pub trait KeyValueStore {
    /// Overwrite `key` with `json`
    fn save(&mut self, key: &str, json: &str) -> Result<()>;

    /// Stored value for `key`, `None` if never written
    fn load(&self, key: &str) -> Result<Option<String>>;
}

/// In-process store, for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn save(&mut self, key: &str, json: &str) -> Result<()> {
        self.entries.insert(key.to_string(), json.to_string());
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }
}

/// One `<key>.json` file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    root_dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `path`, creating the directory if needed
    pub fn open(path: &Path) -> Result<Self> {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create storage directory: {}", path.display()))?;

        Ok(Self {
            root_dir: path.to_path_buf(),
        })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Path of the file backing `key`
    pub fn key_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
            bail!("Invalid storage key: {:?}", key);
        }
        Ok(self.root_dir.join(format!("{}.json", key)))
    }
}

impl KeyValueStore for FileStore {
    fn save(&mut self, key: &str, json: &str) -> Result<()> {
        let path = self.key_path(key)?;
        let tmp_path = path.with_extension("json.tmp");

        // Write then rename so readers never see a half-written file
        fs::write(&tmp_path, json)
            .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &path).with_context(|| {
            format!(
                "Failed to move {} into place at {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key)?;
        if !path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Some(json))
    }
}

/// Search engine metadata of the published funnel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeoConfig {
    pub title: String,
    pub description: String,
    pub keywords: String,
}

/// Editor-level configuration stored next to the funnel
///
/// Tracking and scoring sections belong to other parts of the product and are
/// kept as opaque JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub domain: String,
    pub seo: SeoConfig,
    pub pixel: Value,
    pub utm: Value,
    pub scoring: Value,
    pub results: Value,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            domain: String::new(),
            seo: SeoConfig::default(),
            pixel: Value::Object(Map::new()),
            utm: Value::Object(Map::new()),
            scoring: Value::Object(Map::new()),
            results: Value::Object(Map::new()),
        }
    }
}

/// Combined document handed to the rendering runtime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelSnapshot {
    pub funnel: Funnel,
    pub config: EditorConfig,
    pub timestamp: DateTime<Utc>,
}

/// Why a stored funnel was rejected
#[derive(Debug, Error)]
pub enum RestoreError {
    #[error("stored funnel has schema version {found:?}, expected {}", SCHEMA_VERSION)]
    Stale { found: Option<u64> },

    #[error("stored funnel is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),

    #[error("stored funnel does not match the document shape: {0}")]
    Shape(#[source] serde_json::Error),

    #[error("stored funnel breaks document invariants: {0}")]
    Invalid(String),

    #[error("storage read failed: {0}")]
    Storage(String),
}

/// Where the restored funnel came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreSource {
    /// Loaded from the store
    Stored,
    /// Nothing stored; starter funnel
    Missing,
    /// Schema sentinel mismatch; starter funnel
    Stale,
    /// Unreadable or invalid; starter funnel
    Corrupt,
}

/// Outcome of [`restore`]
#[derive(Debug, Clone)]
pub struct Restored {
    pub funnel: Funnel,
    pub config: EditorConfig,
    pub source: RestoreSource,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VersionedFunnel<'a> {
    schema_version: u64,
    #[serde(flatten)]
    funnel: &'a Funnel,
}

/// Serialize a funnel with its schema sentinel
pub fn encode_funnel(funnel: &Funnel) -> Result<String> {
    serde_json::to_string(&VersionedFunnel {
        schema_version: SCHEMA_VERSION,
        funnel,
    })
    .context("Failed to serialize funnel")
}

/// Parse a stored funnel, checking the sentinel before the shape
pub fn decode_funnel(json: &str) -> std::result::Result<Funnel, RestoreError> {
    let mut value: Value = serde_json::from_str(json).map_err(RestoreError::Malformed)?;

    let found = value
        .as_object_mut()
        .and_then(|fields| fields.remove(SCHEMA_FIELD))
        .and_then(|v| v.as_u64());
    if found != Some(SCHEMA_VERSION) {
        return Err(RestoreError::Stale { found });
    }

    let funnel: Funnel = serde_json::from_value(value).map_err(RestoreError::Shape)?;

    let result = Validator::validate(&funnel);
    if !result.is_valid() {
        return Err(RestoreError::Invalid(result.error_summary()));
    }

    Ok(funnel)
}

/// Load the funnel and editor config, falling back to defaults
pub fn restore(store: &impl KeyValueStore) -> Restored {
    let (funnel, source) = match load_funnel(store) {
        Ok(Some(funnel)) => {
            info!(
                funnel_id = funnel.id(),
                pages = funnel.page_count(),
                "restored funnel from storage"
            );
            (funnel, RestoreSource::Stored)
        }
        Ok(None) => {
            info!("no stored funnel, starting fresh");
            (Funnel::starter(), RestoreSource::Missing)
        }
        Err(e @ RestoreError::Stale { .. }) => {
            warn!(error = %e, "discarding stale funnel");
            (Funnel::starter(), RestoreSource::Stale)
        }
        Err(e) => {
            warn!(error = %e, "discarding corrupt funnel");
            (Funnel::starter(), RestoreSource::Corrupt)
        }
    };

    let config = load_config(store).unwrap_or_else(|e| {
        warn!(error = %format!("{:#}", e), "discarding stored editor config");
        EditorConfig::default()
    });

    Restored {
        funnel,
        config,
        source,
    }
}

fn load_funnel(store: &impl KeyValueStore) -> std::result::Result<Option<Funnel>, RestoreError> {
    let json = store
        .load(FUNNEL_KEY)
        .map_err(|e| RestoreError::Storage(format!("{:#}", e)))?;
    json.map(|json| decode_funnel(&json)).transpose()
}

/// Stored editor config, default if never written
pub fn load_config(store: &impl KeyValueStore) -> Result<EditorConfig> {
    match store.load(EDITOR_CONFIG_KEY)? {
        Some(json) => serde_json::from_str(&json).context("Failed to parse editor config"),
        None => Ok(EditorConfig::default()),
    }
}

/// Write the funnel and config; the combined snapshot is best-effort
pub fn save_all(
    store: &mut impl KeyValueStore,
    funnel: &Funnel,
    config: &EditorConfig,
) -> Result<()> {
    let funnel_json = encode_funnel(funnel)?;
    let config_json =
        serde_json::to_string(config).context("Failed to serialize editor config")?;

    store
        .save(FUNNEL_KEY, &funnel_json)
        .context("Failed to save funnel")?;
    store
        .save(EDITOR_CONFIG_KEY, &config_json)
        .context("Failed to save editor config")?;

    if let Err(e) = save_snapshot(store, funnel, config) {
        warn!(error = %format!("{:#}", e), "failed to write funnel snapshot");
    }

    info!(
        funnel_id = funnel.id(),
        pages = funnel.page_count(),
        components = funnel.component_count(),
        "saved funnel"
    );
    Ok(())
}

fn save_snapshot(store: &mut impl KeyValueStore, funnel: &Funnel, config: &EditorConfig) -> Result<()> {
    let snapshot = FunnelSnapshot {
        funnel: funnel.clone(),
        config: config.clone(),
        timestamp: Utc::now(),
    };
    let json = serde_json::to_string(&snapshot).context("Failed to serialize snapshot")?;
    store.save(SNAPSHOT_KEY, &json)
}

/// The last combined snapshot, if any
pub fn load_snapshot(store: &impl KeyValueStore) -> Result<Option<FunnelSnapshot>> {
    store
        .load(SNAPSHOT_KEY)?
        .map(|json| serde_json::from_str(&json).context("Failed to parse funnel snapshot"))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Page, PageKind};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample_funnel() -> Funnel {
        Funnel::new(
            "Quiz",
            vec![
                Page::from_template(PageKind::Intro),
                Page::from_template(PageKind::Question),
                Page::from_template(PageKind::Result),
            ],
        )
    }

    #[test]
    fn test_encode_carries_sentinel() {
        let json = encode_funnel(&Funnel::starter()).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value[SCHEMA_FIELD], json!(SCHEMA_VERSION));
        assert!(value["pages"].is_array());
    }

    #[test]
    fn test_round_trip() {
        let funnel = sample_funnel();
        let decoded = decode_funnel(&encode_funnel(&funnel).unwrap()).unwrap();
        assert_eq!(decoded, funnel);
    }

    #[test]
    fn test_decode_rejects_wrong_sentinel() {
        let json = r#"{"schemaVersion":1,"id":"f","name":"Old","pages":[]}"#;
        assert!(matches!(
            decode_funnel(json),
            Err(RestoreError::Stale { found: Some(1) })
        ));

        let json = r#"{"id":"f","name":"Old","pages":[]}"#;
        assert!(matches!(
            decode_funnel(json),
            Err(RestoreError::Stale { found: None })
        ));
    }

    #[test]
    fn test_decode_rejects_empty_funnel() {
        let json = r#"{"schemaVersion":2,"id":"f","name":"Empty","pages":[]}"#;
        assert!(matches!(decode_funnel(json), Err(RestoreError::Invalid(_))));
    }

    #[test]
    fn test_decode_rejects_bad_shape() {
        let json = r#"{"schemaVersion":2,"id":"f","name":"Bad","pages":"nope"}"#;
        assert!(matches!(decode_funnel(json), Err(RestoreError::Shape(_))));

        assert!(matches!(
            decode_funnel("{not json"),
            Err(RestoreError::Malformed(_))
        ));
    }

    #[test]
    fn test_restore_missing() {
        let store = MemoryStore::new();
        let restored = restore(&store);

        assert_eq!(restored.source, RestoreSource::Missing);
        assert_eq!(restored.funnel.page_count(), 1);
        assert_eq!(restored.config, EditorConfig::default());
    }

    #[test]
    fn test_save_all_and_restore() {
        let funnel = sample_funnel();
        let config = EditorConfig {
            domain: "quiz.example.com".to_string(),
            utm: json!({ "source": "ads" }),
            ..EditorConfig::default()
        };

        let mut store = MemoryStore::new();
        save_all(&mut store, &funnel, &config).unwrap();
        assert!(store.contains(SNAPSHOT_KEY));

        let restored = restore(&store);
        assert_eq!(restored.source, RestoreSource::Stored);
        assert_eq!(restored.funnel, funnel);
        assert_eq!(restored.config, config);

        let snapshot = load_snapshot(&store).unwrap().unwrap();
        assert_eq!(snapshot.funnel, funnel);
    }

    #[test]
    fn test_corrupt_config_falls_back_independently() {
        let funnel = sample_funnel();
        let mut store = MemoryStore::new();
        save_all(&mut store, &funnel, &EditorConfig::default()).unwrap();
        store.save(EDITOR_CONFIG_KEY, "[1, 2").unwrap();

        let restored = restore(&store);
        assert_eq!(restored.source, RestoreSource::Stored);
        assert_eq!(restored.config, EditorConfig::default());
    }

    #[test]
    fn test_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(&dir.path().join("storage")).unwrap();

        assert_eq!(store.load("funnel_config").unwrap(), None);
        store.save("funnel_config", "{}").unwrap();
        assert_eq!(store.load("funnel_config").unwrap().as_deref(), Some("{}"));
        assert!(store.root_dir().join("funnel_config.json").exists());
        assert!(!store.root_dir().join("funnel_config.json.tmp").exists());

        assert!(store.save("../escape", "{}").is_err());
    }
}
