//! Hierarchical configuration loader with precedence
//!
//! Loads configuration from multiple sources with the following precedence (low to high):
//! 1. Embedded defaults (built into binary)
//! 2. User config (~/.lifeline/config.yaml), or an explicit file
//! 3. Environment variables (LIFELINE_* prefix)
//! 4. CLI flags (handled by caller)

use crate::error::{Error, Result};
use crate::types::RuntimeConfig;
use camino::{Utf8Path, Utf8PathBuf};
use rust_embed::RustEmbed;
use serde_yaml_ng::Value;
use std::env;
use std::fs;
use tracing::debug;

/// Embedded configuration files
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../embedded/config/"]
#[prefix = ""]
struct EmbeddedConfigs;

const DEFAULTS_FILE: &str = "lifeline-defaults.yaml";
const USER_CONFIG_FILE: &str = "config.yaml";

/// Configuration hierarchy loader
pub struct HierarchicalConfigLoader {
    /// Base directory for configuration files
    config_dir: Utf8PathBuf,
}

impl HierarchicalConfigLoader {
    /// Create a loader rooted at ~/.lifeline
    pub fn new() -> Result<Self> {
        let home = crate::utils::get_home_dir()?;
        Ok(Self {
            config_dir: home.join(".lifeline"),
        })
    }

    /// Create a loader with a custom config directory
    pub fn with_dir(config_dir: Utf8PathBuf) -> Self {
        Self { config_dir }
    }

    /// Load runtime configuration, layering the user config file if it exists
    pub fn load_runtime_config(&self) -> Result<RuntimeConfig> {
        let mut layered = Self::load_embedded_defaults()?;

        let user_config = self.config_dir.join(USER_CONFIG_FILE);
        if user_config.exists() {
            debug!("Layering user config: {}", user_config);
            merge_values(&mut layered, Self::load_yaml_value(&user_config)?);
        }

        self.finish(layered)
    }

    /// Load runtime configuration, layering an explicit file that must exist
    pub fn load_runtime_config_from(&self, path: &Utf8Path) -> Result<RuntimeConfig> {
        if !path.exists() {
            return Err(Error::config_not_found(path.as_str()));
        }

        let mut layered = Self::load_embedded_defaults()?;
        debug!("Layering config file: {}", path);
        merge_values(&mut layered, Self::load_yaml_value(path)?);

        self.finish(layered)
    }

    fn finish(&self, layered: Value) -> Result<RuntimeConfig> {
        let config: RuntimeConfig = serde_yaml_ng::from_value(layered)
            .map_err(|e| Error::invalid_config(format!("Failed to parse configuration: {}", e)))?;
        let config = self.apply_env_overrides(config)?;
        validate(&config)?;
        Ok(config)
    }

    /// Load the embedded defaults as an untyped YAML tree
    fn load_embedded_defaults() -> Result<Value> {
        let embedded_file = EmbeddedConfigs::get(DEFAULTS_FILE).ok_or_else(|| {
            Error::config_not_found(format!("Embedded config not found: {}", DEFAULTS_FILE))
        })?;

        let content = std::str::from_utf8(&embedded_file.data).map_err(|_| {
            Error::invalid_config(format!("Invalid UTF-8 in embedded config: {}", DEFAULTS_FILE))
        })?;

        serde_yaml_ng::from_str(content).map_err(|e| {
            Error::invalid_config(format!(
                "Failed to parse embedded config {}: {}",
                DEFAULTS_FILE, e
            ))
        })
    }

    fn load_yaml_value(path: &Utf8Path) -> Result<Value> {
        let content = fs::read_to_string(path)?;
        let value: Value = serde_yaml_ng::from_str(&content)
            .map_err(|e| Error::invalid_config(format!("Failed to parse {}: {}", path, e)))?;
        Ok(value)
    }

    /// Apply environment variable overrides to runtime config
    fn apply_env_overrides(&self, mut config: RuntimeConfig) -> Result<RuntimeConfig> {
        if let Ok(val) = env::var("LIFELINE_CATALOG_URL") {
            config.catalog.url = val;
        }

        if let Ok(val) = env::var("LIFELINE_REGISTRY_TAGS_URL") {
            config.registry.tags_url = val;
        }

        if let Ok(val) = env::var("LIFELINE_REGISTRY_FORMAT") {
            config.registry.format = val.parse().map_err(Error::invalid_config)?;
        }

        if let Ok(val) = env::var("LIFELINE_REGISTRY_TOKEN") {
            config.registry.token = Some(val);
        }

        if let Ok(val) = env::var("LIFELINE_IMAGE") {
            config.registry.image = val;
        }

        if let Ok(val) = env::var("LIFELINE_EOL_TABLE") {
            config.policy.eol_table = val;
        }

        if let Ok(val) = env::var("LIFELINE_MINIMUM_SUPPORT_DAYS") {
            config.policy.minimum_support_days = val.parse().map_err(|_| {
                Error::invalid_config("LIFELINE_MINIMUM_SUPPORT_DAYS must be a valid number")
            })?;
        }

        if let Ok(val) = env::var("LIFELINE_HTTP_TIMEOUT_SECS") {
            config.network.http_timeout_secs = val.parse().map_err(|_| {
                Error::invalid_config("LIFELINE_HTTP_TIMEOUT_SECS must be a valid number")
            })?;
        }

        Ok(config)
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }
}

/// Reject configurations the resolver cannot run with
pub fn validate(config: &RuntimeConfig) -> Result<()> {
    if config.policy.minimum_support_days == 0 {
        return Err(Error::invalid_config(
            "policy.minimum-support-days must be greater than zero",
        ));
    }
    if config.network.http_timeout_secs == 0 {
        return Err(Error::invalid_config(
            "network.http-timeout-secs must be greater than zero",
        ));
    }
    if config.catalog.url.trim().is_empty() {
        return Err(Error::invalid_config("catalog.url must not be empty"));
    }
    if config.registry.tags_url.trim().is_empty() {
        return Err(Error::invalid_config("registry.tags-url must not be empty"));
    }
    if config.registry.image.trim().is_empty() {
        return Err(Error::invalid_config("registry.image must not be empty"));
    }
    Ok(())
}

/// Deep-merge `overlay` into `base`; mappings merge key by key, everything else replaces
fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(base_value) => merge_values(base_value, overlay_value),
                    None => {
                        base_map.insert(key, overlay_value);
                    }
                }
            }
        }
        (_, Value::Null) => {}
        (base, overlay) => *base = overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TagListingFormat;
    use serial_test::serial;
    use tempfile::TempDir;

    fn create_temp_loader() -> (HierarchicalConfigLoader, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_dir =
            Utf8PathBuf::from_path_buf(temp_dir.path().to_path_buf()).expect("Invalid UTF-8 path");
        let loader = HierarchicalConfigLoader::with_dir(config_dir);
        (loader, temp_dir)
    }

    #[test]
    #[serial]
    fn test_load_runtime_config_defaults() {
        let (loader, _temp) = create_temp_loader();
        let config = loader.load_runtime_config().unwrap();
        assert_eq!(config.policy.minimum_support_days, 180);
        assert_eq!(config.registry.image, "quay.io/astronomer/ap-airflow");
        assert_eq!(config.registry.format, TagListingFormat::KeyMap);
    }

    #[test]
    #[serial]
    fn test_user_config_overrides_only_given_keys() {
        let (loader, _temp) = create_temp_loader();

        let config_content = r#"
registry:
  image: "registry.internal/mirror/ap-airflow"
policy:
  minimum-support-days: 365
"#;
        fs::write(loader.config_dir().join("config.yaml"), config_content).unwrap();

        let config = loader.load_runtime_config().unwrap();
        assert_eq!(config.registry.image, "registry.internal/mirror/ap-airflow");
        assert_eq!(config.policy.minimum_support_days, 365);
        assert_eq!(
            config.registry.tags_url,
            "https://quay.io/v1/repositories/astronomer/ap-airflow/tags"
        );
        assert_eq!(config.policy.eol_table, "enterprise_support_data.json");
    }

    #[test]
    #[serial]
    fn test_explicit_file_must_exist() {
        let (loader, temp) = create_temp_loader();
        let missing = Utf8PathBuf::from_path_buf(temp.path().join("nope.yaml")).unwrap();

        let err = loader.load_runtime_config_from(&missing).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { .. }));
    }

    #[test]
    #[serial]
    fn test_explicit_file_is_layered() {
        let (loader, temp) = create_temp_loader();
        let path = Utf8PathBuf::from_path_buf(temp.path().join("custom.yaml")).unwrap();
        fs::write(&path, "catalog:\n  url: \"http://localhost:9000/catalog\"\n").unwrap();

        let config = loader.load_runtime_config_from(&path).unwrap();
        assert_eq!(config.catalog.url, "http://localhost:9000/catalog");
        assert_eq!(config.catalog.releases_key, "available_releases");
    }

    #[test]
    #[serial]
    fn test_invalid_yaml_is_config_error() {
        let (loader, _temp) = create_temp_loader();
        fs::write(loader.config_dir().join("config.yaml"), "policy: [unclosed").unwrap();

        let err = loader.load_runtime_config().unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        let (loader, _temp) = create_temp_loader();

        env::set_var("LIFELINE_MINIMUM_SUPPORT_DAYS", "30");
        env::set_var("LIFELINE_REGISTRY_FORMAT", "distribution");
        env::set_var("LIFELINE_IMAGE", "localhost:5000/airflow");

        let config = loader.load_runtime_config();

        env::remove_var("LIFELINE_MINIMUM_SUPPORT_DAYS");
        env::remove_var("LIFELINE_REGISTRY_FORMAT");
        env::remove_var("LIFELINE_IMAGE");

        let config = config.unwrap();
        assert_eq!(config.policy.minimum_support_days, 30);
        assert_eq!(config.registry.format, TagListingFormat::Distribution);
        assert_eq!(config.registry.image, "localhost:5000/airflow");
    }

    #[test]
    #[serial]
    fn test_env_override_rejects_garbage() {
        let (loader, _temp) = create_temp_loader();

        env::set_var("LIFELINE_HTTP_TIMEOUT_SECS", "soon");
        let result = loader.load_runtime_config();
        env::remove_var("LIFELINE_HTTP_TIMEOUT_SECS");

        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn test_validate_rejects_zero_support_days() {
        let mut config = RuntimeConfig::default();
        config.policy.minimum_support_days = 0;
        assert!(validate(&config).is_err());

        config.policy.minimum_support_days = 1;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_merge_values_is_deep() {
        let mut base: Value =
            serde_yaml_ng::from_str("a:\n  b: 1\n  c: 2\nd: 3\n").unwrap();
        let overlay: Value = serde_yaml_ng::from_str("a:\n  c: 20\ne: 5\n").unwrap();
        merge_values(&mut base, overlay);

        let expected: Value =
            serde_yaml_ng::from_str("a:\n  b: 1\n  c: 20\nd: 3\ne: 5\n").unwrap();
        assert_eq!(base, expected);
    }

    #[test]
    fn test_merge_ignores_empty_overlay() {
        let mut base: Value = serde_yaml_ng::from_str("a: 1\n").unwrap();
        merge_values(&mut base, Value::Null);
        assert_eq!(base, serde_yaml_ng::from_str::<Value>("a: 1\n").unwrap());
    }
}
