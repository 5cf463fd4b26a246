use crate::compat::CompatibilityTable;
use anyhow::{Context, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable naming a YAML config file.
pub const CONFIG_ENV: &str = "TYPEFLUX_CONFIG";

/// Settings shared by every node built from this configuration.
///
/// ```yaml
/// compatibility_groups:
///   ImageArtifact: [ImageArtifact, ImageUrlArtifact]
///   ImageUrlArtifact: [ImageArtifact, ImageUrlArtifact]
/// default_condition: false
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TypeFluxConfig {
    /// Kinds treated as interchangeable when locking node types.
    #[serde(default)]
    pub compatibility_groups: CompatibilityTable,
    /// Condition used by an `IfElse` node whose `evaluate` input is unconnected.
    #[serde(default)]
    pub default_condition: bool,
}

impl Default for TypeFluxConfig {
    fn default() -> Self {
        Self {
            compatibility_groups: CompatibilityTable::default(),
            default_condition: false,
        }
    }
}

impl TypeFluxConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse TypeFlux config")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config = Self::from_yaml_str(&content)
            .with_context(|| format!("Failed to parse YAML: {:?}", path))?;
        tracing::info!(path = ?path, groups = config.compatibility_groups.len(), "Loaded config");
        Ok(config)
    }

    /// Loads the file named by `TYPEFLUX_CONFIG`, or the defaults when it is unset.
    pub fn from_env() -> Result<Self> {
        match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::load(path),
            Err(_) => {
                tracing::debug!("{} not set, using default config", CONFIG_ENV);
                Ok(Self::default())
            }
        }
    }

    /// JSON schema of the config file, for editor tooling.
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(TypeFluxConfig)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeTag;
    use std::io::Write;

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = TypeFluxConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, TypeFluxConfig::default());
    }

    #[test]
    fn test_custom_groups_replace_defaults() {
        let yaml = r#"
compatibility_groups:
  str: [str, prompt]
  prompt: [str, prompt]
default_condition: true
"#;
        let config = TypeFluxConfig::from_yaml_str(yaml).unwrap();
        assert!(config.default_condition);
        let table = &config.compatibility_groups;
        assert!(table.compatible(&TypeTag::new("str"), &TypeTag::new("prompt")));
        assert!(!table.compatible(
            &TypeTag::new("ImageArtifact"),
            &TypeTag::new("ImageUrlArtifact")
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "default_condition: true").unwrap();

        let config = TypeFluxConfig::load(file.path()).unwrap();
        assert!(config.default_condition);
        assert_eq!(config.compatibility_groups, CompatibilityTable::artifacts());
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = TypeFluxConfig::load("/nonexistent/typeflux.yaml").unwrap_err();
        assert!(format!("{:#}", err).contains("typeflux.yaml"));
    }

    #[test]
    fn test_schema_lists_fields() {
        let schema = serde_json::to_value(TypeFluxConfig::schema()).unwrap();
        let props = &schema["properties"];
        assert!(props.get("compatibility_groups").is_some());
        assert!(props.get("default_condition").is_some());
    }
}
