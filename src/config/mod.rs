// src/config/mod.rs
mod models;

pub use models::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a file (YAML or JSON)
pub async fn load_config<P: AsRef<Path>>(path: P) -> Result<HealthConfig> {
    let path = path.as_ref();
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let config: HealthConfig = match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str(&contents).context("Failed to parse YAML config")?
        }
        _ => serde_json::from_str(&contents).context("Failed to parse JSON config")?,
    };

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    fn write_config(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_load_yaml() {
        let file = write_config(
            ".yaml",
            "default_timeout_ms: 1000\nreject_duplicate_names: true\nprobes:\n  db:\n    timeout_ms: 250\n",
        );

        let config = load_config(file.path()).await.unwrap();

        assert!(config.reject_duplicate_names);
        assert_eq!(config.timeout_for("db"), Some(Duration::from_millis(250)));
        assert_eq!(config.timeout_for("cache"), Some(Duration::from_secs(1)));
    }

    #[tokio::test]
    async fn test_load_json() {
        let file = write_config(".json", r#"{ "probes": { "db": {} } }"#);

        let config = load_config(file.path()).await.unwrap();

        assert_eq!(config.default_timeout(), None);
        assert_eq!(config.timeout_for("db"), None);
        assert!(!config.reject_duplicate_names);
    }

    #[tokio::test]
    async fn test_load_rejects_zero_timeout() {
        let file = write_config(".yml", "probes:\n  db:\n    timeout_ms: 0\n");

        let err = load_config(file.path()).await.unwrap_err();

        assert_eq!(
            err.downcast_ref::<ConfigError>(),
            Some(&ConfigError::ZeroProbeTimeout("db".to_string()))
        );
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        assert!(load_config("/nonexistent/health.yaml").await.is_err());
    }

    #[test]
    fn test_validate() {
        let mut config = HealthConfig {
            default_timeout_ms: Some(0),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroDefaultTimeout));

        config.default_timeout_ms = Some(5);
        config.probes.insert(" ".to_string(), ProbeConfig::default());
        assert_eq!(config.validate(), Err(ConfigError::EmptyProbeName));
    }
}
