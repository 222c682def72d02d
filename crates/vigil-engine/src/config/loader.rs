use super::schema::VigilConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from default locations:
    /// 1. ./vigil.yaml
    /// 2. ~/.vigil/config.yaml
    /// 3. Default configuration
    ///
    /// Environment overrides are applied on top in every case.
    pub async fn load_default() -> Result<VigilConfig, ConfigError> {
        let local_config = PathBuf::from("./vigil.yaml");
        if local_config.exists() {
            return Self::load_from(&local_config).await;
        }

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".vigil").join("config.yaml");
            if home_config.exists() {
                return Self::load_from(&home_config).await;
            }
        }

        let mut config = VigilConfig::default();
        apply_env_overrides(&mut config, |key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub async fn load_from(path: &Path) -> Result<VigilConfig, ConfigError> {
        debug!("Loading config from {}", path.display());
        let content = tokio::fs::read_to_string(path).await?;
        let mut config: VigilConfig = serde_yaml::from_str(&content)?;
        apply_env_overrides(&mut config, |key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }
}

/// Overlay named environment values onto `config`.
///
/// `lookup` is `std::env::var` in production; tests pass a map.
pub fn apply_env_overrides<F>(config: &mut VigilConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let set = |target: &mut String, key: &str| {
        if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
            *target = value;
        }
    };

    set(&mut config.target.ui_base_url, "VIGIL_UI_BASE_URL");
    set(&mut config.target.api_base_url, "VIGIL_API_BASE_URL");
    set(&mut config.credentials.email, "VIGIL_TEST_EMAIL");
    set(&mut config.credentials.password, "VIGIL_TEST_PASSWORD");
    set(&mut config.issue_tracker.base_url, "VIGIL_JIRA_URL");
    set(&mut config.issue_tracker.email, "VIGIL_JIRA_EMAIL");
    set(&mut config.issue_tracker.api_token, "VIGIL_JIRA_API_TOKEN");
    set(&mut config.issue_tracker.project_key, "VIGIL_JIRA_PROJECT_KEY");

    if let Some(flag) = lookup("VIGIL_FILE_TICKETS") {
        config.issue_tracker.enabled = is_truthy(&flag);
    }
    if let Some(dir) = lookup("VIGIL_OUTPUT_DIR").filter(|v| !v.is_empty()) {
        config.discovery.output_dir = PathBuf::from(dir);
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

impl VigilConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("target.ui_base_url", &self.target.ui_base_url),
            ("target.api_base_url", &self.target.api_base_url),
        ] {
            url::Url::parse(value)
                .map_err(|e| ConfigError::Invalid(format!("{} '{}': {}", name, value, e)))?;
        }
        if self.resolver.candidate_timeout_ms == 0 || self.resolver.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeouts must be non-zero".into()));
        }
        if self.discovery.verbs.is_empty() {
            return Err(ConfigError::Invalid(
                "discovery.verbs must name at least one method".into(),
            ));
        }
        let tracker = &self.issue_tracker;
        if tracker.enabled && (tracker.base_url.is_empty() || tracker.project_key.is_empty()) {
            return Err(ConfigError::Invalid(
                "issue_tracker.enabled requires base_url and project_key".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use vigil_common::HttpMethod;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = VigilConfig::default();
        config.validate().unwrap();
        assert_eq!(config.resolver.candidate_timeout_ms, 3000);
        assert_eq!(config.discovery.verbs, vec![HttpMethod::Get, HttpMethod::Post]);
        assert_eq!(config.auth_policy.auth_statuses, vec![401, 403]);
        assert!(!config.issue_tracker.enabled);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = VigilConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                ("VIGIL_UI_BASE_URL", "https://staging.example.com"),
                ("VIGIL_TEST_PASSWORD", "hunter2"),
                ("VIGIL_FILE_TICKETS", "yes"),
                ("VIGIL_JIRA_URL", "https://example.atlassian.net"),
                ("VIGIL_JIRA_PROJECT_KEY", "QA"),
                ("VIGIL_OUTPUT_DIR", "/tmp/out"),
            ]),
        );
        assert_eq!(config.target.ui_base_url, "https://staging.example.com");
        assert_eq!(config.credentials.password, "hunter2");
        assert!(config.issue_tracker.enabled);
        assert_eq!(config.discovery.output_dir, PathBuf::from("/tmp/out"));
        config.validate().unwrap();
        assert!(!format!("{:?}", config.credentials).contains("hunter2"));
    }

    #[test]
    fn test_enabled_tracker_requires_project() {
        let mut config = VigilConfig::default();
        apply_env_overrides(&mut config, env(&[("VIGIL_FILE_TICKETS", "1")]));
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_parse_partial_yaml() {
        let yaml = r#"
target:
  api_base_url: "http://api.local:8080"
resolver:
  candidate_timeout_ms: 1500
discovery:
  verbs: [GET, POST, DELETE]
auth_policy:
  auth_implies_existence: false
"#;
        let config: VigilConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.target.api_base_url, "http://api.local:8080");
        assert_eq!(config.target.ui_base_url, "http://localhost:3000");
        assert_eq!(config.resolver.candidate_timeout_ms, 1500);
        assert_eq!(config.resolver.request_timeout_ms, 5000);
        assert_eq!(config.discovery.verbs.len(), 3);
        assert!(!config.auth_policy.auth_implies_existence);
        assert_eq!(config.auth_policy.not_found_statuses, vec![404, 410]);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = VigilConfig::default();
        config.resolver.candidate_timeout_ms = 0;
        assert!(config.validate().is_err());
    }
}
