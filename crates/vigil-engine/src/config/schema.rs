use crate::resolution::AuthPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use vigil_common::HttpMethod;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VigilConfig {
    #[serde(default)]
    pub target: TargetConfig,
    #[serde(default)]
    pub credentials: Credentials,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub auth_policy: AuthPolicy,
    #[serde(default)]
    pub issue_tracker: IssueTrackerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    #[serde(default = "default_ui_base_url")]
    pub ui_base_url: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            ui_base_url: default_ui_base_url(),
            api_base_url: default_api_base_url(),
        }
    }
}

fn default_ui_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_api_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &redacted(&self.password))
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Upper bound for one UI candidate check.
    #[serde(default = "default_candidate_timeout_ms")]
    pub candidate_timeout_ms: u64,
    /// Per-request timeout for HTTP probes and API calls.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            candidate_timeout_ms: default_candidate_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl ResolverConfig {
    pub fn candidate_timeout(&self) -> Duration {
        Duration::from_millis(self.candidate_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn default_candidate_timeout_ms() -> u64 {
    3000
}

fn default_request_timeout_ms() -> u64 {
    5000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_verbs")]
    pub verbs: Vec<HttpMethod>,
    /// Extra catalogs loaded on top of the built-in ones.
    #[serde(default)]
    pub catalog_dir: Option<PathBuf>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            verbs: default_verbs(),
            catalog_dir: None,
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./generated")
}

fn default_verbs() -> Vec<HttpMethod> {
    vec![HttpMethod::Get, HttpMethod::Post]
}

#[derive(Clone, Serialize, Deserialize)]
pub struct IssueTrackerConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub api_token: String,
    #[serde(default)]
    pub project_key: String,
    #[serde(default = "default_issue_type")]
    pub issue_type: String,
    #[serde(default = "default_screenshot_dir")]
    pub screenshot_dir: PathBuf,
}

impl Default for IssueTrackerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: String::new(),
            email: String::new(),
            api_token: String::new(),
            project_key: String::new(),
            issue_type: default_issue_type(),
            screenshot_dir: default_screenshot_dir(),
        }
    }
}

impl fmt::Debug for IssueTrackerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssueTrackerConfig")
            .field("enabled", &self.enabled)
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .field("api_token", &redacted(&self.api_token))
            .field("project_key", &self.project_key)
            .field("issue_type", &self.issue_type)
            .field("screenshot_dir", &self.screenshot_dir)
            .finish()
    }
}

fn default_issue_type() -> String {
    "Bug".to_string()
}

fn default_screenshot_dir() -> PathBuf {
    PathBuf::from("./screenshots")
}

fn redacted(secret: &str) -> &'static str {
    if secret.is_empty() { "" } else { "[redacted]" }
}
