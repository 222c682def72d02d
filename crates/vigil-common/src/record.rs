//! Discovery records: the audit artifact of one discovery run.

use crate::candidates::CandidateList;
use crate::target::{ElementRole, EndpointStatus, HttpMethod, TargetMetadata};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceKind {
    Ui,
    Api,
}

/// One HTTP call made while probing an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointAttempt {
    /// Path template as declared, before placeholder expansion.
    pub path: String,
    pub method: HttpMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub status_class: EndpointStatus,
    pub elapsed_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryEntry {
    pub logical_name: String,
    pub role: ElementRole,
    /// The full candidate list as declared, in declared order.
    pub candidates: Vec<String>,
    pub matched: Option<String>,
    /// Every declared candidate except the matched one, in declared order.
    #[serde(default)]
    pub fallbacks: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<TargetMetadata>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attempts: Vec<EndpointAttempt>,
}

impl DiscoveryEntry {
    pub fn found(
        list: &CandidateList,
        role: ElementRole,
        matched: &str,
        metadata: TargetMetadata,
    ) -> Self {
        Self {
            logical_name: list.logical_name().to_string(),
            role,
            candidates: list.candidates().to_vec(),
            matched: Some(matched.to_string()),
            fallbacks: list
                .candidates()
                .iter()
                .filter(|c| c.as_str() != matched)
                .cloned()
                .collect(),
            metadata: Some(metadata),
            attempts: Vec::new(),
        }
    }

    pub fn not_found(list: &CandidateList, role: ElementRole) -> Self {
        Self {
            logical_name: list.logical_name().to_string(),
            role,
            candidates: list.candidates().to_vec(),
            matched: None,
            fallbacks: list.candidates().to_vec(),
            metadata: None,
            attempts: Vec::new(),
        }
    }

    pub fn with_attempts(mut self, attempts: Vec<EndpointAttempt>) -> Self {
        self.attempts = attempts;
        self
    }

    pub fn is_found(&self) -> bool {
        self.matched.is_some()
    }

    /// Candidates in resolution order: matched first, then the fallbacks.
    pub fn ordered_candidates(&self) -> Vec<String> {
        match &self.matched {
            Some(matched) => std::iter::once(matched.clone())
                .chain(self.fallbacks.iter().cloned())
                .collect(),
            None => self.candidates.clone(),
        }
    }
}

/// Result of one discovery run over a page or API surface.
///
/// Written once as the audit artifact and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryRecord {
    pub discovered_at: DateTime<Utc>,
    pub surface: String,
    pub base_url: String,
    pub kind: SurfaceKind,
    pub entries: Vec<DiscoveryEntry>,
}

impl DiscoveryRecord {
    pub fn new(
        surface: impl Into<String>,
        base_url: impl Into<String>,
        kind: SurfaceKind,
        entries: Vec<DiscoveryEntry>,
    ) -> Self {
        Self {
            discovered_at: Utc::now(),
            surface: surface.into(),
            base_url: base_url.into(),
            kind,
            entries,
        }
    }

    pub fn entry(&self, logical_name: &str) -> Option<&DiscoveryEntry> {
        self.entries.iter().find(|e| e.logical_name == logical_name)
    }

    pub fn unmatched(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| !e.is_found())
            .map(|e| e.logical_name.as_str())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.entries.iter().all(DiscoveryEntry::is_found)
    }
}
