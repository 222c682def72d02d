//! Catalogs of logical targets to discover on one page or API surface.

pub mod builtin;
pub mod loader;

pub use loader::{CatalogError, CatalogLoader};

use serde::{Deserialize, Serialize};
use vigil_common::{CandidateList, CandidateListError, ElementRole, SurfaceKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    /// Declared role; inferred from the matched element when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<ElementRole>,
    pub candidates: Vec<String>,
}

impl CatalogEntry {
    pub fn new(name: &str, role: Option<ElementRole>, candidates: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            role,
            candidates: candidates.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// An API entry whose only candidate is its own path.
    pub fn path(path: &str) -> Self {
        Self::new(path, Some(ElementRole::Endpoint), &[path])
    }

    pub fn candidate_list(&self) -> Result<CandidateList, CandidateListError> {
        CandidateList::new(self.name.as_str(), &self.candidates)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub surface: String,
    pub kind: SurfaceKind,
    /// Page path relative to the UI base URL, navigated to before probing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(surface: &str, kind: SurfaceKind, path: Option<&str>) -> Self {
        Self {
            surface: surface.to_string(),
            kind,
            path: path.map(str::to_string),
            entries: Vec::new(),
        }
    }

    pub fn with_entry(mut self, entry: CatalogEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// API catalog with one entry per path template.
    pub fn from_paths(surface: &str, paths: &[&str]) -> Self {
        paths.iter().fold(
            Self::new(surface, SurfaceKind::Api, None),
            |catalog, path| catalog.with_entry(CatalogEntry::path(path)),
        )
    }

    pub fn entry(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Reject duplicate names and empty candidate lists.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.surface.trim().is_empty() {
            return Err(CatalogError::Invalid("catalog has no surface name".into()));
        }
        let mut seen: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if seen.contains(&entry.name.as_str()) {
                return Err(CatalogError::DuplicateName(entry.name.clone()));
            }
            seen.push(&entry.name);
            entry.candidate_list()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_duplicates() {
        let catalog = Catalog::new("login", SurfaceKind::Ui, Some("/login"))
            .with_entry(CatalogEntry::new("email", None, &["#email"]))
            .with_entry(CatalogEntry::new("email", None, &["#mail"]));
        assert!(matches!(
            catalog.validate(),
            Err(CatalogError::DuplicateName(name)) if name == "email"
        ));
    }

    #[test]
    fn test_validate_rejects_empty_candidates() {
        let catalog = Catalog::new("login", SurfaceKind::Ui, None)
            .with_entry(CatalogEntry::new("email", None, &[]));
        assert!(matches!(
            catalog.validate(),
            Err(CatalogError::Candidates(_))
        ));
    }

    #[test]
    fn test_from_paths() {
        let catalog = Catalog::from_paths("auth", &["/auth/login", "/auth/logout"]);
        assert_eq!(catalog.kind, SurfaceKind::Api);
        assert_eq!(catalog.entries.len(), 2);
        assert_eq!(catalog.entries[1].name, "/auth/logout");
        assert_eq!(catalog.entries[1].candidates, vec!["/auth/logout"]);
        assert!(catalog.validate().is_ok());
    }
}
