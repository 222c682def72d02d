use super::Catalog;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;
use vigil_common::CandidateListError;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Glob pattern error: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error("Glob iteration error: {0}")]
    Glob(#[from] glob::GlobError),
    #[error("Duplicate logical name in catalog: {0}")]
    DuplicateName(String),
    #[error("Invalid candidate list: {0}")]
    Candidates(#[from] CandidateListError),
    #[error("Invalid catalog: {0}")]
    Invalid(String),
    #[error("Catalog directory not found: {0}")]
    DirectoryNotFound(PathBuf),
}

pub struct CatalogLoader;

impl CatalogLoader {
    pub async fn load_from(path: &Path) -> Result<Catalog, CatalogError> {
        let content = tokio::fs::read_to_string(path).await?;
        let catalog: Catalog = serde_yaml::from_str(&content)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load every `*.yaml` / `*.yml` catalog in `dir`, sorted by file name.
    ///
    /// Files that fail to parse or validate are skipped with a warning.
    pub async fn load_dir(dir: &Path) -> Result<Vec<Catalog>, CatalogError> {
        if !dir.is_dir() {
            return Err(CatalogError::DirectoryNotFound(dir.to_path_buf()));
        }

        let mut paths = Vec::new();
        for pattern in ["*.yaml", "*.yml"] {
            let full_pattern = dir.join(pattern);
            let pattern_str = full_pattern.to_str().ok_or(CatalogError::Pattern(
                glob::PatternError {
                    pos: 0,
                    msg: "Invalid UTF-8 path",
                },
            ))?;
            for entry in glob::glob(pattern_str)? {
                let entry_path = entry?;
                if entry_path.is_file() {
                    paths.push(entry_path);
                }
            }
        }
        paths.sort();

        let mut catalogs = Vec::new();
        for path in paths {
            match Self::load_from(&path).await {
                Ok(catalog) => catalogs.push(catalog),
                Err(e) => warn!("Skipping invalid catalog {}: {}", path.display(), e),
            }
        }
        Ok(catalogs)
    }
}
