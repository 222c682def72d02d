//! Page objects over logical elements.
//!
//! A [`Locator`] is what generated stubs hand out: a logical name plus its
//! candidates, matched one first. [`PageSession`] resolves a locator every
//! time it acts on it, so a page that re-renders between two actions is
//! handled the same way as a fresh one.

mod dashboard;
mod login;

pub use dashboard::DashboardPage;
pub use login::LoginPage;

use crate::backend::{Backend, NavigationResult};
use crate::catalog::{Catalog, CatalogEntry};
use crate::resolution::{ElementProbe, Resolver};
use crate::transport::join_url;
use thiserror::Error;
use tracing::debug;
use vigil_common::{
    BackendError, CandidateExhaustedError, CandidateList, CandidateListError, DiscoveryEntry,
    DiscoveryRecord,
};

#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    NotFound(#[from] CandidateExhaustedError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("invalid locator: {0}")]
    InvalidLocator(#[from] CandidateListError),

    #[error("no entry named '{0}' in the page description")]
    MissingEntry(String),
}

/// A logical element and the selectors that may locate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    name: String,
    candidates: Vec<String>,
    discovered: bool,
}

impl Locator {
    /// A locator whose first candidate matched during discovery.
    pub fn discovered(name: &str, candidates: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            candidates: candidates.iter().map(|c| c.to_string()).collect(),
            discovered: true,
        }
    }

    /// A locator nothing matched during discovery. Resolving it fails with
    /// the full candidate list.
    pub fn undiscovered(name: &str, candidates: &[&str]) -> Self {
        Self {
            discovered: false,
            ..Self::discovered(name, candidates)
        }
    }

    pub fn from_entry(entry: &DiscoveryEntry) -> Self {
        Self {
            name: entry.logical_name.clone(),
            candidates: entry.ordered_candidates(),
            discovered: entry.is_found(),
        }
    }

    /// A catalog entry that was never probed is tried as declared.
    pub fn from_catalog_entry(entry: &CatalogEntry) -> Self {
        Self {
            name: entry.name.clone(),
            candidates: entry.candidates.clone(),
            discovered: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn is_discovered(&self) -> bool {
        self.discovered
    }

    pub fn candidate_list(&self) -> Result<CandidateList, CandidateListError> {
        CandidateList::new(self.name.as_str(), &self.candidates)
    }
}

/// Where page objects take their locators from.
pub(crate) enum LocatorSource<'s> {
    Catalog(&'s Catalog),
    Record(&'s DiscoveryRecord),
}

impl LocatorSource<'_> {
    pub(crate) fn locator(&self, name: &str) -> Result<Locator, PageError> {
        let found = match self {
            LocatorSource::Catalog(catalog) => {
                catalog.entry(name).map(Locator::from_catalog_entry)
            }
            LocatorSource::Record(record) => record.entry(name).map(Locator::from_entry),
        };
        found.ok_or_else(|| PageError::MissingEntry(name.to_string()))
    }
}

/// One flow's exclusive handle on a page.
pub struct PageSession<'a, B: Backend + ?Sized> {
    backend: &'a mut B,
    resolver: Resolver,
    base_url: String,
}

impl<'a, B: Backend + ?Sized> PageSession<'a, B> {
    pub fn new(backend: &'a mut B, base_url: &str, resolver: Resolver) -> Self {
        Self {
            backend,
            resolver,
            base_url: base_url.to_string(),
        }
    }

    pub fn backend(&mut self) -> &mut B {
        &mut *self.backend
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Navigate to `path` relative to the session's base URL.
    pub async fn goto(&mut self, path: &str) -> Result<NavigationResult, PageError> {
        let url = join_url(&self.base_url, path);
        Ok(self.backend.navigate(&url).await?)
    }

    /// Resolve `locator` to the first candidate that is currently visible.
    pub async fn resolve(&mut self, locator: &Locator) -> Result<String, PageError> {
        let list = locator.candidate_list()?;
        if !locator.discovered {
            let tried = list.candidates().to_vec();
            return Err(CandidateExhaustedError::new(list.logical_name(), tried).into());
        }

        let wait = self.resolver.candidate_timeout();
        let mut probe = ElementProbe::visible(&mut *self.backend, wait);
        let target = self.resolver.resolve(&list, &mut probe).await?;
        debug!("'{}' -> {:?}", locator.name, target.matched_candidate);
        Ok(target.matched_candidate)
    }

    pub async fn fill(&mut self, locator: &Locator, value: &str) -> Result<(), PageError> {
        let selector = self.resolve(locator).await?;
        Ok(self.backend.fill(&selector, value).await?)
    }

    pub async fn click(&mut self, locator: &Locator) -> Result<(), PageError> {
        let selector = self.resolve(locator).await?;
        Ok(self.backend.click(&selector).await?)
    }

    pub async fn text_of(&mut self, locator: &Locator) -> Result<String, PageError> {
        let selector = self.resolve(locator).await?;
        Ok(self.backend.text_content(&selector).await?)
    }

    pub async fn value_of(&mut self, locator: &Locator) -> Result<String, PageError> {
        let selector = self.resolve(locator).await?;
        Ok(self.backend.input_value(&selector).await?)
    }

    /// `false` when no candidate is visible; backend failures still surface.
    pub async fn is_visible(&mut self, locator: &Locator) -> Result<bool, PageError> {
        match self.resolve(locator).await {
            Ok(_) => Ok(true),
            Err(PageError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    pub async fn screenshot(&mut self) -> Result<Vec<u8>, PageError> {
        Ok(self.backend.screenshot().await?)
    }
}
