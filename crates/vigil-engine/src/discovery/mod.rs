//! Discovery runs: probe a live surface against a catalog and record what
//! was found.
//!
//! A run always covers every catalog entry. Unmatched entries are recorded
//! as not found; only problems with the run itself (wrong catalog kind, a
//! page that cannot be opened) abort it.

use crate::backend::Backend;
use crate::catalog::{Catalog, CatalogError};
use crate::config::VigilConfig;
use crate::resolution::endpoint_probe::endpoint_metadata;
use crate::resolution::{AuthPolicy, ElementProbe, EndpointProbe, Resolver};
use crate::transport::{HttpTransport, join_url};
use thiserror::Error;
use tracing::{info, warn};
use vigil_common::{
    BackendError, DiscoveryEntry, DiscoveryRecord, ElementRole, EndpointAttempt, EndpointStatus,
    HttpMethod, SurfaceKind, TargetMetadata,
};

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("catalog '{surface}' is a {found:?} catalog, expected {expected:?}")]
    WrongKind {
        surface: String,
        expected: SurfaceKind,
        found: SurfaceKind,
    },

    #[error("could not open page for '{surface}': {source}")]
    Navigation {
        surface: String,
        #[source]
        source: BackendError,
    },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

pub struct Prober {
    resolver: Resolver,
    verbs: Vec<HttpMethod>,
    policy: AuthPolicy,
}

impl Prober {
    pub fn new(resolver: Resolver, verbs: Vec<HttpMethod>, policy: AuthPolicy) -> Self {
        Self {
            resolver,
            verbs,
            policy,
        }
    }

    pub fn from_config(config: &VigilConfig) -> Self {
        Self::new(
            Resolver::new(config.resolver.candidate_timeout()),
            config.discovery.verbs.clone(),
            config.auth_policy.clone(),
        )
    }

    /// Probe every element of a UI catalog for existence.
    pub async fn discover_ui<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
        base_url: &str,
        catalog: &Catalog,
    ) -> Result<DiscoveryRecord, DiscoveryError> {
        expect_kind(catalog, SurfaceKind::Ui)?;
        catalog.validate()?;

        let page_url = match &catalog.path {
            Some(path) => join_url(base_url, path),
            None => base_url.to_string(),
        };
        info!("Discovering '{}' at {}", catalog.surface, page_url);
        backend
            .navigate(&page_url)
            .await
            .map_err(|source| DiscoveryError::Navigation {
                surface: catalog.surface.clone(),
                source,
            })?;

        let wait = self.resolver.candidate_timeout();
        let mut entries = Vec::with_capacity(catalog.entries.len());
        for entry in &catalog.entries {
            let list = entry.candidate_list().map_err(CatalogError::from)?;
            let mut probe = ElementProbe::attached(&mut *backend, wait);
            match self.resolver.resolve(&list, &mut probe).await {
                Ok(target) => {
                    let role = entry.role.unwrap_or_else(|| match target.element() {
                        Some(meta) => meta.role(),
                        None => ElementRole::Text,
                    });
                    info!(
                        "  {} -> {:?} ({:?})",
                        entry.name, target.matched_candidate, role
                    );
                    entries.push(DiscoveryEntry::found(
                        &list,
                        role,
                        &target.matched_candidate,
                        target.metadata,
                    ));
                }
                Err(e) => {
                    info!("  {} -> not found", entry.name);
                    tracing::debug!("{}", e);
                    entries.push(DiscoveryEntry::not_found(
                        &list,
                        entry.role.unwrap_or(ElementRole::Text),
                    ));
                }
            }
        }

        let record = DiscoveryRecord::new(&catalog.surface, page_url, SurfaceKind::Ui, entries);
        log_summary(&record);
        Ok(record)
    }

    /// Call every path template of an API catalog with every configured verb.
    ///
    /// Attempts are independent: a failed call never stops the sweep.
    pub async fn discover_api<T: HttpTransport + ?Sized>(
        &self,
        transport: &T,
        base_url: &str,
        catalog: &Catalog,
        bearer: Option<&str>,
    ) -> Result<DiscoveryRecord, DiscoveryError> {
        expect_kind(catalog, SurfaceKind::Api)?;
        catalog.validate()?;
        info!(
            "Discovering '{}' at {} with {:?}",
            catalog.surface, base_url, self.verbs
        );

        let probes: Vec<EndpointProbe<'_, T>> = self
            .verbs
            .iter()
            .map(|verb| {
                EndpointProbe::new(transport, base_url, *verb, &self.policy).with_bearer(bearer)
            })
            .collect();

        let mut entries = Vec::with_capacity(catalog.entries.len());
        for entry in &catalog.entries {
            let list = entry.candidate_list().map_err(CatalogError::from)?;

            let mut attempts = Vec::new();
            for candidate in list.iter() {
                for probe in &probes {
                    attempts.push(probe.attempt(candidate).await);
                }
            }

            let found = list.iter().find_map(|candidate| {
                self.select_attempt(&attempts, candidate)
                    .map(|(attempt, requires_auth)| (candidate, attempt, requires_auth))
            });

            let discovery_entry = match found {
                Some((candidate, attempt, requires_auth)) => {
                    info!(
                        "  {} -> {} {} (status {:?}, auth: {})",
                        entry.name, attempt.method, candidate, attempt.status, requires_auth
                    );
                    let metadata =
                        TargetMetadata::Endpoint(endpoint_metadata(attempt, requires_auth));
                    DiscoveryEntry::found(&list, ElementRole::Endpoint, candidate, metadata)
                }
                None => {
                    info!("  {} -> absent", entry.name);
                    DiscoveryEntry::not_found(&list, ElementRole::Endpoint)
                }
            };
            entries.push(discovery_entry.with_attempts(attempts));
        }

        let record = DiscoveryRecord::new(&catalog.surface, base_url, SurfaceKind::Api, entries);
        log_summary(&record);
        Ok(record)
    }

    /// The first attempt on `path`, in verb order, that the policy accepts,
    /// plus whether any verb on that path demanded authorization.
    fn select_attempt<'r>(
        &self,
        attempts: &'r [EndpointAttempt],
        path: &str,
    ) -> Option<(&'r EndpointAttempt, bool)> {
        let on_path = || attempts.iter().filter(move |a| a.path == path);
        let chosen = on_path().find(|a| self.policy.counts_as_existing(a.status_class))?;
        let requires_auth = on_path().any(|a| a.status_class == EndpointStatus::AuthRequired);
        Some((chosen, requires_auth))
    }
}

fn expect_kind(catalog: &Catalog, expected: SurfaceKind) -> Result<(), DiscoveryError> {
    if catalog.kind != expected {
        return Err(DiscoveryError::WrongKind {
            surface: catalog.surface.clone(),
            expected,
            found: catalog.kind,
        });
    }
    Ok(())
}

fn log_summary(record: &DiscoveryRecord) {
    let unmatched = record.unmatched();
    if unmatched.is_empty() {
        info!(
            "Discovery of '{}' matched all {} entries",
            record.surface,
            record.entries.len()
        );
    } else {
        warn!(
            "Discovery of '{}' left {} of {} entries unmatched: {:?}",
            record.surface,
            unmatched.len(),
            record.entries.len(),
            unmatched
        );
    }
}
