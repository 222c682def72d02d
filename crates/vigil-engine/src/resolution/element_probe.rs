use super::resolver::Probe;
use crate::backend::{Backend, ElementState};
use async_trait::async_trait;
use std::time::Duration;
use vigil_common::{ProbeError, TargetMetadata};

/// Probes UI candidates against a live page.
pub struct ElementProbe<'a, B: Backend + ?Sized> {
    backend: &'a mut B,
    state: ElementState,
    wait: Duration,
}

impl<'a, B: Backend + ?Sized> ElementProbe<'a, B> {
    pub fn new(backend: &'a mut B, state: ElementState, wait: Duration) -> Self {
        Self {
            backend,
            state,
            wait,
        }
    }

    /// Existence only, as used during discovery.
    pub fn attached(backend: &'a mut B, wait: Duration) -> Self {
        Self::new(backend, ElementState::Attached, wait)
    }

    pub fn visible(backend: &'a mut B, wait: Duration) -> Self {
        Self::new(backend, ElementState::Visible, wait)
    }
}

#[async_trait]
impl<'a, B: Backend + ?Sized> Probe for ElementProbe<'a, B> {
    async fn probe(&mut self, candidate: &str) -> Result<Option<TargetMetadata>, ProbeError> {
        let found = self
            .backend
            .query_element(candidate, self.state, self.wait)
            .await?;
        Ok(found.map(TargetMetadata::Element))
    }
}
