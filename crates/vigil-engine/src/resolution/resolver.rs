//! First-match-in-order resolution over a `CandidateList`.
//!
//! The list is the fallback mechanism: candidates are probed one at a time in
//! declared order, every per-candidate failure counts as "no match", and only
//! exhausting the list is an error. Nothing is cached between calls.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use vigil_common::{
    CandidateExhaustedError, CandidateList, ProbeError, ResolvedTarget, TargetMetadata,
};

pub const DEFAULT_CANDIDATE_TIMEOUT: Duration = Duration::from_secs(3);

/// Checks one candidate against the live target.
///
/// `Ok(Some(_))` is a match, `Ok(None)` is a miss and `Err` is a failed
/// probe, which the resolver treats exactly like a miss.
#[async_trait]
pub trait Probe: Send {
    async fn probe(&mut self, candidate: &str) -> Result<Option<TargetMetadata>, ProbeError>;
}

/// Adapts a plain closure into a [`Probe`].
pub struct FnProbe<F>(F);

impl<F> FnProbe<F>
where
    F: FnMut(&str) -> Result<Option<TargetMetadata>, ProbeError> + Send,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F> Probe for FnProbe<F>
where
    F: FnMut(&str) -> Result<Option<TargetMetadata>, ProbeError> + Send,
{
    async fn probe(&mut self, candidate: &str) -> Result<Option<TargetMetadata>, ProbeError> {
        (self.0)(candidate)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Resolver {
    candidate_timeout: Duration,
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(DEFAULT_CANDIDATE_TIMEOUT)
    }
}

impl Resolver {
    pub fn new(candidate_timeout: Duration) -> Self {
        Self { candidate_timeout }
    }

    pub fn candidate_timeout(&self) -> Duration {
        self.candidate_timeout
    }

    /// Resolve `list` to its first matching candidate.
    ///
    /// Worst case runs `list.len()` probes of at most `candidate_timeout`
    /// each. On failure the error carries the whole list, in order.
    pub async fn resolve<P: Probe + ?Sized>(
        &self,
        list: &CandidateList,
        probe: &mut P,
    ) -> Result<ResolvedTarget, CandidateExhaustedError> {
        for candidate in list.iter() {
            let outcome = match tokio::time::timeout(self.candidate_timeout, probe.probe(candidate))
                .await
            {
                Ok(outcome) => outcome,
                Err(_) => Err(ProbeError::Timeout(self.candidate_timeout)),
            };

            match outcome {
                Ok(Some(metadata)) => {
                    debug!(
                        "Resolved '{}' with candidate {:?}",
                        list.logical_name(),
                        candidate
                    );
                    return Ok(ResolvedTarget {
                        logical_name: list.logical_name().to_string(),
                        matched_candidate: candidate.to_string(),
                        metadata,
                    });
                }
                Ok(None) => {
                    debug!("'{}': no match for {:?}", list.logical_name(), candidate);
                }
                Err(e) => {
                    debug!(
                        "'{}': probe of {:?} failed: {}",
                        list.logical_name(),
                        candidate,
                        e
                    );
                }
            }
        }

        Err(CandidateExhaustedError::new(
            list.logical_name(),
            list.candidates().to_vec(),
        ))
    }
}
