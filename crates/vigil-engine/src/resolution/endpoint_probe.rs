use super::policy::AuthPolicy;
use super::resolver::Probe;
use crate::transport::{HttpRequest, HttpTransport, join_url};
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;
use std::time::Instant;
use tracing::debug;
use vigil_common::{
    EndpointAttempt, EndpointMetadata, EndpointStatus, HttpMethod, ProbeError, TargetMetadata,
};

/// Value substituted for `{param}` segments when probing a template.
pub const PLACEHOLDER_VALUE: &str = "1";

/// Fill `{param}` segments of a path template with a placeholder value.
pub fn expand_template(template: &str) -> String {
    static PARAM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{[^{}/]+\}").unwrap());
    PARAM_RE
        .replace_all(template, PLACEHOLDER_VALUE)
        .into_owned()
}

/// Probes API path templates with one HTTP method.
pub struct EndpointProbe<'a, T: HttpTransport + ?Sized> {
    transport: &'a T,
    base_url: &'a str,
    method: HttpMethod,
    policy: &'a AuthPolicy,
    bearer: Option<&'a str>,
}

impl<'a, T: HttpTransport + ?Sized> EndpointProbe<'a, T> {
    pub fn new(
        transport: &'a T,
        base_url: &'a str,
        method: HttpMethod,
        policy: &'a AuthPolicy,
    ) -> Self {
        Self {
            transport,
            base_url,
            method,
            policy,
            bearer: None,
        }
    }

    pub fn with_bearer(mut self, token: Option<&'a str>) -> Self {
        self.bearer = token;
        self
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Issue one request and classify it. Never fails: a transport error is
    /// recorded as `Unreachable`.
    pub async fn attempt(&self, path_template: &str) -> EndpointAttempt {
        let url = join_url(self.base_url, &expand_template(path_template));
        let mut request = HttpRequest::new(self.method, url);
        if let Some(token) = self.bearer {
            request = request.bearer(token);
        }

        let start = Instant::now();
        let status = match self.transport.send(request).await {
            Ok(response) => Some(response.status),
            Err(e) => {
                debug!("{} {} unreachable: {}", self.method, path_template, e);
                None
            }
        };
        let elapsed_ms = start.elapsed().as_millis() as u64;

        EndpointAttempt {
            path: path_template.to_string(),
            method: self.method,
            status,
            status_class: self.policy.classify(status),
            elapsed_ms,
        }
    }
}

/// Metadata for an attempt the policy accepted as an existing route.
pub fn endpoint_metadata(attempt: &EndpointAttempt, requires_auth: bool) -> EndpointMetadata {
    EndpointMetadata {
        method: attempt.method,
        status: attempt.status,
        status_class: attempt.status_class,
        requires_auth,
        elapsed_ms: attempt.elapsed_ms,
    }
}

#[async_trait]
impl<'a, T: HttpTransport + ?Sized> Probe for EndpointProbe<'a, T> {
    async fn probe(&mut self, candidate: &str) -> Result<Option<TargetMetadata>, ProbeError> {
        let attempt = self.attempt(candidate).await;
        if attempt.status_class == EndpointStatus::Unreachable {
            return Err(ProbeError::Transport(format!(
                "{} {} did not answer",
                self.method, candidate
            )));
        }
        if !self.policy.counts_as_existing(attempt.status_class) {
            return Ok(None);
        }
        let requires_auth = attempt.status_class == EndpointStatus::AuthRequired;
        Ok(Some(TargetMetadata::Endpoint(endpoint_metadata(
            &attempt,
            requires_auth,
        ))))
    }
}
