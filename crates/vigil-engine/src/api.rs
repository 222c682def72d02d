//! Typed client over discovered API endpoints.

use crate::resolution::{AuthPolicy, EndpointProbe, Resolver};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, TransportError, join_url};
use regex::{Captures, Regex};
use serde_json::{Value, json};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, info};
use vigil_common::{
    CandidateExhaustedError, CandidateList, DiscoveryEntry, EndpointStatus, HttpMethod,
    TargetMetadata,
};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    NotFound(#[from] CandidateExhaustedError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("{method} {path} answered {status}: {body}")]
    Status {
        method: HttpMethod,
        path: String,
        status: u16,
        body: String,
    },

    #[error("login response carried no token")]
    MissingToken,

    #[error("no value for '{param}' in {path}")]
    MissingParam { path: String, param: String },

    #[error("invalid JSON in response: {0}")]
    Json(#[from] serde_json::Error),
}

/// One API operation and the paths that may serve it, primary first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub name: String,
    pub method: HttpMethod,
    pub paths: Vec<String>,
    pub requires_auth: bool,
    pub discovered: bool,
}

impl Endpoint {
    pub fn discovered(
        name: &str,
        method: HttpMethod,
        paths: &[&str],
        requires_auth: bool,
    ) -> Self {
        Self {
            name: name.to_string(),
            method,
            paths: paths.iter().map(|p| p.to_string()).collect(),
            requires_auth,
            discovered: true,
        }
    }

    /// An operation no path answered for. Calling it fails without a request.
    pub fn undiscovered(name: &str, method: HttpMethod, paths: &[&str]) -> Self {
        Self {
            discovered: false,
            ..Self::discovered(name, method, paths, false)
        }
    }

    pub fn from_entry(entry: &DiscoveryEntry) -> Self {
        let paths = entry.ordered_candidates();
        match &entry.metadata {
            Some(TargetMetadata::Endpoint(meta)) if entry.is_found() => Self {
                name: entry.logical_name.clone(),
                method: meta.method,
                paths,
                requires_auth: meta.requires_auth,
                discovered: true,
            },
            _ => Self {
                name: entry.logical_name.clone(),
                method: HttpMethod::Get,
                paths,
                requires_auth: false,
                discovered: false,
            },
        }
    }

    pub fn path(&self) -> Option<&str> {
        self.paths.first().map(String::as_str)
    }

    fn exhausted(&self) -> CandidateExhaustedError {
        CandidateExhaustedError::new(self.name.as_str(), self.paths.clone())
    }
}

/// Substitute `{param}` segments from `params`.
pub fn fill_template(template: &str, params: &[(&str, &str)]) -> Result<String, ApiError> {
    static PARAM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{([^{}/]+)\}").unwrap());

    let mut missing = None;
    let filled = PARAM_RE.replace_all(template, |caps: &Captures| {
        let name = &caps[1];
        match params.iter().find(|(key, _)| *key == name) {
            Some((_, value)) => value.to_string(),
            None => {
                if missing.is_none() {
                    missing = Some(name.to_string());
                }
                String::new()
            }
        }
    });
    match missing {
        Some(param) => Err(ApiError::MissingParam {
            path: template.to_string(),
            param,
        }),
        None => Ok(filled.into_owned()),
    }
}

pub struct ApiClient<T: HttpTransport> {
    transport: T,
    base_url: String,
    policy: AuthPolicy,
    resolver: Resolver,
    token: Option<String>,
}

impl<T: HttpTransport> ApiClient<T> {
    pub fn new(transport: T, base_url: &str) -> Self {
        Self {
            transport,
            base_url: base_url.to_string(),
            policy: AuthPolicy::default(),
            resolver: Resolver::default(),
            token: None,
        }
    }

    pub fn with_policy(mut self, policy: AuthPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_resolver(mut self, resolver: Resolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn call(
        &self,
        endpoint: &Endpoint,
        body: Option<Value>,
    ) -> Result<HttpResponse, ApiError> {
        self.call_with(endpoint, &[], body).await
    }

    /// Call `endpoint`, trying its paths in order.
    ///
    /// A path is skipped when it answers with a not-found status or cannot
    /// be reached; any other answer, error statuses included, is returned.
    pub async fn call_with(
        &self,
        endpoint: &Endpoint,
        params: &[(&str, &str)],
        body: Option<Value>,
    ) -> Result<HttpResponse, ApiError> {
        if !endpoint.discovered {
            return Err(endpoint.exhausted().into());
        }

        let mut answered = false;
        let mut last_error = None;
        for template in &endpoint.paths {
            let path = fill_template(template, params)?;
            let mut request = HttpRequest::new(endpoint.method, join_url(&self.base_url, &path));
            if endpoint.requires_auth
                && let Some(token) = &self.token
            {
                request = request.bearer(token);
            }
            if let Some(body) = &body {
                request = request.json(body.clone());
            }

            match self.transport.send(request).await {
                Ok(response) => {
                    if self.policy.classify(Some(response.status)) == EndpointStatus::Absent {
                        debug!("{} {} absent, trying next path", endpoint.method, path);
                        answered = true;
                        continue;
                    }
                    return Ok(response);
                }
                Err(e) => {
                    debug!("{} {} failed: {}", endpoint.method, path, e);
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if !answered => Err(e.into()),
            _ => Err(endpoint.exhausted().into()),
        }
    }

    /// Sign in and keep the returned token for endpoints that need it.
    pub async fn login(
        &mut self,
        email: &str,
        password: &str,
        endpoint: &Endpoint,
    ) -> Result<(), ApiError> {
        let body = json!({ "email": email, "password": password });
        let response = self.call(endpoint, Some(body)).await?;
        if !response.is_success() {
            return Err(ApiError::Status {
                method: endpoint.method,
                path: endpoint.path().unwrap_or_default().to_string(),
                status: response.status,
                body: response.body,
            });
        }

        let payload: Value = response.json()?;
        let token = ["token", "access_token"]
            .iter()
            .find_map(|key| payload.get(*key).and_then(Value::as_str))
            .ok_or(ApiError::MissingToken)?;
        info!("Logged in as {}", email);
        self.token = Some(token.to_string());
        Ok(())
    }

    /// Find which of several candidate paths serves `method` right now.
    pub async fn resolve_endpoint(
        &self,
        list: &CandidateList,
        method: HttpMethod,
    ) -> Result<Endpoint, ApiError> {
        let mut probe = EndpointProbe::new(&self.transport, &self.base_url, method, &self.policy)
            .with_bearer(self.token.as_deref());
        let target = self.resolver.resolve(list, &mut probe).await?;
        let requires_auth = target.endpoint().is_some_and(|meta| meta.requires_auth);

        let ordered = list
            .reordered_with_primary(&target.matched_candidate)
            .unwrap_or_else(|| list.clone());
        let paths: Vec<&str> = ordered.iter().collect();
        Ok(Endpoint::discovered(
            list.logical_name(),
            method,
            &paths,
            requires_auth,
        ))
    }
}
