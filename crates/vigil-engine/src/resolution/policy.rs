use serde::{Deserialize, Serialize};
use vigil_common::EndpointStatus;

/// How HTTP status codes are read when probing for routes.
///
/// Some APIs answer 401 for every path, known or not; turn
/// `auth_implies_existence` off for those.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthPolicy {
    #[serde(default = "default_auth_statuses")]
    pub auth_statuses: Vec<u16>,
    #[serde(default = "default_not_found_statuses")]
    pub not_found_statuses: Vec<u16>,
    #[serde(default = "default_auth_implies_existence")]
    pub auth_implies_existence: bool,
}

impl Default for AuthPolicy {
    fn default() -> Self {
        Self {
            auth_statuses: default_auth_statuses(),
            not_found_statuses: default_not_found_statuses(),
            auth_implies_existence: default_auth_implies_existence(),
        }
    }
}

fn default_auth_statuses() -> Vec<u16> {
    vec![401, 403]
}

fn default_not_found_statuses() -> Vec<u16> {
    vec![404, 410]
}

fn default_auth_implies_existence() -> bool {
    true
}

impl AuthPolicy {
    /// Classify one probe. `None` means no response arrived at all.
    pub fn classify(&self, status: Option<u16>) -> EndpointStatus {
        match status {
            None => EndpointStatus::Unreachable,
            Some(code) if self.not_found_statuses.contains(&code) => EndpointStatus::Absent,
            Some(code) if self.auth_statuses.contains(&code) => EndpointStatus::AuthRequired,
            Some(code) if code >= 500 => EndpointStatus::ServerError,
            Some(_) => EndpointStatus::Exists,
        }
    }

    pub fn counts_as_existing(&self, status: EndpointStatus) -> bool {
        match status {
            EndpointStatus::Exists => true,
            EndpointStatus::AuthRequired => self.auth_implies_existence,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_classification() {
        let policy = AuthPolicy::default();
        assert_eq!(policy.classify(None), EndpointStatus::Unreachable);
        assert_eq!(policy.classify(Some(200)), EndpointStatus::Exists);
        assert_eq!(policy.classify(Some(302)), EndpointStatus::Exists);
        assert_eq!(policy.classify(Some(405)), EndpointStatus::Exists);
        assert_eq!(policy.classify(Some(401)), EndpointStatus::AuthRequired);
        assert_eq!(policy.classify(Some(403)), EndpointStatus::AuthRequired);
        assert_eq!(policy.classify(Some(404)), EndpointStatus::Absent);
        assert_eq!(policy.classify(Some(503)), EndpointStatus::ServerError);
    }

    #[test]
    fn test_auth_existence_is_a_knob() {
        let mut policy = AuthPolicy::default();
        assert!(policy.counts_as_existing(EndpointStatus::AuthRequired));
        policy.auth_implies_existence = false;
        assert!(!policy.counts_as_existing(EndpointStatus::AuthRequired));
        assert!(policy.counts_as_existing(EndpointStatus::Exists));
        assert!(!policy.counts_as_existing(EndpointStatus::ServerError));
    }
}
