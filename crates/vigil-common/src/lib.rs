pub mod candidates;
pub mod error;
pub mod record;
pub mod target;

pub use candidates::{CandidateList, CandidateListError, SelectorKind};
pub use error::{BackendError, CandidateExhaustedError, ProbeError};
pub use record::{DiscoveryEntry, DiscoveryRecord, EndpointAttempt, SurfaceKind};
pub use target::{
    ElementMetadata, ElementRole, EndpointMetadata, EndpointStatus, HttpMethod, ResolvedTarget,
    TargetMetadata,
};
