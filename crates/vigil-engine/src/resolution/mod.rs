pub mod element_probe;
pub mod endpoint_probe;
pub mod policy;
pub mod resolver;

pub use element_probe::ElementProbe;
pub use endpoint_probe::{EndpointProbe, expand_template};
pub use policy::AuthPolicy;
pub use resolver::{DEFAULT_CANDIDATE_TIMEOUT, FnProbe, Probe, Resolver};
