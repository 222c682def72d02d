pub mod api;
pub mod backend;
pub mod catalog;
pub mod config;
pub mod discovery;
pub mod dom;
pub mod emit;
pub mod page;
pub mod resolution;
pub mod tracker;
pub mod transport;

pub use vigil_common::{
    BackendError, CandidateExhaustedError, CandidateList, DiscoveryRecord, HttpMethod,
    ResolvedTarget,
};
