pub mod loader;
pub mod schema;

pub use loader::{ConfigError, ConfigLoader};
pub use schema::{
    Credentials, DiscoveryConfig, IssueTrackerConfig, ResolverConfig, TargetConfig, VigilConfig,
};
