pub mod config;
pub mod paths;

// Foundation crate: small, well-tested primitives only.
pub use config::*;
pub use paths::*;
