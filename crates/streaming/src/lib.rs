pub mod cache;
pub mod fetch;
pub mod loader;

pub use cache::*;
pub use fetch::*;
pub use loader::*;
