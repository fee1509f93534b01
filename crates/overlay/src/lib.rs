pub mod backend;
pub mod kind;
pub mod registry;

pub use backend::*;
pub use kind::*;
pub use registry::*;
