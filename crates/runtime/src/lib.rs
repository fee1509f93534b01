pub mod commands;
pub mod extension;
pub mod state;

pub use commands::*;
pub use extension::*;
pub use state::*;
