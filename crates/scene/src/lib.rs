pub mod events;
pub mod surface;

pub use events::*;
pub use surface::*;
