pub mod color;
pub mod document;
pub mod validate;

pub use color::*;
pub use document::*;
pub use validate::*;
