//! Domain models shared across the publishing pipeline.

mod catalog;
mod draft;
mod recipe;

pub use catalog::*;
pub use draft::*;
pub use recipe::*;
