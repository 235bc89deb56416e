//! Turning a report into deliverable text.
//!
//! - [`render`]: serializes a `Report` into one text body
//! - [`chunk`]: splits that body into bounded chunks for the delivery channel

pub mod chunk;
pub mod render;

pub use chunk::split;
pub use render::render;
