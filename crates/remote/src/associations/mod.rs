//! Associations Module - declaration surface and registry for remote associations

pub mod definition;
pub mod inference;
pub mod registry;

pub use definition::*;
pub use registry::*;
