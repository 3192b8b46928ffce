//! Loading Module - lazy and batched association resolution

pub mod batch;
pub mod lazy;

pub use batch::BatchResolver;
pub use lazy::SingularResolver;
