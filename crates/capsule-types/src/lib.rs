pub mod capsule;
pub mod error;

pub use capsule::Capsule;
pub use error::CapsuleError;
