//! GSTPro core types and validation

pub mod error;
pub mod serde_utils;
pub mod types;
pub mod validation;

pub use error::{ValidationError, ValidationErrors};
pub use types::*;
pub use validation::Validate;
