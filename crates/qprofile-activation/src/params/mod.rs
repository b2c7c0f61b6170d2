//! Parameter value validation.

pub mod type_validations;

pub use type_validations::TypeValidations;
