pub mod errors;
pub mod validations;

pub use errors::*;
