pub mod tariff;

// Re-export commonly used types
pub use tariff::{NewTariff, Tariff, TariffId, TariffRepository, TariffType};

pub use crate::shared::errors::{DomainError, DomainResult};
