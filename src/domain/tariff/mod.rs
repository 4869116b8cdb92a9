//! Tariff aggregate
//!
//! Contains the Tariff entity, the duplicate rule and the repository interface.

pub mod model;
pub mod repository;

pub use model::{final_price, DuplicateKey, NewTariff, Tariff, TariffId, TariffType};
pub use repository::TariffRepository;
