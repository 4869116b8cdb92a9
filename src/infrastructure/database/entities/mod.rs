//! Database entities module

pub mod tariff;

pub use tariff::Entity as Tariff;
