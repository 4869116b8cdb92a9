pub mod tariff_manager;

pub use tariff_manager::{ImportSummary, TariffManager};
