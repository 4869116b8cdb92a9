//! # ATC Tariffs
//!
//! Catalog of city call tariffs (regular and privileged) with validation,
//! duplicate prevention, bulk price changes and CSV interchange.
//!
//! ## Architecture
//!
//! - **domain**: Tariff entity, duplicate rule and repository trait
//! - **application**: `TariffManager`, the only entry point for front ends
//! - **infrastructure**: SQLite (SeaORM) and in-memory stores, CSV files
//! - **shared**: errors and field validation
//! - **config** / **logging**: TOML configuration and tracing setup

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod logging;
pub mod shared;

pub use application::{ImportSummary, TariffManager};
pub use config::{default_config_path, AppConfig, StorageBackend};
pub use domain::{DomainError, DomainResult, NewTariff, Tariff, TariffId, TariffType};
pub use infrastructure::{open_repository, DatabaseConfig};
pub use logging::init_tracing;
