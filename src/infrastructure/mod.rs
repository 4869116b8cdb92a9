//! Infrastructure layer - external concerns

pub mod csv;
pub mod database;
pub mod storage;

pub use database::{init_database, open_database, DatabaseConfig, SeaOrmTariffRepository};
pub use storage::InMemoryTariffRepository;

use std::sync::Arc;

use tracing::info;

use crate::config::{StorageBackend, StorageConfig};
use crate::domain::TariffRepository;

/// Open the store selected by `[storage]`.
pub async fn open_repository(
    storage: &StorageConfig,
) -> Result<Arc<dyn TariffRepository>, sea_orm::DbErr> {
    match storage.backend {
        StorageBackend::Memory => {
            info!("Using in-memory tariff store");
            Ok(Arc::new(InMemoryTariffRepository::new()))
        }
        StorageBackend::Sqlite => {
            let db = open_database(&storage.database()).await?;
            Ok(Arc::new(SeaOrmTariffRepository::new(db)))
        }
    }
}
