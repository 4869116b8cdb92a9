//! Tariff repository interface

use async_trait::async_trait;

use super::model::{NewTariff, Tariff, TariffId};
use crate::domain::DomainResult;

/// CRUD persistence for tariffs.
///
/// Field validation and duplicate prevention belong to the manager; a store
/// may still reject rows through its own constraints.
#[async_trait]
pub trait TariffRepository: Send + Sync {
    /// Every stored tariff, ordered by [`Tariff::canonical_cmp`].
    async fn find_all(&self) -> DomainResult<Vec<Tariff>>;
    async fn find_by_id(&self, id: TariffId) -> DomainResult<Option<Tariff>>;
    /// Store a new row and return it with its assigned id.
    async fn add(&self, tariff: NewTariff) -> DomainResult<Tariff>;
    /// Replace the row with the same id. Fails with `NotFound` if there is none.
    async fn update(&self, tariff: Tariff) -> DomainResult<()>;
    /// Fails with `NotFound` if there is no such row.
    async fn delete(&self, id: TariffId) -> DomainResult<()>;
    async fn delete_all(&self) -> DomainResult<()>;
}
