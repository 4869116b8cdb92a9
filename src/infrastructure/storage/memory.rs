//! In-memory tariff store

use std::sync::atomic::{AtomicI32, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::{DomainError, DomainResult, NewTariff, Tariff, TariffId, TariffRepository};

/// Process-lifetime store for development, tests and `--memory` sessions.
pub struct InMemoryTariffRepository {
    tariffs: DashMap<TariffId, Tariff>,
    tariff_counter: AtomicI32,
}

impl InMemoryTariffRepository {
    pub fn new() -> Self {
        Self {
            tariffs: DashMap::new(),
            tariff_counter: AtomicI32::new(1),
        }
    }
}

impl Default for InMemoryTariffRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TariffRepository for InMemoryTariffRepository {
    async fn find_all(&self) -> DomainResult<Vec<Tariff>> {
        let mut all: Vec<Tariff> = self.tariffs.iter().map(|t| t.value().clone()).collect();
        all.sort_by(Tariff::canonical_cmp);
        Ok(all)
    }

    async fn find_by_id(&self, id: TariffId) -> DomainResult<Option<Tariff>> {
        Ok(self.tariffs.get(&id).map(|t| t.clone()))
    }

    async fn add(&self, tariff: NewTariff) -> DomainResult<Tariff> {
        // Ids are never handed out twice, even after deletes or a wipe.
        let id = self.tariff_counter.fetch_add(1, Ordering::SeqCst);
        let saved = Tariff::from_parts(id, tariff);
        self.tariffs.insert(id, saved.clone());
        Ok(saved)
    }

    async fn update(&self, tariff: Tariff) -> DomainResult<()> {
        match self.tariffs.get_mut(&tariff.id()) {
            Some(mut existing) => {
                *existing = tariff;
                Ok(())
            }
            None => Err(DomainError::tariff_not_found(tariff.id())),
        }
    }

    async fn delete(&self, id: TariffId) -> DomainResult<()> {
        self.tariffs
            .remove(&id)
            .ok_or_else(|| DomainError::tariff_not_found(id))?;
        Ok(())
    }

    async fn delete_all(&self) -> DomainResult<()> {
        self.tariffs.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn add_assigns_increasing_ids() {
        let repo = InMemoryTariffRepository::new();
        let a = repo.add(NewTariff::regular("Omsk", d("1"))).await.unwrap();
        let b = repo.add(NewTariff::regular("Kazan", d("2"))).await.unwrap();
        assert_eq!(a.id(), 1);
        assert_eq!(b.id(), 2);
        assert_eq!(repo.find_by_id(2).await.unwrap(), Some(b));
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_wipe() {
        let repo = InMemoryTariffRepository::new();
        repo.add(NewTariff::regular("Omsk", d("1"))).await.unwrap();
        repo.delete_all().await.unwrap();
        let next = repo.add(NewTariff::regular("Omsk", d("1"))).await.unwrap();
        assert_eq!(next.id(), 2);
    }

    #[tokio::test]
    async fn find_all_uses_canonical_order() {
        let repo = InMemoryTariffRepository::new();
        repo.add(NewTariff::regular("Omsk", d("3"))).await.unwrap();
        repo.add(NewTariff::regular("Kazan", d("9"))).await.unwrap();
        repo.add(NewTariff::regular("Omsk", d("1"))).await.unwrap();

        let rows: Vec<(String, Decimal)> = repo
            .find_all()
            .await
            .unwrap()
            .iter()
            .map(|t| (t.city().to_string(), t.price_per_minute()))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("Kazan".to_string(), d("9")),
                ("Omsk".to_string(), d("1")),
                ("Omsk".to_string(), d("3")),
            ]
        );
    }

    #[tokio::test]
    async fn update_and_delete_missing_rows_fail() {
        let repo = InMemoryTariffRepository::new();
        let ghost = Tariff::from_parts(99, NewTariff::regular("Omsk", d("1")));
        assert!(matches!(
            repo.update(ghost).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            repo.delete(99).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn update_replaces_in_place() {
        let repo = InMemoryTariffRepository::new();
        let saved = repo.add(NewTariff::regular("Omsk", d("1"))).await.unwrap();
        let changed = saved.with_data(NewTariff::privileged("Omsk", d("4"), d("10")));
        repo.update(changed.clone()).await.unwrap();
        assert_eq!(repo.find_by_id(saved.id()).await.unwrap(), Some(changed));
        assert_eq!(repo.find_all().await.unwrap().len(), 1);
    }
}
