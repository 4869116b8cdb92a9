//! Tariff catalog service
//!
//! Validation, duplicate policy and bulk operations over a
//! [`TariffRepository`], with a cache of the full list for the UI.

use std::path::Path;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::tariff::DuplicateKey;
use crate::domain::{
    DomainError, DomainResult, NewTariff, Tariff, TariffId, TariffRepository,
};
use crate::infrastructure::csv;
use crate::shared::validations::{round2, validate_price};

/// Outcome of an append-mode CSV import
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ImportSummary {
    pub added: usize,
    pub skipped: usize,
    pub total: usize,
}

/// Service for tariff catalog operations
pub struct TariffManager {
    repo: Arc<dyn TariffRepository>,
    cache: Vec<Tariff>,
}

impl TariffManager {
    /// Build a manager over `repo` and load its current contents.
    pub async fn new(repo: Arc<dyn TariffRepository>) -> DomainResult<Self> {
        let mut manager = Self {
            repo,
            cache: Vec::new(),
        };
        manager.refresh().await?;
        Ok(manager)
    }

    /// Reload the cache from the repository.
    pub async fn refresh(&mut self) -> DomainResult<()> {
        self.cache = self.repo.find_all().await?;
        debug!(rows = self.cache.len(), "Tariff cache refreshed");
        Ok(())
    }

    /// Cached tariffs in display order.
    pub fn tariffs(&self) -> &[Tariff] {
        &self.cache
    }

    pub fn get(&self, index: usize) -> Option<&Tariff> {
        self.cache.get(index)
    }

    /// Id of the row shown at `index`.
    pub fn id_at(&self, index: usize) -> DomainResult<TariffId> {
        self.cache
            .get(index)
            .map(Tariff::id)
            .ok_or(DomainError::InvalidIndex(index))
    }

    pub async fn find_by_id(&self, id: TariffId) -> DomainResult<Option<Tariff>> {
        self.repo.find_by_id(id).await
    }

    // ── CRUD ────────────────────────────────────────────────────

    pub async fn add(&mut self, tariff: NewTariff) -> DomainResult<Tariff> {
        let tariff = tariff.validated()?;
        self.ensure_unique(&tariff.duplicate_key(), None).await?;

        let saved = self.repo.add(tariff).await?;
        info!(
            id = saved.id(),
            city = saved.city(),
            tariff_type = %saved.tariff_type(),
            "Tariff added"
        );
        self.refresh().await?;
        Ok(saved)
    }

    pub async fn add_regular(&mut self, city: &str, price: Decimal) -> DomainResult<Tariff> {
        self.add(NewTariff::regular(city.trim(), price)).await
    }

    pub async fn add_privileged(
        &mut self,
        city: &str,
        price: Decimal,
        discount: Decimal,
    ) -> DomainResult<Tariff> {
        self.add(NewTariff::privileged(city.trim(), price, discount))
            .await
    }

    /// Replace the fields of the row shown at `index`.
    pub async fn update(&mut self, index: usize, tariff: NewTariff) -> DomainResult<Tariff> {
        let id = self.id_at(index)?;
        self.update_by_id(id, tariff).await
    }

    /// Replace the fields of row `id`, keeping its identity.
    pub async fn update_by_id(&mut self, id: TariffId, tariff: NewTariff) -> DomainResult<Tariff> {
        let tariff = tariff.validated()?;
        self.ensure_unique(&tariff.duplicate_key(), Some(id)).await?;

        let updated = Tariff::from_parts(id, tariff);
        self.repo.update(updated.clone()).await?;
        info!(id, "Tariff updated");
        self.refresh().await?;
        Ok(updated)
    }

    pub async fn remove(&mut self, index: usize) -> DomainResult<()> {
        let id = self.id_at(index)?;
        self.remove_by_id(id).await
    }

    pub async fn remove_by_id(&mut self, id: TariffId) -> DomainResult<()> {
        self.repo.delete(id).await?;
        info!(id, "Tariff removed");
        self.refresh().await
    }

    pub async fn clear(&mut self) -> DomainResult<()> {
        self.repo.delete_all().await?;
        info!("All tariffs removed");
        self.refresh().await
    }

    /// Fails with a conflict if any stored row other than `except` has `key`.
    async fn ensure_unique(&self, key: &DuplicateKey, except: Option<TariffId>) -> DomainResult<()> {
        let clash = self
            .repo
            .find_all()
            .await?
            .iter()
            .any(|t| Some(t.id()) != except && t.duplicate_key() == *key);
        if clash {
            return Err(DomainError::duplicate());
        }
        Ok(())
    }

    // ── Aggregates & bulk operations ────────────────────────────

    pub fn total_final_price(&self) -> DomainResult<Decimal> {
        if self.cache.is_empty() {
            return Err(DomainError::Empty);
        }
        Ok(self.cache.iter().map(Tariff::final_price).sum())
    }

    /// Mean final price, rounded to cents.
    pub fn average_final_price(&self) -> DomainResult<Decimal> {
        let total = self.total_final_price()?;
        Ok(round2(total / Decimal::from(self.cache.len())))
    }

    /// Scale every stored price by `1 + percent / 100`, rounded to cents.
    ///
    /// New prices are checked against the bounds and against each other
    /// (rounding may merge two rows into one duplicate key) before the first
    /// write, so a rejected adjustment leaves the catalog untouched. If the
    /// store fails mid-way, the rows already written keep their new price
    /// and the cache is reloaded before the error is returned.
    pub async fn increase_all_prices(&mut self, percent: Decimal) -> DomainResult<()> {
        let factor = Decimal::ONE + percent / Decimal::ONE_HUNDRED;
        if factor <= Decimal::ZERO {
            return Err(DomainError::validation(
                "Процент слишком мал: цена станет ≤ 0",
            ));
        }
        if percent > Decimal::ONE_HUNDRED {
            return Err(DomainError::validation(
                "Процент не должен превышать 100",
            ));
        }

        let mut changed = Vec::new();
        let mut keys: Vec<DuplicateKey> = Vec::new();
        for t in self.repo.find_all().await? {
            let new_price = round2(t.price_per_minute() * factor);
            validate_price(new_price)?;
            let mut data = t.to_new();
            data.price_per_minute = new_price;
            let adjusted = t.with_data(data);

            let key = adjusted.duplicate_key();
            if keys.contains(&key) {
                return Err(DomainError::duplicate());
            }
            keys.push(key);
            changed.push(adjusted);
        }

        let rows = changed.len();
        for t in changed {
            let id = t.id();
            if let Err(e) = self.repo.update(t).await {
                warn!(id, error = %e, "Price adjustment stopped");
                self.refresh().await?;
                return Err(e);
            }
        }
        info!(%percent, rows, "Prices adjusted");
        self.refresh().await
    }

    // ── CSV ─────────────────────────────────────────────────────

    /// Save the cached list to `path`.
    pub fn export_csv(&self, path: &Path) -> DomainResult<()> {
        csv::write_tariffs(path, &self.cache)
    }

    /// Append the rows of `path` to the catalog.
    ///
    /// Rows are read, validated and stored one at a time. Rows matching an
    /// existing tariff (or an earlier row of the same file) are skipped. The
    /// first bad row stops the import with its line number; rows stored
    /// before it stay. A bad header stores nothing.
    pub async fn import_csv(&mut self, path: &Path) -> DomainResult<ImportSummary> {
        let content = csv::read_content(path)?;
        let rows = csv::parse_tariffs(&content)?;
        let mut known: Vec<DuplicateKey> = self
            .repo
            .find_all()
            .await?
            .iter()
            .map(Tariff::duplicate_key)
            .collect();

        let mut summary = ImportSummary::default();
        for row in rows {
            let record = match row {
                Ok(record) => record,
                Err(e) => {
                    warn!(error = %e, "Import stopped");
                    self.refresh().await?;
                    return Err(e);
                }
            };
            summary.total += 1;

            let key = record.tariff.duplicate_key();
            if known.contains(&key) {
                summary.skipped += 1;
                continue;
            }
            if let Err(e) = self.repo.add(record.tariff).await {
                warn!(line = record.line, error = %e, "Import stopped");
                self.refresh().await?;
                return Err(DomainError::csv(record.line, e.to_string()));
            }
            known.push(key);
            summary.added += 1;
        }

        info!(
            added = summary.added,
            skipped = summary.skipped,
            total = summary.total,
            "CSV imported from {}",
            path.display()
        );
        self.refresh().await?;
        Ok(summary)
    }
}

// ── Tests ──────────────────────────────────────────────────────
