//! SeaORM implementation of TariffRepository

use async_trait::async_trait;
use log::info;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, DatabaseConnection, DbErr, EntityTrait, QueryOrder,
    Set, SqlErr,
};

use crate::domain::tariff::{NewTariff, Tariff, TariffId, TariffRepository, TariffType};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::tariff;
use crate::shared::validations::{normalize_city, round_to, DISCOUNT_SCALE, PRICE_SCALE};

// ── Conversion helpers ──────────────────────────────────────────

fn db_err(e: DbErr) -> DomainError {
    // SQLite reports the failed index columns, e.g. "tariffs.city, tariffs.type, ..."
    if let Some(SqlErr::UniqueConstraintViolation(_)) = e.sql_err() {
        return DomainError::Conflict(
            "Такой тариф уже существует (нарушено ограничение уникальности).".to_string(),
        );
    }
    DomainError::Storage(e.to_string())
}

fn type_to_entity(t: TariffType) -> tariff::TariffType {
    match t {
        TariffType::Regular => tariff::TariffType::Regular,
        TariffType::Privileged => tariff::TariffType::Privileged,
    }
}

fn type_from_entity(t: tariff::TariffType) -> TariffType {
    match t {
        tariff::TariffType::Regular => TariffType::Regular,
        tariff::TariffType::Privileged => TariffType::Privileged,
    }
}

fn to_real(value: Decimal) -> DomainResult<f64> {
    value
        .to_f64()
        .ok_or_else(|| DomainError::Storage(format!("значение вне диапазона REAL: {value}")))
}

fn from_real(value: f64, scale: u32) -> DomainResult<Decimal> {
    Decimal::from_f64(value)
        .map(|d| round_to(d, scale))
        .ok_or_else(|| DomainError::Storage(format!("некорректное число в БД: {value}")))
}

fn entity_to_domain(m: tariff::Model) -> DomainResult<Tariff> {
    let data = NewTariff {
        city: m.city,
        tariff_type: type_from_entity(m.tariff_type),
        price_per_minute: from_real(m.price, PRICE_SCALE)?,
        discount_percent: from_real(m.discount, DISCOUNT_SCALE)?,
    };
    Ok(Tariff::from_parts(m.id, data))
}

/// Column values as they are written: normalized city, zero discount for REGULAR.
fn stored_columns(
    t: &NewTariff,
) -> DomainResult<(String, tariff::TariffType, f64, f64)> {
    let discount = match t.tariff_type {
        TariffType::Privileged => to_real(t.discount_percent)?,
        TariffType::Regular => 0.0,
    };
    Ok((
        normalize_city(&t.city),
        type_to_entity(t.tariff_type),
        to_real(t.price_per_minute)?,
        discount,
    ))
}

// ── SeaOrmTariffRepository ──────────────────────────────────────

pub struct SeaOrmTariffRepository {
    db: DatabaseConnection,
}

impl SeaOrmTariffRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TariffRepository for SeaOrmTariffRepository {
    async fn find_all(&self) -> DomainResult<Vec<Tariff>> {
        let models = tariff::Entity::find()
            .order_by_asc(tariff::Column::City)
            .order_by_asc(tariff::Column::TariffType)
            .order_by_asc(tariff::Column::Price)
            .order_by_asc(tariff::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models.into_iter().map(entity_to_domain).collect()
    }

    async fn find_by_id(&self, id: TariffId) -> DomainResult<Option<Tariff>> {
        let model = tariff::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?;
        model.map(entity_to_domain).transpose()
    }

    async fn add(&self, t: NewTariff) -> DomainResult<Tariff> {
        let (city, tariff_type, price, discount) = stored_columns(&t)?;
        let model = tariff::ActiveModel {
            id: NotSet,
            city: Set(city),
            tariff_type: Set(tariff_type),
            price: Set(price),
            discount: Set(discount),
        };
        let result = model.insert(&self.db).await.map_err(db_err)?;
        info!("Tariff saved: {} ({})", result.city, result.id);
        entity_to_domain(result)
    }

    async fn update(&self, t: Tariff) -> DomainResult<()> {
        let existing = tariff::Entity::find_by_id(t.id())
            .one(&self.db)
            .await
            .map_err(db_err)?;

        if existing.is_none() {
            return Err(DomainError::tariff_not_found(t.id()));
        }

        let (city, tariff_type, price, discount) = stored_columns(&t.to_new())?;
        let model = tariff::ActiveModel {
            id: Set(t.id()),
            city: Set(city),
            tariff_type: Set(tariff_type),
            price: Set(price),
            discount: Set(discount),
        };
        model.update(&self.db).await.map_err(db_err)?;
        info!("Tariff updated: {}", t.id());
        Ok(())
    }

    async fn delete(&self, id: TariffId) -> DomainResult<()> {
        let result = tariff::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(DomainError::tariff_not_found(id));
        }
        info!("Tariff deleted: {}", id);
        Ok(())
    }

    async fn delete_all(&self) -> DomainResult<()> {
        let result = tariff::Entity::delete_many()
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        info!("Tariffs cleared: {} rows", result.rows_affected);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::{open_database, DatabaseConfig};

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    async fn repo() -> SeaOrmTariffRepository {
        let db = open_database(&DatabaseConfig::in_memory()).await.unwrap();
        SeaOrmTariffRepository::new(db)
    }

    #[tokio::test]
    async fn add_then_find_by_id_round_trips() {
        let repo = repo().await;
        let new = NewTariff::privileged("Springfield", d("10.00"), d("20"));
        let saved = repo.add(new.clone()).await.unwrap();

        let found = repo.find_by_id(saved.id()).await.unwrap().unwrap();
        assert_eq!(found, saved);
        assert_eq!(found.to_new(), new);
    }

    #[tokio::test]
    async fn add_normalizes_city_and_regular_discount() {
        let repo = repo().await;
        let saved = repo
            .add(NewTariff::new("  New   York ", TariffType::Regular, d("2.5"), d("30")))
            .await
            .unwrap();
        assert_eq!(saved.city(), "New York");
        assert_eq!(saved.discount_percent(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn unique_index_maps_to_conflict() {
        let repo = repo().await;
        repo.add(NewTariff::regular("Omsk", d("1.5"))).await.unwrap();
        let err = repo.add(NewTariff::regular("Omsk", d("1.5"))).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)), "{err:?}");
        assert_eq!(repo.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn check_constraint_rejects_out_of_range_price() {
        let repo = repo().await;
        let err = repo.add(NewTariff::regular("Omsk", d("5000"))).await.unwrap_err();
        assert!(matches!(err, DomainError::Storage(_)), "{err:?}");
    }

    #[tokio::test]
    async fn find_all_uses_canonical_order() {
        let repo = repo().await;
        repo.add(NewTariff::regular("Omsk", d("3"))).await.unwrap();
        repo.add(NewTariff::privileged("Omsk", d("9"), d("5"))).await.unwrap();
        repo.add(NewTariff::regular("Kazan", d("7"))).await.unwrap();

        let all = repo.find_all().await.unwrap();
        let mut sorted = all.clone();
        sorted.sort_by(Tariff::canonical_cmp);
        assert_eq!(all, sorted);
        assert_eq!(all[0].city(), "Kazan");
        assert_eq!(all[1].tariff_type(), TariffType::Privileged);
    }

    #[tokio::test]
    async fn update_and_delete() {
        let repo = repo().await;
        let saved = repo.add(NewTariff::regular("Omsk", d("1"))).await.unwrap();

        let changed = saved.with_data(NewTariff::privileged("Tomsk", d("4.25"), d("12.5")));
        repo.update(changed.clone()).await.unwrap();
        assert_eq!(repo.find_by_id(saved.id()).await.unwrap(), Some(changed));

        repo.delete(saved.id()).await.unwrap();
        assert_eq!(repo.find_by_id(saved.id()).await.unwrap(), None);
        assert!(matches!(
            repo.delete(saved.id()).await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            repo.update(saved).await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn ids_are_not_reused() {
        let repo = repo().await;
        let first = repo.add(NewTariff::regular("Omsk", d("1"))).await.unwrap();
        repo.delete_all().await.unwrap();
        let second = repo.add(NewTariff::regular("Omsk", d("1"))).await.unwrap();
        assert!(second.id() > first.id());
    }

    #[tokio::test]
    async fn data_survives_reopening_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig::sqlite(dir.path().join("atc.db"));

        let repo = SeaOrmTariffRepository::new(open_database(&config).await.unwrap());
        let saved = repo.add(NewTariff::regular("Omsk", d("1.25"))).await.unwrap();
        drop(repo);

        let reopened = SeaOrmTariffRepository::new(open_database(&config).await.unwrap());
        assert_eq!(reopened.find_all().await.unwrap(), vec![saved]);
    }
}
