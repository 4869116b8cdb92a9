//! Tariff domain entity

use std::cmp::Ordering;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::shared::errors::{DomainError, DomainResult};
use crate::shared::validations::{
    normalize_city, round2, round_to, validate_city, validate_discount, validate_price,
    DISCOUNT_SCALE, PRICE_SCALE,
};

/// Identity assigned by a repository on insert.
pub type TariffId = i32;

/// Pricing variant of a tariff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TariffType {
    /// Flat price per minute
    #[default]
    Regular,
    /// Price per minute with a percentage discount
    Privileged,
}

impl TariffType {
    /// Token used in the database and in CSV files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "REGULAR",
            Self::Privileged => "PRIVILEGED",
        }
    }

    /// Label shown in tables.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Regular => "Обычный",
            Self::Privileged => "Льготный",
        }
    }
}

impl std::fmt::Display for TariffType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TariffType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "REGULAR" => Ok(Self::Regular),
            "PRIVILEGED" => Ok(Self::Privileged),
            _ => Err(DomainError::validation(format!(
                "неизвестный тип тарифа: {}",
                s.trim()
            ))),
        }
    }
}

/// A tariff that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTariff {
    pub city: String,
    pub tariff_type: TariffType,
    pub price_per_minute: Decimal,
    pub discount_percent: Decimal,
}

impl NewTariff {
    pub fn new(
        city: impl Into<String>,
        tariff_type: TariffType,
        price_per_minute: Decimal,
        discount_percent: Decimal,
    ) -> Self {
        Self {
            city: city.into(),
            tariff_type,
            price_per_minute,
            discount_percent,
        }
    }

    pub fn regular(city: impl Into<String>, price_per_minute: Decimal) -> Self {
        Self::new(city, TariffType::Regular, price_per_minute, Decimal::ZERO)
    }

    pub fn privileged(
        city: impl Into<String>,
        price_per_minute: Decimal,
        discount_percent: Decimal,
    ) -> Self {
        Self::new(city, TariffType::Privileged, price_per_minute, discount_percent)
    }

    /// Check every field and return the normalized form that may be stored.
    ///
    /// The discount is only checked for privileged tariffs; regular ones get 0.
    pub fn validated(self) -> DomainResult<Self> {
        validate_city(&self.city)?;
        validate_price(self.price_per_minute)?;
        let discount_percent = match self.tariff_type {
            TariffType::Privileged => {
                validate_discount(self.discount_percent)?;
                round_to(self.discount_percent, DISCOUNT_SCALE)
            }
            TariffType::Regular => Decimal::ZERO,
        };
        Ok(Self {
            city: normalize_city(&self.city),
            tariff_type: self.tariff_type,
            price_per_minute: round_to(self.price_per_minute, PRICE_SCALE),
            discount_percent,
        })
    }

    pub fn final_price(&self) -> Decimal {
        final_price(self.tariff_type, self.price_per_minute, self.discount_percent)
    }

    pub fn duplicate_key(&self) -> DuplicateKey {
        DuplicateKey::new(
            &self.city,
            self.tariff_type,
            self.price_per_minute,
            self.discount_percent,
        )
    }
}

/// A stored tariff. Only repositories hand these out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tariff {
    id: TariffId,
    city: String,
    tariff_type: TariffType,
    price_per_minute: Decimal,
    discount_percent: Decimal,
}

impl Tariff {
    pub(crate) fn from_parts(id: TariffId, data: NewTariff) -> Self {
        Self {
            id,
            city: data.city,
            tariff_type: data.tariff_type,
            price_per_minute: data.price_per_minute,
            discount_percent: data.discount_percent,
        }
    }

    pub fn id(&self) -> TariffId {
        self.id
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn tariff_type(&self) -> TariffType {
        self.tariff_type
    }

    pub fn price_per_minute(&self) -> Decimal {
        self.price_per_minute
    }

    pub fn discount_percent(&self) -> Decimal {
        self.discount_percent
    }

    /// Field values without the identity, e.g. to prefill an edit form.
    pub fn to_new(&self) -> NewTariff {
        NewTariff::new(
            self.city.clone(),
            self.tariff_type,
            self.price_per_minute,
            self.discount_percent,
        )
    }

    /// Same row with different field values.
    pub(crate) fn with_data(&self, data: NewTariff) -> Self {
        Self::from_parts(self.id, data)
    }

    pub fn final_price(&self) -> Decimal {
        final_price(self.tariff_type, self.price_per_minute, self.discount_percent)
    }

    pub fn duplicate_key(&self) -> DuplicateKey {
        DuplicateKey::new(
            &self.city,
            self.tariff_type,
            self.price_per_minute,
            self.discount_percent,
        )
    }

    /// Listing order shared by every repository: city, type token, price, id.
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.city
            .cmp(&other.city)
            .then_with(|| self.tariff_type.as_str().cmp(other.tariff_type.as_str()))
            .then_with(|| self.price_per_minute.cmp(&other.price_per_minute))
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Discount-applied price, rounded to cents and never negative.
pub fn final_price(tariff_type: TariffType, price: Decimal, discount: Decimal) -> Decimal {
    match tariff_type {
        TariffType::Regular => round2(price),
        TariffType::Privileged => {
            let factor = Decimal::ONE - discount / Decimal::ONE_HUNDRED;
            round2(price * factor).max(Decimal::ZERO)
        }
    }
}

/// What two tariffs must share to count as the same offering: city without
/// regard to case or spacing, type, and price and discount to two decimals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateKey {
    city: String,
    tariff_type: TariffType,
    price: Decimal,
    discount: Decimal,
}

impl DuplicateKey {
    pub fn new(city: &str, tariff_type: TariffType, price: Decimal, discount: Decimal) -> Self {
        let discount = match tariff_type {
            TariffType::Privileged => round2(discount),
            TariffType::Regular => Decimal::ZERO,
        };
        Self {
            city: normalize_city(city).to_lowercase(),
            tariff_type,
            price: round2(price),
            discount,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
