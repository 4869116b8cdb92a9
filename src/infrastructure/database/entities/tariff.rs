//! Tariff table entity

use sea_orm::entity::prelude::*;

/// Stored tariff type token
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum TariffType {
    #[sea_orm(string_value = "REGULAR")]
    Regular,
    #[sea_orm(string_value = "PRIVILEGED")]
    Privileged,
}

/// One row of the `tariffs` table
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "tariffs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Normalized city name
    pub city: String,

    #[sea_orm(column_name = "type")]
    pub tariff_type: TariffType,

    /// Price per minute, 0.01..=1000.00
    pub price: f64,

    /// Discount percent, 0 for REGULAR rows
    pub discount: f64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
