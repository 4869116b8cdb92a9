//! Field rules shared by the manager, the SQLite repository and the CSV importer.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::shared::errors::{DomainError, DomainResult};

pub const CITY_MIN_CHARS: usize = 2;
pub const CITY_MAX_CHARS: usize = 30;

/// 0.01
pub const MIN_PRICE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);
/// 1000.00
pub const MAX_PRICE: Decimal = Decimal::from_parts(100_000, 0, 0, false, 2);
pub const MAX_DISCOUNT: Decimal = Decimal::ONE_HUNDRED;

/// Prices keep the precision written to CSV.
pub const PRICE_SCALE: u32 = 4;
pub const DISCOUNT_SCALE: u32 = 2;

static CITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\p{L} .\-]+$").unwrap_or_else(|e| unreachable!("city pattern: {e}"))
});

/// Trim and collapse every run of whitespace into one space.
pub fn normalize_city(city: &str) -> String {
    city.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn validate_city(city: &str) -> DomainResult<()> {
    let city = normalize_city(city);
    if city.is_empty() {
        return Err(DomainError::validation("Пустое название города"));
    }
    let len = city.chars().count();
    if !(CITY_MIN_CHARS..=CITY_MAX_CHARS).contains(&len) {
        return Err(DomainError::validation(format!(
            "Название города: {CITY_MIN_CHARS}–{CITY_MAX_CHARS} символов"
        )));
    }
    if !CITY_RE.is_match(&city) {
        return Err(DomainError::validation(
            "Только буквы, пробел, точка, дефис",
        ));
    }
    Ok(())
}

pub fn validate_price(price: Decimal) -> DomainResult<()> {
    if price < MIN_PRICE || price > MAX_PRICE {
        return Err(DomainError::validation("Цена должна быть 0.01..1 000.00"));
    }
    Ok(())
}

pub fn validate_discount(discount: Decimal) -> DomainResult<()> {
    if discount < Decimal::ZERO || discount > MAX_DISCOUNT {
        return Err(DomainError::validation(
            "Скидка должна быть в диапазоне 0..100%",
        ));
    }
    Ok(())
}

/// Half away from zero, the way prices are shown to people.
pub fn round_to(value: Decimal, dp: u32) -> Decimal {
    value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

pub fn round2(value: Decimal) -> Decimal {
    round_to(value, 2)
}

/// Lenient decimal parsing for user and CSV input: `,` or `.` as the
/// fractional separator, spaces and non-breaking spaces ignored.
pub fn parse_decimal(raw: &str) -> DomainResult<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{00A0}')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    cleaned
        .parse::<Decimal>()
        .map_err(|_| DomainError::validation(format!("не число: {}", raw.trim())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize_city("  New   York \t"), "New York");
        assert_eq!(normalize_city(""), "");
    }

    #[test]
    fn city_rules() {
        assert!(validate_city("Москва").is_ok());
        assert!(validate_city("St. Louis").is_ok());
        assert!(validate_city("Ростов-на-Дону").is_ok());
        assert!(validate_city("   ").is_err());
        assert!(validate_city("A").is_err());
        assert!(validate_city(&"a".repeat(31)).is_err());
        assert!(validate_city(&"я".repeat(30)).is_ok());
        assert!(validate_city("City 17").is_err());
        assert!(validate_city("Rome;Milan").is_err());
    }

    #[test]
    fn empty_city_message() {
        let err = validate_city("  ").unwrap_err();
        assert_eq!(err.to_string(), "Пустое название города");
    }

    #[test]
    fn price_bounds_are_inclusive() {
        assert!(validate_price(d("0.01")).is_ok());
        assert!(validate_price(d("1000.00")).is_ok());
        assert!(validate_price(d("0.009")).is_err());
        assert!(validate_price(d("1000.01")).is_err());
        assert!(validate_price(Decimal::ZERO).is_err());
    }

    #[test]
    fn discount_bounds_are_inclusive() {
        assert!(validate_discount(Decimal::ZERO).is_ok());
        assert!(validate_discount(d("100")).is_ok());
        assert!(validate_discount(d("-0.5")).is_err());
        assert!(validate_discount(d("100.01")).is_err());
    }

    #[test]
    fn round2_is_half_away_from_zero() {
        assert_eq!(round2(d("2.345")), d("2.35"));
        assert_eq!(round2(d("2.344")), d("2.34"));
        assert_eq!(round2(d("0.125")), d("0.13"));
    }

    #[test]
    fn parse_decimal_accepts_comma_and_spaces() {
        assert_eq!(parse_decimal("12,50").unwrap(), d("12.5"));
        assert_eq!(parse_decimal(" 1 000.25 ").unwrap(), d("1000.25"));
        assert_eq!(parse_decimal("1\u{00A0}000,5").unwrap(), d("1000.5"));
        assert!(parse_decimal("abc").is_err());
        assert!(parse_decimal("").is_err());
    }
}
