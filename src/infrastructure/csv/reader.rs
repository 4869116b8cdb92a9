use std::fs;
use std::iter::Enumerate;
use std::path::Path;
use std::str::Lines;

use rust_decimal::Decimal;

use super::{BOM, COLUMNS, DELIMITER, HEADER};
use crate::domain::{DomainError, DomainResult, NewTariff, TariffType};
use crate::shared::validations::parse_decimal;

/// A validated row together with its 1-based line number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRecord {
    pub line: usize,
    pub tariff: NewTariff,
}

pub fn read_content(path: &Path) -> DomainResult<String> {
    Ok(fs::read_to_string(path)?)
}

/// Check the header and hand out the data rows one at a time.
///
/// Blank lines are skipped. A file without any non-blank line yields no
/// rows; a bad header fails here, before any row is read.
pub fn parse_tariffs(content: &str) -> DomainResult<CsvRows<'_>> {
    let content = content.strip_prefix(BOM).unwrap_or(content);
    let mut rows = CsvRows {
        lines: content.lines().enumerate(),
    };

    if let Some((header_line, header)) = rows.next_line() {
        if !is_valid_header(header) {
            return Err(DomainError::csv(
                header_line,
                format!("некорректная шапка CSV, ожидалось: {HEADER}"),
            ));
        }
    }
    Ok(rows)
}

/// Data rows after the header. Each item is validated on its own, so an
/// error at one line says nothing about the rows after it.
pub struct CsvRows<'a> {
    lines: Enumerate<Lines<'a>>,
}

impl<'a> CsvRows<'a> {
    fn next_line(&mut self) -> Option<(usize, &'a str)> {
        self.lines
            .by_ref()
            .map(|(i, line)| (i + 1, line))
            .find(|(_, line)| !line.trim().is_empty())
    }
}

impl Iterator for CsvRows<'_> {
    type Item = DomainResult<CsvRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        let (line, text) = self.next_line()?;
        Some(
            parse_row(text)
                .map(|tariff| CsvRecord { line, tariff })
                .map_err(|e| DomainError::csv(line, e.to_string())),
        )
    }
}

fn is_valid_header(line: &str) -> bool {
    let names: Vec<&str> = line.split(DELIMITER).map(str::trim).collect();
    names.len() >= COLUMNS.len()
        && COLUMNS
            .iter()
            .zip(&names)
            .all(|(expected, got)| got.eq_ignore_ascii_case(expected))
}

fn parse_row(text: &str) -> DomainResult<NewTariff> {
    let fields: Vec<&str> = text.split(DELIMITER).collect();
    let [city, kind, price, discount, ..] = fields.as_slice() else {
        return Err(DomainError::validation(format!(
            "ожидалось 4 поля ({HEADER})"
        )));
    };

    let tariff_type: TariffType = kind.parse()?;
    let price = parse_decimal(price)?;
    let discount = parse_decimal(discount)?;
    if tariff_type == TariffType::Regular && discount != Decimal::ZERO {
        return Err(DomainError::validation(
            "для обычного тарифа скидка должна быть 0",
        ));
    }

    NewTariff::new(city.trim(), tariff_type, price, discount).validated()
}
