//! Table view over the manager's cache

use atc_tariffs::shared::validations::round2;
use atc_tariffs::{Tariff, TariffType};
use tabled::{
    builder::Builder,
    settings::{
        object::{Columns, Rows},
        Alignment, Style, Theme,
    },
};

pub const EMPTY_MESSAGE: &str = "Список тарифов пуст";

const HEADER: [&str; 6] = [
    "№",
    "Город",
    "Тип",
    "Цена, руб/мин",
    "Скидка, %",
    "Итоговая цена, руб/мин",
];

/// Rows are numbered from 1 in cache order; `edit`/`delete` take that number.
pub fn render(tariffs: &[Tariff]) -> String {
    if tariffs.is_empty() {
        return EMPTY_MESSAGE.to_string();
    }

    let mut builder = Builder::default();
    builder.push_record(HEADER);
    for (i, t) in tariffs.iter().enumerate() {
        let discount = match t.tariff_type() {
            TariffType::Privileged => format!("{:.2}", round2(t.discount_percent())),
            TariffType::Regular => "—".to_string(),
        };
        builder.push_record([
            (i + 1).to_string(),
            t.city().to_string(),
            t.tariff_type().title().to_string(),
            format!("{:.2}", round2(t.price_per_minute())),
            discount,
            format!("{:.2}", t.final_price()),
        ]);
    }

    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    theme.remove_horizontal_lines();
    table.with(theme);
    table.modify(Rows::first(), Alignment::center());
    table.modify(Columns::new(3..6), Alignment::right());
    table.to_string()
}
