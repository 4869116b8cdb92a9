//! CSV interchange for the tariff list
//!
//! Files are UTF-8 with a leading BOM (spreadsheet tools need it to pick the
//! encoding), `;`-delimited, with the header `city;type;price;discount`.
//! Semicolons inside city names are written as commas; the substitution is
//! not reversed on import.

mod reader;
mod writer;

pub use reader::{parse_tariffs, read_content, CsvRecord, CsvRows};
pub use writer::{render_tariffs, write_tariffs};

pub const HEADER: &str = "city;type;price;discount";
pub const COLUMNS: [&str; 4] = ["city", "type", "price", "discount"];
pub const DELIMITER: char = ';';
const BOM: char = '\u{FEFF}';
