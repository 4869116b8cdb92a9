//! Subcommands and the session that runs them
//!
//! The same [`Command`] set serves one-shot invocations (`atc add ...`) and
//! the interactive shell, where each input line is parsed as a command.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use atc_tariffs::shared::validations::{parse_decimal, round2};
use atc_tariffs::{DomainError, NewTariff, TariffId, TariffManager, TariffType};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{info, warn};

use crate::table;
use crate::words::{split_words, UnclosedQuote};

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Нет строки {0} в таблице")]
    NoSuchRow(usize),

    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ошибка JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Quote(#[from] UnclosedQuote),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Regular,
    Privileged,
}

impl From<KindArg> for TariffType {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Regular => TariffType::Regular,
            KindArg::Privileged => TariffType::Privileged,
        }
    }
}

/// Accepts `12.5`, `12,5` and `1 000,00`.
fn parse_amount(raw: &str) -> Result<Decimal, String> {
    parse_decimal(raw).map_err(|e| e.to_string())
}

#[derive(Debug, Clone, Args)]
pub struct TariffArgs {
    /// City name (letters, space, dot, hyphen)
    #[arg(long)]
    pub city: String,

    #[arg(long = "type", value_enum, default_value = "regular")]
    pub kind: KindArg,

    /// Price per minute, rubles
    #[arg(long, value_parser = parse_amount, allow_hyphen_values = true)]
    pub price: Decimal,

    /// Discount in percent; privileged tariffs only
    #[arg(long, value_parser = parse_amount, allow_hyphen_values = true, default_value = "0")]
    pub discount: Decimal,
}

impl From<TariffArgs> for NewTariff {
    fn from(args: TariffArgs) -> Self {
        NewTariff::new(args.city, args.kind.into(), args.price, args.discount)
    }
}

/// Fields left out keep their current value.
#[derive(Debug, Clone, Default, Args)]
pub struct EditArgs {
    #[arg(long)]
    pub city: Option<String>,

    #[arg(long = "type", value_enum)]
    pub kind: Option<KindArg>,

    #[arg(long, value_parser = parse_amount, allow_hyphen_values = true)]
    pub price: Option<Decimal>,

    #[arg(long, value_parser = parse_amount, allow_hyphen_values = true)]
    pub discount: Option<Decimal>,
}

impl EditArgs {
    fn apply(self, mut current: NewTariff) -> NewTariff {
        if let Some(city) = self.city {
            current.city = city;
        }
        if let Some(kind) = self.kind {
            current.tariff_type = kind.into();
        }
        if let Some(price) = self.price {
            current.price_per_minute = price;
        }
        if let Some(discount) = self.discount {
            current.discount_percent = discount;
        }
        if current.tariff_type == TariffType::Regular {
            current.discount_percent = Decimal::ZERO;
        }
        current
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Show the tariff table
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Add a tariff
    Add(TariffArgs),

    /// Change the tariff shown in row ROW
    Edit {
        row: usize,
        #[command(flatten)]
        changes: EditArgs,
    },

    /// Delete the tariff shown in row ROW
    Delete {
        row: usize,
        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Delete every tariff
    Clear {
        #[arg(short, long)]
        yes: bool,
    },

    /// Average final price per minute
    Average,

    /// Sum of final prices per minute
    Total,

    /// Change every price by PERCENT, e.g. 10 or -5
    Adjust {
        #[arg(value_parser = parse_amount, allow_hyphen_values = true)]
        percent: Decimal,
    },

    /// Append tariffs from a CSV file
    Import { file: PathBuf },

    /// Save the tariff table to a CSV file
    Export { file: PathBuf },

    /// Interactive mode
    Shell,
}

/// One line of shell input.
#[derive(Debug, Parser)]
#[command(
    name = "atc",
    no_binary_name = true,
    disable_version_flag = true,
    after_help = "exit, quit — выход"
)]
pub struct ShellLine {
    #[command(subcommand)]
    pub command: Command,
}

/// Adds `.csv` unless the name already ends with it.
pub fn with_csv_extension(path: &Path) -> PathBuf {
    let has_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if has_csv {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_owned();
        name.push(".csv");
        PathBuf::from(name)
    }
}

pub struct Session<R, W> {
    manager: TariffManager,
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(manager: TariffManager, input: R, out: W) -> Self {
        Self {
            manager,
            input,
            out,
        }
    }

    pub fn manager(&self) -> &TariffManager {
        &self.manager
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Entry point for a command line invocation.
    pub async fn run(&mut self, command: Command) -> Result<(), CliError> {
        match command {
            Command::Shell => self.run_shell().await,
            other => self.execute(other).await,
        }
    }

    pub async fn execute(&mut self, command: Command) -> Result<(), CliError> {
        match command {
            Command::List { json } => {
                if json {
                    let text = serde_json::to_string_pretty(self.manager.tariffs())?;
                    writeln!(self.out, "{text}")?;
                } else {
                    self.print_table()?;
                }
            }
            Command::Add(args) => {
                let saved = self.manager.add(args.into()).await?;
                info!(id = saved.id(), "Added from command line");
                self.print_table()?;
            }
            Command::Edit { row, changes } => {
                let id = self.id_for_row(row)?;
                let current = self
                    .manager
                    .find_by_id(id)
                    .await?
                    .ok_or(CliError::NoSuchRow(row))?;
                self.manager
                    .update_by_id(id, changes.apply(current.to_new()))
                    .await?;
                self.print_table()?;
            }
            Command::Delete { row, yes } => {
                let id = self.id_for_row(row)?;
                if yes || self.confirm("Удалить выбранный тариф?")? {
                    self.manager.remove_by_id(id).await?;
                    self.print_table()?;
                } else {
                    writeln!(self.out, "Отменено")?;
                }
            }
            Command::Clear { yes } => {
                if yes || self.confirm("Удалить все тарифы?")? {
                    self.manager.clear().await?;
                    self.print_table()?;
                } else {
                    writeln!(self.out, "Отменено")?;
                }
            }
            Command::Average => {
                let avg = round2(self.manager.average_final_price()?);
                writeln!(self.out, "Средняя цена: {avg:.2} руб/мин")?;
            }
            Command::Total => {
                let total = round2(self.manager.total_final_price()?);
                writeln!(self.out, "Общая сумма: {total:.2} руб/мин")?;
            }
            Command::Adjust { percent } => {
                self.manager.increase_all_prices(percent).await?;
                self.print_table()?;
            }
            Command::Import { file } => {
                let summary = self.manager.import_csv(&file).await?;
                writeln!(
                    self.out,
                    "Импорт завершён: добавлено {}, пропущено дубликатов {}, всего строк {}",
                    summary.added, summary.skipped, summary.total
                )?;
                self.print_table()?;
            }
            Command::Export { file } => {
                let path = with_csv_extension(&file);
                self.manager.export_csv(&path)?;
                let shown = std::path::absolute(&path).unwrap_or(path);
                writeln!(self.out, "Сохранено: {}", shown.display())?;
            }
            Command::Shell => writeln!(self.out, "Интерактивный режим уже запущен")?,
        }
        Ok(())
    }

    /// Read commands line by line until `exit`, `quit` or end of input.
    pub async fn run_shell(&mut self) -> Result<(), CliError> {
        writeln!(
            self.out,
            "Каталог тарифов АТС. help — список команд, exit — выход."
        )?;
        self.print_table()?;

        loop {
            write!(self.out, "atc> ")?;
            self.out.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.out)?;
                break;
            }

            let words = match split_words(&line) {
                Ok(words) => words,
                Err(e) => {
                    writeln!(self.out, "Ошибка: {e}")?;
                    continue;
                }
            };
            match words.first().map(String::as_str) {
                None => continue,
                Some("exit" | "quit") => break,
                _ => {}
            }

            match ShellLine::try_parse_from(&words) {
                Ok(parsed) => {
                    if let Err(e) = self.execute(parsed.command).await {
                        warn!(error = %e, "Command failed");
                        writeln!(self.out, "Ошибка: {e}")?;
                    }
                }
                Err(e) => write!(self.out, "{e}")?,
            }
        }
        Ok(())
    }

    fn id_for_row(&self, row: usize) -> Result<TariffId, CliError> {
        row.checked_sub(1)
            .and_then(|index| self.manager.get(index))
            .map(|t| t.id())
            .ok_or(CliError::NoSuchRow(row))
    }

    fn confirm(&mut self, question: &str) -> Result<bool, CliError> {
        write!(self.out, "{question} [y/N] ")?;
        self.out.flush()?;
        let mut answer = String::new();
        self.input.read_line(&mut answer)?;
        let answer = answer.trim().to_lowercase();
        Ok(matches!(answer.as_str(), "y" | "yes" | "д" | "да"))
    }

    fn print_table(&mut self) -> Result<(), CliError> {
        writeln!(self.out, "{}", table::render(self.manager.tariffs()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;

    use atc_tariffs::infrastructure::InMemoryTariffRepository;

    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    async fn session(input: &str) -> Session<Cursor<Vec<u8>>, Vec<u8>> {
        let manager = TariffManager::new(Arc::new(InMemoryTariffRepository::new()))
            .await
            .unwrap();
        Session::new(manager, Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    fn parse(line: &str) -> Command {
        ShellLine::try_parse_from(split_words(line).unwrap())
            .unwrap()
            .command
    }

    fn output(session: Session<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(session.into_output()).unwrap()
    }

    #[test]
    fn parses_add_with_comma_decimals() {
        let cmd = parse(r#"add --city "New York" --type privileged --price 2,5 --discount 10"#);
        let Command::Add(args) = cmd else {
            panic!("expected add, got {cmd:?}");
        };
        assert_eq!(args.city, "New York");
        assert_eq!(args.kind, KindArg::Privileged);
        assert_eq!(args.price, d("2.5"));
        assert_eq!(args.discount, d("10"));
    }

    #[test]
    fn parses_negative_adjustment() {
        assert!(matches!(parse("adjust -5"), Command::Adjust { percent } if percent == d("-5")));
    }

    #[test]
    fn rejects_non_numeric_price() {
        let words = split_words("add --city Omsk --price abc").unwrap();
        assert!(ShellLine::try_parse_from(words).is_err());
    }

    #[test]
    fn csv_extension_is_appended_once() {
        assert_eq!(with_csv_extension(Path::new("out")), PathBuf::from("out.csv"));
        assert_eq!(with_csv_extension(Path::new("out.CSV")), PathBuf::from("out.CSV"));
        assert_eq!(with_csv_extension(Path::new("out.txt")), PathBuf::from("out.txt.csv"));
    }

    #[tokio::test]
    async fn add_then_average_and_total() {
        let mut s = session("").await;
        s.execute(parse("add --city Springfield --type privileged --price 10 --discount 20"))
            .await
            .unwrap();
        s.execute(parse("add --city Shelbyville --price 5")).await.unwrap();
        s.execute(Command::Average).await.unwrap();
        s.execute(Command::Total).await.unwrap();

        let text = output(s);
        assert!(text.contains("Средняя цена: 6.50 руб/мин"), "{text}");
        assert!(text.contains("Общая сумма: 13.00 руб/мин"), "{text}");
    }

    #[tokio::test]
    async fn average_of_empty_catalog_is_an_error() {
        let mut s = session("").await;
        let err = s.execute(Command::Average).await.unwrap_err();
        assert!(matches!(err, CliError::Domain(DomainError::Empty)));
    }

    #[tokio::test]
    async fn edit_keeps_unchanged_fields() {
        let mut s = session("").await;
        s.execute(parse("add --city Omsk --type privileged --price 4 --discount 25"))
            .await
            .unwrap();
        s.execute(parse("edit 1 --price 8")).await.unwrap();

        let t = &s.manager().tariffs()[0];
        assert_eq!(t.city(), "Omsk");
        assert_eq!(t.price_per_minute(), d("8"));
        assert_eq!(t.discount_percent(), d("25"));
        assert_eq!(t.final_price(), d("6.00"));
    }

    #[tokio::test]
    async fn edit_to_regular_drops_discount() {
        let mut s = session("").await;
        s.execute(parse("add --city Omsk --type privileged --price 4 --discount 25"))
            .await
            .unwrap();
        s.execute(parse("edit 1 --type regular")).await.unwrap();
        assert_eq!(s.manager().tariffs()[0].discount_percent(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn unknown_row_is_reported() {
        let mut s = session("").await;
        assert!(matches!(
            s.execute(parse("delete 0 --yes")).await,
            Err(CliError::NoSuchRow(0))
        ));
        assert!(matches!(
            s.execute(parse("edit 3 --price 1")).await,
            Err(CliError::NoSuchRow(3))
        ));
    }

    #[tokio::test]
    async fn delete_asks_for_confirmation() {
        let mut s = session("n\nда\n").await;
        s.execute(parse("add --city Omsk --price 1")).await.unwrap();

        s.execute(parse("delete 1")).await.unwrap();
        assert_eq!(s.manager().tariffs().len(), 1);

        s.execute(parse("delete 1")).await.unwrap();
        assert!(s.manager().tariffs().is_empty());

        let text = output(s);
        assert!(text.contains("Удалить выбранный тариф? [y/N]"));
        assert!(text.contains("Отменено"));
        assert!(text.contains(table::EMPTY_MESSAGE));
    }

    #[tokio::test]
    async fn export_then_import_skips_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("tariffs");

        let mut s = session("").await;
        s.execute(parse("add --city Omsk --price 1,5")).await.unwrap();
        s.execute(Command::Export {
            file: target.clone(),
        })
        .await
        .unwrap();
        assert!(dir.path().join("tariffs.csv").exists());

        s.execute(Command::Import {
            file: dir.path().join("tariffs.csv"),
        })
        .await
        .unwrap();
        assert_eq!(s.manager().tariffs().len(), 1);

        let text = output(s);
        assert!(text.contains("Сохранено: "), "{text}");
        assert!(text.contains("добавлено 0, пропущено дубликатов 1, всего строк 1"), "{text}");
    }

    #[tokio::test]
    async fn shell_runs_until_exit_and_survives_errors() {
        let script = "\
add --city Omsk --price 2
add --city Omsk --price 2
add --city 'Tomsk' --price 5000
list --json
exit
add --city Kazan --price 1
";
        let mut s = session(script).await;
        s.run_shell().await.unwrap();
        assert_eq!(s.manager().tariffs().len(), 1);

        let text = output(s);
        assert!(text.contains("Такой тариф уже существует"), "{text}");
        assert!(text.contains("Цена должна быть"), "{text}");
        assert!(text.contains("\"city\": \"Omsk\""), "{text}");
        assert!(!text.contains("Kazan"));
    }

    #[tokio::test]
    async fn shell_stops_at_end_of_input() {
        let mut s = session("list\n").await;
        s.run_shell().await.unwrap();
        assert!(output(s).contains(table::EMPTY_MESSAGE));
    }
}
