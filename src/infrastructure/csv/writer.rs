use std::fs;
use std::io::Write;
use std::path::Path;

use tracing::{info, warn};

use super::{BOM, DELIMITER, HEADER};
use crate::domain::{DomainResult, Tariff};
use crate::shared::validations::{round_to, DISCOUNT_SCALE, PRICE_SCALE};

fn escape(city: &str) -> String {
    city.replace(DELIMITER, ",")
}

/// Full file contents, BOM included.
pub fn render_tariffs(tariffs: &[Tariff]) -> String {
    let mut out = String::new();
    out.push(BOM);
    out.push_str(HEADER);
    out.push('\n');
    for t in tariffs {
        out.push_str(&format!(
            "{city}{sep}{kind}{sep}{price:.4}{sep}{discount:.2}\n",
            city = escape(t.city()),
            kind = t.tariff_type().as_str(),
            price = round_to(t.price_per_minute(), PRICE_SCALE),
            discount = round_to(t.discount_percent(), DISCOUNT_SCALE),
            sep = DELIMITER,
        ));
    }
    out
}

/// Write through a temporary file next to `path`, then move it into place.
///
/// When the rename is refused (e.g. the target is on another volume or held
/// open), the contents are copied over the target and the temp file removed.
pub fn write_tariffs(path: &Path, tariffs: &[Tariff]) -> DomainResult<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = tempfile::Builder::new()
        .prefix("atc_")
        .suffix(".csv")
        .tempfile_in(dir)?;
    tmp.write_all(render_tariffs(tariffs).as_bytes())?;
    tmp.as_file().sync_all()?;

    if let Err(e) = tmp.persist(path) {
        warn!(error = %e.error, "rename failed, copying temp file over {}", path.display());
        fs::copy(e.file.path(), path)?;
        // dropping the NamedTempFile removes it
    }

    info!(rows = tariffs.len(), "CSV saved to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::domain::NewTariff;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn sample() -> Vec<Tariff> {
        vec![
            Tariff::from_parts(1, NewTariff::regular("Omsk", d("1.5"))),
            Tariff::from_parts(2, NewTariff::privileged("Rome;Milan", d("10"), d("12.5"))),
        ]
    }

    #[test]
    fn renders_bom_header_and_fixed_precision() {
        let text = render_tariffs(&sample());
        assert!(text.starts_with('\u{FEFF}'));
        let lines: Vec<&str> = text.trim_start_matches('\u{FEFF}').lines().collect();
        assert_eq!(
            lines,
            vec![
                "city;type;price;discount",
                "Omsk;REGULAR;1.5000;0.00",
                "Rome,Milan;PRIVILEGED;10.0000;12.50",
            ]
        );
    }

    #[test]
    fn writes_file_and_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        write_tariffs(&path, &sample()).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[..3], &[0xEF, 0xBB, 0xBF]);
        assert_eq!(String::from_utf8(bytes).unwrap(), render_tariffs(&sample()));

        // only the target remains, no temp files
        let entries = fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        fs::write(&path, "old contents").unwrap();
        write_tariffs(&path, &[]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "\u{FEFF}city;type;price;discount\n");
    }
}
