use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use csv::StringRecord;
use log::{debug, trace};

use crate::error::{Error, Result};

pub const DATE_FORMAT: &str = "%d-%b-%Y";

const BYTE_ORDER_MARK: &[u8] = b"\xEF\xBB\xBF";
const STATEMENT_EXTENSION: &str = ".csv";

const AMC_NAME_COLUMN: usize = 0;
const FOLIO_COLUMN: usize = 3;
const ISSUER_CODE_COLUMN: usize = 4;
const SCHEME_NAME_COLUMN: usize = 5;
const DATE_COLUMN: usize = 7;
const DESCRIPTION_COLUMN: usize = 8;
const AMOUNT_COLUMN: usize = 10;
const UNITS_COLUMN: usize = 11;
const PRICE_COLUMN: usize = 12;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TransactionKind {
    Buy,
    Sell,
    Other,
}

impl TransactionKind {
    /// Classifies the free-text transaction description of a statement row.
    pub fn classify(description: &str) -> Self {
        let description = description.to_lowercase();
        if description.contains("purchase") || description.contains("switch in") {
            TransactionKind::Buy
        } else if description.contains("redemption") || description.contains("switch out") {
            TransactionKind::Sell
        } else {
            TransactionKind::Other
        }
    }
}

/**
 * Units are always kept as an unsigned magnitude, whether the statement
 * reports sells as negative or not. The kind says which way they move.
 */
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transaction {
    date: NaiveDate,
    kind: TransactionKind,
    units: f64,
    price: f64,
    amount: f64,
}

impl Transaction {
    pub fn new(date: NaiveDate, kind: TransactionKind, units: f64, price: f64, amount: f64) -> Self {
        Transaction {
            date,
            kind,
            units: units.abs(),
            price,
            amount,
        }
    }

    /// A transaction that does not move units (dividends, address changes...).
    pub fn other(date: NaiveDate) -> Self {
        Transaction::new(date, TransactionKind::Other, 0.0, 0.0, 0.0)
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn units(&self) -> f64 {
        self.units
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }
}

pub fn parse_date(value: &str, origin: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| Error::DateParse {
        value: value.to_string(),
        origin: origin.to_string(),
    })
}

/// Only finite numbers are accepted; `NaN` or `inf` would slip past the
/// over-sell check.
fn parse_number(field: &'static str, value: &str, origin: &str) -> Result<f64> {
    match value.parse::<f64>() {
        Ok(number) if number.is_finite() => Ok(number),
        _ => Err(Error::NumberParse {
            field,
            value: value.to_string(),
            origin: origin.to_string(),
        }),
    }
}

/// One transactional row of a statement export, borrowed from the csv record.
#[derive(Debug)]
pub struct StatementRow<'r> {
    pub amc_name: &'r str,
    pub folio: &'r str,
    pub issuer_code: &'r str,
    pub scheme_name: &'r str,
    date: &'r str,
    description: &'r str,
    amount: &'r str,
    units: &'r str,
    price: &'r str,
    pub origin: String,
}

impl<'r> StatementRow<'r> {
    /// Returns `None` for rows without a folio number, which carry no transaction.
    pub fn from_record(record: &'r StringRecord, origin: String) -> Result<Option<Self>> {
        let folio = record.get(FOLIO_COLUMN).unwrap_or_default();
        if folio.is_empty() {
            trace!("Skipping row without folio at {}", origin);
            return Ok(None);
        }

        let column = |index: usize, field: &'static str| {
            record.get(index).ok_or_else(|| Error::MissingField {
                field,
                origin: origin.clone(),
            })
        };
        let amc_name = column(AMC_NAME_COLUMN, "fund name")?;
        let issuer_code = column(ISSUER_CODE_COLUMN, "issuer code")?;
        let scheme_name = column(SCHEME_NAME_COLUMN, "scheme name")?;
        let date = column(DATE_COLUMN, "date")?;
        let description = column(DESCRIPTION_COLUMN, "transaction type")?;
        let amount = column(AMOUNT_COLUMN, "amount")?;
        let units = column(UNITS_COLUMN, "units")?;
        let price = column(PRICE_COLUMN, "price")?;

        Ok(Some(StatementRow {
            amc_name,
            folio,
            issuer_code,
            scheme_name,
            date,
            description,
            amount,
            units,
            price,
            origin,
        }))
    }

    pub fn to_transaction(&self) -> Result<Transaction> {
        let date = parse_date(self.date, &self.origin)?;
        let kind = TransactionKind::classify(self.description);
        if kind == TransactionKind::Other {
            return Ok(Transaction::other(date));
        }

        let units = parse_number("units", self.units, &self.origin)?;
        let price = parse_number("price", self.price, &self.origin)?;
        let amount = parse_number("amount", self.amount, &self.origin)?;
        Ok(Transaction::new(date, kind, units, price, amount))
    }
}

/// Lists the statement exports in `dir`, sorted by file name.
pub fn discover_statements(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_statement = path
            .file_name()
            .map_or(false, |name| name.to_string_lossy().ends_with(STATEMENT_EXTENSION));
        if is_statement && path.is_file() {
            paths.push(path);
        }
    }

    if paths.is_empty() {
        return Err(Error::Discovery(dir.to_path_buf()));
    }
    paths.sort();
    Ok(paths)
}

/// Feeds every transactional row of the statement at `path` to `visit` and
/// returns how many there were. The header row is skipped.
pub fn read_statement<F>(path: &Path, mut visit: F) -> Result<usize>
where
    F: FnMut(StatementRow<'_>) -> Result<()>,
{
    let bytes = fs::read(path)?;
    let content = bytes.strip_prefix(BYTE_ORDER_MARK).unwrap_or(&bytes[..]);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content);

    let label = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let mut rows = 0;
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |position| position.line());
        if let Some(row) = StatementRow::from_record(&record, format!("{}:{}", label, line))? {
            visit(row)?;
            rows += 1;
        }
    }
    debug!("Read {} transaction rows from {}", rows, path.display());
    Ok(rows)
}
