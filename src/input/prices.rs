use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use rand::thread_rng;
use rand_distr::{Distribution, Uniform};
use time::macros::{date, format_description};
use time::Date;

const DATE_COLUMN: &str = "DATE";

pub fn parse_date(raw: &str) -> Result<Date, time::error::Parse> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(raw, &format)
}

pub fn format_date(date: Date) -> String {
    let format = format_description!("[year]-[month]-[day]");
    //Formatting a Date with a date-only description cannot fail
    date.format(&format).unwrap()
}

/// Immutable table of daily closing prices. Rows are keyed by calendar date, columns are
/// instrument symbols. Built once at startup and shared read-only across requests.
///
/// A symbol is always a member of `symbols` if the source declared the column, even when a
/// given date has no cell for it, so column existence and cell presence are separate queries.
#[derive(Clone, Debug)]
pub struct PriceTable {
    dates: Vec<Date>,
    rows: HashMap<Date, HashMap<String, f64>>,
    symbols: HashSet<String>,
}

impl PriceTable {
    pub fn get_price(&self, date: &Date, symbol: &str) -> Option<f64> {
        if let Some(date_row) = self.rows.get(date) {
            if let Some(price) = date_row.get(symbol) {
                return Some(*price);
            }
        }
        None
    }

    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    pub fn latest_date(&self) -> Option<Date> {
        self.dates.last().copied()
    }

    /// The full row of closes on the most recent date in the table.
    pub fn latest_row(&self) -> Option<&HashMap<String, f64>> {
        self.rows.get(self.dates.last()?)
    }

    pub fn has_symbol(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol)
    }

    pub fn symbols(&self) -> &HashSet<String> {
        &self.symbols
    }

    /// Load the table from a wide CSV: a `DATE` column holding `YYYY-MM-DD` values plus one
    /// column per instrument. Any malformation is fatal, the process should not start without
    /// a usable price table.
    pub fn from_path(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("unable to open prices file {path:?}"))?;
        Self::from_reader(file).with_context(|| format!("malformed prices file {path:?}"))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::Reader::from_reader(reader);

        let headers = rdr
            .headers()
            .context("prices source has no readable header row")?
            .clone();

        let date_pos = match headers.iter().position(|h| h == DATE_COLUMN) {
            Some(pos) => pos,
            None => bail!("prices source is missing the {DATE_COLUMN} column"),
        };

        let mut builder = PriceTableBuilder::new();
        for (pos, header) in headers.iter().enumerate() {
            if pos != date_pos {
                builder.add_symbol(header);
            }
        }

        for record in rdr.records() {
            let record = record.context("prices source contains an unreadable row")?;

            let raw_date = record
                .get(date_pos)
                .context("prices row has no date cell")?;
            let date = parse_date(raw_date)
                .with_context(|| format!("prices row has unparseable date {raw_date:?}"))?;

            for (pos, cell) in record.iter().enumerate() {
                if pos == date_pos || cell.is_empty() {
                    continue;
                }
                let symbol = &headers[pos];
                let price: f64 = cell.parse().with_context(|| {
                    format!("price for {symbol} on {raw_date} is not numeric: {cell:?}")
                })?;
                builder.add_price(date, symbol, price);
            }
        }

        let table = builder.build();
        if table.dates.is_empty() {
            bail!("prices source has no data rows");
        }
        Ok(table)
    }

    /// Build a table of uniform random closes, used to set up tests and examples.
    pub fn random(days: i64, symbols: Vec<&str>) -> Self {
        let price_dist = Uniform::new(90.0, 100.0);
        let mut rng = thread_rng();

        let start = date!(2024 - 01 - 01);
        let mut builder = PriceTableBuilder::new();

        for offset in 0..days {
            let date = start + time::Duration::days(offset);
            for symbol in &symbols {
                builder.add_price(date, *symbol, price_dist.sample(&mut rng));
            }
        }
        builder.build()
    }
}

pub struct PriceTableBuilder {
    rows: HashMap<Date, HashMap<String, f64>>,
    dates: HashSet<Date>,
    symbols: HashSet<String>,
}

impl PriceTableBuilder {
    pub fn new() -> Self {
        Self {
            rows: HashMap::new(),
            dates: HashSet::new(),
            symbols: HashSet::new(),
        }
    }

    /// Register a column even if no row ever fills a cell for it.
    pub fn add_symbol(&mut self, symbol: impl Into<String>) {
        self.symbols.insert(symbol.into());
    }

    pub fn add_price(&mut self, date: Date, symbol: impl Into<String>, price: f64) {
        let symbol = symbol.into();
        self.symbols.insert(symbol.clone());

        if let Some(date_row) = self.rows.get_mut(&date) {
            date_row.insert(symbol, price);
        } else {
            let mut date_row = HashMap::new();
            date_row.insert(symbol, price);
            self.rows.insert(date, date_row);
        }

        self.dates.insert(date);
    }

    pub fn build(&mut self) -> PriceTable {
        let mut dates = Vec::from_iter(self.dates.clone());
        dates.sort();

        PriceTable {
            dates,
            rows: std::mem::take(&mut self.rows),
            symbols: std::mem::take(&mut self.symbols),
        }
    }
}

impl Default for PriceTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}
