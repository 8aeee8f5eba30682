use std::collections::HashSet;

use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::input::prices::{format_date, PriceTable};

const NAME_COLUMN: &str = "name";
const WEIGHT_COLUMN: &str = "weight";

/// Number of holdings returned by the ranking, fewer if the basket is smaller.
pub const TOP_HOLDINGS: usize = 5;

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Constituent {
    pub name: String,
    pub weight: f64,
    pub latest_close: f64,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct EtfSeriesPoint {
    pub date: String,
    pub price: f64,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Holding {
    pub name: String,
    pub holding_value: f64,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct BasketReport {
    pub constituents: Vec<Constituent>,
    pub etf_series: Vec<EtfSeriesPoint>,
    pub top_holdings: Vec<Holding>,
}

#[derive(Clone, Debug, Display, PartialEq)]
pub enum BasketError {
    #[display("error in uploaded CSV: {_0}")]
    Parse(String),
    #[display("uploaded CSV is empty")]
    EmptyInput,
    #[display("uploaded CSV is missing columns: {}", _0.join(", "))]
    Schema(Vec<String>),
    #[display("weight column contains non-numeric values")]
    InvalidWeight,
    #[display("weights must be non-negative")]
    NegativeWeight,
    #[display("duplicate constituents found: {}", _0.join(", "))]
    Duplicate(Vec<String>),
    #[display("price data missing for: {}", _0.join(", "))]
    UnknownConstituent(Vec<String>),
    #[display("price table has no value for {_0} on a required date")]
    MissingPrice(String),
}

impl std::error::Error for BasketError {}

impl BasketError {
    /// Machine-distinguishable kind, stable across message wording changes.
    pub fn kind(&self) -> &'static str {
        match self {
            BasketError::Parse(_) => "ParseError",
            BasketError::EmptyInput => "EmptyInputError",
            BasketError::Schema(_) => "SchemaError",
            BasketError::InvalidWeight => "InvalidWeightError",
            BasketError::NegativeWeight => "NegativeWeightError",
            BasketError::Duplicate(_) => "DuplicateConstituentError",
            BasketError::UnknownConstituent(_) => "UnknownConstituentError",
            BasketError::MissingPrice(_) => "MissingPriceError",
        }
    }

    /// MissingPrice means a symbol passed column-existence validation but a cell was empty,
    /// which is a defect in the loaded table rather than in the request.
    pub fn is_internal(&self) -> bool {
        matches!(self, BasketError::MissingPrice(_))
    }
}

/// Uploaded basket after CSV decoding but before validation. Cells are kept as raw strings so
/// each check can report its own failure precisely.
#[derive(Clone, Debug)]
pub struct RawBasket {
    headers: Vec<String>,
    records: Vec<Vec<String>>,
}

impl RawBasket {
    fn column(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    fn cells(&self, column: usize) -> impl Iterator<Item = &str> {
        //The csv reader rejects ragged rows so every record has a cell for every header
        self.records.iter().map(move |record| record[column].as_str())
    }
}

pub fn parse_basket(raw: &[u8]) -> Result<RawBasket, BasketError> {
    let mut rdr = csv::Reader::from_reader(raw);

    let headers = match rdr.headers() {
        Ok(headers) => headers.iter().map(String::from).collect(),
        Err(e) => return Err(BasketError::Parse(e.to_string())),
    };

    let mut records = Vec::new();
    for record in rdr.records() {
        match record {
            Ok(record) => records.push(record.iter().map(String::from).collect()),
            Err(e) => return Err(BasketError::Parse(e.to_string())),
        }
    }

    Ok(RawBasket { headers, records })
}

type Check = fn(&RawBasket, &PriceTable) -> Result<(), BasketError>;

/// The order of this slice is the validation contract: checks run top to bottom and the first
/// failure is the only error a request ever surfaces.
const CHECKS: [Check; 6] = [
    check_has_rows,
    check_schema,
    check_weights_numeric,
    check_weights_non_negative,
    check_no_duplicates,
    check_known_constituents,
];

fn check_has_rows(basket: &RawBasket, _prices: &PriceTable) -> Result<(), BasketError> {
    if basket.records.is_empty() {
        return Err(BasketError::EmptyInput);
    }
    Ok(())
}

fn check_schema(basket: &RawBasket, _prices: &PriceTable) -> Result<(), BasketError> {
    let mut missing = Vec::new();
    for required in [NAME_COLUMN, WEIGHT_COLUMN] {
        if basket.column(required).is_none() {
            missing.push(required.to_string());
        }
    }

    if !missing.is_empty() {
        return Err(BasketError::Schema(missing));
    }
    Ok(())
}

fn check_weights_numeric(basket: &RawBasket, _prices: &PriceTable) -> Result<(), BasketError> {
    let Some(column) = basket.column(WEIGHT_COLUMN) else {
        return Ok(());
    };

    //Reported once for the column, not per offending row. "NaN" and friends parse as f64 but
    //are not usable weights, and surrounding whitespace is tolerated
    for cell in basket.cells(column) {
        match cell.trim().parse::<f64>() {
            Ok(weight) if !weight.is_nan() => {}
            _ => return Err(BasketError::InvalidWeight),
        }
    }
    Ok(())
}

fn check_weights_non_negative(basket: &RawBasket, _prices: &PriceTable) -> Result<(), BasketError> {
    let Some(column) = basket.column(WEIGHT_COLUMN) else {
        return Ok(());
    };

    for cell in basket.cells(column) {
        if let Ok(weight) = cell.trim().parse::<f64>() {
            if weight < 0.0 {
                return Err(BasketError::NegativeWeight);
            }
        }
    }
    Ok(())
}

fn check_no_duplicates(basket: &RawBasket, _prices: &PriceTable) -> Result<(), BasketError> {
    let Some(column) = basket.column(NAME_COLUMN) else {
        return Ok(());
    };

    let mut seen = HashSet::new();
    let mut duplicates: Vec<String> = Vec::new();
    for name in basket.cells(column) {
        if !seen.insert(name) && !duplicates.iter().any(|dup| dup == name) {
            duplicates.push(name.to_string());
        }
    }

    if !duplicates.is_empty() {
        return Err(BasketError::Duplicate(duplicates));
    }
    Ok(())
}

fn check_known_constituents(basket: &RawBasket, prices: &PriceTable) -> Result<(), BasketError> {
    let Some(column) = basket.column(NAME_COLUMN) else {
        return Ok(());
    };

    let unknown: Vec<String> = basket
        .cells(column)
        .filter(|name| !prices.has_symbol(name))
        .map(String::from)
        .collect();

    if !unknown.is_empty() {
        return Err(BasketError::UnknownConstituent(unknown));
    }
    Ok(())
}

struct BasketRow {
    name: String,
    weight: f64,
}

impl RawBasket {
    /// Only callable once the validation chain has passed.
    fn rows(&self) -> Vec<BasketRow> {
        //Schema and weight checks have already run so these lookups cannot fail
        let name_col = self.column(NAME_COLUMN).unwrap();
        let weight_col = self.column(WEIGHT_COLUMN).unwrap();

        self.records
            .iter()
            .map(|record| BasketRow {
                name: record[name_col].clone(),
                weight: record[weight_col].trim().parse().unwrap(),
            })
            .collect()
    }
}

/// Validate an uploaded basket CSV against the price table and compute the derived outputs:
/// per-constituent latest close, the weighted daily series over the full table history and
/// the top holdings by value.
pub fn evaluate(prices: &PriceTable, raw: &[u8]) -> Result<BasketReport, BasketError> {
    let basket = parse_basket(raw)?;
    for check in CHECKS {
        check(&basket, prices)?;
    }

    let rows = basket.rows();

    //Validation leaves at least one basket row, and a table with declared symbols but no
    //date rows is the same data-integrity defect as an empty cell
    let latest_row = prices
        .latest_row()
        .ok_or_else(|| BasketError::MissingPrice(rows[0].name.clone()))?;

    let mut constituents = Vec::with_capacity(rows.len());
    for row in &rows {
        let latest_close = latest_row
            .get(&row.name)
            .copied()
            .ok_or_else(|| BasketError::MissingPrice(row.name.clone()))?;
        constituents.push(Constituent {
            name: row.name.clone(),
            weight: row.weight,
            latest_close,
        });
    }

    let mut etf_series = Vec::with_capacity(prices.dates().len());
    for date in prices.dates() {
        let mut price = 0.0;
        for row in &rows {
            let close = prices
                .get_price(date, &row.name)
                .ok_or_else(|| BasketError::MissingPrice(row.name.clone()))?;
            price += row.weight * close;
        }
        etf_series.push(EtfSeriesPoint {
            date: format_date(*date),
            price,
        });
    }

    let mut top_holdings: Vec<Holding> = constituents
        .iter()
        .map(|constituent| Holding {
            name: constituent.name.clone(),
            holding_value: constituent.weight * constituent.latest_close,
        })
        .collect();
    //Stable sort keeps input order between equal holding values
    top_holdings.sort_by(|x, y| y.holding_value.partial_cmp(&x.holding_value).unwrap());
    top_holdings.truncate(TOP_HOLDINGS);

    Ok(BasketReport {
        constituents,
        etf_series,
        top_holdings,
    })
}
