use crate::models::{ListingRecord, Price};
use crate::scrapers::SearchQuery;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

const HEADERS: [&str; 23] = [
    "url",
    "posting_id",
    "property_type",
    "transaction_type",
    "address",
    "location",
    "price",
    "price_currency",
    "expenses",
    "expenses_currency",
    "total_area_m2",
    "covered_area_m2",
    "rooms",
    "bedrooms",
    "bathrooms",
    "agency",
    "publisher_id",
    "antiquity",
    "garages",
    "latitude",
    "longitude",
    "operation",
    "scraped_at",
];

/// Suffix of the file holding every embedded-state field of every listing
const COMPLETE_SUFFIX: &str = "_COMPLETE";

/// Flat CSV row. `None` serializes as an empty cell.
#[derive(Serialize)]
struct CsvRow<'a> {
    url: &'a str,
    posting_id: Option<&'a str>,
    property_type: Option<&'static str>,
    transaction_type: &'static str,
    address: Option<&'a str>,
    location: Option<&'a str>,
    price: Option<u64>,
    price_currency: Option<&'static str>,
    expenses: Option<u64>,
    expenses_currency: Option<&'static str>,
    total_area_m2: Option<f64>,
    covered_area_m2: Option<f64>,
    rooms: Option<u32>,
    bedrooms: Option<u32>,
    bathrooms: Option<u32>,
    agency: Option<&'a str>,
    publisher_id: Option<&'a str>,
    antiquity: Option<u32>,
    garages: Option<u32>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    operation: Option<&'a str>,
    scraped_at: String,
}

impl<'a> From<&'a ListingRecord> for CsvRow<'a> {
    fn from(record: &'a ListingRecord) -> Self {
        Self {
            url: &record.url,
            posting_id: record.posting_id.as_deref(),
            property_type: record.property_type.map(|t| t.label()),
            transaction_type: record.transaction_type.label(),
            address: record.address.as_deref(),
            location: record.location.as_deref(),
            price: record.price.map(|p| p.amount),
            price_currency: record.price.map(currency_code),
            expenses: record.expenses.map(|p| p.amount),
            expenses_currency: record.expenses.map(currency_code),
            total_area_m2: record.total_area_m2,
            covered_area_m2: record.covered_area_m2,
            rooms: record.rooms,
            bedrooms: record.bedrooms,
            bathrooms: record.bathrooms,
            agency: record.agency.as_deref(),
            publisher_id: record.publisher_id.as_deref(),
            antiquity: record.antiquity,
            garages: record.garages,
            latitude: record.latitude,
            longitude: record.longitude,
            operation: record.operation.as_deref(),
            scraped_at: record.scraped_at.to_rfc3339(),
        }
    }
}

fn currency_code(price: Price) -> &'static str {
    price.currency.code()
}

/// Write a header row and one row per record
pub fn write_records<W: Write>(writer: W, records: &[ListingRecord]) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(HEADERS)?;
    for record in records {
        wtr.serialize(CsvRow::from(record))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Flatten a JSON value into `a.b[0].c` keyed cells. `null` is an empty cell.
fn flatten(prefix: &str, value: &Value, cells: &mut BTreeMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (key, inner) in map {
                let key = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(&key, inner, cells);
            }
        }
        Value::Array(items) => {
            for (i, inner) in items.iter().enumerate() {
                flatten(&format!("{prefix}[{i}]"), inner, cells);
            }
        }
        Value::Null => {
            cells.insert(prefix.to_string(), String::new());
        }
        Value::String(text) => {
            cells.insert(prefix.to_string(), text.clone());
        }
        other => {
            cells.insert(prefix.to_string(), other.to_string());
        }
    }
}

/// Write every field of each listing's embedded posting, one column per
/// flattened key. Columns are the union over all listings, after `url`.
pub fn write_complete<W: Write>(writer: W, records: &[ListingRecord]) -> Result<()> {
    let rows: Vec<BTreeMap<String, String>> = records
        .iter()
        .map(|record| {
            let mut cells = BTreeMap::new();
            if let Some(raw) = &record.raw_data {
                flatten("", raw, &mut cells);
            }
            cells
        })
        .collect();

    let mut seen = HashSet::new();
    let columns: Vec<&str> = rows
        .iter()
        .flat_map(|cells| cells.keys())
        .map(String::as_str)
        .filter(|key| *key != "url" && seen.insert(*key))
        .collect();

    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(std::iter::once("url").chain(columns.iter().copied()))?;
    for (record, cells) in records.iter().zip(&rows) {
        let values = columns
            .iter()
            .map(|column| cells.get(*column).map_or("", String::as_str));
        wtr.write_record(std::iter::once(record.url.as_str()).chain(values))?;
    }
    wtr.flush()?;
    Ok(())
}

/// `{dir}/{search slug}{suffix}-{timestamp}.csv`
pub fn output_path(
    dir: &Path,
    query: &SearchQuery,
    suffix: &str,
    now: DateTime<Local>,
) -> PathBuf {
    dir.join(format!(
        "{}{}-{}.csv",
        query.slug(),
        suffix,
        now.format("%Y-%m-%d-%H-%M-%S")
    ))
}

/// Files written by one run
#[derive(Debug)]
pub struct SavedFiles {
    pub listings: PathBuf,
    /// Only written when some listing came from embedded page state
    pub complete: Option<PathBuf>,
}

fn write_file(
    path: &Path,
    records: &[ListingRecord],
    write: fn(File, &[ListingRecord]) -> Result<()>,
) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    write(file, records).with_context(|| format!("Failed to write {}", path.display()))
}

/// Save the records under `dir`, creating it if needed
pub fn save_csv(dir: &Path, query: &SearchQuery, records: &[ListingRecord]) -> Result<SavedFiles> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let now = Local::now();
    let listings = output_path(dir, query, "", now);
    write_file(&listings, records, write_records)?;

    let complete = if records.iter().any(|r| r.raw_data.is_some()) {
        let path = output_path(dir, query, COMPLETE_SUFFIX, now);
        write_file(&path, records, write_complete)?;
        Some(path)
    } else {
        None
    };

    Ok(SavedFiles { listings, complete })
}
