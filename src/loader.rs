use crate::dataset::Dataset;
use crate::error::{LoadError, Result};
use crate::types::{Column, KpiRecord, RawRow};
use crate::util::{non_blank, parse_count_cell, parse_date_safe, parse_f64_cell};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// What happened while loading, for the startup banner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    /// Blank measure cells; these are kept as absent values.
    pub absent_values: usize,
    /// Header cells that are not KPI columns and were ignored.
    pub ignored_columns: Vec<String>,
}

/// Load the KPI file at `path`.
///
/// Any row that does not fit the schema fails the whole load rather than
/// being dropped.
pub fn load(path: impl AsRef<Path>) -> Result<(Dataset, LoadReport)> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let (dataset, report) = load_from_reader(file)?;
    info!(
        path = %path.display(),
        rows = report.total_rows,
        absent_values = report.absent_values,
        "dataset loaded"
    );
    Ok((dataset, report))
}

pub fn load_from_reader<R: Read>(reader: R) -> Result<(Dataset, LoadReport)> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    // Serde would quietly fill a missing column with `None` on every row, so
    // check the header up front and fail with the column's name instead.
    let (columns, ignored_columns) = check_headers(rdr.headers()?)?;
    if !ignored_columns.is_empty() {
        debug!(?ignored_columns, "ignoring unknown columns");
    }

    let mut report = LoadReport {
        ignored_columns,
        ..LoadReport::default()
    };
    let mut records = Vec::new();
    for (i, result) in rdr.deserialize::<RawRow>().enumerate() {
        // 1-based data row, header excluded.
        let row_no = i + 1;
        let raw = result?;
        let (clean, absent) = clean_row(raw, row_no)?;
        report.absent_values += absent;
        records.push(clean);
    }
    report.total_rows = records.len();
    Ok((Dataset::new(records, columns), report))
}

/// Known columns in file order, plus any header cells we do not use.
/// Fails on the first required column that is not present.
fn check_headers(headers: &StringRecord) -> Result<(Vec<Column>, Vec<String>)> {
    let mut order = Vec::new();
    let mut ignored = Vec::new();
    for h in headers.iter() {
        match Column::from_header(h) {
            Some(col) if !order.contains(&col) => order.push(col),
            _ => ignored.push(h.to_string()),
        }
    }
    if let Some(missing) = Column::ALL.iter().find(|c| !order.contains(*c)) {
        return Err(LoadError::MissingColumn(missing.header().to_string()));
    }
    Ok((order, ignored))
}

/// Type one row. Returns the record and how many measure cells were blank.
fn clean_row(raw: RawRow, row: usize) -> Result<(KpiRecord, usize)> {
    // Categories and the date are the grouping keys, so a blank one makes the
    // row unusable.
    let required = |v: &Option<String>, col: Column| -> Result<String> {
        non_blank(v.as_deref())
            .map(str::to_string)
            .ok_or_else(|| LoadError::MissingField {
                row,
                column: col.header().to_string(),
            })
    };
    let city = required(&raw.city, Column::City)?;
    let product = required(&raw.product, Column::Product)?;
    let loyalty_segment = required(&raw.loyalty_segment, Column::LoyaltySegment)?;
    let branch = required(&raw.branch, Column::Branch)?;
    let date_text = required(&raw.date, Column::Date)?;
    let date = parse_date_safe(Some(date_text.as_str())).ok_or_else(|| LoadError::InvalidDate {
        row,
        value: date_text.clone(),
    })?;

    // Measures may be blank; only content that is not a number is an error.
    let number = |v: &Option<String>, col: Column| -> Result<Option<f64>> {
        parse_f64_cell(v.as_deref()).map_err(|_| invalid_number(row, col, v))
    };
    let sales = number(&raw.sales, Column::Sales)?;
    let inventory_level = number(&raw.inventory_level, Column::InventoryLevel)?;
    let avg_service_time = number(&raw.avg_service_time, Column::AvgServiceTime)?;
    let return_rate = number(&raw.return_rate, Column::ReturnRate)?;
    let customer_footfall = parse_count_cell(raw.customer_footfall.as_deref())
        .map_err(|_| invalid_number(row, Column::CustomerFootfall, &raw.customer_footfall))?;

    let absent = [sales, inventory_level, avg_service_time, return_rate]
        .iter()
        .filter(|v| v.is_none())
        .count()
        + usize::from(customer_footfall.is_none());

    Ok((
        KpiRecord {
            city,
            product,
            loyalty_segment,
            branch,
            date,
            sales,
            inventory_level,
            customer_footfall,
            avg_service_time,
            return_rate,
        },
        absent,
    ))
}

fn invalid_number(row: usize, col: Column, v: &Option<String>) -> LoadError {
    LoadError::InvalidNumber {
        row,
        column: col.header().to_string(),
        value: v.clone().unwrap_or_default(),
    }
}
