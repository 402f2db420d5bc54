use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

/// The columns a KPI file must carry, in their canonical header spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    City,
    Product,
    LoyaltySegment,
    Branch,
    Date,
    Sales,
    InventoryLevel,
    CustomerFootfall,
    AvgServiceTime,
    ReturnRate,
}

impl Column {
    pub const ALL: [Column; 10] = [
        Column::City,
        Column::Product,
        Column::LoyaltySegment,
        Column::Branch,
        Column::Date,
        Column::Sales,
        Column::InventoryLevel,
        Column::CustomerFootfall,
        Column::AvgServiceTime,
        Column::ReturnRate,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Column::City => "City",
            Column::Product => "Product",
            Column::LoyaltySegment => "LoyaltySegment",
            Column::Branch => "Branch",
            Column::Date => "Date",
            Column::Sales => "Sales",
            Column::InventoryLevel => "InventoryLevel (%)",
            Column::CustomerFootfall => "CustomerFootfall",
            Column::AvgServiceTime => "AvgServiceTime",
            Column::ReturnRate => "ReturnRate",
        }
    }

    /// Other spellings seen in exports for the same column.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Column::InventoryLevel => &["InventoryLevel(%)"],
            _ => &[],
        }
    }

    /// Match a header cell against the canonical names and their aliases.
    /// These are the same names `RawRow` deserializes from.
    pub fn from_header(h: &str) -> Option<Column> {
        Column::ALL
            .into_iter()
            .find(|c| c.header() == h || c.aliases().contains(&h))
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// One CSV row before typing. Every cell is optional so that the loader can
/// report exactly which field of which row is unusable.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RawRow {
    #[serde(rename = "City")]
    pub city: Option<String>,
    #[serde(rename = "Product")]
    pub product: Option<String>,
    #[serde(rename = "LoyaltySegment")]
    pub loyalty_segment: Option<String>,
    #[serde(rename = "Branch")]
    pub branch: Option<String>,
    #[serde(rename = "Date")]
    pub date: Option<String>,
    #[serde(rename = "Sales")]
    pub sales: Option<String>,
    #[serde(rename = "InventoryLevel (%)", alias = "InventoryLevel(%)")]
    pub inventory_level: Option<String>,
    #[serde(rename = "CustomerFootfall")]
    pub customer_footfall: Option<String>,
    #[serde(rename = "AvgServiceTime")]
    pub avg_service_time: Option<String>,
    #[serde(rename = "ReturnRate")]
    pub return_rate: Option<String>,
}

/// A typed KPI observation for one branch on one date.
///
/// Categorical fields and the date are always present; measures may be absent
/// and are then left out of any sum or mean.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiRecord {
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Product")]
    pub product: String,
    #[serde(rename = "LoyaltySegment")]
    pub loyalty_segment: String,
    #[serde(rename = "Branch")]
    pub branch: String,
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Sales")]
    pub sales: Option<f64>,
    #[serde(rename = "InventoryLevel (%)")]
    pub inventory_level: Option<f64>,
    #[serde(rename = "CustomerFootfall")]
    pub customer_footfall: Option<u64>,
    #[serde(rename = "AvgServiceTime")]
    pub avg_service_time: Option<f64>,
    #[serde(rename = "ReturnRate")]
    pub return_rate: Option<f64>,
}

impl KpiRecord {
    /// Render a single cell for table display. Absent measures render empty.
    pub fn cell(&self, column: Column) -> String {
        fn opt<T: ToString>(v: &Option<T>) -> String {
            v.as_ref().map(|x| x.to_string()).unwrap_or_default()
        }
        match column {
            Column::City => self.city.clone(),
            Column::Product => self.product.clone(),
            Column::LoyaltySegment => self.loyalty_segment.clone(),
            Column::Branch => self.branch.clone(),
            Column::Date => self.date.format("%Y-%m-%d").to_string(),
            Column::Sales => opt(&self.sales),
            Column::InventoryLevel => opt(&self.inventory_level),
            Column::CustomerFootfall => opt(&self.customer_footfall),
            Column::AvgServiceTime => opt(&self.avg_service_time),
            Column::ReturnRate => opt(&self.return_rate),
        }
    }

    pub fn matches(&self, selection: &Selection) -> bool {
        self.city == selection.city
            && self.product == selection.product
            && self.loyalty_segment == selection.loyalty_segment
    }
}

/// The (city, product, loyalty segment) filter triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Selection {
    pub city: String,
    pub product: String,
    pub loyalty_segment: String,
}

impl Selection {
    pub fn new(
        city: impl Into<String>,
        product: impl Into<String>,
        loyalty_segment: impl Into<String>,
    ) -> Self {
        Self {
            city: city.into(),
            product: product.into(),
            loyalty_segment: loyalty_segment.into(),
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {} / {}", self.city, self.product, self.loyalty_segment)
    }
}

/// Sorted, duplicate-free choices for each dropdown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlOptions {
    pub cities: Vec<String>,
    pub products: Vec<String>,
    pub loyalty_segments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct SalesPoint {
    #[serde(rename = "Date")]
    #[tabled(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Sales")]
    #[tabled(rename = "Sales")]
    pub sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct BranchInventory {
    #[serde(rename = "Branch")]
    #[tabled(rename = "Branch")]
    pub branch: String,
    #[serde(rename = "InventoryLevel (%)")]
    #[tabled(rename = "InventoryLevel (%)")]
    pub mean_inventory_level: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct FootfallPoint {
    #[serde(rename = "Date")]
    #[tabled(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "CustomerFootfall")]
    #[tabled(rename = "CustomerFootfall")]
    pub footfall: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceTimeSample {
    #[serde(rename = "Branch")]
    pub branch: String,
    #[serde(rename = "AvgServiceTime")]
    pub avg_service_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct SegmentCount {
    #[serde(rename = "LoyaltySegment")]
    #[tabled(rename = "LoyaltySegment")]
    pub loyalty_segment: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: usize,
}

/// Everything one selection produces, in output-slot order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedViews {
    pub selection: Selection,
    pub sales_by_date: Vec<SalesPoint>,
    pub inventory_by_branch: Vec<BranchInventory>,
    pub footfall_by_date: Vec<FootfallPoint>,
    pub service_time: Vec<ServiceTimeSample>,
    pub return_rates: Vec<f64>,
    pub loyalty_counts: Vec<SegmentCount>,
    pub rows: Vec<KpiRecord>,
}

impl DerivedViews {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
