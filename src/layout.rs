// Static dashboard structure: dropdown controls, the seven output slots and
// the table definition.
use crate::dataset::Dataset;
use crate::types::{Column, ControlOptions, Selection};

pub const DASHBOARD_TITLE: &str = "Nothing Before Coffee - Franchise KPI Dashboard";
pub const TABLE_HEADING: &str = "Branch Performance Table";

pub fn control_options(dataset: &Dataset) -> ControlOptions {
    ControlOptions {
        cities: dataset.distinct(|r| r.city.as_str()),
        products: dataset.distinct(|r| r.product.as_str()),
        loyalty_segments: dataset.distinct(|r| r.loyalty_segment.as_str()),
    }
}

/// First value of each sorted option list. `None` when the dataset is empty.
pub fn default_selection(options: &ControlOptions) -> Option<Selection> {
    Some(Selection::new(
        options.cities.first()?.clone(),
        options.products.first()?.clone(),
        options.loyalty_segments.first()?.clone(),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dropdown {
    pub id: &'static str,
    pub label: &'static str,
    pub options: Vec<String>,
    pub value: Option<String>,
    pub clearable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Bar,
    Area,
    Box,
    Histogram,
    Pie,
    Table,
}

/// The output slots, in the order `compute` fills them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    SalesLine,
    InventoryBar,
    FootfallTrend,
    ServiceEfficiency,
    ReturnRate,
    LoyaltyPie,
    BranchTable,
}

impl Slot {
    pub const ALL: [Slot; 7] = [
        Slot::SalesLine,
        Slot::InventoryBar,
        Slot::FootfallTrend,
        Slot::ServiceEfficiency,
        Slot::ReturnRate,
        Slot::LoyaltyPie,
        Slot::BranchTable,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Slot::SalesLine => "sales-line",
            Slot::InventoryBar => "inventory-bar",
            Slot::FootfallTrend => "footfall-trend",
            Slot::ServiceEfficiency => "service-efficiency",
            Slot::ReturnRate => "return-rate",
            Slot::LoyaltyPie => "loyalty-pie",
            Slot::BranchTable => "branch-table",
        }
    }

    pub fn kind(self) -> ChartKind {
        match self {
            Slot::SalesLine => ChartKind::Line,
            Slot::InventoryBar => ChartKind::Bar,
            Slot::FootfallTrend => ChartKind::Area,
            Slot::ServiceEfficiency => ChartKind::Box,
            Slot::ReturnRate => ChartKind::Histogram,
            Slot::LoyaltyPie => ChartKind::Pie,
            Slot::BranchTable => ChartKind::Table,
        }
    }

    pub fn title(self, selection: &Selection) -> String {
        match self {
            Slot::SalesLine => format!(
                "Sales Trend in {} for {}",
                selection.city, selection.product
            ),
            Slot::InventoryBar => format!("Inventory in {}", selection.city),
            Slot::FootfallTrend => "Customer Footfall Over Time".to_string(),
            Slot::ServiceEfficiency => "Service Time per Branch".to_string(),
            Slot::ReturnRate => "Return Rate Distribution".to_string(),
            Slot::LoyaltyPie => "Loyalty Segments".to_string(),
            Slot::BranchTable => TABLE_HEADING.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    pub id: &'static str,
    pub columns: Vec<String>,
    pub page_size: usize,
}

/// Whole-page structure handed to the front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub title: String,
    pub dropdowns: Vec<Dropdown>,
    pub slots: Vec<Slot>,
    pub table: TableSpec,
}

pub fn layout(dataset: &Dataset, title: &str, page_size: usize) -> Layout {
    let options = control_options(dataset);
    let dropdown = |id, label, options: Vec<String>| Dropdown {
        id,
        label,
        value: options.first().cloned(),
        options,
        clearable: false,
    };
    Layout {
        title: title.to_string(),
        dropdowns: vec![
            dropdown("city-dropdown", "Select City:", options.cities),
            dropdown("product-dropdown", "Select Product:", options.products),
            dropdown(
                "loyalty-dropdown",
                "Select Loyalty Segment:",
                options.loyalty_segments,
            ),
        ],
        slots: Slot::ALL.to_vec(),
        table: TableSpec {
            id: Slot::BranchTable.id(),
            columns: dataset
                .columns()
                .iter()
                .map(|c: &Column| c.header().to_string())
                .collect(),
            page_size,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::fixtures::record;

    fn ds() -> Dataset {
        Dataset::from_records(vec![
            record("Austin", "Tea", "Silver", "A1", "2024-01-01"),
            record("Boston", "Coffee", "Gold", "B1", "2024-01-01"),
            record("Austin", "Coffee", "Gold", "A2", "2024-01-02"),
        ])
    }

    #[test]
    fn options_are_sorted_and_deduplicated() {
        let opts = control_options(&ds());
        assert_eq!(opts.cities, vec!["Austin", "Boston"]);
        assert_eq!(opts.products, vec!["Coffee", "Tea"]);
        assert_eq!(opts.loyalty_segments, vec!["Gold", "Silver"]);
    }

    #[test]
    fn default_selection_takes_first_of_each() {
        let sel = default_selection(&control_options(&ds())).unwrap();
        assert_eq!(sel, Selection::new("Austin", "Coffee", "Gold"));
        assert_eq!(default_selection(&ControlOptions::default()), None);
    }

    #[test]
    fn layout_declares_seven_slots_in_order() {
        let l = layout(&ds(), DASHBOARD_TITLE, 10);
        let ids: Vec<&str> = l.slots.iter().map(|s| s.id()).collect();
        assert_eq!(
            ids,
            vec![
                "sales-line",
                "inventory-bar",
                "footfall-trend",
                "service-efficiency",
                "return-rate",
                "loyalty-pie",
                "branch-table"
            ]
        );
        assert_eq!(l.dropdowns[0].value.as_deref(), Some("Austin"));
        assert!(l.dropdowns.iter().all(|d| !d.clearable));
        assert_eq!(l.table.columns.len(), 10);
        assert_eq!(l.table.columns[6], "InventoryLevel (%)");
        assert_eq!(l.table.page_size, 10);
    }

    #[test]
    fn titles_mention_the_selection() {
        let sel = Selection::new("Austin", "Coffee", "Gold");
        assert_eq!(Slot::SalesLine.title(&sel), "Sales Trend in Austin for Coffee");
        assert_eq!(Slot::InventoryBar.title(&sel), "Inventory in Austin");
        assert_eq!(Slot::ReturnRate.kind(), ChartKind::Histogram);
    }
}
