use crate::charts::{box_stats, histogram, pie_slices};
use crate::layout::{Layout, Slot};
use crate::types::{Column, DerivedViews, KpiRecord};
use crate::util::{format_int, format_number};
use serde::Serialize;
use std::error::Error;
use std::fmt::Write as _;
use std::path::Path;
use tabled::{builder::Builder, settings::Style, Table, Tabled};
use tracing::info;

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    info!(path = %path.display(), rows = rows.len(), "csv written");
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    info!(path = %path.display(), "json written");
    Ok(())
}

/// Markdown table of `rows`, or a placeholder when there is nothing to show.
pub fn table_rows<T: Tabled + Clone>(rows: &[T]) -> String {
    if rows.is_empty() {
        return "(no rows)\n".to_string();
    }
    format!("{}\n", Table::new(rows.to_vec()).with(Style::markdown()))
}

pub fn page_count(rows: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    rows.div_ceil(page_size).max(1)
}

/// One page of the filtered-rows table. `page` is zero-based and clamped to
/// the last page.
pub fn table_page(columns: &[Column], rows: &[KpiRecord], page: usize, page_size: usize) -> String {
    let pages = page_count(rows.len(), page_size);
    let page = page.min(pages - 1);
    let mut builder = Builder::default();
    builder.push_record(columns.iter().map(|c| c.header().to_string()));
    let visible = rows.iter().skip(page * page_size).take(page_size.max(1));
    let mut shown = 0usize;
    for r in visible {
        builder.push_record(columns.iter().map(|c| r.cell(*c)));
        shown += 1;
    }
    if shown == 0 {
        return "(no rows)\n".to_string();
    }
    format!(
        "{}\nPage {} of {} ({} rows)\n",
        builder.build().with(Style::markdown()),
        page + 1,
        pages,
        format_int(rows.len())
    )
}

/// Render every output slot for one selection.
pub fn render_dashboard(
    layout: &Layout,
    columns: &[Column],
    views: &DerivedViews,
    histogram_bins: usize,
    page: usize,
) -> String {
    let sel = &views.selection;
    let mut out = String::new();
    let _ = writeln!(out, "{}", layout.title);
    let _ = writeln!(out, "Selection: {}", sel);

    let total_sales: f64 = views.sales_by_date.iter().map(|p| p.sales).sum();
    let total_footfall = views
        .footfall_by_date
        .iter()
        .fold(0u64, |acc, p| acc.saturating_add(p.footfall));
    let _ = writeln!(
        out,
        "Rows: {} | Total sales: {} | Total footfall: {}\n",
        format_int(views.rows.len()),
        format_number(total_sales, 2),
        format_int(total_footfall)
    );

    for slot in &layout.slots {
        let _ = writeln!(out, "## {} [{}]\n", slot.title(sel), slot.id());
        let body = match slot {
            Slot::SalesLine => table_rows(&views.sales_by_date),
            Slot::InventoryBar => table_rows(&views.inventory_by_branch),
            Slot::FootfallTrend => table_rows(&views.footfall_by_date),
            Slot::ServiceEfficiency => table_rows(&box_stats(&views.service_time)),
            Slot::ReturnRate => table_rows(&histogram(&views.return_rates, histogram_bins)),
            Slot::LoyaltyPie => table_rows(&pie_slices(&views.loyalty_counts)),
            Slot::BranchTable => table_page(columns, &views.rows, page, layout.table.page_size),
        };
        let _ = writeln!(out, "{}", body);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::fixtures::record;
    use crate::dataset::Dataset;
    use crate::engine::compute;
    use crate::layout::{layout, DASHBOARD_TITLE};
    use crate::types::Selection;

    fn rows(n: usize) -> Vec<KpiRecord> {
        (0..n)
            .map(|i| record("Austin", "Coffee", "Gold", &format!("B{i:02}"), "2024-01-01"))
            .collect()
    }

    #[test]
    fn pages_are_clamped() {
        assert_eq!(page_count(0, 10), 1);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);

        let r = rows(12);
        let last = table_page(&Column::ALL, &r, 5, 10);
        assert!(last.contains("Page 2 of 2"));
        assert!(last.contains("B11"));
        assert!(!last.contains("B09"));
    }

    #[test]
    fn empty_table_has_placeholder() {
        assert_eq!(table_page(&Column::ALL, &[], 0, 10), "(no rows)\n");
    }

    #[test]
    fn dashboard_lists_every_slot() {
        let ds = Dataset::from_records(rows(3));
        let l = layout(&ds, DASHBOARD_TITLE, 10);
        let views = compute(&ds, &Selection::new("Austin", "Coffee", "Gold"));
        let text = render_dashboard(&l, ds.columns(), &views, 20, 0);
        for slot in Slot::ALL {
            assert!(text.contains(slot.id()), "missing {}", slot.id());
        }
        assert!(text.contains("Sales Trend in Austin for Coffee"));
        assert!(text.contains("Total sales: 300.00"));
    }

    #[test]
    fn footfall_total_saturates() {
        let mut r = rows(2);
        r[0].customer_footfall = Some(u64::MAX);
        r[1].date = crate::dataset::fixtures::date("2024-01-02");
        r[1].customer_footfall = Some(u64::MAX);
        let ds = Dataset::from_records(r);
        let l = layout(&ds, DASHBOARD_TITLE, 10);
        let views = compute(&ds, &Selection::new("Austin", "Coffee", "Gold"));
        let text = render_dashboard(&l, ds.columns(), &views, 20, 0);
        assert!(text.contains(&format!("Total footfall: {}", format_int(u64::MAX))));
    }

    #[test]
    fn csv_export_writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.csv");
        write_csv(&path, &rows(2)).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("City,Product,LoyaltySegment,Branch,Date"));
        assert!(lines.next().unwrap().contains("2024-01-01"));
    }
}
