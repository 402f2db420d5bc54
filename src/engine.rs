// Filter-and-aggregate engine.
//
// `compute` is the single entry point the front end calls on every selection
// change. It is a pure function of the dataset and the selection.
use crate::dataset::Dataset;
use crate::types::{
    BranchInventory, DerivedViews, FootfallPoint, KpiRecord, SalesPoint, SegmentCount, Selection,
    ServiceTimeSample,
};
use crate::util::mean;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::debug;

pub fn compute(dataset: &Dataset, selection: &Selection) -> DerivedViews {
    let rows: Vec<KpiRecord> = dataset.filter(selection).cloned().collect();
    debug!(%selection, rows = rows.len(), "computing derived views");

    DerivedViews {
        selection: selection.clone(),
        sales_by_date: sales_by_date(&rows),
        inventory_by_branch: inventory_by_branch(&rows),
        footfall_by_date: footfall_by_date(&rows),
        service_time: service_time(&rows),
        return_rates: return_rates(&rows),
        loyalty_counts: loyalty_counts(&rows),
        rows,
    }
}

/// Sum of sales per date, ascending. Dates whose sales are all absent are
/// left out.
pub fn sales_by_date(rows: &[KpiRecord]) -> Vec<SalesPoint> {
    sum_by_date(rows, |r| r.sales)
        .into_iter()
        .map(|(date, sales)| SalesPoint { date, sales })
        .collect()
}

/// Total footfall per date, ascending.
pub fn footfall_by_date(rows: &[KpiRecord]) -> Vec<FootfallPoint> {
    let mut map: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for r in rows {
        // Rows without a count never create an entry, so a date whose counts
        // are all missing stays out of the series.
        if let Some(f) = r.customer_footfall {
            let total = map.entry(r.date).or_default();
            // Counts come straight from the file and may be arbitrarily large.
            *total = total.saturating_add(f);
        }
    }
    map.into_iter()
        .map(|(date, footfall)| FootfallPoint { date, footfall })
        .collect()
}

/// Mean inventory level per branch, branches in lexical order.
pub fn inventory_by_branch(rows: &[KpiRecord]) -> Vec<BranchInventory> {
    // Collect the readings first so a branch with none left never gets a
    // mean at all.
    let mut map: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for r in rows {
        if let Some(level) = r.inventory_level {
            map.entry(r.branch.as_str()).or_default().push(level);
        }
    }
    map.into_iter()
        .filter_map(|(branch, levels)| {
            mean(&levels).map(|m| BranchInventory {
                branch: branch.to_string(),
                mean_inventory_level: m,
            })
        })
        .collect()
}

/// Unaggregated (branch, service time) pairs in row order.
pub fn service_time(rows: &[KpiRecord]) -> Vec<ServiceTimeSample> {
    rows.iter()
        .filter_map(|r| {
            r.avg_service_time.map(|t| ServiceTimeSample {
                branch: r.branch.clone(),
                avg_service_time: t,
            })
        })
        .collect()
}

/// Raw return rates for the histogram; binning happens in `charts`.
pub fn return_rates(rows: &[KpiRecord]) -> Vec<f64> {
    rows.iter().filter_map(|r| r.return_rate).collect()
}

/// Row count per loyalty segment.
///
/// After filtering this always yields at most one group, since the segment
/// is part of the selection.
pub fn loyalty_counts(rows: &[KpiRecord]) -> Vec<SegmentCount> {
    let mut map: BTreeMap<&str, usize> = BTreeMap::new();
    for r in rows {
        *map.entry(r.loyalty_segment.as_str()).or_default() += 1;
    }
    map.into_iter()
        .map(|(segment, count)| SegmentCount {
            loyalty_segment: segment.to_string(),
            count,
        })
        .collect()
}

fn sum_by_date<F>(rows: &[KpiRecord], value: F) -> BTreeMap<NaiveDate, f64>
where
    F: Fn(&KpiRecord) -> Option<f64>,
{
    // BTreeMap keeps the dates sorted, which is the order the charts want.
    let mut map = BTreeMap::new();
    for r in rows {
        if let Some(v) = value(r) {
            *map.entry(r.date).or_insert(0.0) += v;
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::fixtures::{date, record};

    fn sample() -> Dataset {
        let mut a = record("Austin", "Coffee", "Gold", "Downtown", "2024-01-02");
        a.sales = Some(150.0);
        a.inventory_level = Some(60.0);
        a.customer_footfall = Some(30);
        let mut b = record("Austin", "Coffee", "Gold", "Uptown", "2024-01-01");
        b.sales = Some(100.0);
        b.inventory_level = Some(90.0);
        b.customer_footfall = Some(12);
        let mut c = record("Austin", "Coffee", "Gold", "Downtown", "2024-01-02");
        c.sales = None;
        c.inventory_level = Some(80.0);
        c.customer_footfall = Some(8);
        c.avg_service_time = None;
        c.return_rate = None;
        let other = record("Boston", "Coffee", "Gold", "Harbor", "2024-01-01");
        Dataset::from_records(vec![a, b, c, other])
    }

    #[test]
    fn sales_are_summed_per_date_in_date_order() {
        let views = compute(&sample(), &Selection::new("Austin", "Coffee", "Gold"));
        assert_eq!(
            views.sales_by_date,
            vec![
                SalesPoint { date: date("2024-01-01"), sales: 100.0 },
                SalesPoint { date: date("2024-01-02"), sales: 150.0 },
            ]
        );
    }

    #[test]
    fn footfall_sums_include_every_row() {
        let views = compute(&sample(), &Selection::new("Austin", "Coffee", "Gold"));
        let totals: Vec<u64> = views.footfall_by_date.iter().map(|p| p.footfall).collect();
        assert_eq!(totals, vec![12, 38]);
    }

    #[test]
    fn inventory_mean_per_branch_skips_absent_values() {
        let mut ds = sample().records().to_vec();
        ds[1].inventory_level = None;
        let views = compute(
            &Dataset::from_records(ds),
            &Selection::new("Austin", "Coffee", "Gold"),
        );
        // Uptown has no inventory readings left, so it drops out entirely.
        assert_eq!(
            views.inventory_by_branch,
            vec![BranchInventory { branch: "Downtown".into(), mean_inventory_level: 70.0 }]
        );
    }

    #[test]
    fn distributions_are_per_record() {
        let views = compute(&sample(), &Selection::new("Austin", "Coffee", "Gold"));
        assert_eq!(views.service_time.len(), 2);
        assert_eq!(views.service_time[0].branch, "Downtown");
        assert_eq!(views.return_rates, vec![2.0, 2.0]);
    }

    #[test]
    fn loyalty_counts_has_single_group_of_filtered_size() {
        let views = compute(&sample(), &Selection::new("Austin", "Coffee", "Gold"));
        assert_eq!(
            views.loyalty_counts,
            vec![SegmentCount { loyalty_segment: "Gold".into(), count: 3 }]
        );
        assert_eq!(views.rows.len(), 3);
    }

    #[test]
    fn unknown_selection_is_empty_not_an_error() {
        let views = compute(&sample(), &Selection::new("Denver", "Coffee", "Gold"));
        assert!(views.is_empty());
        assert!(views.sales_by_date.is_empty());
        assert!(views.inventory_by_branch.is_empty());
        assert!(views.footfall_by_date.is_empty());
        assert!(views.service_time.is_empty());
        assert!(views.return_rates.is_empty());
        assert!(views.loyalty_counts.is_empty());
    }

    #[test]
    fn date_with_no_sales_is_left_out() {
        let mut first = record("Austin", "Coffee", "Gold", "Downtown", "2024-01-01");
        first.sales = None;
        let mut second = record("Austin", "Coffee", "Gold", "Uptown", "2024-01-01");
        second.sales = None;
        let third = record("Austin", "Coffee", "Gold", "Uptown", "2024-01-02");
        let views = compute(
            &Dataset::from_records(vec![first, second, third]),
            &Selection::new("Austin", "Coffee", "Gold"),
        );
        assert_eq!(
            views.sales_by_date,
            vec![SalesPoint { date: date("2024-01-02"), sales: 100.0 }]
        );
        // The rows themselves are still there for the table.
        assert_eq!(views.rows.len(), 3);
    }

    #[test]
    fn date_with_no_footfall_is_left_out() {
        let mut first = record("Austin", "Coffee", "Gold", "Downtown", "2024-01-01");
        first.customer_footfall = None;
        let mut second = record("Austin", "Coffee", "Gold", "Downtown", "2024-01-02");
        second.customer_footfall = None;
        let mut third = record("Austin", "Coffee", "Gold", "Uptown", "2024-01-02");
        third.customer_footfall = Some(7);
        let views = compute(
            &Dataset::from_records(vec![first, second, third]),
            &Selection::new("Austin", "Coffee", "Gold"),
        );
        assert_eq!(
            views.footfall_by_date,
            vec![FootfallPoint { date: date("2024-01-02"), footfall: 7 }]
        );
    }

    #[test]
    fn huge_footfall_saturates_instead_of_overflowing() {
        let mut first = record("Austin", "Coffee", "Gold", "Downtown", "2024-01-01");
        first.customer_footfall = Some(10_000_000_000_000_000_000);
        let mut second = record("Austin", "Coffee", "Gold", "Uptown", "2024-01-01");
        second.customer_footfall = Some(10_000_000_000_000_000_000);
        let views = compute(
            &Dataset::from_records(vec![first, second]),
            &Selection::new("Austin", "Coffee", "Gold"),
        );
        assert_eq!(views.footfall_by_date[0].footfall, u64::MAX);
    }

    #[test]
    fn compute_is_repeatable() {
        let ds = sample();
        let sel = Selection::new("Austin", "Coffee", "Gold");
        assert_eq!(compute(&ds, &sel), compute(&ds, &sel));
    }
}
