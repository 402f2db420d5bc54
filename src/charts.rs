// Chart-side shaping of the derived views: histogram binning, box-plot
// statistics and pie shares. These never touch the dataset directly.
use crate::types::{SegmentCount, ServiceTimeSample};
use crate::util::quantile_sorted;
use std::collections::BTreeMap;
use tabled::Tabled;

#[derive(Debug, Clone, PartialEq, Tabled)]
pub struct HistogramBin {
    #[tabled(rename = "From")]
    pub lower: f64,
    #[tabled(rename = "To")]
    pub upper: f64,
    #[tabled(rename = "Count")]
    pub count: usize,
}

/// Split `values` into `bins` equal-width buckets over `[min, max]`.
///
/// Buckets are half-open except the last, which also takes `max`. A single
/// distinct value collapses into one bucket.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if (max - min).abs() < f64::EPSILON {
        return vec![HistogramBin {
            lower: min,
            upper: max,
            count: values.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: min + width * i as f64,
            upper: if i + 1 == bins {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count: 0,
        })
        .collect();
    for v in values {
        let idx = (((v - min) / width).floor() as usize).min(bins - 1);
        out[idx].count += 1;
    }
    out
}

#[derive(Debug, Clone, PartialEq, Tabled)]
pub struct BoxStats {
    #[tabled(rename = "Branch")]
    pub branch: String,
    #[tabled(rename = "N")]
    pub count: usize,
    #[tabled(rename = "Min")]
    pub min: f64,
    #[tabled(rename = "Q1")]
    pub q1: f64,
    #[tabled(rename = "Median")]
    pub median: f64,
    #[tabled(rename = "Q3")]
    pub q3: f64,
    #[tabled(rename = "Max")]
    pub max: f64,
}

/// Five-number summary of service time per branch, branches in lexical order.
pub fn box_stats(samples: &[ServiceTimeSample]) -> Vec<BoxStats> {
    let mut by_branch: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for s in samples {
        by_branch
            .entry(s.branch.as_str())
            .or_default()
            .push(s.avg_service_time);
    }
    by_branch
        .into_iter()
        .map(|(branch, mut v)| {
            v.sort_by(f64::total_cmp);
            BoxStats {
                branch: branch.to_string(),
                count: v.len(),
                min: v[0],
                q1: quantile_sorted(&v, 0.25),
                median: quantile_sorted(&v, 0.5),
                q3: quantile_sorted(&v, 0.75),
                max: v[v.len() - 1],
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Tabled)]
pub struct PieSlice {
    #[tabled(rename = "LoyaltySegment")]
    pub loyalty_segment: String,
    #[tabled(rename = "Count")]
    pub count: usize,
    #[tabled(rename = "Share (%)")]
    pub percent: f64,
}

pub fn pie_slices(counts: &[SegmentCount]) -> Vec<PieSlice> {
    let total: usize = counts.iter().map(|c| c.count).sum();
    counts
        .iter()
        .map(|c| PieSlice {
            loyalty_segment: c.loyalty_segment.clone(),
            count: c.count,
            percent: if total == 0 {
                0.0
            } else {
                c.count as f64 / total as f64 * 100.0
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn histogram_spreads_over_equal_width_bins() {
        let values = [0.0, 1.0, 2.5, 5.0, 10.0];
        let bins = histogram(&values, 20);
        assert_eq!(bins.len(), 20);
        assert_eq!(bins[0].lower, 0.0);
        assert_eq!(bins[19].upper, 10.0);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 5);
        // 10.0 lands in the closed last bin.
        assert_eq!(bins[19].count, 1);
        assert_eq!(bins[2].count, 1);
        assert_eq!(bins[10].count, 1);
    }

    #[test]
    fn histogram_degenerate_inputs() {
        assert!(histogram(&[], 20).is_empty());
        let one = histogram(&[3.0, 3.0, 3.0], 20);
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].count, 3);
    }

    #[test]
    fn box_stats_per_branch() {
        let samples: Vec<ServiceTimeSample> = [("B", 4.0), ("A", 1.0), ("A", 3.0), ("A", 2.0), ("A", 4.0)]
            .into_iter()
            .map(|(b, t)| ServiceTimeSample {
                branch: b.to_string(),
                avg_service_time: t,
            })
            .collect();
        let stats = box_stats(&samples);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].branch, "A");
        assert_eq!(stats[0].count, 4);
        assert_eq!(stats[0].min, 1.0);
        assert_eq!(stats[0].median, 2.5);
        assert_eq!(stats[0].q3, 3.25);
        assert_eq!(stats[1].max, 4.0);
    }

    #[test]
    fn pie_shares_sum_to_hundred() {
        let slices = pie_slices(&[
            SegmentCount { loyalty_segment: "Gold".into(), count: 3 },
            SegmentCount { loyalty_segment: "Silver".into(), count: 1 },
        ]);
        assert_eq!(slices[0].percent, 75.0);
        assert_eq!(slices[1].percent, 25.0);
        assert!(pie_slices(&[]).is_empty());
    }
}
