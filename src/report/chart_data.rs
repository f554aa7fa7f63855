//! Chart-ready data for the plotting layer.
//!
//! Nothing here draws. Each chart is reduced to the numbers a renderer needs:
//! - top-N categories and brands by revenue (bars)
//! - the discount percentage histogram (equal-width bins)
//! - MRP against discount ratio (scatter plus summary annotation)

use anyhow::Result;
use chrono::Utc;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::ChartConfig;
use crate::models::{columns, GroupSummary};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarDatum {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatioAnnotation {
    pub mean: Option<f64>,
    pub max: Option<f64>,
    pub min: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartData {
    pub generated_at: String,
    pub top_categories: Vec<BarDatum>,
    pub top_brands: Vec<BarDatum>,
    pub discount_histogram: Vec<HistogramBin>,
    pub mrp_vs_discount_ratio: Vec<ScatterPoint>,
    pub ratio_annotation: RatioAnnotation,
}

/// Takes the first `top_n` rows of an already sorted summary.
pub fn top_by_revenue<T: GroupSummary>(rows: &[T], top_n: usize, missing_label: &str) -> Vec<BarDatum> {
    rows.iter()
        .take(top_n)
        .map(|r| BarDatum {
            label: r.label(missing_label).to_string(),
            value: r.total_revenue(),
        })
        .collect()
}

/// Equal-width histogram over [min, max], last bin closed on the right.
///
/// A single distinct value is spread over [v - 0.5, v + 0.5].
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let mut min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        min -= 0.5;
        max += 0.5;
    }

    let width = (max - min) / bins as f64;
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            start: min + i as f64 * width,
            end: if i + 1 == bins { max } else { min + (i + 1) as f64 * width },
            count: 0,
        })
        .collect();

    for v in values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        out[idx].count += 1;
    }

    out
}

pub fn ratio_annotation(ratios: &[f64]) -> RatioAnnotation {
    if ratios.is_empty() {
        return RatioAnnotation {
            mean: None,
            max: None,
            min: None,
        };
    }

    RatioAnnotation {
        mean: Some(ratios.iter().sum::<f64>() / ratios.len() as f64),
        max: ratios.iter().copied().reduce(f64::max),
        min: ratios.iter().copied().reduce(f64::min),
    }
}

pub struct ChartDataBuilder {
    config: ChartConfig,
    missing_label: String,
}

impl ChartDataBuilder {
    pub fn new(config: ChartConfig, missing_label: impl Into<String>) -> Self {
        ChartDataBuilder {
            config,
            missing_label: missing_label.into(),
        }
    }

    pub fn build<C: GroupSummary, B: GroupSummary>(
        &self,
        df: &DataFrame,
        categories: &[C],
        brands: &[B],
    ) -> Result<ChartData> {
        let discount_pct: Vec<f64> = df.column(columns::DISCOUNT_PCT)?.f64()?.into_iter().flatten().collect();

        let mrp = df.column(columns::MRP_CLEAN)?.f64()?;
        let ratio = df.column(columns::DISCOUNT_RATIO)?.f64()?;

        let points: Vec<ScatterPoint> = mrp
            .into_iter()
            .zip(ratio.into_iter())
            .filter_map(|(x, y)| Some(ScatterPoint { x: x?, y: y? }))
            .collect();
        let ratios: Vec<f64> = ratio.into_iter().flatten().collect();

        Ok(ChartData {
            generated_at: Utc::now().to_rfc3339(),
            top_categories: top_by_revenue(categories, self.config.top_n, &self.missing_label),
            top_brands: top_by_revenue(brands, self.config.top_n, &self.missing_label),
            discount_histogram: histogram(&discount_pct, self.config.histogram_bins),
            mrp_vs_discount_ratio: points,
            ratio_annotation: ratio_annotation(&ratios),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CategorySummary;

    fn category(key: Option<&str>, revenue: f64) -> CategorySummary {
        CategorySummary {
            key: key.map(str::to_string),
            products: 1,
            total_revenue: revenue,
            avg_mrp: None,
            avg_sell_price: None,
            avg_discount_pct: None,
            premium_share: None,
        }
    }

    #[test]
    fn test_top_by_revenue_truncates_in_order() {
        let rows = vec![
            category(Some("A"), 30.0),
            category(None, 20.0),
            category(Some("C"), 10.0),
        ];

        let bars = top_by_revenue(&rows, 2, "unknown");
        assert_eq!(
            bars,
            vec![
                BarDatum { label: "A".to_string(), value: 30.0 },
                BarDatum { label: "unknown".to_string(), value: 20.0 },
            ]
        );
    }

    #[test]
    fn test_histogram_counts_every_value() {
        let values = vec![0.0, 5.0, 10.0, 10.0, 20.0];
        let bins = histogram(&values, 4);

        assert_eq!(bins.len(), 4);
        assert_eq!(bins[0].start, 0.0);
        assert_eq!(bins[3].end, 20.0);
        let counts: Vec<usize> = bins.iter().map(|b| b.count).collect();
        // [0,5) [5,10) [10,15) [15,20]
        assert_eq!(counts, vec![1, 1, 2, 1]);
    }

    #[test]
    fn test_histogram_single_value() {
        let bins = histogram(&[7.0, 7.0], 2);
        assert_eq!(bins[0].start, 6.5);
        assert_eq!(bins[1].end, 7.5);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 2);
    }

    #[test]
    fn test_histogram_empty() {
        assert!(histogram(&[], 20).is_empty());
    }

    #[test]
    fn test_ratio_annotation() {
        let note = ratio_annotation(&[0.2, 0.0, 0.4]);
        assert_eq!(note.max, Some(0.4));
        assert_eq!(note.min, Some(0.0));
        assert!((note.mean.unwrap() - 0.2).abs() < 1e-12);

        assert_eq!(ratio_annotation(&[]).mean, None);
    }

    #[test]
    fn test_build_uses_rows_with_both_values() {
        let df = df!(
            "MRP_clean" => [Some(1000.0), Some(500.0), None],
            "Discount_ratio" => [Some(0.2), Some(0.0), None],
            "Discount_pct" => [Some(20.0), Some(0.0), None]
        )
        .unwrap();
        let categories = vec![category(Some("A"), 1300.0), category(Some("B"), 300.0)];

        let builder = ChartDataBuilder::new(ChartConfig::default(), "unknown");
        let data = builder.build(&df, &categories, &categories).unwrap();

        assert_eq!(data.mrp_vs_discount_ratio.len(), 2);
        assert_eq!(data.top_categories.len(), 2);
        assert_eq!(data.discount_histogram.len(), 20);
        assert_eq!(data.discount_histogram.iter().map(|b| b.count).sum::<usize>(), 2);
        assert_eq!(data.ratio_annotation.max, Some(0.2));
    }
}
