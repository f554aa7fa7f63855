use anyhow::Result;
use polars::prelude::*;
use tracing::info;

use crate::models::columns;

/// Derived values for a single product row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedMetrics {
    pub discount_value: Option<f64>,
    pub discount_ratio: Option<f64>,
    pub revenue: Option<f64>,
    pub is_premium: i32,
}

/// Linear-interpolation quantile over the present values.
///
/// Returns `None` when no value is present.
pub fn quantile_linear(values: &Float64Chunked, q: f64) -> PolarsResult<Option<f64>> {
    values.quantile(q.clamp(0.0, 1.0), QuantileMethod::Linear)
}

/// Computes the derived metrics of one row from its cleaned MRP and sell price.
pub fn derive_row(mrp: Option<f64>, sell_price: Option<f64>, premium_cutoff: Option<f64>) -> DerivedMetrics {
    let discount_value = match (mrp, sell_price) {
        (Some(m), Some(s)) => Some(m - s),
        _ => None,
    };

    let discount_ratio = match (discount_value, mrp) {
        (Some(v), Some(m)) => Some(v / m).filter(|r| r.is_finite()),
        _ => None,
    };

    let is_premium = match (mrp, premium_cutoff) {
        (Some(m), Some(cutoff)) if m >= cutoff => 1,
        _ => 0,
    };

    DerivedMetrics {
        discount_value,
        discount_ratio,
        revenue: sell_price,
        is_premium,
    }
}

pub struct FeatureEngineer {
    premium_quantile: f64,
}

impl FeatureEngineer {
    pub fn new(premium_quantile: f64) -> Self {
        FeatureEngineer { premium_quantile }
    }

    /// Adds (or replaces) `Discount_value`, `Discount_ratio`, `Revenue` and
    /// `Is_premium`. Expects `MRP_clean` and a numeric `SellPrice`.
    pub fn derive_dataframe(&self, df: &mut DataFrame) -> Result<Option<f64>> {
        let mrp_column = df.column(columns::MRP_CLEAN)?.f64()?;
        let cutoff = quantile_linear(mrp_column, self.premium_quantile)?;
        let mrp: Vec<Option<f64>> = mrp_column.into_iter().collect();
        let sell: Vec<Option<f64>> = df
            .column(columns::SELL_PRICE)?
            .cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            .collect();

        match cutoff {
            Some(c) => info!("Premium cutoff (q={}) on MRP_clean: {:.2}", self.premium_quantile, c),
            None => info!("No MRP_clean values present, no product is premium"),
        }

        let n = df.height();
        let mut discount_values = Vec::with_capacity(n);
        let mut discount_ratios = Vec::with_capacity(n);
        let mut revenues = Vec::with_capacity(n);
        let mut premium_flags = Vec::with_capacity(n);

        for (m, s) in mrp.iter().zip(sell.iter()) {
            let metrics = derive_row(*m, *s, cutoff);
            discount_values.push(metrics.discount_value);
            discount_ratios.push(metrics.discount_ratio);
            revenues.push(metrics.revenue);
            premium_flags.push(metrics.is_premium);
        }

        df.with_column(Series::new(columns::DISCOUNT_VALUE.into(), discount_values))?;
        df.with_column(Series::new(columns::DISCOUNT_RATIO.into(), discount_ratios))?;
        df.with_column(Series::new(columns::REVENUE.into(), revenues))?;
        df.with_column(Series::new(columns::IS_PREMIUM.into(), premium_flags))?;

        Ok(cutoff)
    }
}

impl Default for FeatureEngineer {
    fn default() -> Self {
        Self::new(0.75)
    }
}
