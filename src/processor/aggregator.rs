use anyhow::Result;
use polars::prelude::*;

use crate::models::{columns, BrandSummary, CategorySummary};

pub const PRODUCTS: &str = "Products";
pub const TOTAL_REVENUE: &str = "Total_Revenue";
pub const AVG_MRP: &str = "Avg_MRP";
pub const AVG_SELL_PRICE: &str = "Avg_SellPrice";
pub const AVG_DISCOUNT_PCT: &str = "Avg_Discount_pct";
pub const PREMIUM_SHARE: &str = "Premium_share";

/// Groups rows by `Category` / `BrandName` and computes the KPI frames.
///
/// Missing values are skipped by every aggregate: an all-missing group has a
/// zero sum and missing means. Rows without a key form one extra group.
/// Output is ordered by `Total_Revenue` descending, then key ascending with
/// the missing key last.
pub struct Aggregator;

impl Aggregator {
    pub fn category_frame(&self, df: &DataFrame) -> Result<DataFrame> {
        self.group_frame(
            df,
            columns::CATEGORY,
            vec![
                col(columns::SELL_PRICE).mean().alias(AVG_SELL_PRICE),
                col(columns::DISCOUNT_PCT).mean().alias(AVG_DISCOUNT_PCT),
                col(columns::IS_PREMIUM).cast(DataType::Float64).mean().alias(PREMIUM_SHARE),
            ],
        )
    }

    pub fn brand_frame(&self, df: &DataFrame) -> Result<DataFrame> {
        self.group_frame(
            df,
            columns::BRAND_NAME,
            vec![col(columns::DISCOUNT_PCT).mean().alias(AVG_DISCOUNT_PCT)],
        )
    }

    pub fn summarize_categories(&self, df: &DataFrame) -> Result<Vec<CategorySummary>> {
        let frame = self.category_frame(df)?;

        let keys = frame.column(columns::CATEGORY)?.str()?;
        let products = frame.column(PRODUCTS)?.cast(&DataType::UInt64)?;
        let products = products.u64()?;
        let revenue = frame.column(TOTAL_REVENUE)?.f64()?;
        let mrp = frame.column(AVG_MRP)?.f64()?;
        let sell_price = frame.column(AVG_SELL_PRICE)?.f64()?;
        let discount_pct = frame.column(AVG_DISCOUNT_PCT)?.f64()?;
        let premium = frame.column(PREMIUM_SHARE)?.f64()?;

        let rows = (0..frame.height())
            .map(|i| CategorySummary {
                key: keys.get(i).map(str::to_string),
                products: products.get(i).unwrap_or(0) as usize,
                total_revenue: revenue.get(i).unwrap_or(0.0),
                avg_mrp: mrp.get(i),
                avg_sell_price: sell_price.get(i),
                avg_discount_pct: discount_pct.get(i),
                premium_share: premium.get(i),
            })
            .collect();

        Ok(rows)
    }

    pub fn summarize_brands(&self, df: &DataFrame) -> Result<Vec<BrandSummary>> {
        let frame = self.brand_frame(df)?;

        let keys = frame.column(columns::BRAND_NAME)?.str()?;
        let products = frame.column(PRODUCTS)?.cast(&DataType::UInt64)?;
        let products = products.u64()?;
        let revenue = frame.column(TOTAL_REVENUE)?.f64()?;
        let mrp = frame.column(AVG_MRP)?.f64()?;
        let discount_pct = frame.column(AVG_DISCOUNT_PCT)?.f64()?;

        let rows = (0..frame.height())
            .map(|i| BrandSummary {
                key: keys.get(i).map(str::to_string),
                products: products.get(i).unwrap_or(0) as usize,
                total_revenue: revenue.get(i).unwrap_or(0.0),
                avg_mrp: mrp.get(i),
                avg_discount_pct: discount_pct.get(i),
            })
            .collect();

        Ok(rows)
    }

    fn group_frame(&self, df: &DataFrame, key_col: &str, extra: Vec<Expr>) -> Result<DataFrame> {
        let mut aggs = vec![
            col(columns::PRODUCT_ID).drop_nulls().n_unique().alias(PRODUCTS),
            col(columns::REVENUE).sum().alias(TOTAL_REVENUE),
            col(columns::MRP_CLEAN).mean().alias(AVG_MRP),
        ];
        aggs.extend(extra);

        let sort_options = SortMultipleOptions::default()
            .with_order_descending_multi([true, false])
            .with_nulls_last(true)
            .with_maintain_order(true);

        let frame = df
            .clone()
            .lazy()
            .with_column(col(key_col).cast(DataType::String))
            .group_by([col(key_col)])
            .agg(aggs)
            .sort_by_exprs([col(TOTAL_REVENUE), col(key_col)], sort_options)
            .collect()?;

        Ok(frame)
    }
}

/// Builds a display frame with the summary column names of the report.
pub fn categories_to_dataframe(rows: &[CategorySummary], missing_label: &str) -> Result<DataFrame> {
    let df = df!(
        columns::CATEGORY => rows.iter().map(|r| r.key.clone().unwrap_or_else(|| missing_label.to_string())).collect::<Vec<_>>(),
        PRODUCTS => rows.iter().map(|r| r.products as u64).collect::<Vec<_>>(),
        TOTAL_REVENUE => rows.iter().map(|r| r.total_revenue).collect::<Vec<_>>(),
        AVG_MRP => rows.iter().map(|r| r.avg_mrp).collect::<Vec<_>>(),
        AVG_SELL_PRICE => rows.iter().map(|r| r.avg_sell_price).collect::<Vec<_>>(),
        AVG_DISCOUNT_PCT => rows.iter().map(|r| r.avg_discount_pct).collect::<Vec<_>>(),
        PREMIUM_SHARE => rows.iter().map(|r| r.premium_share).collect::<Vec<_>>(),
    )?;

    Ok(df)
}

pub fn brands_to_dataframe(rows: &[BrandSummary], missing_label: &str) -> Result<DataFrame> {
    let df = df!(
        columns::BRAND_NAME => rows.iter().map(|r| r.key.clone().unwrap_or_else(|| missing_label.to_string())).collect::<Vec<_>>(),
        PRODUCTS => rows.iter().map(|r| r.products as u64).collect::<Vec<_>>(),
        TOTAL_REVENUE => rows.iter().map(|r| r.total_revenue).collect::<Vec<_>>(),
        AVG_MRP => rows.iter().map(|r| r.avg_mrp).collect::<Vec<_>>(),
        AVG_DISCOUNT_PCT => rows.iter().map(|r| r.avg_discount_pct).collect::<Vec<_>>(),
    )?;

    Ok(df)
}
