use anyhow::Result;
use polars::prelude::*;
use regex::Regex;
use tracing::info;

use super::numeric_extractor::{extract_column, extract_first_number, extract_price, parse_strict_number};
use crate::models::columns;

pub struct RuleNormalizer;

impl RuleNormalizer {
    pub fn normalize_dataframe(&self, df: &mut DataFrame) -> Result<()> {
        // MRP keeps its raw text; the parsed value goes to a new column
        self.extract_price_column(df, columns::MRP, columns::MRP_CLEAN)?;

        // SellPrice is overwritten by its numeric parse
        self.normalize_sell_price(df)?;

        self.extract_discount_column(df, columns::DISCOUNT, columns::DISCOUNT_PCT)?;

        if df.column(columns::CURRENCY).is_ok() {
            self.normalize_currency_column(df, columns::CURRENCY)?;
        }

        Ok(())
    }

    fn extract_price_column(&self, df: &mut DataFrame, source: &str, target: &str) -> Result<()> {
        let values = extract_column(df, source, extract_price)?;
        log_coverage(target, &values);

        df.with_column(Series::new(target.into(), values))?;
        Ok(())
    }

    fn normalize_sell_price(&self, df: &mut DataFrame) -> Result<()> {
        let values = extract_column(df, columns::SELL_PRICE, parse_strict_number)?;
        log_coverage(columns::SELL_PRICE, &values);

        df.with_column(Series::new(columns::SELL_PRICE.into(), values))?;
        Ok(())
    }

    fn extract_discount_column(&self, df: &mut DataFrame, source: &str, target: &str) -> Result<()> {
        let values = extract_column(df, source, extract_first_number)?;
        log_coverage(target, &values);

        df.with_column(Series::new(target.into(), values))?;
        Ok(())
    }

    /// Trims the cell and collapses inner whitespace runs to one space.
    fn normalize_currency_column(&self, df: &mut DataFrame, col_name: &str) -> Result<()> {
        let whitespace = Regex::new(r"\s+")?;
        let column = df.column(col_name)?.cast(&DataType::String)?;

        let normalized: Vec<Option<String>> = column
            .str()?
            .into_iter()
            .map(|cell| cell.map(|s| whitespace.replace_all(s.trim(), " ").into_owned()))
            .collect();

        df.with_column(Series::new(col_name.into(), normalized))?;
        Ok(())
    }
}

fn log_coverage(col_name: &str, values: &[Option<f64>]) {
    let parsed = values.iter().filter(|v| v.is_some()).count();
    info!(
        "Cleaned {}: {} parsed, {} missing out of {}",
        col_name,
        parsed,
        values.len() - parsed,
        values.len()
    );
}
