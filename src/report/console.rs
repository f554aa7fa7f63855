use anyhow::Result;
use polars::prelude::*;

use crate::models::columns;
use crate::processor::BusinessInsights;

/// Human-readable stage summaries printed to stdout.
pub struct ConsoleReport {
    preview_rows: usize,
}

impl ConsoleReport {
    pub fn new(preview_rows: usize) -> Self {
        ConsoleReport { preview_rows }
    }

    pub fn raw_overview(&self, df: &DataFrame) {
        println!("\n================ RAW DATA OVERVIEW ================");
        println!("Shape (rows, columns): {:?}", df.shape());
        println!("\nColumns: {:?}", df.get_column_names());

        println!("\nMissing values per column:");
        for (name, count) in missing_counts(df) {
            println!("   {:<20} {}", name, count);
        }

        println!("\nSample rows:\n{}", df.head(Some(self.preview_rows)));
    }

    pub fn cleaned_preview(&self, df: &DataFrame) -> Result<()> {
        println!("\n================ CLEANED DATA PREVIEW ================");
        let preview = df.select([
            columns::MRP,
            columns::MRP_CLEAN,
            columns::SELL_PRICE,
            columns::DISCOUNT,
            columns::DISCOUNT_PCT,
        ])?;
        println!("{}", preview.head(Some(5)));
        Ok(())
    }

    pub fn feature_preview(&self, df: &DataFrame, premium_cutoff: Option<f64>) -> Result<()> {
        println!("\n================ FEATURE ENGINEERING PREVIEW ================");
        match premium_cutoff {
            Some(cutoff) => println!("Premium cutoff (MRP_clean): {:.2}", cutoff),
            None => println!("Premium cutoff (MRP_clean): n/a"),
        }
        let preview = df.select([
            columns::MRP_CLEAN,
            columns::SELL_PRICE,
            columns::DISCOUNT_VALUE,
            columns::DISCOUNT_RATIO,
            columns::IS_PREMIUM,
        ])?;
        println!("{}", preview.head(Some(5)));
        Ok(())
    }

    pub fn summary_table(&self, title: &str, summary: &DataFrame) {
        println!("\n================ {} ================", title);
        println!("{}", summary.head(Some(self.preview_rows)));
    }

    pub fn insights(&self, insights: &BusinessInsights) {
        println!("\n================ BUSINESS INSIGHTS ================");
        for line in insight_lines(insights) {
            println!("{}", line);
        }
    }
}

const ADDITIONAL_INSIGHTS: [&str; 4] = [
    "- High discount categories likely represent overstock or low demand.",
    "- Premium products contribute more margin but appear in fewer units.",
    "- Categories with limited size variety may have lower conversion.",
    "- Heavy discount ratios help identify overpriced items.",
];

/// The numbered insight sentences followed by the fixed additional notes.
pub fn insight_lines(insights: &BusinessInsights) -> Vec<String> {
    let mut lines = insights.sentences();
    lines.push(String::new());
    lines.push("Additional Insights:".to_string());
    lines.extend(ADDITIONAL_INSIGHTS.iter().map(|s| s.to_string()));
    lines
}

/// Null count of every column, in frame order.
pub fn missing_counts(df: &DataFrame) -> Vec<(String, usize)> {
    df.get_columns()
        .iter()
        .map(|c| (c.name().to_string(), c.null_count()))
        .collect()
}
