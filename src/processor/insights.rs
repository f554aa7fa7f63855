use tracing::warn;

use crate::error::PipelineError;
use crate::models::{CategorySummary, GroupSummary};

/// Returns the first row holding the largest present `metric`.
///
/// Rows with a missing metric are ignored. Fails when the table is empty or
/// no row has a value.
pub fn argmax_by<'a, T, F>(rows: &'a [T], column: &str, metric: F) -> Result<&'a T, PipelineError>
where
    F: Fn(&T) -> Option<f64>,
{
    let mut best: Option<(&T, f64)> = None;

    for row in rows {
        let Some(value) = metric(row) else {
            continue;
        };
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((row, value)),
        }
    }

    best.map(|(row, _)| row).ok_or_else(|| PipelineError::EmptySummary {
        column: column.to_string(),
    })
}

/// The three headline answers drawn from the category summary.
///
/// A `None` means the lookup had no data; that insight is skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct BusinessInsights {
    pub highest_discount_category: Option<String>,
    pub most_premium_category: Option<String>,
    pub top_revenue_category: Option<String>,
}

pub struct InsightExtractor {
    missing_label: String,
}

impl InsightExtractor {
    pub fn new(missing_label: impl Into<String>) -> Self {
        InsightExtractor {
            missing_label: missing_label.into(),
        }
    }

    pub fn extract(&self, categories: &[CategorySummary]) -> BusinessInsights {
        BusinessInsights {
            highest_discount_category: self.lookup(categories, "Avg_Discount_pct", |r| r.avg_discount_pct),
            most_premium_category: self.lookup(categories, "Premium_share", |r| r.premium_share),
            top_revenue_category: self.lookup(categories, "Total_Revenue", |r| Some(r.total_revenue)),
        }
    }

    fn lookup<F>(&self, categories: &[CategorySummary], column: &str, metric: F) -> Option<String>
    where
        F: Fn(&CategorySummary) -> Option<f64>,
    {
        match argmax_by(categories, column, metric) {
            Ok(row) => Some(row.label(&self.missing_label).to_string()),
            Err(e) => {
                warn!("Skipping insight: {}", e);
                None
            }
        }
    }
}

impl BusinessInsights {
    pub fn sentences(&self) -> Vec<String> {
        let show = |v: &Option<String>| v.clone().unwrap_or_else(|| "no data".to_string());

        vec![
            format!("1. Category with highest discounting: {}", show(&self.highest_discount_category)),
            format!("2. Category with most premium products: {}", show(&self.most_premium_category)),
            format!("3. Highest revenue category: {}", show(&self.top_revenue_category)),
        ]
    }
}
