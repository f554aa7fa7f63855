use anyhow::{Context, Result};
use polars::prelude::*;
use tracing::info;

use crate::config::PipelineConfig;
use crate::models::{BrandSummary, CategorySummary};
use crate::processor::{
    brands_to_dataframe, categories_to_dataframe, Aggregator, BusinessInsights, FeatureEngineer,
    InsightExtractor, RuleNormalizer,
};
use crate::report::{ChartDataBuilder, ConsoleReport};
use crate::storage::{validate_schema, LocalStorage};

/// Everything the transform core produces for one dataset.
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    pub products: DataFrame,
    pub premium_cutoff: Option<f64>,
    pub categories: Vec<CategorySummary>,
    pub brands: Vec<BrandSummary>,
    pub insights: BusinessInsights,
}

pub struct RetailPipeline {
    config: PipelineConfig,
    normalizer: RuleNormalizer,
    engineer: FeatureEngineer,
    aggregator: Aggregator,
    extractor: InsightExtractor,
}

impl RetailPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let engineer = FeatureEngineer::new(config.analysis.premium_quantile);
        let extractor = InsightExtractor::new(config.analysis.missing_key_label.clone());

        RetailPipeline {
            config,
            normalizer: RuleNormalizer,
            engineer,
            aggregator: Aggregator,
            extractor,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Clean, derive, aggregate and extract insights. No I/O.
    pub fn analyze(&self, mut df: DataFrame) -> Result<AnalysisOutput> {
        validate_schema(&df)?;

        self.normalizer.normalize_dataframe(&mut df)?;
        info!("Applied normalization rules");

        let premium_cutoff = self.engineer.derive_dataframe(&mut df)?;
        info!("Derived discount, revenue and premium columns");

        let categories = self.aggregator.summarize_categories(&df)?;
        let brands = self.aggregator.summarize_brands(&df)?;
        info!("Aggregated {} categories and {} brands", categories.len(), brands.len());

        let insights = self.extractor.extract(&categories);

        Ok(AnalysisOutput {
            products: df,
            premium_cutoff,
            categories,
            brands,
            insights,
        })
    }

    /// Full batch run: load, analyze, report, export.
    pub fn run(&self) -> Result<AnalysisOutput> {
        let storage = LocalStorage;
        let report = ConsoleReport::new(self.config.analysis.preview_rows);
        let label = &self.config.analysis.missing_key_label;

        let raw = storage
            .load_products(&self.config.input.path)
            .context("Failed to load product data")?;
        report.raw_overview(&raw);

        let mut output = self.analyze(raw)?;

        report.cleaned_preview(&output.products)?;
        report.feature_preview(&output.products, output.premium_cutoff)?;
        report.summary_table("CATEGORY KPIs", &categories_to_dataframe(&output.categories, label)?);
        report.summary_table("BRAND KPIs", &brands_to_dataframe(&output.brands, label)?);
        report.insights(&output.insights);

        storage.store_cleaned_csv(&mut output.products, &self.config.output.cleaned_csv)?;

        if let Some(path) = &self.config.output.cleaned_parquet {
            storage.store_parquet(&mut output.products, path)?;
        }

        if let Some(path) = &self.config.output.chart_data {
            let builder = ChartDataBuilder::new(self.config.charts.clone(), label.clone());
            let charts = builder.build(&output.products, &output.categories, &output.brands)?;
            storage.store_json(&charts, path)?;
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;

    fn scenario_frame() -> DataFrame {
        df!(
            "Product ID" => ["p1", "p2", "p3"],
            "Category" => ["A", "A", "B"],
            "BrandName" => ["x", "y", "x"],
            "MRP" => ["1,000", "500", "abc"],
            "SellPrice" => ["800", "500", "300"],
            "Discount" => ["20% off", "0% off", "N/A"],
            "Currancy" => ["BDT", "BDT", "BDT"]
        )
        .unwrap()
    }

    fn f64_values(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
        df.column(name).unwrap().f64().unwrap().into_iter().collect()
    }

    #[test]
    fn test_three_row_scenario() {
        let pipeline = RetailPipeline::new(PipelineConfig::default());
        let out = pipeline.analyze(scenario_frame()).unwrap();

        assert_eq!(f64_values(&out.products, "MRP_clean"), vec![Some(1000.0), Some(500.0), None]);
        assert_eq!(f64_values(&out.products, "Discount_value"), vec![Some(200.0), Some(0.0), None]);
        assert_eq!(f64_values(&out.products, "Discount_ratio"), vec![Some(0.2), Some(0.0), None]);

        let a = out.categories.iter().find(|r| r.key.as_deref() == Some("A")).unwrap();
        let b = out.categories.iter().find(|r| r.key.as_deref() == Some("B")).unwrap();
        assert_eq!(a.total_revenue, 1300.0);
        assert_eq!(b.total_revenue, 300.0);

        assert_eq!(out.insights.top_revenue_category.as_deref(), Some("A"));
        assert_eq!(out.insights.highest_discount_category.as_deref(), Some("A"));
    }

    #[test]
    fn test_missing_mrp_rows_are_not_premium() {
        let pipeline = RetailPipeline::new(PipelineConfig::default());
        let out = pipeline.analyze(scenario_frame()).unwrap();

        let mrp = out.products.column("MRP_clean").unwrap().f64().unwrap();
        let premium = out.products.column("Is_premium").unwrap().i32().unwrap();
        for (m, p) in mrp.into_iter().zip(premium.into_iter()) {
            if m.is_none() {
                assert_eq!(p, Some(0));
            }
        }
    }

    #[test]
    fn test_analyze_on_cleaned_output_is_stable() {
        let pipeline = RetailPipeline::new(PipelineConfig::default());
        let first = pipeline.analyze(scenario_frame()).unwrap();
        let second = pipeline.analyze(first.products.clone()).unwrap();

        assert!(second.products.equals_missing(&first.products));
        assert_eq!(second.categories, first.categories);
        assert_eq!(second.brands, first.brands);
    }

    #[test]
    fn test_missing_required_column_aborts() {
        let df = scenario_frame().drop("Discount").unwrap();
        let err = RetailPipeline::new(PipelineConfig::default()).analyze(df).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::MissingColumns(cols)) if cols == &vec!["Discount".to_string()]
        ));
    }

    #[test]
    fn test_extra_columns_pass_through() {
        let mut df = scenario_frame();
        df.with_column(Series::new("Size".into(), ["S", "M", "L"])).unwrap();

        let out = RetailPipeline::new(PipelineConfig::default()).analyze(df).unwrap();
        let size = out.products.column("Size").unwrap().str().unwrap();
        assert_eq!(size.get(2), Some("L"));
        assert_eq!(out.products.width(), 8 + 6);
    }

    #[test]
    fn test_run_writes_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("products.csv");
        std::fs::write(
            &input,
            "Product ID,Category,BrandName,MRP,SellPrice,Discount,Currancy\n\
             p1,A,x,\"1,000\",800,20% off,BDT\n\
             p2,A,y,500,500,0% off,BDT\n\
             p3,B,x,abc,300,N/A,BDT\n",
        )
        .unwrap();

        let mut config = PipelineConfig::default();
        config.input.path = input;
        config.output.cleaned_csv = dir.path().join("out").join("cleaned.csv");
        config.output.chart_data = Some(dir.path().join("out").join("charts.json"));

        let out = RetailPipeline::new(config.clone()).run().unwrap();
        assert_eq!(out.products.height(), 3);

        let cleaned = LocalStorage.load_products(&config.output.cleaned_csv).unwrap();
        assert_eq!(cleaned.height(), 3);
        for name in crate::models::columns::DERIVED {
            assert!(cleaned.column(name).is_ok(), "missing column {}", name);
        }

        let charts: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(config.output.chart_data.unwrap()).unwrap()).unwrap();
        assert_eq!(charts["top_categories"][0]["label"], "A");
        assert_eq!(charts["top_categories"][0]["value"], 1300.0);
    }

    #[test]
    fn test_failed_csv_write_leaves_no_chart_data() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("products.csv");
        std::fs::write(
            &input,
            "Product ID,Category,BrandName,MRP,SellPrice,Discount,Currancy\n\
             p1,A,x,100,90,10%,BDT\n",
        )
        .unwrap();
        let blocked = dir.path().join("blocked");
        std::fs::create_dir(&blocked).unwrap();

        let mut config = PipelineConfig::default();
        config.input.path = input;
        // A directory cannot be opened as the CSV file.
        config.output.cleaned_csv = blocked;
        config.output.chart_data = Some(dir.path().join("charts.json"));

        assert!(RetailPipeline::new(config.clone()).run().is_err());
        assert!(!config.output.chart_data.unwrap().exists());
    }
}
