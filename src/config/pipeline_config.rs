use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::PipelineError;

/// Top-level configuration loaded from `src/configs/pipeline.toml`.
///
/// Every section has defaults, so a partial file (or no file at all) is valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub input: InputSection,
    pub output: OutputSection,
    pub analysis: AnalysisConfig,
    pub charts: ChartConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSection {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub cleaned_csv: PathBuf,
    pub cleaned_parquet: Option<PathBuf>,
    pub chart_data: Option<PathBuf>,
}

/// Knobs of the transform core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Quantile of `MRP_clean` at or above which a product is premium.
    pub premium_quantile: f64,
    /// Display label for rows whose grouping key is missing.
    pub missing_key_label: String,
    /// Rows shown in each console preview.
    pub preview_rows: usize,
}

/// Settings handed to the chart data builder; never read by the transform core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub top_n: usize,
    pub histogram_bins: usize,
}

/// Values given on the command line; each one beats every other source.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub charts: Option<PathBuf>,
    pub no_charts: bool,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut PipelineConfig) {
        if let Some(input) = &self.input {
            config.input.path = input.clone();
        }
        if let Some(output) = &self.output {
            config.output.cleaned_csv = output.clone();
        }
        if let Some(charts) = &self.charts {
            config.output.chart_data = Some(charts.clone());
        }
        if self.no_charts {
            config.output.chart_data = None;
        }
    }
}

impl Default for InputSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/products.csv"),
        }
    }
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            cleaned_csv: PathBuf::from("output/products_cleaned.csv"),
            cleaned_parquet: None,
            chart_data: Some(PathBuf::from("output/chart_data.json")),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            premium_quantile: 0.75,
            missing_key_label: "unknown".to_string(),
            preview_rows: 10,
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            top_n: 10,
            histogram_bins: 20,
        }
    }
}

impl PipelineConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pipeline config file: {}", path.display()))?;

        let config: PipelineConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse pipeline config file: {}", path.display()))?;

        Ok(config)
    }

    /// Loads `path` when it exists, falling back to defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Builds the effective configuration: defaults, then the file at
    /// `path` (when present), then `RETAIL_*` environment variables, then
    /// `overrides`. The result is validated.
    pub fn resolve(path: &Path, overrides: &ConfigOverrides) -> Result<Self> {
        Self::resolve_with_prefix(path, "RETAIL", overrides)
    }

    pub fn resolve_with_prefix(path: &Path, prefix: &str, overrides: &ConfigOverrides) -> Result<Self> {
        let mut config = Self::load_or_default(path)?;
        config.apply_env_overrides_with_prefix(prefix);
        overrides.apply(&mut config);
        config.validate()?;
        Ok(config)
    }

    /// Reads `<PREFIX>_INPUT_PATH`, `<PREFIX>_OUTPUT_PATH` and `<PREFIX>_CHARTS_PATH`.
    pub fn apply_env_overrides_with_prefix(&mut self, prefix: &str) {
        let prefix = prefix.to_uppercase();

        if let Ok(path) = env::var(format!("{}_INPUT_PATH", prefix)) {
            self.input.path = PathBuf::from(path);
        }
        if let Ok(path) = env::var(format!("{}_OUTPUT_PATH", prefix)) {
            self.output.cleaned_csv = PathBuf::from(path);
        }
        if let Ok(path) = env::var(format!("{}_CHARTS_PATH", prefix)) {
            self.output.chart_data = Some(PathBuf::from(path));
        }
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        let q = self.analysis.premium_quantile;
        if !(0.0..=1.0).contains(&q) {
            return Err(PipelineError::InvalidConfig(format!(
                "premium_quantile must be within [0, 1], got {}",
                q
            )));
        }

        if self.charts.histogram_bins == 0 {
            return Err(PipelineError::InvalidConfig(
                "histogram_bins must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
