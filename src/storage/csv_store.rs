use anyhow::{Context, Result};
use polars::prelude::*;
use serde::Serialize;
use std::fs::{self, File};
use std::path::Path;
use tracing::info;

use crate::error::PipelineError;
use crate::models::columns;

/// Local-file storage for the pipeline's input and outputs.
pub struct LocalStorage;

impl LocalStorage {
    /// Reads the product CSV with every column as text, so that cleaning
    /// sees exactly what was in the file.
    pub fn load_products(&self, path: &Path) -> Result<DataFrame> {
        if !path.exists() {
            return Err(PipelineError::InputNotFound(path.to_path_buf()).into());
        }

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .try_into_reader_with_file_path(Some(path.into()))?
            .finish()
            .with_context(|| format!("Failed to parse CSV file: {}", path.display()))?;

        info!("Loaded {} rows x {} columns from {}", df.height(), df.width(), path.display());
        Ok(df)
    }

    pub fn store_cleaned_csv(&self, df: &mut DataFrame, path: &Path) -> Result<()> {
        let mut file = create_file(path)?;

        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .finish(df)
            .with_context(|| format!("Failed to write cleaned CSV: {}", path.display()))?;

        info!("Stored cleaned dataset ({} rows) at: {}", df.height(), path.display());
        Ok(())
    }

    pub fn store_parquet(&self, df: &mut DataFrame, path: &Path) -> Result<()> {
        let mut file = create_file(path)?;

        ParquetWriter::new(&mut file)
            .finish(df)
            .with_context(|| format!("Failed to write Parquet file: {}", path.display()))?;

        info!("Stored Parquet copy at: {}", path.display());
        Ok(())
    }

    pub fn store_json<T: Serialize>(&self, value: &T, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        ensure_parent_dir(path)?;
        fs::write(path, json).with_context(|| format!("Failed to write JSON file: {}", path.display()))?;

        info!("Stored JSON at: {}", path.display());
        Ok(())
    }
}

/// Fails with every absent required column listed at once.
pub fn validate_schema(df: &DataFrame) -> Result<(), PipelineError> {
    let missing: Vec<String> = columns::REQUIRED
        .iter()
        .filter(|name| df.column(name).is_err())
        .map(|name| name.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(PipelineError::MissingColumns(missing))
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }
    Ok(())
}

fn create_file(path: &Path) -> Result<File> {
    ensure_parent_dir(path)?;
    File::create(path).with_context(|| format!("Failed to create file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "Product ID,Category,BrandName,MRP,SellPrice,Discount,Currancy,Size\n\
        p1,A,x,\"1,000\",800,20% off, BDT ,M\n\
        p2,A,y,500,500,0% off,BDT,L\n";

    fn write_sample(dir: &tempfile::TempDir) -> std::path::PathBuf {
        let path = dir.path().join("products.csv");
        let mut file = File::create(&path).unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_reads_every_column_as_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(&dir);

        let df = LocalStorage.load_products(&path).unwrap();
        assert_eq!(df.shape(), (2, 8));

        let mrp = df.column("MRP").unwrap().str().unwrap();
        assert_eq!(mrp.get(0), Some("1,000"));
        let sell = df.column("SellPrice").unwrap().str().unwrap();
        assert_eq!(sell.get(1), Some("500"));
        assert!(validate_schema(&df).is_ok());
    }

    #[test]
    fn test_missing_input_is_fatal() {
        let err = LocalStorage
            .load_products(Path::new("no/such/products.csv"))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::InputNotFound(_))
        ));
    }

    #[test]
    fn test_validate_schema_lists_missing_columns() {
        let df = df!(
            "Product ID" => ["p1"],
            "Category" => ["A"],
            "MRP" => ["10"]
        )
        .unwrap();

        match validate_schema(&df) {
            Err(PipelineError::MissingColumns(missing)) => {
                assert_eq!(missing, vec!["BrandName", "SellPrice", "Discount", "Currancy"]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_store_cleaned_csv_round_trips_rows() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_sample(&dir);
        let mut df = LocalStorage.load_products(&input).unwrap();

        let output = dir.path().join("nested").join("cleaned.csv");
        LocalStorage.store_cleaned_csv(&mut df, &output).unwrap();

        let reloaded = LocalStorage.load_products(&output).unwrap();
        assert_eq!(reloaded.shape(), df.shape());

        let header = fs::read_to_string(&output).unwrap();
        assert!(header.starts_with("Product ID,Category,BrandName,MRP,SellPrice,Discount,Currancy,Size"));
    }

    #[test]
    fn test_store_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("data.json");
        LocalStorage.store_json(&vec![1, 2, 3], &path).unwrap();

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value, serde_json::json!([1, 2, 3]));
    }
}
