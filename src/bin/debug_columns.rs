use anyhow::{Result, anyhow};
use std::env;
use std::path::PathBuf;

use retail_analytics::models::columns;
use retail_analytics::processor::{extract_first_number, extract_price, parse_strict_number};
use retail_analytics::report::missing_counts;
use retail_analytics::storage::{LocalStorage, validate_schema};

fn main() -> Result<()> {
    println!("=== DEBUGGING PRODUCT CSV COLUMNS ===\n");

    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("Usage: debug_columns <products.csv> [rows]"))?;
    let rows: usize = env::args().nth(2).and_then(|s| s.parse().ok()).unwrap_or(15);

    let df = LocalStorage.load_products(&path)?;

    println!("1. Columns ({}):", df.width());
    for name in df.get_column_names() {
        println!("   {}", name);
    }

    println!("\n2. Schema check:");
    match validate_schema(&df) {
        Ok(()) => println!("   all required columns present"),
        Err(e) => println!("   {}", e),
    }

    println!("\n3. Missing values per column:");
    for (name, count) in missing_counts(&df) {
        println!("   {:<20} {}", name, count);
    }

    // Show how each raw cell is read by the cleaning rules
    println!("\n4. Extraction preview (first {} rows):", rows);
    let cells = |name: &str| -> Vec<Option<String>> {
        df.column(name)
            .ok()
            .and_then(|c| c.str().ok().map(|s| s.into_iter().map(|v| v.map(str::to_string)).collect()))
            .unwrap_or_default()
    };
    let mrp = cells(columns::MRP);
    let sell = cells(columns::SELL_PRICE);
    let discount = cells(columns::DISCOUNT);

    for i in 0..rows.min(df.height()) {
        let raw = |v: &Vec<Option<String>>| v.get(i).cloned().flatten();
        let show = |v: Option<f64>| v.map(|x| x.to_string()).unwrap_or_else(|| "missing".to_string());

        let mrp_raw = raw(&mrp);
        let sell_raw = raw(&sell);
        let discount_raw = raw(&discount);

        println!(
            "   row {:>3}: MRP {:?} -> {} | SellPrice {:?} -> {} | Discount {:?} -> {}",
            i,
            mrp_raw,
            show(mrp_raw.as_deref().and_then(extract_price)),
            sell_raw,
            show(sell_raw.as_deref().and_then(parse_strict_number)),
            discount_raw,
            show(discount_raw.as_deref().and_then(extract_first_number)),
        );
    }

    Ok(())
}
