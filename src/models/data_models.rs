use serde::{Deserialize, Serialize};

/// Column names of the product CSV and of the columns the pipeline adds.
pub mod columns {
    pub const PRODUCT_ID: &str = "Product ID";
    pub const CATEGORY: &str = "Category";
    pub const BRAND_NAME: &str = "BrandName";
    pub const MRP: &str = "MRP";
    pub const SELL_PRICE: &str = "SellPrice";
    pub const DISCOUNT: &str = "Discount";
    pub const CURRENCY: &str = "Currancy";

    pub const MRP_CLEAN: &str = "MRP_clean";
    pub const DISCOUNT_PCT: &str = "Discount_pct";
    pub const DISCOUNT_VALUE: &str = "Discount_value";
    pub const DISCOUNT_RATIO: &str = "Discount_ratio";
    pub const REVENUE: &str = "Revenue";
    pub const IS_PREMIUM: &str = "Is_premium";

    pub const REQUIRED: [&str; 7] = [
        PRODUCT_ID, CATEGORY, BRAND_NAME, MRP, SELL_PRICE, DISCOUNT, CURRENCY,
    ];

    pub const DERIVED: [&str; 6] = [
        MRP_CLEAN,
        DISCOUNT_PCT,
        DISCOUNT_VALUE,
        DISCOUNT_RATIO,
        REVENUE,
        IS_PREMIUM,
    ];
}

/// KPIs for one `Category` value. `key` is `None` for rows without a category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub key: Option<String>,
    pub products: usize,
    pub total_revenue: f64,
    pub avg_mrp: Option<f64>,
    pub avg_sell_price: Option<f64>,
    pub avg_discount_pct: Option<f64>,
    pub premium_share: Option<f64>,
}

/// KPIs for one `BrandName` value. `key` is `None` for rows without a brand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandSummary {
    pub key: Option<String>,
    pub products: usize,
    pub total_revenue: f64,
    pub avg_mrp: Option<f64>,
    pub avg_discount_pct: Option<f64>,
}

/// Shared view over both summary kinds, used by insights and chart data.
pub trait GroupSummary {
    fn key(&self) -> Option<&str>;
    fn total_revenue(&self) -> f64;

    fn label<'a>(&'a self, missing_label: &'a str) -> &'a str {
        self.key().unwrap_or(missing_label)
    }
}

impl GroupSummary for CategorySummary {
    fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    fn total_revenue(&self) -> f64 {
        self.total_revenue
    }
}

impl GroupSummary for BrandSummary {
    fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    fn total_revenue(&self) -> f64 {
        self.total_revenue
    }
}
