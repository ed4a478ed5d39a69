use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogSettings,
    #[serde(default)]
    pub store: StoreSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CatalogSettings {
    #[serde(default = "default_catalog_path")]
    pub path: String,
    #[serde(default)]
    pub discount_policy: DiscountPolicy,
    /// Highest discount percentage a catalog row may carry
    #[serde(default = "default_max_discount")]
    pub max_discount: f64,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
            discount_policy: DiscountPolicy::default(),
            max_discount: default_max_discount(),
        }
    }
}

/// What to do with a catalog row whose discount is outside `0..=max_discount`
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DiscountPolicy {
    #[default]
    Reject,
    Clamp,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct StoreSettings {
    /// Directory receipts and revenue reports are written to (and scanned from)
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

fn default_catalog_path() -> String {
    "items.csv".to_string()
}

fn default_max_discount() -> f64 {
    75.0
}

fn default_output_dir() -> String {
    ".".to_string()
}
