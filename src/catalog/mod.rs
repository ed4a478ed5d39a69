mod item;

pub use item::Item;

#[cfg(test)]
pub(crate) use item::sample as sample_item;

use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use crate::config::{CatalogSettings, DiscountPolicy};
use crate::error::{PosError, Result};

/// Fields per catalog row, in file order
pub const CATALOG_FIELDS: usize = 8;

/// Item lookup table keyed by item code
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    items: HashMap<String, Item>,
}

impl Catalog {
    pub fn get(&self, code: &str) -> Option<&Item> {
        self.items.get(code)
    }

    /// Insert an item, replacing (and returning) any previous item with the same code
    pub fn insert(&mut self, item: Item) -> Option<Item> {
        self.items.insert(item.code.clone(), item)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All items ordered by code
    pub fn sorted(&self) -> Vec<&Item> {
        let mut items: Vec<_> = self.items.values().collect();
        items.sort_by(|a, b| a.code.cmp(&b.code));
        items
    }
}

impl FromIterator<Item> for Catalog {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        let mut catalog = Catalog::default();
        for item in iter {
            catalog.insert(item);
        }
        catalog
    }
}

/// A catalog row that was skipped during loading
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRow {
    pub line: u64,
    pub reason: String,
}

/// Result of loading a catalog file: the usable items plus every row that was skipped
#[derive(Debug, Default)]
pub struct CatalogLoad {
    pub catalog: Catalog,
    pub rejected: Vec<RejectedRow>,
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    code: String,
    name: String,
    price: f64,
    size: String,
    manufacture_date: String,
    expiry_date: String,
    manufacturer: String,
    discount: f64,
}

impl CatalogRow {
    fn into_item(self, settings: &CatalogSettings) -> std::result::Result<Item, String> {
        if self.code.is_empty() {
            return Err("empty item code".to_string());
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(format!("invalid price {} for '{}'", self.price, self.code));
        }

        let max = settings.max_discount;
        let mut discount = self.discount;
        if !discount.is_finite() {
            return Err(format!("invalid discount for '{}'", self.code));
        }
        if discount < 0.0 || discount > max {
            match settings.discount_policy {
                DiscountPolicy::Reject => {
                    return Err(format!(
                        "discount {}% for '{}' outside 0-{}%",
                        discount, self.code, max
                    ));
                }
                DiscountPolicy::Clamp => {
                    let clamped = discount.clamp(0.0, max);
                    tracing::warn!(
                        code = %self.code,
                        discount,
                        clamped,
                        "discount out of range, clamped"
                    );
                    discount = clamped;
                }
            }
        }

        Ok(Item {
            code: self.code,
            name: self.name,
            price: self.price,
            size: self.size,
            manufacture_date: self.manufacture_date,
            expiry_date: self.expiry_date,
            manufacturer: self.manufacturer,
            discount,
        })
    }
}

/// Load the item catalog from a comma-separated file.
///
/// The first line is a header. Each following row must carry exactly
/// [`CATALOG_FIELDS`] fields: code, name, price, size, manufacture date,
/// expiry date, manufacturer, discount. Rows that fail to parse or
/// validate are skipped and listed in [`CatalogLoad::rejected`]. On a
/// duplicate code the last row wins.
///
/// Only failing to open or read the file is an error.
pub fn load_catalog(path: &Path, settings: &CatalogSettings) -> Result<CatalogLoad> {
    let file = File::open(path).map_err(|source| PosError::CatalogRead {
        path: path.to_path_buf(),
        source,
    })?;

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(std::io::BufReader::new(file));

    let mut load = CatalogLoad::default();

    for result in rdr.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                load.rejected.push(RejectedRow {
                    line,
                    reason: e.to_string(),
                });
                continue;
            }
        };
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if record.len() != CATALOG_FIELDS {
            load.rejected.push(RejectedRow {
                line,
                reason: format!(
                    "expected {} fields, found {}",
                    CATALOG_FIELDS,
                    record.len()
                ),
            });
            continue;
        }

        let item = record
            .deserialize::<CatalogRow>(None)
            .map_err(|e| e.to_string())
            .and_then(|row| row.into_item(settings));

        match item {
            Ok(item) => {
                if let Some(previous) = load.catalog.insert(item) {
                    tracing::debug!(code = %previous.code, line, "duplicate item code, keeping later row");
                }
            }
            Err(reason) => load.rejected.push(RejectedRow { line, reason }),
        }
    }

    for row in &load.rejected {
        tracing::warn!(line = row.line, reason = %row.reason, "skipped catalog row");
    }
    tracing::info!(
        path = %path.display(),
        items = load.catalog.len(),
        rejected = load.rejected.len(),
        "catalog loaded"
    );

    Ok(load)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const HEADER: &str = "ItemCode,ItemName,Price,Size,ManufactureDate,ExpiryDate,Manufacturer,Discount\n";

    fn write_catalog(dir: &TempDir, rows: &str) -> std::path::PathBuf {
        let path = dir.path().join("items.csv");
        fs::write(&path, format!("{HEADER}{rows}")).unwrap();
        path
    }

    #[test]
    fn loads_row_and_computes_discount() {
        let dir = TempDir::new().unwrap();
        let path = write_catalog(&dir, "A1,Soap,50.00,100g,2024-01-01,2025-01-01,Acme,10\n");

        let load = load_catalog(&path, &CatalogSettings::default()).unwrap();
        assert!(load.rejected.is_empty());

        let item = load.catalog.get("A1").unwrap();
        assert_eq!(item.name, "Soap");
        assert_eq!(item.size, "100g");
        assert_eq!(item.manufacturer, "Acme");
        assert!((item.discounted_price() - 45.0).abs() < 1e-9);
    }

    #[test]
    fn header_only_gives_empty_catalog() {
        let dir = TempDir::new().unwrap();
        let path = write_catalog(&dir, "");

        let load = load_catalog(&path, &CatalogSettings::default()).unwrap();
        assert!(load.catalog.is_empty());
        assert!(load.rejected.is_empty());
    }

    #[test]
    fn duplicate_code_last_row_wins() {
        let dir = TempDir::new().unwrap();
        let path = write_catalog(
            &dir,
            "A1,Soap,50.00,100g,2024-01-01,2025-01-01,Acme,10\n\
             A1,Soap XL,80.00,200g,2024-01-01,2025-01-01,Acme,0\n",
        );

        let load = load_catalog(&path, &CatalogSettings::default()).unwrap();
        assert_eq!(load.catalog.len(), 1);
        assert_eq!(load.catalog.get("A1").unwrap().name, "Soap XL");
    }

    #[test]
    fn malformed_rows_are_skipped() {
        let dir = TempDir::new().unwrap();
        let path = write_catalog(
            &dir,
            "A1,Soap,50.00,100g,2024-01-01,2025-01-01,Acme,10\n\
             B2,Rice,abc,1kg,2024-01-01,2025-01-01,Farm,0\n\
             C3,Milk,10.00,1l\n\
             \n\
             D4,Tea,200.00,250g,2024-01-01,2025-01-01,Hills,5\n",
        );

        let load = load_catalog(&path, &CatalogSettings::default()).unwrap();
        assert_eq!(load.catalog.len(), 2);
        assert!(load.catalog.get("A1").is_some());
        assert!(load.catalog.get("D4").is_some());

        let lines: Vec<u64> = load.rejected.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![3, 4]);
        assert!(load.rejected[1].reason.contains("expected 8 fields"));
    }

    #[test]
    fn quotes_are_not_special() {
        let dir = TempDir::new().unwrap();
        let path = write_catalog(
            &dir,
            "A1,\"Soap\nTotal Cost: Rs.999\",50.00,100g,2024-01-01,2025-01-01,Acme,10\n\
             B2,\"Rice, long\",100.00,1kg,2024-01-01,2025-01-01,Farm,0\n",
        );

        let load = load_catalog(&path, &CatalogSettings::default()).unwrap();
        assert!(load.catalog.is_empty());
        assert_eq!(load.rejected.len(), 3);
        assert!(load.rejected[0].reason.contains("expected 8 fields"));
        assert!(load.rejected[1].reason.contains("expected 8 fields"));
    }

    #[test]
    fn excessive_discount_rejected_by_default() {
        let dir = TempDir::new().unwrap();
        let path = write_catalog(&dir, "A1,Soap,50.00,100g,2024-01-01,2025-01-01,Acme,90\n");

        let load = load_catalog(&path, &CatalogSettings::default()).unwrap();
        assert!(load.catalog.is_empty());
        assert_eq!(load.rejected.len(), 1);
        assert!(load.rejected[0].reason.contains("outside"));
    }

    #[test]
    fn excessive_discount_clamped_when_configured() {
        let dir = TempDir::new().unwrap();
        let path = write_catalog(
            &dir,
            "A1,Soap,100.00,100g,2024-01-01,2025-01-01,Acme,90\n\
             B2,Rice,100.00,1kg,2024-01-01,2025-01-01,Farm,-5\n",
        );
        let settings = CatalogSettings {
            discount_policy: DiscountPolicy::Clamp,
            ..CatalogSettings::default()
        };

        let load = load_catalog(&path, &settings).unwrap();
        assert!(load.rejected.is_empty());
        assert_eq!(load.catalog.get("A1").unwrap().discount, 75.0);
        assert_eq!(load.catalog.get("B2").unwrap().discount, 0.0);
    }

    #[test]
    fn negative_price_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_catalog(&dir, "A1,Soap,-1.00,100g,2024-01-01,2025-01-01,Acme,0\n");

        let load = load_catalog(&path, &CatalogSettings::default()).unwrap();
        assert!(load.catalog.is_empty());
        assert!(load.rejected[0].reason.contains("invalid price"));
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = TempDir::new().unwrap();
        let err = load_catalog(&dir.path().join("nope.csv"), &CatalogSettings::default())
            .unwrap_err();
        assert!(matches!(err, PosError::CatalogRead { .. }));
    }
}
