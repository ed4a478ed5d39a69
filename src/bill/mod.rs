pub mod receipt;

pub use receipt::{receipt_file_name, RECEIPT_FORMAT_VERSION};

use chrono::{Local, NaiveDateTime};
use std::path::Path;

use crate::catalog::Item;
use crate::error::{PosError, Result};

pub const GUEST_CUSTOMER: &str = "Guest";

/// A bill under construction. Line items keep insertion order and may repeat.
#[derive(Debug, Clone)]
pub struct Bill {
    pub cashier: String,
    pub branch: String,
    pub customer: String,
    /// Set once when the bill is opened
    pub created_at: NaiveDateTime,
    items: Vec<Item>,
}

impl Bill {
    pub fn new(cashier: &str, branch: &str, customer: &str) -> Self {
        Self::with_timestamp(cashier, branch, customer, Local::now().naive_local())
    }

    pub fn with_timestamp(
        cashier: &str,
        branch: &str,
        customer: &str,
        created_at: NaiveDateTime,
    ) -> Self {
        let customer = customer.trim();
        Self {
            cashier: cashier.trim().to_string(),
            branch: branch.trim().to_string(),
            customer: if customer.is_empty() {
                GUEST_CUSTOMER.to_string()
            } else {
                customer.to_string()
            },
            created_at,
            items: Vec::new(),
        }
    }

    pub fn add_item(&mut self, item: Item) {
        self.items.push(item);
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Sum of discounted prices over every line
    pub fn total(&self) -> f64 {
        self.items.iter().map(Item::discounted_price).sum()
    }

    /// Write the bill as a receipt file at `path`
    pub fn finalize(&self, path: &Path) -> Result<()> {
        receipt::write_atomic(path, &receipt::render(self)).map_err(|source| {
            PosError::ReceiptWrite {
                path: path.to_path_buf(),
                source,
            }
        })?;
        tracing::info!(
            path = %path.display(),
            items = self.items.len(),
            total = self.total(),
            "bill finalized"
        );
        Ok(())
    }
}
