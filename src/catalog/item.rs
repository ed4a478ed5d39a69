use serde::{Deserialize, Serialize};

/// A catalog entry. Immutable once loaded.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Item {
    pub code: String,
    pub name: String,
    pub price: f64,
    pub size: String,
    pub manufacture_date: String,
    pub expiry_date: String,
    pub manufacturer: String,
    /// Percentage, 0-100
    pub discount: f64,
}

impl Item {
    /// Price after the item's percentage discount
    pub fn discounted_price(&self) -> f64 {
        self.price * (1.0 - self.discount / 100.0)
    }
}

#[cfg(test)]
pub(crate) fn sample(code: &str, name: &str, price: f64, discount: f64) -> Item {
    Item {
        code: code.to_string(),
        name: name.to_string(),
        price,
        size: "1pc".to_string(),
        manufacture_date: "2024-01-01".to_string(),
        expiry_date: "2025-01-01".to_string(),
        manufacturer: "Acme".to_string(),
        discount,
    }
}
