//! Products

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product
///
/// Catalog entries are immutable. The cart shares them behind an `Arc` and
/// only ever reads their identity and price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique product identifier
    pub id: String,

    /// Product name
    pub name: String,

    /// Unit price in the catalog currency
    pub price: Decimal,

    /// Image reference
    #[serde(default)]
    pub image: String,

    /// Product description
    #[serde(default)]
    pub description: String,

    /// Product category
    #[serde(default)]
    pub category: String,
}

impl Product {
    /// Create a product with the given identity and price, leaving the display
    /// fields empty.
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            image: String::new(),
            description: String::new(),
            category: String::new(),
        }
    }

    /// Returns the price of `quantity` units, or `None` on overflow.
    pub fn line_price(&self, quantity: u64) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(quantity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_price_multiplies_unit_price() {
        let product = Product::new("p1", "Mug", Decimal::new(1250, 2));

        assert_eq!(product.line_price(3), Some(Decimal::new(3750, 2)));
    }

    #[test]
    fn line_price_overflow_returns_none() {
        let product = Product::new("p1", "Mug", Decimal::MAX);

        assert_eq!(product.line_price(2), None);
    }
}
