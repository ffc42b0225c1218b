//! Catalog
//!
//! Loads the static product catalog from a YAML fixture. Prices are written
//! as `"AMOUNT CURRENCY"` (e.g. `"2.99 GBP"`) and every product must share
//! one currency.

use std::{fs, path::Path, sync::Arc};

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::iso::{Currency, EUR, GBP, USD};
use serde::Deserialize;
use thiserror::Error;

use crate::products::Product;

/// Catalog Loading Errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// IO error reading the catalog file
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Price below zero
    #[error("Negative price for product {0}")]
    NegativePrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between products
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Two products share an id
    #[error("Duplicate product id: {0}")]
    DuplicateProduct(String),

    /// The catalog has no products
    #[error("Catalog contains no products")]
    Empty,
}

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
struct CatalogFixture {
    products: Vec<ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
struct ProductFixture {
    id: String,
    name: String,
    price: String,
    #[serde(default)]
    image: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    category: String,
}

/// Ordered, read-only product catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Arc<Product>>,
    index: FxHashMap<String, usize>,
    currency: &'static Currency,
}

impl Catalog {
    /// Parse a catalog from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML can't be parsed, a price is malformed or
    /// negative, currencies differ, an id repeats, or there are no products.
    pub fn from_yaml(yaml: &str) -> Result<Self, CatalogError> {
        let fixture: CatalogFixture = serde_norway::from_str(yaml)?;

        let mut products = Vec::with_capacity(fixture.products.len());
        let mut index = FxHashMap::default();
        let mut currency: Option<&'static Currency> = None;

        for product_fixture in fixture.products {
            let (price, product_currency) = parse_price(&product_fixture.price)?;

            if price < Decimal::ZERO {
                return Err(CatalogError::NegativePrice(product_fixture.id));
            }

            match currency {
                Some(existing) if existing != product_currency => {
                    return Err(CatalogError::CurrencyMismatch(
                        existing.iso_alpha_code.to_string(),
                        product_currency.iso_alpha_code.to_string(),
                    ));
                }
                Some(_) => {}
                None => currency = Some(product_currency),
            }

            if index.contains_key(&product_fixture.id) {
                return Err(CatalogError::DuplicateProduct(product_fixture.id));
            }

            index.insert(product_fixture.id.clone(), products.len());

            products.push(Arc::new(Product {
                id: product_fixture.id,
                name: product_fixture.name,
                price,
                image: product_fixture.image,
                description: product_fixture.description,
                category: product_fixture.category,
            }));
        }

        let currency = currency.ok_or(CatalogError::Empty)?;

        Ok(Self {
            products,
            index,
            currency,
        })
    }

    /// Read and parse a catalog file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be read or fails [`Catalog::from_yaml`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml(&contents)
    }

    /// Look up a product by id.
    pub fn get(&self, id: &str) -> Option<&Arc<Product>> {
        self.index.get(id).and_then(|&position| self.products.get(position))
    }

    /// Products in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Product>> {
        self.products.iter()
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Check if the catalog has no products. Loaded catalogs never are.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Currency every price is expressed in.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

/// Parse price string (e.g., "2.99 GBP") into an amount and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(Decimal, &'static Currency), CatalogError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(currency_code), None) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(CatalogError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| CatalogError::InvalidPrice(s.to_string()))?;

    let currency = match currency_code {
        "GBP" => GBP,
        "USD" => USD,
        "EUR" => EUR,
        other => return Err(CatalogError::UnknownCurrency(other.to_string())),
    };

    Ok((amount, currency))
}
