//! Cart
//!
//! The cart aggregate and its state transitions. Every transition takes the
//! current cart by reference and returns the next one, so a failed transition
//! leaves the current cart untouched. Totals are derived from the items and
//! the coupon code on every transition and can't be set directly.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    coupons::{self, CouponDefinition},
    products::Product,
};

/// Errors raised by cart transitions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CartError {
    /// An add was attempted with a quantity of zero or less.
    #[error("Quantity must be greater than 0")]
    InvalidQuantity(i64),

    /// A quantity update was attempted with a negative quantity.
    #[error("Quantity cannot be negative")]
    NegativeQuantity(i64),

    /// The coupon code is malformed or not in the coupon table.
    #[error("Invalid coupon code. Please check and try again.")]
    InvalidCoupon(String),

    /// Merging quantities would overflow.
    #[error("Quantity is too large")]
    QuantityOverflow,

    /// A monetary total could not be represented.
    #[error("Cart total is too large to represent")]
    AmountOverflow,
}

/// A product in the cart and how many units of it were selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Shared catalog product
    pub product: Arc<Product>,

    /// Number of units, always at least one
    pub quantity: u64,
}

impl CartItem {
    /// Price of this line, or `None` on overflow.
    pub fn line_price(&self) -> Option<Decimal> {
        self.product.line_price(self.quantity)
    }
}

/// Derived cart amounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    /// Sum of line prices
    pub subtotal: Decimal,

    /// Coupon discount
    pub discount: Decimal,

    /// `subtotal - discount`
    pub total: Decimal,
}

/// Calculate the totals for the given items and coupon code.
///
/// The code is re-validated on every call; an unknown or malformed code
/// yields no discount.
///
/// # Errors
///
/// Returns [`CartError::AmountOverflow`] if any amount can't be represented.
pub fn calculate_totals(
    items: &[CartItem],
    coupon_code: Option<&str>,
) -> Result<Totals, CartError> {
    let subtotal = items.iter().try_fold(Decimal::ZERO, |acc, item| {
        item.line_price()
            .and_then(|line| acc.checked_add(line))
            .ok_or(CartError::AmountOverflow)
    })?;

    let discount = match coupon_code.and_then(coupons::validate) {
        Some(coupon) => coupon.discount_on(subtotal).ok_or(CartError::AmountOverflow)?,
        None => Decimal::ZERO,
    };

    let total = subtotal
        .checked_sub(discount)
        .ok_or(CartError::AmountOverflow)?;

    Ok(Totals {
        subtotal,
        discount,
        total,
    })
}

/// Cart snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    items: Vec<CartItem>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    coupon_code: Option<String>,

    #[serde(default)]
    total: Decimal,

    #[serde(default)]
    subtotal: Decimal,

    #[serde(default)]
    discount: Decimal,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cart from items and an optional coupon code, computing totals.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::AmountOverflow`] if the totals can't be represented.
    pub fn with_items(
        items: impl Into<Vec<CartItem>>,
        coupon_code: Option<String>,
    ) -> Result<Self, CartError> {
        let items = items.into();
        let totals = calculate_totals(&items, coupon_code.as_deref())?;

        Ok(Self {
            items,
            coupon_code,
            total: totals.total,
            subtotal: totals.subtotal,
            discount: totals.discount,
        })
    }

    /// Items in insertion order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Find the line for a product.
    pub fn item(&self, product_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product.id == product_id)
    }

    /// Active coupon code, if any.
    pub fn coupon_code(&self) -> Option<&str> {
        self.coupon_code.as_deref()
    }

    /// Sum of line prices.
    pub fn subtotal(&self) -> Decimal {
        self.subtotal
    }

    /// Coupon discount.
    pub fn discount(&self) -> Decimal {
        self.discount
    }

    /// Amount payable.
    pub fn total(&self) -> Decimal {
        self.total
    }

    /// Derived totals as one value.
    pub fn totals(&self) -> Totals {
        Totals {
            subtotal: self.subtotal,
            discount: self.discount,
            total: self.total,
        }
    }

    /// Total number of units across all lines.
    pub fn unit_count(&self) -> u64 {
        self.items
            .iter()
            .fold(0_u64, |acc, item| acc.saturating_add(item.quantity))
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add `quantity` units of a product, merging with an existing line.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidQuantity`] if `quantity` is zero or negative.
    /// - [`CartError::QuantityOverflow`] if the merged quantity overflows.
    /// - [`CartError::AmountOverflow`] if the totals can't be represented.
    pub fn add_item(&self, product: Arc<Product>, quantity: i64) -> Result<Self, CartError> {
        let quantity = u64::try_from(quantity)
            .ok()
            .filter(|quantity| *quantity > 0)
            .ok_or(CartError::InvalidQuantity(quantity))?;

        let mut items = self.items.clone();

        if let Some(existing) = items.iter_mut().find(|item| item.product.id == product.id) {
            existing.quantity = existing
                .quantity
                .checked_add(quantity)
                .ok_or(CartError::QuantityOverflow)?;
        } else {
            items.push(CartItem { product, quantity });
        }

        Self::with_items(items, self.coupon_code.clone())
    }

    /// Remove the line for a product. Removing an absent product is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::AmountOverflow`] if the totals can't be represented.
    pub fn remove_item(&self, product_id: &str) -> Result<Self, CartError> {
        let items: Vec<CartItem> = self
            .items
            .iter()
            .filter(|item| item.product.id != product_id)
            .cloned()
            .collect();

        Self::with_items(items, self.coupon_code.clone())
    }

    /// Set the quantity of an existing line. Zero removes the line; an absent
    /// product is a no-op.
    ///
    /// # Errors
    ///
    /// - [`CartError::NegativeQuantity`] if `quantity` is negative.
    /// - [`CartError::AmountOverflow`] if the totals can't be represented.
    pub fn set_quantity(&self, product_id: &str, quantity: i64) -> Result<Self, CartError> {
        let quantity =
            u64::try_from(quantity).map_err(|_err| CartError::NegativeQuantity(quantity))?;

        if quantity == 0 {
            return self.remove_item(product_id);
        }

        let items: Vec<CartItem> = self
            .items
            .iter()
            .map(|item| {
                if item.product.id == product_id {
                    CartItem {
                        product: Arc::clone(&item.product),
                        quantity,
                    }
                } else {
                    item.clone()
                }
            })
            .collect();

        Self::with_items(items, self.coupon_code.clone())
    }

    /// Activate a coupon, replacing any active one.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidCoupon`] if the code doesn't validate.
    /// - [`CartError::AmountOverflow`] if the totals can't be represented.
    pub fn apply_coupon(
        &self,
        code: &str,
    ) -> Result<(Self, &'static CouponDefinition), CartError> {
        let coupon =
            coupons::validate(code).ok_or_else(|| CartError::InvalidCoupon(code.to_string()))?;
        let cart = Self::with_items(self.items.clone(), Some(coupon.code.to_string()))?;

        Ok((cart, coupon))
    }

    /// Deactivate the coupon.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::AmountOverflow`] if the totals can't be represented.
    pub fn remove_coupon(&self) -> Result<Self, CartError> {
        Self::with_items(self.items.clone(), None)
    }

    /// Recompute the derived totals of a cart built elsewhere, such as a
    /// restored snapshot, dropping lines that violate the item invariants
    /// (zero quantity, negative price, repeated product id).
    ///
    /// # Errors
    ///
    /// Returns [`CartError::AmountOverflow`] if the totals can't be represented.
    pub fn normalized(self) -> Result<Self, CartError> {
        let mut items: Vec<CartItem> = Vec::with_capacity(self.items.len());

        for item in self.items {
            let valid = item.quantity > 0
                && item.product.price >= Decimal::ZERO
                && !items.iter().any(|kept| kept.product.id == item.product.id);

            if valid {
                items.push(item);
            }
        }

        Self::with_items(items, self.coupon_code)
    }
}
