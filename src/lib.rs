//! Storefront Cart
//!
//! Shopping-cart state for a storefront: a product catalog, a cart with
//! merged lines and derived totals, a single-coupon discount rule, and a
//! manager that persists the cart to a key-value store and notifies
//! subscribers of every change.

pub mod cart;
pub mod catalog;
pub mod coupons;
pub mod manager;
pub mod messages;
pub mod products;
pub mod store;

pub mod prelude;
