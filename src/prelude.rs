//! Storefront cart prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError, CartItem, Totals, calculate_totals},
    catalog::{Catalog, CatalogError},
    coupons::{CouponDefinition, coupons, validate},
    manager::{CartManager, CartSettings, RestoreOutcome, SubscriptionKey},
    messages::{MessageSlot, ScheduledClear},
    products::Product,
    store::{DirectoryStore, KeyValueStore, MemoryStore, StoreError},
};
