//! Cart manager
//!
//! Owns the current [`Cart`] and the transient error/notice messages, applies
//! cart transitions, persists every committed cart to a [`KeyValueStore`] and
//! notifies subscribers of the new snapshot.
//!
//! Initialisation order is construct, restore, ready: writes are skipped
//! until the restore attempt has finished so an empty cart can never
//! overwrite a snapshot that hasn't been read yet.

use std::{
    fmt,
    sync::Arc,
    time::{Duration, Instant},
};

use slotmap::{SlotMap, new_key_type};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    cart::{Cart, CartError},
    coupons::CouponDefinition,
    messages::MessageSlot,
    products::Product,
    store::{KeyValueStore, StoreError},
};

/// Key the cart snapshot is stored under by default.
pub const DEFAULT_STORAGE_KEY: &str = "shopping-cart";

/// How long a notice stays up by default.
pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_secs(3);

/// Cart manager settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSettings {
    /// Store key for the cart snapshot
    pub storage_key: String,

    /// Lifetime of notices set by successful operations
    pub notice_ttl: Duration,
}

impl Default for CartSettings {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            notice_ttl: DEFAULT_NOTICE_TTL,
        }
    }
}

new_key_type! {
    /// Subscription Key
    pub struct SubscriptionKey;
}

type Subscriber = Box<dyn FnMut(&Cart)>;

/// Result of a restore attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// A stored snapshot was adopted.
    Restored,

    /// Nothing was stored; the cart starts empty.
    Empty,

    /// The stored snapshot was unreadable; the cart starts empty.
    Discarded,

    /// Restore had already run; nothing changed.
    Skipped,
}

#[derive(Debug, Error)]
enum RestoreError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot has no items sequence")]
    MissingItems,

    #[error(transparent)]
    Cart(#[from] CartError),
}

/// Cart state container.
pub struct CartManager<S: KeyValueStore> {
    store: S,
    settings: CartSettings,
    cart: Cart,
    error: MessageSlot,
    notice: MessageSlot,
    ready: bool,
    subscribers: SlotMap<SubscriptionKey, Subscriber>,
}

impl<S: KeyValueStore + fmt::Debug> fmt::Debug for CartManager<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartManager")
            .field("store", &self.store)
            .field("settings", &self.settings)
            .field("cart", &self.cart)
            .field("error", &self.error)
            .field("notice", &self.notice)
            .field("ready", &self.ready)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl<S: KeyValueStore> CartManager<S> {
    /// Create a manager with an empty cart. Nothing is persisted until
    /// [`CartManager::restore`] has run.
    pub fn new(store: S, settings: CartSettings) -> Self {
        Self {
            store,
            settings,
            cart: Cart::new(),
            error: MessageSlot::new(),
            notice: MessageSlot::new(),
            ready: false,
            subscribers: SlotMap::with_key(),
        }
    }

    /// Create a manager and restore the stored cart.
    pub fn open(store: S, settings: CartSettings) -> Self {
        let mut manager = Self::new(store, settings);

        manager.restore();

        manager
    }

    /// Adopt the stored snapshot, if there is a readable one, and mark the
    /// manager ready. Storage and decoding failures fall back to an empty
    /// cart. Only the first call has any effect.
    pub fn restore(&mut self) -> RestoreOutcome {
        if self.ready {
            return RestoreOutcome::Skipped;
        }

        let outcome = match self.load_snapshot() {
            Ok(Some(cart)) => {
                debug!(items = cart.len(), "restored stored cart");
                self.cart = cart;
                RestoreOutcome::Restored
            }
            Ok(None) => RestoreOutcome::Empty,
            Err(error) => {
                warn!(key = %self.settings.storage_key, %error, "discarding stored cart");
                RestoreOutcome::Discarded
            }
        };

        self.ready = true;

        if outcome == RestoreOutcome::Restored {
            self.notify();
        }

        outcome
    }

    fn load_snapshot(&self) -> Result<Option<Cart>, RestoreError> {
        let Some(bytes) = self.store.get(&self.settings.storage_key)? else {
            return Ok(None);
        };

        if bytes.is_empty() {
            return Ok(None);
        }

        let value: serde_json::Value = serde_json::from_slice(&bytes)?;

        if !value.get("items").is_some_and(serde_json::Value::is_array) {
            return Err(RestoreError::MissingItems);
        }

        let cart: Cart = serde_json::from_slice(&bytes)?;

        Ok(Some(cart.normalized()?))
    }

    /// Check if the restore attempt has completed.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Current cart snapshot.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Last error message, empty when there is none.
    pub fn last_error(&self) -> &str {
        self.error.text()
    }

    /// Last notice, empty when there is none.
    pub fn last_notice(&self) -> &str {
        self.notice.text()
    }

    /// When the current notice is due to clear.
    pub fn notice_expires_at(&self) -> Option<Instant> {
        self.notice.pending().map(|scheduled| scheduled.deadline())
    }

    /// Manager settings.
    pub fn settings(&self) -> &CartSettings {
        &self.settings
    }

    /// Backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consume the manager, returning the backing store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Add one unit of a product.
    ///
    /// # Errors
    ///
    /// See [`CartManager::add_item`].
    pub fn add_one(&mut self, product: Arc<Product>) -> Result<(), CartError> {
        self.add_item(product, 1)
    }

    /// Add `quantity` units of a product, merging with an existing line.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidQuantity`] if `quantity` is zero or negative.
    /// - [`CartError::QuantityOverflow`] or [`CartError::AmountOverflow`] if
    ///   the result can't be represented.
    pub fn add_item(&mut self, product: Arc<Product>, quantity: i64) -> Result<(), CartError> {
        let notice = format!("{} added to cart!", product.name);
        let product_id = product.id.clone();

        let next = self.cart.add_item(product, quantity).map_err(|error| self.fail(error))?;

        debug!(%product_id, quantity, "added item to cart");

        self.error.clear();
        self.set_notice(notice);
        self.commit(next);

        Ok(())
    }

    /// Remove a product's line. Removing an absent product is not an error.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::AmountOverflow`] if the totals can't be represented.
    pub fn remove_item(&mut self, product_id: &str) -> Result<(), CartError> {
        let next = self.cart.remove_item(product_id).map_err(|error| self.fail(error))?;

        debug!(%product_id, "removed item from cart");

        self.commit(next);

        Ok(())
    }

    /// Set a line's quantity; zero removes the line and an absent product is
    /// left alone.
    ///
    /// # Errors
    ///
    /// - [`CartError::NegativeQuantity`] if `quantity` is negative.
    /// - [`CartError::AmountOverflow`] if the totals can't be represented.
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> Result<(), CartError> {
        if quantity == 0 {
            return self.remove_item(product_id);
        }

        let next = self
            .cart
            .set_quantity(product_id, quantity)
            .map_err(|error| self.fail(error))?;

        debug!(%product_id, quantity, "updated item quantity");

        self.error.clear();
        self.commit(next);

        Ok(())
    }

    /// Activate a coupon.
    ///
    /// # Errors
    ///
    /// - [`CartError::InvalidCoupon`] if the code doesn't validate; the active
    ///   coupon is left unchanged and nothing is persisted.
    /// - [`CartError::AmountOverflow`] if the totals can't be represented.
    pub fn apply_coupon(&mut self, code: &str) -> Result<&'static CouponDefinition, CartError> {
        let (next, coupon) = self.cart.apply_coupon(code).map_err(|error| self.fail(error))?;

        debug!(code = coupon.code, "applied coupon");

        self.error.clear();
        self.set_notice("Coupon applied successfully!");
        self.commit(next);

        Ok(coupon)
    }

    /// Deactivate the coupon.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::AmountOverflow`] if the totals can't be represented.
    pub fn remove_coupon(&mut self) -> Result<(), CartError> {
        let next = self.cart.remove_coupon().map_err(|error| self.fail(error))?;

        debug!("removed coupon");

        self.commit(next);

        Ok(())
    }

    /// Empty the cart and drop the coupon.
    pub fn clear(&mut self) {
        debug!("cleared cart");

        self.commit(Cart::new());
    }

    /// Clear the error message.
    pub fn clear_error(&mut self) {
        self.error.clear();
    }

    /// Clear the notice and cancel its scheduled clear.
    pub fn clear_notice(&mut self) {
        self.notice.clear();
    }

    /// Run the notice's scheduled clear if it is due at `now`; returns
    /// whether the notice was cleared.
    pub fn expire_messages(&mut self, now: Instant) -> bool {
        self.notice.expire(now)
    }

    /// Register a callback run after every committed change.
    pub fn subscribe(&mut self, subscriber: impl FnMut(&Cart) + 'static) -> SubscriptionKey {
        self.subscribers.insert(Box::new(subscriber))
    }

    /// Remove a subscription; returns whether it existed.
    pub fn unsubscribe(&mut self, key: SubscriptionKey) -> bool {
        self.subscribers.remove(key).is_some()
    }

    fn fail(&mut self, error: CartError) -> CartError {
        debug!(%error, "cart operation rejected");

        self.error.set(error.to_string());

        error
    }

    fn set_notice(&mut self, text: impl Into<String>) {
        self.notice
            .set_expiring(text, Instant::now(), self.settings.notice_ttl);
    }

    fn commit(&mut self, cart: Cart) {
        self.cart = cart;
        self.persist();
        self.notify();
    }

    fn persist(&mut self) {
        if !self.ready {
            debug!("skipping cart write before restore");
            return;
        }

        let bytes = match serde_json::to_vec(&self.cart) {
            Ok(bytes) => bytes,
            Err(error) => {
                warn!(%error, "failed to encode cart");
                return;
            }
        };

        if let Err(error) = self.store.set(&self.settings.storage_key, &bytes) {
            warn!(key = %self.settings.storage_key, %error, "failed to persist cart");
        }
    }

    fn notify(&mut self) {
        for subscriber in self.subscribers.values_mut() {
            subscriber(&self.cart);
        }
    }
}
