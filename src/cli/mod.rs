use std::{
    io::{self, Write},
    sync::Arc,
};

use clap::{Parser, Subcommand};
use thiserror::Error;
use tracing::debug;

use storefront_cart::{
    cart::CartError,
    catalog::{Catalog, CatalogError},
    manager::CartManager,
    store::DirectoryStore,
};

use crate::config::StorefrontConfig;

mod coupon;
mod render;

const BUNDLED_CATALOG_YAML: &str = include_str!("../../fixtures/products/storefront.yml");

#[derive(Debug, Parser)]
#[command(name = "storefront", about = "Storefront shopping cart", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub config: StorefrontConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the catalog
    Products,

    /// List available coupons
    Coupons,

    /// Show the cart
    Show,

    /// Add a product to the cart
    Add {
        /// Product id
        product_id: String,

        /// Units to add
        #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
        quantity: i64,
    },

    /// Remove a product from the cart
    Remove {
        /// Product id
        product_id: String,
    },

    /// Set the quantity of a product already in the cart
    Set {
        /// Product id
        product_id: String,

        /// New quantity; zero removes the product
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },

    /// Apply or remove the cart coupon
    Coupon(coupon::CouponCommand),

    /// Empty the cart
    Clear,
}

/// Errors surfaced to the command line.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    #[error("Failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl Cli {
    /// Load configuration from `.env`, the environment and CLI arguments.
    pub(crate) fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    pub(crate) fn run(self, out: &mut impl Write) -> Result<(), CliError> {
        let catalog = match &self.config.catalog {
            Some(path) => Catalog::from_path(path)?,
            None => Catalog::from_yaml(BUNDLED_CATALOG_YAML)?,
        };

        let store = DirectoryStore::new(&self.config.storage.store_dir);
        let mut manager = CartManager::open(store, self.config.storage.cart_settings());

        debug!(
            store_dir = %self.config.storage.store_dir.display(),
            items = manager.cart().len(),
            "opened cart"
        );

        match self.command {
            Commands::Products => return render::catalog_table(out, &catalog),
            Commands::Coupons => return render::coupon_table(out),
            Commands::Show => {}
            Commands::Add {
                product_id,
                quantity,
            } => {
                let product = catalog
                    .get(&product_id)
                    .ok_or(CliError::UnknownProduct(product_id))?;

                manager.add_item(Arc::clone(product), quantity)?;
            }
            Commands::Remove { product_id } => manager.remove_item(&product_id)?,
            Commands::Set {
                product_id,
                quantity,
            } => manager.set_quantity(&product_id, quantity)?,
            Commands::Coupon(command) => coupon::run(command, &mut manager)?,
            Commands::Clear => manager.clear(),
        }

        if !manager.last_notice().is_empty() {
            writeln!(out, "{}", manager.last_notice())?;
        }

        render::cart_summary(out, manager.cart(), catalog.currency())
    }
}
