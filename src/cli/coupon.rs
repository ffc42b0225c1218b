use clap::{Args, Subcommand};

use storefront_cart::{cart::CartError, manager::CartManager, store::KeyValueStore};

#[derive(Debug, Args)]
pub(crate) struct CouponCommand {
    #[command(subcommand)]
    command: CouponSubcommand,
}

#[derive(Debug, Subcommand)]
enum CouponSubcommand {
    /// Apply a coupon code
    Apply {
        /// Coupon code
        code: String,
    },

    /// Remove the active coupon
    Remove,
}

pub(crate) fn run<S: KeyValueStore>(
    command: CouponCommand,
    manager: &mut CartManager<S>,
) -> Result<(), CartError> {
    match command.command {
        CouponSubcommand::Apply { code } => manager.apply_coupon(code.trim()).map(|_coupon| ()),
        CouponSubcommand::Remove => manager.remove_coupon(),
    }
}
