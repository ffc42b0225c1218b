//! Table output

use std::io::Write;

use rust_decimal::{Decimal, RoundingStrategy};
use rusty_money::{Money, iso::Currency};
use tabled::{
    Table, Tabled,
    settings::{Alignment, Style, object::Columns},
};

use storefront_cart::{cart::Cart, catalog::Catalog, coupons};

use super::CliError;

#[derive(Tabled)]
struct ProductRow {
    #[tabled(rename = "Id")]
    id: String,

    #[tabled(rename = "Product")]
    name: String,

    #[tabled(rename = "Category")]
    category: String,

    #[tabled(rename = "Price")]
    price: String,
}

#[derive(Tabled)]
struct CouponRow {
    #[tabled(rename = "Code")]
    code: &'static str,

    #[tabled(rename = "Discount")]
    discount: String,

    #[tabled(rename = "Description")]
    description: &'static str,
}

#[derive(Tabled)]
struct CartRow {
    #[tabled(rename = "Id")]
    id: String,

    #[tabled(rename = "Product")]
    name: String,

    #[tabled(rename = "Qty")]
    quantity: u64,

    #[tabled(rename = "Each")]
    unit_price: String,

    #[tabled(rename = "Line total")]
    line_total: String,
}

pub(super) fn catalog_table(out: &mut impl Write, catalog: &Catalog) -> Result<(), CliError> {
    let rows = catalog.iter().map(|product| ProductRow {
        id: product.id.clone(),
        name: product.name.clone(),
        category: product.category.clone(),
        price: format_amount(product.price, catalog.currency()),
    });

    let mut table = Table::new(rows);
    table.with(Style::modern_rounded());
    table.modify(Columns::new(3..4), Alignment::right());

    writeln!(out, "{table}")?;

    Ok(())
}

pub(super) fn coupon_table(out: &mut impl Write) -> Result<(), CliError> {
    let rows = coupons::coupons().iter().map(|coupon| CouponRow {
        code: coupon.code,
        discount: format!("{}%", (coupon.discount_rate * Decimal::ONE_HUNDRED).normalize()),
        description: coupon.description,
    });

    let mut table = Table::new(rows);
    table.with(Style::modern_rounded());

    writeln!(out, "{table}")?;

    Ok(())
}

pub(super) fn cart_summary(
    out: &mut impl Write,
    cart: &Cart,
    currency: &'static Currency,
) -> Result<(), CliError> {
    if cart.is_empty() {
        writeln!(out, "Your cart is empty")?;
    } else {
        let rows = cart.items().iter().map(|item| CartRow {
            id: item.product.id.clone(),
            name: item.product.name.clone(),
            quantity: item.quantity,
            unit_price: format_amount(item.product.price, currency),
            line_total: item
                .line_price()
                .map_or_else(|| "-".to_string(), |line| format_amount(line, currency)),
        });

        let mut table = Table::new(rows);
        table.with(Style::modern_rounded());
        table.modify(Columns::new(2..5), Alignment::right());

        writeln!(out, "{table}")?;
    }

    writeln!(
        out,
        "Subtotal ({} items): {}",
        cart.unit_count(),
        format_amount(cart.subtotal(), currency)
    )?;

    if let Some(code) = cart.coupon_code() {
        writeln!(
            out,
            "Discount ({code}): -{}",
            format_amount(cart.discount(), currency)
        )?;
    }

    writeln!(out, "Total: {}", format_amount(cart.total(), currency))?;

    Ok(())
}

/// Format an amount in the given currency, rounded to its minor unit.
fn format_amount(amount: Decimal, currency: &'static Currency) -> String {
    let mut rounded =
        amount.round_dp_with_strategy(currency.exponent, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(currency.exponent);

    match i64::try_from(rounded.mantissa()) {
        Ok(minor) => Money::from_minor(minor, currency).to_string(),
        Err(_) => format!("{rounded} {}", currency.iso_alpha_code),
    }
}
