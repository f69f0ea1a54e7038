//! Cart fixture walkthrough.
//!
//! Stocks the deliberately defective cart, applies a discount code and
//! prints the lines and totals.
//!
//! Use `-c` to apply a different code (try `BOGUS123`).

use anyhow::Result;
use clap::Parser;
use rusty_money::{Money, iso};
use tabled::settings::Style;
use tracing_subscriber::EnvFilter;

use storefront::cart::Cart;

/// Arguments for the cart walkthrough
#[derive(Debug, Parser)]
#[command(name = "cart-demo", about = "Walk through the defective shopping cart", long_about = None)]
struct CartDemoArgs {
    /// Discount code to apply at checkout
    #[arg(short, long, default_value = "SAVE20")]
    code: String,
}

#[expect(clippy::print_stdout, reason = "demo binary")]
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = CartDemoArgs::parse();

    let mut cart = Cart::new();
    cart.add_item("Laptop", 99_999, 1);
    cart.add_item("Mouse", 2_999, 2);
    cart.add_item("Keyboard", 7_999, 1);

    println!("Items: {}", cart.len());
    println!("{}", lines_table(&cart)?);
    println!("Subtotal: {}", Money::from_minor(cart.subtotal()?, iso::USD));

    cart.apply_discount(&args.code);

    println!(
        "Discount ({}): {}",
        args.code,
        Money::from_minor(cart.discount_amount()?, iso::USD)
    );
    println!("{}", cart.checkout()?);

    Ok(())
}

fn lines_table(cart: &Cart) -> Result<String> {
    let mut builder = tabled::builder::Builder::default();

    builder.push_record(["Item", "Unit Price", "Qty", "Subtotal"]);

    for line in cart.lines() {
        builder.push_record([
            line.name().to_owned(),
            Money::from_minor(line.unit_price(), iso::USD).to_string(),
            line.quantity().to_string(),
            Money::from_minor(line.subtotal()?, iso::USD).to_string(),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::rounded());

    Ok(table.to_string())
}
