//! Shopping cart fixture.
//!
//! A small in-memory cart used as a demonstration fixture. It carries three
//! known defects on purpose, each documented at its definition so a test
//! suite can assert they are present (or, after a fix, assert they are
//! gone):
//!
//! - `add_item` appends a duplicate line for a name that is already in the
//!   cart instead of incrementing the existing line's quantity.
//! - `remove_item` never re-examines the slot a later line shifts into, so
//!   the line directly after a removed one escapes the scan.
//! - `apply_discount` stores any code without checking it against
//!   [`KNOWN_CODES`], and the rate is derived from the digits embedded in
//!   the code, so an unknown code still drags the total down.
//!
//! All amounts are `i64` minor units (cents); [`Cart::checkout`] formats
//! the final figure through [`rusty_money`].

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{Money, iso};
use thiserror::Error;

/// Discount codes the cart is supposed to accept.
///
/// `apply_discount` should reject anything not listed here; it currently
/// does not consult this list at all.
pub const KNOWN_CODES: [&str; 2] = ["SAVE10", "SAVE20"];

/// Errors from cart arithmetic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// A line subtotal or the running total overflowed `i64` minor units.
    #[error("amount for {0:?} overflows minor units")]
    AmountOverflow(String),
}

/// One line in the cart: a display name, a unit price in minor units and a
/// quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    name: String,
    unit_price: i64,
    quantity: u32,
}

impl CartLine {
    /// Create a new line.
    #[must_use]
    pub fn new(name: impl Into<String>, unit_price: i64, quantity: u32) -> Self {
        Self {
            name: name.into(),
            unit_price,
            quantity,
        }
    }

    /// The display name of the line.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Unit price in minor units.
    #[must_use]
    pub fn unit_price(&self) -> i64 {
        self.unit_price
    }

    /// Quantity of units on this line.
    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Price times quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::AmountOverflow`] if the multiplication does not
    /// fit in `i64` minor units.
    pub fn subtotal(&self) -> Result<i64, CartError> {
        self.unit_price
            .checked_mul(i64::from(self.quantity))
            .ok_or_else(|| CartError::AmountOverflow(self.name.clone()))
    }
}

/// The cart itself: an ordered list of lines plus an optional applied
/// discount code.
#[derive(Debug, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
    discount_code: Option<String>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a line to the cart.
    ///
    /// Known defect: a name that is already in the cart gets a second line
    /// appended instead of a quantity bump on the existing line.
    pub fn add_item(&mut self, name: impl Into<String>, unit_price: i64, quantity: u32) {
        self.lines.push(CartLine::new(name, unit_price, quantity));
    }

    /// Remove every line whose name matches.
    ///
    /// Known defect: the index advances past the slot that the removal
    /// shifted a later line into, so the line directly after a removed one
    /// is never examined. Two adjacent lines for the same name leave one
    /// survivor behind.
    pub fn remove_item(&mut self, name: &str) {
        let mut index = 0;

        while let Some(line) = self.lines.get(index) {
            if line.name() == name {
                self.lines.remove(index);
            }

            index += 1;
        }
    }

    /// Apply a discount code to the cart.
    ///
    /// Known defect: the code is stored as-is, without consulting
    /// [`KNOWN_CODES`]. An unrecognised code is treated exactly like a
    /// valid one.
    pub fn apply_discount(&mut self, code: impl Into<String>) {
        self.discount_code = Some(code.into());
    }

    /// The currently applied discount code, if any.
    #[must_use]
    pub fn discount_code(&self) -> Option<&str> {
        self.discount_code.as_deref()
    }

    /// The lines currently in the cart.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Number of lines in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of all line subtotals, before any discount.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::AmountOverflow`] if any line or the running sum
    /// overflows.
    pub fn subtotal(&self) -> Result<i64, CartError> {
        self.lines.iter().try_fold(0_i64, |acc, line| {
            acc.checked_add(line.subtotal()?)
                .ok_or_else(|| CartError::AmountOverflow(line.name().to_owned()))
        })
    }

    /// The discount taken off the subtotal for the applied code.
    ///
    /// The rate comes from the digits embedded in the code: `SAVE10` means
    /// 10%, `SAVE20` means 20% — and, because nothing validates the prefix,
    /// `BOGUS123` means 123%.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::AmountOverflow`] if the subtotal cannot be
    /// computed or the discount does not fit in minor units.
    pub fn discount_amount(&self) -> Result<i64, CartError> {
        let Some(code) = self.discount_code.as_deref() else {
            return Ok(0);
        };

        let subtotal = self.subtotal()?;
        let amount = Decimal::from(subtotal) * code_rate(code);

        amount
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .ok_or_else(|| CartError::AmountOverflow(code.to_owned()))
    }

    /// Subtotal minus the discount. May go negative when an oversized rate
    /// sneaks in through an unvalidated code.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::AmountOverflow`] on arithmetic overflow.
    pub fn total(&self) -> Result<i64, CartError> {
        let subtotal = self.subtotal()?;
        let discount = self.discount_amount()?;

        subtotal
            .checked_sub(discount)
            .ok_or_else(|| CartError::AmountOverflow("total".to_owned()))
    }

    /// Produce the checkout summary line.
    ///
    /// An empty cart reports itself; otherwise the total is clamped at zero
    /// and formatted as money.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::AmountOverflow`] on arithmetic overflow.
    pub fn checkout(&self) -> Result<String, CartError> {
        if self.is_empty() {
            return Ok("Cart is empty".to_owned());
        }

        let total = self.total()?.max(0);

        Ok(format!("Total: {}", Money::from_minor(total, iso::USD)))
    }
}

/// The fractional rate encoded in a discount code's trailing digits.
fn code_rate(code: &str) -> Decimal {
    let digits: String = code.chars().filter(char::is_ascii_digit).collect();

    digits
        .parse::<u32>()
        .map(|percent| Decimal::from(percent) / Decimal::ONE_HUNDRED)
        .unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn stocked_cart() -> Cart {
        let mut cart = Cart::new();
        cart.add_item("Laptop", 99999, 1);
        cart.add_item("Mouse", 2999, 2);
        cart.add_item("Keyboard", 7999, 1);

        cart
    }

    #[test]
    fn subtotal_sums_price_times_quantity() -> TestResult {
        let cart = stocked_cart();

        assert_eq!(cart.subtotal()?, 99999 + 2 * 2999 + 7999);

        Ok(())
    }

    #[test]
    fn save20_takes_a_fifth_off() -> TestResult {
        let mut cart = stocked_cart();
        cart.apply_discount("SAVE20");

        let subtotal = cart.subtotal()?;

        assert_eq!(cart.discount_amount()?, 22799);
        assert_eq!(cart.total()?, subtotal - 22799);

        Ok(())
    }

    #[test]
    fn adding_an_existing_name_appends_a_second_line() {
        let mut cart = Cart::new();
        cart.add_item("Mouse", 2999, 1);
        cart.add_item("Mouse", 2999, 1);

        assert_eq!(cart.len(), 2);
    }

    #[test]
    fn removal_skips_the_line_after_a_match() {
        let mut cart = Cart::new();
        cart.add_item("Mouse", 2999, 1);
        cart.add_item("Mouse", 2999, 1);
        cart.add_item("Keyboard", 7999, 1);

        cart.remove_item("Mouse");

        let names: Vec<&str> = cart.lines().iter().map(CartLine::name).collect();

        assert_eq!(names, ["Mouse", "Keyboard"]);
    }

    #[test]
    fn unknown_code_is_accepted_and_reduces_the_total() -> TestResult {
        let mut cart = stocked_cart();
        let before = cart.total()?;

        cart.apply_discount("BOGUS123");

        assert_eq!(cart.discount_code(), Some("BOGUS123"));
        assert!(cart.total()? < before, "unknown code should reduce total");

        Ok(())
    }

    #[test]
    fn checkout_clamps_negative_totals_to_zero() -> TestResult {
        let mut cart = Cart::new();
        cart.add_item("Laptop", 99999, 1);
        cart.apply_discount("BOGUS123");

        assert!(cart.total()? < 0);
        assert_eq!(cart.checkout()?, "Total: $0.00");

        Ok(())
    }

    #[test]
    fn checkout_reports_empty_cart() -> TestResult {
        let cart = Cart::new();

        assert_eq!(cart.checkout()?, "Cart is empty");

        Ok(())
    }

    #[test]
    fn checkout_formats_the_total_as_money() -> TestResult {
        let mut cart = Cart::new();
        cart.add_item("A", 1000, 1);
        cart.add_item("B", 2000, 1);
        cart.apply_discount("SAVE10");

        assert_eq!(cart.checkout()?, "Total: $27.00");

        Ok(())
    }
}
