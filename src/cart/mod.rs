//! Cart

use std::{cell::OnceCell, num::NonZeroU32};

use rusty_money::iso::Currency;
use tracing::trace;

use crate::foods::Food;

mod line_item;
mod totals;

pub use line_item::LineItem;
pub use totals::{CartTotals, totals_of};

/// In-memory cart, keyed by food id and kept in insertion order.
///
/// Totals are derived from the lines on demand and memoized until the next
/// mutation, so they can never drift from the lines themselves.
#[derive(Debug, Clone)]
pub struct Cart {
    lines: Vec<LineItem>,
    currency: &'static Currency,
    totals: OnceCell<CartTotals>,
}

impl Cart {
    /// Create a new, empty cart in the given currency.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            lines: Vec::new(),
            currency,
            totals: OnceCell::new(),
        }
    }

    /// Add one unit of a food. An existing line for the same food is
    /// incremented rather than duplicated.
    pub fn add_item(&mut self, food: &Food) {
        match self.position(food.id.as_str()) {
            Some(index) => {
                if let Some(line) = self.lines.get_mut(index) {
                    line.increment();
                }
            }
            None => self.lines.push(LineItem::from_food(food)),
        }

        trace!(food_id = %food.id, "added item to cart");

        self.invalidate();
    }

    /// Remove one unit of a food, dropping the line when it reaches zero.
    pub fn decrement(&mut self, id: &str) {
        let Some(quantity) = self.get(id).map(LineItem::quantity) else {
            return;
        };

        self.set_quantity(id, i64::from(quantity) - 1);
    }

    /// Remove the line for a food. Removing an absent food is a no-op.
    pub fn remove_item(&mut self, id: &str) {
        let before = self.lines.len();

        self.lines.retain(|line| line.id().as_str() != id);

        if self.lines.len() != before {
            trace!(food_id = id, "removed item from cart");

            self.invalidate();
        }
    }

    /// Set the quantity of a line exactly.
    ///
    /// Quantities at or below zero remove the line; a negative quantity is
    /// never stored. Unknown ids are ignored.
    pub fn set_quantity(&mut self, id: &str, quantity: i64) {
        let clamped = u32::try_from(quantity.max(0)).unwrap_or(u32::MAX);

        let Some(quantity) = NonZeroU32::new(clamped) else {
            self.remove_item(id);
            return;
        };

        let Some(line) = self.lines.iter_mut().find(|line| line.id().as_str() == id) else {
            return;
        };

        line.set_quantity(quantity);

        self.invalidate();
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.invalidate();
    }

    /// Derived totals for the current lines.
    pub fn totals(&self) -> CartTotals {
        *self
            .totals
            .get_or_init(|| totals_of(&self.lines, self.currency))
    }

    /// Look up the line for a food.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&LineItem> {
        self.lines.iter().find(|line| line.id().as_str() == id)
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    /// Owned copy of the lines, detached from later cart mutation.
    #[must_use]
    pub fn snapshot(&self) -> Vec<LineItem> {
        self.lines.clone()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Currency of the cart.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.lines.iter().position(|line| line.id().as_str() == id)
    }

    fn invalidate(&mut self) {
        self.totals.take();
    }
}
