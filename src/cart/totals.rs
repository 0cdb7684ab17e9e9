//! Cart totals

use rusty_money::{Money, iso::Currency};

use crate::{cart::LineItem, prices::Price};

/// Totals derived from a collection of line items.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CartTotals {
    count: u64,
    amount: Price,
    currency: &'static Currency,
}

impl CartTotals {
    /// Totals for an empty collection.
    #[must_use]
    pub fn empty(currency: &'static Currency) -> Self {
        Self {
            count: 0,
            amount: Price::ZERO,
            currency,
        }
    }

    /// Creates totals from already-known values, e.g. a backend order summary.
    #[must_use]
    pub fn new(count: u64, amount: Price, currency: &'static Currency) -> Self {
        Self {
            count,
            amount,
            currency,
        }
    }

    /// Sum of quantities.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Sum of `quantity × unit price`, in minor units.
    #[must_use]
    pub fn amount(&self) -> Price {
        self.amount
    }

    /// The amount as money.
    #[must_use]
    pub fn amount_money(&self) -> Money<'static, Currency> {
        self.amount.to_money(self.currency)
    }

    /// Currency of the amount.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

/// Derives totals from line items. This is the only place totals are computed.
#[must_use]
pub fn totals_of(lines: &[LineItem], currency: &'static Currency) -> CartTotals {
    lines
        .iter()
        .fold(CartTotals::empty(currency), |totals, line| CartTotals {
            count: totals.count.saturating_add(u64::from(line.quantity())),
            amount: totals.amount.saturating_add(line.line_total()),
            currency,
        })
}
