//! Order status

use std::{fmt, str::FromStr};

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Lifecycle status of an order.
///
/// `Placed → Preparing → OnTheWay → Delivered` is the delivery progression.
/// `Cancelled` sits outside it: a terminal state reachable from any
/// non-terminal state by an administrative action.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Accepted by the backend.
    #[default]
    Placed,

    /// Being cooked.
    Preparing,

    /// Out for delivery.
    OnTheWay,

    /// Handed to the customer.
    Delivered,

    /// Withdrawn by an administrator.
    Cancelled,
}

/// Ordering table for the delivery progression. `Cancelled` is deliberately absent.
pub const PROGRESSION: [OrderStatus; 4] = [
    OrderStatus::Placed,
    OrderStatus::Preparing,
    OrderStatus::OnTheWay,
    OrderStatus::Delivered,
];

/// Rejected status transitions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderStatusError {
    /// Orders never move backwards along the progression.
    #[error("order cannot move back from {from} to {to}")]
    Regression {
        /// Current status
        from: OrderStatus,
        /// Requested status
        to: OrderStatus,
    },

    /// Delivered and cancelled orders are final.
    #[error("order is already {0} and cannot change")]
    Terminal(OrderStatus),

    /// The status string is not recognised.
    #[error("unknown order status: {0}")]
    Unknown(String),
}

/// Progress indicator derived from a status.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Progress {
    /// Fraction of the progression completed, in `[0, 1]`.
    Fraction(Percentage),

    /// The order was cancelled; rendered as a distinct terminal indicator.
    Cancelled,
}

impl Progress {
    /// Whole percent points for display, or `None` when cancelled.
    #[must_use]
    pub fn percent_points(self) -> Option<Decimal> {
        match self {
            // `Percentage` is a fraction (e.g. 0.25), so multiply by 100 to print percent points.
            Progress::Fraction(fraction) => {
                Some(((fraction * Decimal::ONE) * Decimal::ONE_HUNDRED).round_dp(0))
            }
            Progress::Cancelled => None,
        }
    }
}

impl OrderStatus {
    /// Position in the delivery progression, or `None` for `Cancelled`.
    #[must_use]
    pub fn ordinal(self) -> Option<usize> {
        PROGRESSION.iter().position(|status| *status == self)
    }

    /// Whether no further transitions are possible.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// The next status along the progression, if any.
    #[must_use]
    pub fn next(self) -> Option<OrderStatus> {
        let ordinal = self.ordinal()?;

        PROGRESSION.get(ordinal + 1).copied()
    }

    /// Progress as a pure function of the ordinal:
    /// `ordinal / (steps - 1)`, clamped to `[0, 1]`.
    #[must_use]
    pub fn progress(self) -> Progress {
        let Some(ordinal) = self.ordinal() else {
            return Progress::Cancelled;
        };

        let last = Decimal::from(PROGRESSION.len() - 1);

        let fraction = (Decimal::from(ordinal) / last).clamp(Decimal::ZERO, Decimal::ONE);

        Progress::Fraction(Percentage::from(fraction))
    }

    /// Check whether moving to `next` is allowed.
    ///
    /// Staying put is always allowed. Forward moves may skip steps, since the
    /// backend is the authority and may report a later status directly.
    ///
    /// # Errors
    ///
    /// - [`OrderStatusError::Terminal`]: the order is delivered or cancelled.
    /// - [`OrderStatusError::Regression`]: `next` is earlier in the progression.
    pub fn check_transition(self, next: OrderStatus) -> Result<(), OrderStatusError> {
        if self == next {
            return Ok(());
        }

        if self.is_terminal() {
            return Err(OrderStatusError::Terminal(self));
        }

        match (self.ordinal(), next.ordinal()) {
            (Some(from), Some(to)) if to < from => Err(OrderStatusError::Regression {
                from: self,
                to: next,
            }),
            _ => Ok(()),
        }
    }

    /// Human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Placed => "Placed",
            OrderStatus::Preparing => "Preparing",
            OrderStatus::OnTheWay => "On the way",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OrderStatus {
    type Err = OrderStatusError;

    /// Accepts wire names (`on_the_way`), labels (`On the way`) and the
    /// backend's legacy wording (`Food Processing`, `Out for delivery`).
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized: String = value
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match normalized.as_str() {
            "placed" | "orderplaced" | "pending" => Ok(OrderStatus::Placed),
            "preparing" | "processing" | "foodprocessing" => Ok(OrderStatus::Preparing),
            "ontheway" | "outfordelivery" => Ok(OrderStatus::OnTheWay),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" | "canceled" => Ok(OrderStatus::Cancelled),
            _ => Err(OrderStatusError::Unknown(value.to_string())),
        }
    }
}

impl<'de> Deserialize<'de> for OrderStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;

        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn progression_is_strictly_increasing() {
        let ordinals: Vec<Option<usize>> = PROGRESSION.iter().map(|s| s.ordinal()).collect();

        assert_eq!(ordinals, vec![Some(0), Some(1), Some(2), Some(3)]);
        assert_eq!(OrderStatus::Cancelled.ordinal(), None);
    }

    #[test]
    fn next_walks_progression_without_cancelling() {
        assert_eq!(OrderStatus::Placed.next(), Some(OrderStatus::Preparing));
        assert_eq!(OrderStatus::Preparing.next(), Some(OrderStatus::OnTheWay));
        assert_eq!(OrderStatus::OnTheWay.next(), Some(OrderStatus::Delivered));
        assert_eq!(OrderStatus::Delivered.next(), None);
        assert_eq!(OrderStatus::Cancelled.next(), None);
    }

    #[test]
    fn progress_is_fraction_of_ordinal() {
        assert_eq!(
            OrderStatus::Placed.progress().percent_points(),
            Some(Decimal::ZERO)
        );
        assert_eq!(
            OrderStatus::Preparing.progress().percent_points(),
            Some(Decimal::new(33, 0))
        );
        assert_eq!(
            OrderStatus::OnTheWay.progress().percent_points(),
            Some(Decimal::new(67, 0))
        );
        assert_eq!(
            OrderStatus::Delivered.progress().percent_points(),
            Some(Decimal::ONE_HUNDRED)
        );
    }

    #[test]
    fn cancelled_has_distinct_progress() {
        assert_eq!(OrderStatus::Cancelled.progress(), Progress::Cancelled);
        assert_eq!(Progress::Cancelled.percent_points(), None);
    }

    #[test]
    fn forward_transitions_are_allowed() -> TestResult {
        OrderStatus::Placed.check_transition(OrderStatus::Preparing)?;
        OrderStatus::Placed.check_transition(OrderStatus::OnTheWay)?;
        OrderStatus::Preparing.check_transition(OrderStatus::Cancelled)?;
        OrderStatus::OnTheWay.check_transition(OrderStatus::OnTheWay)?;

        Ok(())
    }

    #[test]
    fn backward_transitions_are_rejected() {
        assert_eq!(
            OrderStatus::OnTheWay.check_transition(OrderStatus::Placed),
            Err(OrderStatusError::Regression {
                from: OrderStatus::OnTheWay,
                to: OrderStatus::Placed,
            })
        );
    }

    #[test]
    fn terminal_states_absorb() {
        assert_eq!(
            OrderStatus::Delivered.check_transition(OrderStatus::Cancelled),
            Err(OrderStatusError::Terminal(OrderStatus::Delivered))
        );
        assert_eq!(
            OrderStatus::Cancelled.check_transition(OrderStatus::Preparing),
            Err(OrderStatusError::Terminal(OrderStatus::Cancelled))
        );
    }

    #[test]
    fn parses_wire_names_and_labels() -> TestResult {
        assert_eq!("on_the_way".parse::<OrderStatus>()?, OrderStatus::OnTheWay);
        assert_eq!("On the way".parse::<OrderStatus>()?, OrderStatus::OnTheWay);
        assert_eq!("Food Processing".parse::<OrderStatus>()?, OrderStatus::Preparing);
        assert_eq!("CANCELED".parse::<OrderStatus>()?, OrderStatus::Cancelled);
        assert!("lost".parse::<OrderStatus>().is_err());

        Ok(())
    }

    #[test]
    fn serializes_as_snake_case() -> TestResult {
        assert_eq!(serde_json::to_string(&OrderStatus::OnTheWay)?, "\"on_the_way\"");
        assert_eq!(
            serde_json::from_str::<OrderStatus>("\"delivered\"")?,
            OrderStatus::Delivered
        );

        Ok(())
    }
}
