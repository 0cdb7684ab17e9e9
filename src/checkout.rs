//! Checkout
//!
//! Validates delivery details, submits the cart to the backend, caches the
//! confirmed order and empties the cart. The cart is only cleared once the
//! backend has accepted the order.

use std::fmt;

use jiff::Timestamp;
use smallvec::SmallVec;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    api::{ApiError, NewOrderRequest, OrdersBackend},
    cart::Cart,
    orders::{DeliveryAddress, Order, OrderId, OrderRegistry},
};

const PHONE_DIGITS: std::ops::RangeInclusive<usize> = 7..=15;

/// Why a checkout field was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldProblem {
    /// The field is blank.
    Missing,

    /// The field is filled in but not usable.
    Invalid(&'static str),
}

/// A rejected checkout field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldError {
    /// Field name
    pub field: &'static str,

    /// What is wrong with it
    pub problem: FieldProblem,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.problem {
            FieldProblem::Missing => write!(f, "{} is required", self.field),
            FieldProblem::Invalid(reason) => write!(f, "{} {reason}", self.field),
        }
    }
}

/// Every rejected field of a checkout form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationErrors(SmallVec<[FieldError; 4]>);

impl ValidationErrors {
    /// Rejected fields, in form order.
    #[must_use]
    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }

    /// Whether `field` was rejected.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.iter().any(|error| error.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, error) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }

            write!(f, "{error}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Checkout errors.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The delivery details are incomplete.
    #[error("invalid delivery details: {0}")]
    Validation(#[from] ValidationErrors),

    /// Nothing to order.
    #[error("cart is empty")]
    EmptyCart,

    /// The backend did not accept the order.
    #[error(transparent)]
    Backend(#[from] ApiError),
}

/// Delivery details as entered by the customer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckoutForm {
    /// Recipient name
    pub full_name: String,

    /// Contact phone number
    pub phone: String,

    /// Street address
    pub street: String,

    /// City
    pub city: String,

    /// Optional delivery notes
    pub notes: Option<String>,
}

impl CheckoutForm {
    /// Check the form and turn it into a delivery address.
    ///
    /// # Errors
    ///
    /// Returns every missing or invalid field at once.
    pub fn validate(&self) -> Result<DeliveryAddress, ValidationErrors> {
        let mut errors = SmallVec::new();

        for (field, value) in [
            ("full name", &self.full_name),
            ("phone", &self.phone),
            ("street", &self.street),
            ("city", &self.city),
        ] {
            if value.trim().is_empty() {
                errors.push(FieldError {
                    field,
                    problem: FieldProblem::Missing,
                });
            }
        }

        if !self.phone.trim().is_empty() && !is_phone_number(&self.phone) {
            errors.push(FieldError {
                field: "phone",
                problem: FieldProblem::Invalid("must contain 7 to 15 digits"),
            });
        }

        if !errors.is_empty() {
            return Err(ValidationErrors(errors));
        }

        Ok(DeliveryAddress {
            full_name: self.full_name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            street: self.street.trim().to_string(),
            city: self.city.trim().to_string(),
            notes: self
                .notes
                .as_deref()
                .map(str::trim)
                .filter(|notes| !notes.is_empty())
                .map(str::to_string),
        })
    }
}

fn is_phone_number(phone: &str) -> bool {
    let phone = phone.trim();
    let phone = phone.strip_prefix('+').unwrap_or(phone);

    let valid_chars = phone
        .chars()
        .all(|c| c.is_ascii_digit() || c == ' ' || c == '-');
    let digits = phone.chars().filter(char::is_ascii_digit).count();

    valid_chars && PHONE_DIGITS.contains(&digits)
}

/// Submit the cart as an order.
///
/// On success the confirmed order is cached in `registry` under the
/// backend-issued id and the cart is cleared. On any failure the cart and
/// registry are left as they were.
///
/// # Errors
///
/// - [`CheckoutError::Validation`]: the form is incomplete.
/// - [`CheckoutError::EmptyCart`]: there is nothing to order.
/// - [`CheckoutError::Backend`]: the backend rejected the order or could not
///   be reached.
pub async fn checkout(
    cart: &mut Cart,
    registry: &mut OrderRegistry,
    backend: &dyn OrdersBackend,
    form: &CheckoutForm,
) -> Result<OrderId, CheckoutError> {
    let address = form.validate()?;

    if cart.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let items = cart.snapshot();
    let totals = cart.totals();
    let request = NewOrderRequest::from_lines(&items, totals, address.clone());

    let record = backend.place_order(&request).await.inspect_err(|error| {
        warn!("order submission failed: {error}");
    })?;

    let id = registry.record_confirmed(Order::confirmed(
        record.id,
        items,
        totals,
        record.status,
        record.created_at.unwrap_or_else(Timestamp::now),
        Some(address),
    ));

    cart.clear();

    info!(
        order_id = %id,
        count = totals.count(),
        amount = %totals.amount_money(),
        "checkout complete"
    );

    Ok(id)
}
