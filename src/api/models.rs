//! Wire formats exchanged with the backend.

use std::{fmt, num::NonZeroU32};

use jiff::Timestamp;
use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

use crate::{
    api::ApiError,
    cart::{CartTotals, LineItem, totals_of},
    foods::{Food, FoodId, Rating},
    orders::{DeliveryAddress, Order, OrderId, OrderStatus},
    prices::Price,
    session::{AuthToken, UserProfile},
};

/// Collection responses, either a bare array or wrapped in an object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Listing<T> {
    Bare(Vec<T>),
    Wrapped {
        #[serde(alias = "foods", alias = "orders")]
        data: Vec<T>,
    },
}

impl<T> Listing<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Bare(items) | Listing::Wrapped { data: items } => items,
        }
    }
}

/// Single-resource responses, either bare or wrapped in an object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Envelope<T> {
    Bare(T),
    Wrapped {
        #[serde(alias = "food", alias = "order")]
        data: T,
    },
}

impl<T> Envelope<T> {
    pub(crate) fn into_inner(self) -> T {
        match self {
            Envelope::Bare(item) | Envelope::Wrapped { data: item } => item,
        }
    }
}

/// Error body returned by the backend.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    pub(crate) message: Option<String>,
    pub(crate) error: Option<String>,
}

/// Food as served by `GET /foods`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodRecord {
    /// Food identifier
    #[serde(alias = "_id")]
    pub id: FoodId,

    /// Display name
    pub name: String,

    /// Short description
    #[serde(default)]
    pub description: String,

    /// Unit price in major units
    pub price: Decimal,

    /// Menu category
    #[serde(default)]
    pub category: String,

    /// Image reference
    #[serde(default)]
    pub image: Option<String>,

    /// Average rating
    #[serde(default)]
    pub rating: Option<Decimal>,
}

impl FoodRecord {
    /// Convert into a catalog food priced in `currency`.
    ///
    /// # Errors
    ///
    /// Returns an error for negative prices or out-of-range ratings.
    pub fn into_food(self, currency: &Currency) -> Result<Food, ApiError> {
        Ok(Food {
            id: self.id,
            name: self.name,
            description: self.description,
            price: Price::from_decimal(self.price, currency)?,
            category: self.category,
            image: self.image,
            rating: self.rating.map(Rating::try_from).transpose()?,
        })
    }
}

/// Uploaded image for a food, passed through as-is.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Original file name
    pub file_name: String,

    /// MIME type, e.g. `image/png`
    pub content_type: String,

    /// File contents
    pub bytes: Vec<u8>,
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Admin form for creating or updating a food.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoodForm {
    /// Display name
    pub name: String,

    /// Short description
    pub description: String,

    /// Unit price
    pub price: Price,

    /// Menu category
    pub category: String,

    /// Optional image
    pub image: Option<ImageUpload>,
}

/// Login request body.
#[derive(Clone, Serialize)]
pub struct Credentials {
    /// Account email
    pub email: String,

    /// Account password
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"**redacted**")
            .finish()
    }
}

impl Drop for Credentials {
    fn drop(&mut self) {
        self.password.zeroize();
    }
}

/// Registration request body.
#[derive(Clone, Serialize)]
pub struct Registration {
    /// Display name
    pub name: String,

    /// Account email
    pub email: String,

    /// Account password
    pub password: String,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"**redacted**")
            .finish()
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.password.zeroize();
    }
}

/// Successful login response.
#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    pub(crate) token: AuthToken,
    pub(crate) user: UserProfile,
}

/// One line of a `POST /orders` body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemPayload {
    /// Food identifier
    pub food_id: FoodId,

    /// Display name at order time
    pub name: String,

    /// Quantity ordered
    pub quantity: u32,

    /// Unit price in major units
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderRequest {
    /// Ordered lines
    pub items: Vec<OrderItemPayload>,

    /// Order total in major units
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,

    /// Where to deliver
    pub delivery_address: DeliveryAddress,
}

impl NewOrderRequest {
    /// Build an order request from cart lines and their totals.
    #[must_use]
    pub fn from_lines(lines: &[LineItem], totals: CartTotals, address: DeliveryAddress) -> Self {
        let currency = totals.currency();

        Self {
            items: lines
                .iter()
                .map(|line| OrderItemPayload {
                    food_id: line.id().clone(),
                    name: line.name().to_string(),
                    quantity: line.quantity(),
                    price: line.unit_price().to_decimal(currency),
                })
                .collect(),
            total_amount: totals.amount().to_decimal(currency),
            delivery_address: address,
        }
    }
}

/// Body of `PUT /orders/:id/status`.
#[derive(Debug, Serialize)]
pub(crate) struct StatusUpdate {
    pub(crate) status: OrderStatus,
}

/// One line of an order as served by the backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRecord {
    /// Food identifier
    #[serde(alias = "id")]
    pub food_id: FoodId,

    /// Display name at order time
    #[serde(default)]
    pub name: String,

    /// Unit price in major units
    pub price: Decimal,

    /// Quantity ordered
    pub quantity: u32,

    /// Image reference
    #[serde(default)]
    pub image: Option<String>,
}

/// Order as served by the backend.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    /// Backend-issued identifier
    #[serde(alias = "_id")]
    pub id: OrderId,

    /// Ordered lines
    #[serde(default)]
    pub items: Vec<OrderItemRecord>,

    /// Order total in major units
    #[serde(default)]
    pub total_amount: Option<Decimal>,

    /// Current status
    #[serde(default)]
    pub status: OrderStatus,

    /// Creation time
    #[serde(default)]
    pub created_at: Option<Timestamp>,

    /// Where to deliver
    #[serde(default)]
    pub delivery_address: Option<DeliveryAddress>,
}

impl OrderRecord {
    /// Convert into a confirmed order priced in `currency`.
    ///
    /// Lines with a zero quantity are dropped. The backend's total wins over
    /// the sum of the lines when both are present.
    ///
    /// # Errors
    ///
    /// Returns an error for prices the client cannot represent.
    pub fn into_order(self, currency: &'static Currency) -> Result<Order, ApiError> {
        let items = self
            .items
            .into_iter()
            .filter_map(|item| {
                let quantity = NonZeroU32::new(item.quantity)?;

                Some(
                    Price::from_decimal(item.price, currency).map(|price| {
                        LineItem::new(item.food_id, item.name, price, item.image, quantity)
                    }),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let computed = totals_of(&items, currency);

        let totals = match self.total_amount {
            Some(amount) => CartTotals::new(
                computed.count(),
                Price::from_decimal(amount, currency)?,
                currency,
            ),
            None => computed,
        };

        Ok(Order::confirmed(
            self.id,
            items,
            totals,
            self.status,
            self.created_at.unwrap_or_else(Timestamp::now),
            self.delivery_address,
        ))
    }
}
