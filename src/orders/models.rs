//! Order models

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::{
    cart::{CartTotals, LineItem},
    ids::TypedId,
    orders::OrderStatus,
};

/// Order identifier.
pub type OrderId = TypedId<Order>;

/// Where an order's identity came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderOrigin {
    /// Identifier issued by the order backend.
    Confirmed,

    /// Placeholder identifier generated on the client.
    Local,
}

/// Delivery details captured at checkout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryAddress {
    /// Recipient name
    pub full_name: String,

    /// Contact phone number
    pub phone: String,

    /// Street and house number
    pub street: String,

    /// City or town
    pub city: String,

    /// Free-text delivery notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A placed order.
///
/// Items and totals are snapshots taken when the order was placed and are
/// never mutated afterwards; only the status moves.
#[derive(Clone, Debug, PartialEq)]
pub struct Order {
    id: OrderId,
    items: Vec<LineItem>,
    totals: CartTotals,
    status: OrderStatus,
    created_at: Timestamp,
    delivery_address: Option<DeliveryAddress>,
    origin: OrderOrigin,
}

impl Order {
    /// Build an order whose identifier and status were issued by the backend.
    #[must_use]
    pub fn confirmed(
        id: OrderId,
        items: Vec<LineItem>,
        totals: CartTotals,
        status: OrderStatus,
        created_at: Timestamp,
        delivery_address: Option<DeliveryAddress>,
    ) -> Self {
        Self {
            id,
            items,
            totals,
            status,
            created_at,
            delivery_address,
            origin: OrderOrigin::Confirmed,
        }
    }

    pub(super) fn local(id: OrderId, items: Vec<LineItem>, totals: CartTotals) -> Self {
        Self {
            id,
            items,
            totals,
            status: OrderStatus::Placed,
            created_at: Timestamp::now(),
            delivery_address: None,
            origin: OrderOrigin::Local,
        }
    }

    /// Returns the order identifier.
    #[must_use]
    pub fn id(&self) -> &OrderId {
        &self.id
    }

    /// Returns the item snapshot.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Returns the totals snapshot.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        self.totals
    }

    /// Returns the current status.
    #[must_use]
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Returns the delivery address, if one was captured.
    #[must_use]
    pub fn delivery_address(&self) -> Option<&DeliveryAddress> {
        self.delivery_address.as_ref()
    }

    /// Returns where the identifier came from.
    #[must_use]
    pub fn origin(&self) -> OrderOrigin {
        self.origin
    }

    pub(super) fn set_status(&mut self, status: OrderStatus) {
        self.status = status;
    }
}
