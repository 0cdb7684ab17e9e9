//! Orders
//!
//! The registry is a local, append-only view of orders. The backend remains
//! the authority on order identity and status; the registry caches what the
//! backend confirmed and reflects status changes it reports.

use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cart::{CartTotals, LineItem};

mod models;
mod status;
pub mod sync;

pub use models::{DeliveryAddress, Order, OrderId, OrderOrigin};
pub use status::{OrderStatus, OrderStatusError, PROGRESSION, Progress};

/// Errors returned by registry updates.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrderRegistryError {
    /// No order with the given id is cached.
    #[error("order {0} not found")]
    NotFound(OrderId),

    /// The requested transition is not allowed.
    #[error(transparent)]
    Status(#[from] OrderStatusError),
}

/// Ticket identifying one refresh of the registry from the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

/// Outcome of applying a refresh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The listing was merged into the registry.
    Applied,

    /// A newer refresh was already applied; the listing was discarded.
    Stale,
}

/// Append-only collection of orders, in insertion order.
#[derive(Debug, Default)]
pub struct OrderRegistry {
    orders: Vec<Order>,
    index: FxHashMap<OrderId, usize>,
    issued_refresh: u64,
    applied_refresh: u64,
}

impl OrderRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a client-side order from a copy of the given items and totals.
    ///
    /// The order is given a time-ordered placeholder identifier and starts
    /// at [`OrderStatus::Placed`].
    pub fn place_order(&mut self, items: &[LineItem], totals: CartTotals) -> OrderId {
        let id = OrderId::new(Uuid::now_v7().to_string());

        self.insert(Order::local(id.clone(), items.to_vec(), totals));

        info!(order_id = %id, count = totals.count(), "placed local order");

        id
    }

    /// Cache an order confirmed by the backend.
    ///
    /// If the id is already cached, the existing snapshot is kept and only its
    /// status is advanced when the confirmed status is further along.
    pub fn record_confirmed(&mut self, order: Order) -> OrderId {
        let id = order.id().clone();

        match self.get_mut(id.as_str()) {
            Some(existing) => merge_status(existing, order.status()),
            None => self.insert(order),
        }

        id
    }

    /// Look up an order. A miss is a normal outcome, not an error.
    #[must_use]
    pub fn get_order_by_id(&self, id: &str) -> Option<&Order> {
        self.index.get(id).and_then(|index| self.orders.get(*index))
    }

    /// Reflect an externally driven status change into the cache.
    ///
    /// Returns the previous status.
    ///
    /// # Errors
    ///
    /// - [`OrderRegistryError::NotFound`]: the order is not cached.
    /// - [`OrderRegistryError::Status`]: the transition would regress or
    ///   leave a terminal state.
    pub fn update_status(
        &mut self,
        id: &str,
        status: OrderStatus,
    ) -> Result<OrderStatus, OrderRegistryError> {
        let order = self
            .get_mut(id)
            .ok_or_else(|| OrderRegistryError::NotFound(OrderId::new(id)))?;

        let previous = order.status();

        previous.check_transition(status)?;

        order.set_status(status);

        debug!(order_id = id, from = %previous, to = %status, "order status updated");

        Ok(previous)
    }

    /// Start a refresh. Tickets are handed out in increasing order.
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.issued_refresh += 1;

        RefreshTicket(self.issued_refresh)
    }

    /// Merge a backend listing fetched under `ticket`.
    ///
    /// A listing older than the last applied one is discarded, so a slow
    /// response never overwrites newer state. Orders missing from the
    /// listing are kept.
    pub fn apply_refresh(&mut self, ticket: RefreshTicket, orders: Vec<Order>) -> RefreshOutcome {
        if ticket.0 <= self.applied_refresh {
            warn!(
                ticket = ticket.0,
                applied = self.applied_refresh,
                "discarding stale order listing"
            );

            return RefreshOutcome::Stale;
        }

        self.applied_refresh = ticket.0;

        for order in orders {
            self.record_confirmed(order);
        }

        RefreshOutcome::Applied
    }

    /// Iterate over orders in insertion order.
    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    /// Number of cached orders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    fn insert(&mut self, order: Order) {
        self.index.insert(order.id().clone(), self.orders.len());
        self.orders.push(order);
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Order> {
        let index = *self.index.get(id)?;

        self.orders.get_mut(index)
    }
}

fn merge_status(existing: &mut Order, reported: OrderStatus) {
    match existing.status().check_transition(reported) {
        Ok(()) => existing.set_status(reported),
        Err(error) => {
            debug!(order_id = %existing.id(), %error, "keeping cached status");
        }
    }
}
