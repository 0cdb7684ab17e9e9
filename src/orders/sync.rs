//! Refreshing the registry from the backend.

use rusty_money::iso::Currency;
use tracing::info;

use crate::{
    api::{ApiError, OrdersBackend},
    orders::{Order, OrderRegistry, RefreshOutcome, RefreshTicket},
};

/// Fetch the backend's order listing and merge it into `registry`.
///
/// # Errors
///
/// Returns an error if the listing cannot be fetched or converted. The
/// registry is left untouched in that case.
pub async fn refresh_orders(
    registry: &mut OrderRegistry,
    backend: &dyn OrdersBackend,
    currency: &'static Currency,
) -> Result<RefreshOutcome, ApiError> {
    let ticket = registry.begin_refresh();
    let orders = fetch_listing(backend, currency).await?;

    Ok(apply_listing(registry, ticket, orders))
}

/// Fetch and convert the backend's order listing without touching a registry.
///
/// # Errors
///
/// Returns an error if the listing cannot be fetched or converted.
pub async fn fetch_listing(
    backend: &dyn OrdersBackend,
    currency: &'static Currency,
) -> Result<Vec<Order>, ApiError> {
    backend
        .list_orders()
        .await?
        .into_iter()
        .map(|record| record.into_order(currency))
        .collect()
}

/// Merge a listing fetched under `ticket`.
pub fn apply_listing(
    registry: &mut OrderRegistry,
    ticket: RefreshTicket,
    orders: Vec<Order>,
) -> RefreshOutcome {
    let count = orders.len();
    let outcome = registry.apply_refresh(ticket, orders);

    if outcome == RefreshOutcome::Applied {
        info!(count, "order listing applied");
    }

    outcome
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use rusty_money::iso::NPR;
    use testresult::TestResult;

    use crate::{
        api::{MockOrdersBackend, OrderItemRecord, OrderRecord},
        orders::{OrderId, OrderStatus},
    };

    use super::*;

    fn record(id: &str, status: OrderStatus) -> OrderRecord {
        OrderRecord {
            id: OrderId::new(id),
            items: vec![OrderItemRecord {
                food_id: "momo".into(),
                name: "Momo".to_string(),
                price: Decimal::new(150, 0),
                quantity: 2,
                image: None,
            }],
            total_amount: Some(Decimal::new(300, 0)),
            status,
            created_at: None,
            delivery_address: None,
        }
    }

    #[tokio::test]
    async fn refresh_merges_backend_listing() -> TestResult {
        let mut backend = MockOrdersBackend::new();

        backend.expect_list_orders().times(1).returning(|| {
            Ok(vec![
                record("o-1", OrderStatus::Preparing),
                record("o-2", OrderStatus::Placed),
            ])
        });

        let mut registry = OrderRegistry::new();

        let outcome = refresh_orders(&mut registry, &backend, NPR).await?;

        assert_eq!(outcome, RefreshOutcome::Applied);
        assert_eq!(registry.len(), 2);

        let order = registry.get_order_by_id("o-1").ok_or("order missing")?;

        assert_eq!(order.status(), OrderStatus::Preparing);
        assert_eq!(order.totals().count(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn failed_refresh_leaves_registry_untouched() {
        let mut backend = MockOrdersBackend::new();

        backend
            .expect_list_orders()
            .returning(|| Err(ApiError::NotFound("no orders route".to_string())));

        let mut registry = OrderRegistry::new();

        let result = refresh_orders(&mut registry, &backend, NPR).await;

        assert!(matches!(result, Err(ApiError::NotFound(_))));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn late_listing_is_discarded() -> TestResult {
        let mut backend = MockOrdersBackend::new();

        backend
            .expect_list_orders()
            .returning(|| Ok(vec![record("o-1", OrderStatus::Delivered)]));

        let mut registry = OrderRegistry::new();

        let slow = registry.begin_refresh();
        let slow_orders = vec![record("o-1", OrderStatus::Placed).into_order(NPR)?];

        refresh_orders(&mut registry, &backend, NPR).await?;

        assert_eq!(
            apply_listing(&mut registry, slow, slow_orders),
            RefreshOutcome::Stale
        );

        let order = registry.get_order_by_id("o-1").ok_or("order missing")?;

        assert_eq!(order.status(), OrderStatus::Delivered);

        Ok(())
    }
}
