//! Storefront context
//!
//! Bundles the session, route guard, API client, cart and order registry
//! that make up one running client. Passed explicitly; nothing here is
//! global.

use std::{fmt, sync::Arc};

use thiserror::Error;
use tracing::debug;

use crate::{
    api::{ApiClient, ApiError, Credentials, Navigator, OrdersBackend},
    cart::Cart,
    checkout::{CheckoutError, CheckoutForm, checkout},
    config::ApiConfig,
    guard::{GuardDecision, RouteGuard, resume_path_from_query},
    orders::{OrderId, OrderRegistry, OrderRegistryError, OrderStatus, RefreshOutcome, sync},
    session::{SessionContext, Storage, StorageError, UserProfile},
};

/// Storefront errors.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// The persisted session could not be read.
    #[error(transparent)]
    Session(#[from] StorageError),

    /// A backend request failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Checkout did not complete.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// The order cache refused the update.
    #[error(transparent)]
    Orders(#[from] OrderRegistryError),
}

/// One running storefront client.
pub struct Storefront {
    session: SessionContext,
    guard: Arc<RouteGuard>,
    navigator: Arc<dyn Navigator>,
    api: ApiClient,
    cart: Cart,
    orders: OrderRegistry,
}

impl fmt::Debug for Storefront {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storefront")
            .field("session", &self.session)
            .field("api", &self.api)
            .field("cart", &self.cart)
            .field("orders", &self.orders.len())
            .finish_non_exhaustive()
    }
}

impl Storefront {
    /// Start a client, restoring any session held in `storage`.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored session cannot be read or the API
    /// client cannot be configured.
    pub fn new(
        config: &ApiConfig,
        storage: Arc<dyn Storage>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, StorefrontError> {
        Self::with_guard(config, storage, navigator, RouteGuard::new())
    }

    /// [`Storefront::new`] with custom route rules.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored session cannot be read or the API
    /// client cannot be configured.
    pub fn with_guard(
        config: &ApiConfig,
        storage: Arc<dyn Storage>,
        navigator: Arc<dyn Navigator>,
        guard: RouteGuard,
    ) -> Result<Self, StorefrontError> {
        let session = SessionContext::restore(storage)?;
        let guard = Arc::new(guard);
        let api = ApiClient::new(config, session.clone(), guard.clone(), navigator.clone())?;
        let cart = Cart::new(api.currency());

        Ok(Self {
            session,
            guard,
            navigator,
            api,
            cart,
            orders: OrderRegistry::new(),
        })
    }

    /// Current session.
    #[must_use]
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Backend client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Route rules.
    #[must_use]
    pub fn guard(&self) -> &RouteGuard {
        &self.guard
    }

    /// Cart contents.
    #[must_use]
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Mutable cart.
    pub fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }

    /// Cached orders.
    #[must_use]
    pub fn orders(&self) -> &OrderRegistry {
        &self.orders
    }

    /// Navigate to `path` if the guard allows it, or wherever it sends the
    /// user instead.
    pub fn navigate(&self, path: &str) -> GuardDecision {
        let decision = self.guard.check_context(&self.session, path);

        match &decision {
            GuardDecision::Allow => self.navigator.redirect(path),
            GuardDecision::RedirectTo(redirect) => self.navigator.redirect(&redirect.location()),
            GuardDecision::Forbidden { fallback } => self.navigator.redirect(fallback),
        }

        debug!(path, ?decision, "navigation");

        decision
    }

    /// Sign in, then continue to the page that sent the user to login.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the session
    /// cannot be persisted.
    pub async fn login(&self, credentials: &Credentials) -> Result<UserProfile, StorefrontError> {
        let user = self.api.login(credentials).await?;

        self.navigate(&self.resume_path());

        Ok(user)
    }

    /// Sign out. The cart is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted session cannot be removed.
    pub fn logout(&self) -> Result<(), StorefrontError> {
        self.api.logout()?;

        Ok(())
    }

    /// Submit the cart as an order.
    ///
    /// # Errors
    ///
    /// See [`checkout`].
    pub async fn checkout(&mut self, form: &CheckoutForm) -> Result<OrderId, StorefrontError> {
        Ok(checkout(&mut self.cart, &mut self.orders, &self.api, form).await?)
    }

    /// Refresh cached orders from the backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing cannot be fetched.
    pub async fn refresh_orders(&mut self) -> Result<RefreshOutcome, StorefrontError> {
        let currency = self.api.currency();

        Ok(sync::refresh_orders(&mut self.orders, &self.api, currency).await?)
    }

    /// Move a cached order to `status` on the backend and locally (admin).
    ///
    /// The transition is checked before anything is sent, and nothing is
    /// sent when the order already has `status`. Returns the previous
    /// status.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is not cached, the transition is not
    /// allowed, or the backend rejects it.
    pub async fn advance_order_status(
        &mut self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<OrderStatus, StorefrontError> {
        let current = self
            .orders
            .get_order_by_id(id.as_str())
            .ok_or_else(|| OrderRegistryError::NotFound(id.clone()))?
            .status();

        if current == status {
            return Ok(current);
        }

        current
            .check_transition(status)
            .map_err(OrderRegistryError::from)?;

        self.api.update_order_status(id, status).await?;

        Ok(self.orders.update_status(id.as_str(), status)?)
    }

    fn resume_path(&self) -> String {
        let current = self.navigator.current_path();

        current
            .split_once('?')
            .filter(|(path, _)| self.guard.is_auth_page(path))
            .and_then(|(_, query)| resume_path_from_query(query))
            .unwrap_or_else(|| "/".to_string())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        api::HeadlessNavigator,
        foods::Food,
        prices::Price,
        session::{AuthToken, MemoryStorage, Session, UserId},
    };

    use super::*;

    fn storefront(navigator: Arc<HeadlessNavigator>) -> Result<Storefront, StorefrontError> {
        Storefront::new(
            &ApiConfig::new("http://127.0.0.1:9/api"),
            Arc::new(MemoryStorage::new()),
            navigator,
        )
    }

    fn customer() -> Result<Session, &'static str> {
        Ok(Session {
            token: AuthToken::new("tok").ok_or("blank token")?,
            user: Some(UserProfile {
                id: UserId::new("u-1"),
                name: "Sita".to_string(),
                email: "sita@example.com".to_string(),
                phone: None,
                address: None,
                avatar: None,
                is_admin: false,
            }),
        })
    }

    #[test]
    fn signed_out_navigation_to_orders_goes_to_login() -> TestResult {
        let navigator = Arc::new(HeadlessNavigator::new("/menu"));
        let storefront = storefront(navigator.clone())?;

        let decision = storefront.navigate("/orders");

        assert!(matches!(decision, GuardDecision::RedirectTo(_)));
        assert_eq!(navigator.current_path(), "/login?redirect=%2Forders");

        Ok(())
    }

    #[test]
    fn resume_path_comes_from_login_query() -> TestResult {
        let navigator = Arc::new(HeadlessNavigator::new("/login?redirect=%2Fcheckout"));
        let storefront = storefront(navigator.clone())?;

        assert_eq!(storefront.resume_path(), "/checkout");

        navigator.visit("/menu?redirect=%2Fcheckout");

        assert_eq!(storefront.resume_path(), "/");

        Ok(())
    }

    #[test]
    fn signed_in_customer_is_kept_out_of_admin() -> TestResult {
        let navigator = Arc::new(HeadlessNavigator::new("/"));
        let storefront = storefront(navigator.clone())?;

        storefront.session().login(customer()?)?;

        assert_eq!(storefront.navigate("/checkout"), GuardDecision::Allow);
        assert_eq!(
            storefront.navigate("/admin/foods"),
            GuardDecision::Forbidden {
                fallback: "/".to_string()
            }
        );
        assert_eq!(navigator.current_path(), "/");

        Ok(())
    }

    #[tokio::test]
    async fn advancing_to_the_current_status_sends_nothing() -> TestResult {
        let mut storefront = storefront(Arc::new(HeadlessNavigator::default()))?;
        let mut cart = Cart::new(storefront.api().currency());

        cart.add_item(&Food::new("momo", "Momo", Price::from_minor(15_000)));

        let id = storefront.orders.place_order(cart.lines(), cart.totals());

        // Nothing listens on the configured port, so any request would fail.
        let previous = storefront
            .advance_order_status(&id, OrderStatus::Placed)
            .await?;

        assert_eq!(previous, OrderStatus::Placed);

        Ok(())
    }

    #[tokio::test]
    async fn advancing_uncached_order_is_rejected_before_any_request() -> TestResult {
        let mut storefront = storefront(Arc::new(HeadlessNavigator::default()))?;

        let result = storefront
            .advance_order_status(&OrderId::new("ghost"), OrderStatus::Preparing)
            .await;

        assert!(matches!(
            result,
            Err(StorefrontError::Orders(OrderRegistryError::NotFound(_)))
        ));

        Ok(())
    }
}
