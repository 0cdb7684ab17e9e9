//! Storefront prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    api::{
        ApiClient, ApiError, Credentials, FoodForm, HeadlessNavigator, Navigator, NewOrderRequest,
        OrderRecord, OrdersBackend, Registration,
    },
    cart::{Cart, CartTotals, LineItem},
    checkout::{CheckoutError, CheckoutForm, ValidationErrors, checkout},
    config::{ApiConfig, ClientConfig},
    fixtures::{FixtureError, MenuFixture},
    foods::{Food, FoodId, Rating, RatingError},
    guard::{GuardDecision, LoginRedirect, RouteAccess, RouteGuard},
    orders::{
        DeliveryAddress, Order, OrderId, OrderOrigin, OrderRegistry, OrderRegistryError,
        OrderStatus, OrderStatusError, Progress, RefreshOutcome,
    },
    prices::{Price, PriceError, parse_price},
    session::{
        AuthToken, FileStorage, MemoryStorage, Session, SessionContext, Storage, StorageError,
        UserProfile,
    },
    storefront::{Storefront, StorefrontError},
};
