//! Integration tests for session expiry and error normalisation in the API
//! client, run against a local fake backend.

use std::{sync::Arc, time::Duration};

use serde_json::json;
use testresult::TestResult;

use storefront::{
    api::{ApiClient, ApiError, Credentials, HeadlessNavigator, Navigator, OrdersBackend},
    config::ApiConfig,
    guard::{GuardDecision, RouteGuard},
    orders::{OrderId, OrderStatus},
    foods::FoodId,
    session::{AuthToken, MemoryStorage, Session, SessionContext, Storage, TOKEN_KEY, USER_KEY},
    storefront::{Storefront, StorefrontError},
};

mod support;

use support::FakeBackend;

fn signed_in_storage() -> TestResult<Arc<MemoryStorage>> {
    let storage = Arc::new(MemoryStorage::new());

    storage.set(TOKEN_KEY, "tok-expired")?;
    storage.set(
        USER_KEY,
        &json!({ "_id": "u-1", "name": "Sita", "email": "sita@example.com" }).to_string(),
    )?;

    Ok(storage)
}

fn config(backend: &FakeBackend) -> ApiConfig {
    ApiConfig::new(backend.url()).with_redirect_delay(Duration::ZERO)
}

#[tokio::test]
async fn expired_session_on_protected_page_clears_session_and_records_resume_path() -> TestResult
{
    let backend = FakeBackend::start().await?;
    backend.respond("GET", "/orders", 401, &json!({ "message": "jwt expired" }));

    let storage = signed_in_storage()?;
    let navigator = Arc::new(HeadlessNavigator::new("/"));
    let mut storefront = Storefront::new(&config(&backend), storage.clone(), navigator.clone())?;

    assert_eq!(storefront.navigate("/orders?page=2"), GuardDecision::Allow);

    let result = storefront.refresh_orders().await;

    assert!(matches!(
        result,
        Err(StorefrontError::Api(ApiError::Authentication(ref message))) if message == "jwt expired"
    ));
    assert!(!storefront.session().is_authenticated());
    assert_eq!(storage.get(TOKEN_KEY)?, None);
    assert_eq!(storage.get(USER_KEY)?, None);
    assert_eq!(
        navigator.last_redirect(),
        Some("/login?redirect=%2Forders%3Fpage%3D2".to_string())
    );

    let requests = backend.requests_to("GET", "/orders");

    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests.first().and_then(|request| request.authorization.clone()),
        Some("Bearer tok-expired".to_string())
    );

    Ok(())
}

#[tokio::test]
async fn rejected_login_on_login_page_does_not_redirect() -> TestResult {
    let backend = FakeBackend::start().await?;
    backend.respond(
        "POST",
        "/auth/login",
        401,
        &json!({ "success": false, "message": "Invalid credentials" }),
    );

    let navigator = Arc::new(HeadlessNavigator::new("/login?redirect=%2Fcheckout"));
    let storefront = Storefront::new(
        &config(&backend),
        Arc::new(MemoryStorage::new()),
        navigator.clone(),
    )?;

    let result = storefront
        .login(&Credentials {
            email: "sita@example.com".to_string(),
            password: "wrong".to_string(),
        })
        .await;

    assert!(matches!(
        result,
        Err(StorefrontError::Api(ApiError::Authentication(_)))
    ));
    assert!(navigator.redirects().is_empty());
    assert_eq!(navigator.current_path(), "/login?redirect=%2Fcheckout");

    Ok(())
}

#[tokio::test]
async fn forbidden_keeps_the_session() -> TestResult {
    let backend = FakeBackend::start().await?;
    backend.respond(
        "PUT",
        "/orders/o-1/status",
        403,
        &json!({ "message": "admins only" }),
    );

    let storage = signed_in_storage()?;
    let navigator = Arc::new(HeadlessNavigator::new("/admin/orders"));
    let session = SessionContext::restore(storage)?;
    let client = ApiClient::new(
        &config(&backend),
        session.clone(),
        Arc::new(RouteGuard::new()),
        navigator.clone(),
    )?;

    let result = client
        .update_order_status(&OrderId::new("o-1"), OrderStatus::Preparing)
        .await;

    assert!(matches!(result, Err(ApiError::Authorization(ref message)) if message == "admins only"));
    assert!(session.is_authenticated());
    assert!(navigator.redirects().is_empty());

    Ok(())
}

#[tokio::test]
async fn other_errors_carry_status_and_message() -> TestResult {
    let backend = FakeBackend::start().await?;
    backend.respond("GET", "/foods", 500, &json!({ "error": "database unavailable" }));

    let storefront = Storefront::new(
        &config(&backend),
        Arc::new(MemoryStorage::new()),
        Arc::new(HeadlessNavigator::default()),
    )?;

    let result = storefront.api().list_foods().await;

    assert!(matches!(
        result,
        Err(ApiError::Http { status: 500, ref message }) if message == "database unavailable"
    ));

    Ok(())
}

#[tokio::test]
async fn not_found_carries_the_backend_message() -> TestResult {
    let backend = FakeBackend::start().await?;
    backend.respond("GET", "/foods/ghost", 404, &json!({ "message": "food not found" }));

    let storefront = Storefront::new(
        &config(&backend),
        Arc::new(MemoryStorage::new()),
        Arc::new(HeadlessNavigator::default()),
    )?;

    let result = storefront.api().get_food(&FoodId::new("ghost")).await;

    assert!(matches!(result, Err(ApiError::NotFound(ref message)) if message == "food not found"));

    Ok(())
}

#[tokio::test]
async fn late_rejection_of_an_old_token_keeps_the_newer_session() -> TestResult {
    let backend = FakeBackend::start().await?;
    let release = backend.respond_held("GET", "/orders", 401, &json!({ "message": "jwt expired" }));

    let storage = signed_in_storage()?;
    let navigator = Arc::new(HeadlessNavigator::new("/orders"));
    let session = SessionContext::restore(storage.clone())?;
    let client = ApiClient::new(
        &config(&backend),
        session.clone(),
        Arc::new(RouteGuard::new()),
        navigator.clone(),
    )?;

    let pending = tokio::spawn({
        let client = client.clone();

        async move { client.list_orders().await }
    });

    backend.wait_for("GET", "/orders").await;

    session.login(Session {
        token: AuthToken::new("tok-fresh").ok_or("blank token")?,
        user: None,
    })?;

    release.notify_one();

    let result = pending.await?;

    assert!(matches!(result, Err(ApiError::Authentication(_))));
    assert!(session.is_authenticated());
    assert_eq!(storage.get(TOKEN_KEY)?, Some("tok-fresh".to_string()));
    assert!(navigator.redirects().is_empty());

    let sent = backend.requests_to("GET", "/orders");

    assert_eq!(
        sent.first().and_then(|request| request.authorization.as_deref()),
        Some("Bearer tok-expired")
    );

    Ok(())
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() -> TestResult {
    let storefront = Storefront::new(
        &ApiConfig::new("http://127.0.0.1:1/api"),
        Arc::new(MemoryStorage::new()),
        Arc::new(HeadlessNavigator::default()),
    )?;

    let result = storefront.api().list_foods().await;

    assert!(result.as_ref().is_err_and(ApiError::is_network));

    if let Err(error) = result {
        assert_eq!(
            error.to_string(),
            "network unavailable, please check your connection and try again"
        );
    }

    Ok(())
}

#[tokio::test]
async fn signed_out_requests_carry_no_bearer_token() -> TestResult {
    let backend = FakeBackend::start().await?;
    backend.respond("GET", "/foods", 200, &json!([]));

    let storefront = Storefront::new(
        &config(&backend),
        Arc::new(MemoryStorage::new()),
        Arc::new(HeadlessNavigator::default()),
    )?;

    let foods = storefront.api().list_foods().await?;

    assert!(foods.is_empty());
    assert!(
        backend
            .requests()
            .iter()
            .all(|request| request.authorization.is_none())
    );

    Ok(())
}
