//! API gateway client
//!
//! One HTTP client for the storefront backend. Requests pick up the bearer
//! token of the current session; responses pass through a single
//! interceptor that maps 401/403/404 and transport failures onto
//! [`ApiError`] and expires the session when the backend rejects it.

use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use mockall::automock;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, multipart};
use rusty_money::iso::Currency;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::{
    config::ApiConfig,
    foods::{Food, FoodId},
    guard::RouteGuard,
    orders::{OrderId, OrderStatus},
    session::{AuthToken, Session, SessionContext, UserProfile},
};

mod errors;
mod models;
mod navigation;

pub use errors::ApiError;
pub use models::{
    Credentials, FoodForm, FoodRecord, ImageUpload, NewOrderRequest, OrderItemPayload,
    OrderItemRecord, OrderRecord, Registration,
};
pub use navigation::{HeadlessNavigator, MockNavigator, Navigator, expiry_redirect};

use models::{Envelope, ErrorBody, Listing, LoginResponse, StatusUpdate};

/// Order endpoints of the backend.
#[automock]
#[async_trait]
pub trait OrdersBackend: Send + Sync {
    /// Submit a new order; the backend assigns its id.
    async fn place_order(&self, request: &NewOrderRequest) -> Result<OrderRecord, ApiError>;

    /// Orders visible to the current session.
    async fn list_orders(&self) -> Result<Vec<OrderRecord>, ApiError>;

    /// Move an order to `status` (admin).
    async fn update_order_status(&self, id: &OrderId, status: OrderStatus)
    -> Result<(), ApiError>;
}

/// An outgoing request and the token it carries.
struct ApiRequest {
    builder: RequestBuilder,
    token: Option<AuthToken>,
}

impl ApiRequest {
    fn json<T: Serialize + ?Sized>(self, body: &T) -> Self {
        Self {
            builder: self.builder.json(body),
            token: self.token,
        }
    }

    fn multipart(self, form: multipart::Form) -> Self {
        Self {
            builder: self.builder.multipart(form),
            token: self.token,
        }
    }
}

/// HTTP client for the storefront backend.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base_url: Url,
    session: SessionContext,
    guard: Arc<RouteGuard>,
    navigator: Arc<dyn Navigator>,
    currency: &'static Currency,
    redirect_delay: Duration,
}

impl fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("currency", &self.currency.iso_alpha_code)
            .field("redirect_delay", &self.redirect_delay)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for the backend described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL or currency is invalid, or the HTTP
    /// client cannot be built.
    pub fn new(
        config: &ApiConfig,
        session: SessionContext,
        guard: Arc<RouteGuard>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            http,
            base_url: base_url(&config.api_url)?,
            session,
            guard,
            navigator,
            currency: config.currency()?,
            redirect_delay: config.redirect_delay(),
        })
    }

    /// Session whose token this client sends.
    #[must_use]
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Currency of catalog prices.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Backend base URL, always ending in `/`.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Full menu.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or a food cannot be represented.
    pub async fn list_foods(&self) -> Result<Vec<Food>, ApiError> {
        let listing: Listing<FoodRecord> = self.fetch(self.request(Method::GET, "foods")?).await?;

        listing
            .into_vec()
            .into_iter()
            .map(|record| record.into_food(self.currency))
            .collect()
    }

    /// One food.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for an unknown id, or another error if
    /// the request fails.
    pub async fn get_food(&self, id: &FoodId) -> Result<Food, ApiError> {
        let request = self.request(Method::GET, &format!("foods/{id}"))?;
        let envelope: Envelope<FoodRecord> = self.fetch(request).await?;

        envelope.into_inner().into_food(self.currency)
    }

    /// Add a food to the menu (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn create_food(&self, form: FoodForm) -> Result<Food, ApiError> {
        let request = self
            .request(Method::POST, "foods")?
            .multipart(self.food_multipart(form)?);
        let envelope: Envelope<FoodRecord> = self.fetch(request).await?;

        envelope.into_inner().into_food(self.currency)
    }

    /// Replace a food's details (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn update_food(&self, id: &FoodId, form: FoodForm) -> Result<Food, ApiError> {
        let request = self
            .request(Method::PUT, &format!("foods/{id}"))?
            .multipart(self.food_multipart(form)?);
        let envelope: Envelope<FoodRecord> = self.fetch(request).await?;

        envelope.into_inner().into_food(self.currency)
    }

    /// Remove a food from the menu (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete_food(&self, id: &FoodId) -> Result<(), ApiError> {
        self.execute(self.request(Method::DELETE, &format!("foods/{id}"))?)
            .await?;

        info!(food_id = %id, "food deleted");

        Ok(())
    }

    /// Sign in and persist the resulting session.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Authentication`] for rejected credentials, or
    /// [`ApiError::Session`] if the session cannot be persisted.
    pub async fn login(&self, credentials: &Credentials) -> Result<UserProfile, ApiError> {
        let request = self.request(Method::POST, "auth/login")?.json(credentials);
        let response: LoginResponse = self.fetch(request).await?;

        self.session.login(Session {
            token: response.token,
            user: Some(response.user.clone()),
        })?;

        Ok(response.user)
    }

    /// Create an account. Does not sign in.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the registration.
    pub async fn register(&self, registration: &Registration) -> Result<(), ApiError> {
        self.execute(self.request(Method::POST, "auth/register")?.json(registration))
            .await?;

        info!(email = %registration.email, "account registered");

        Ok(())
    }

    /// Sign out locally.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted session cannot be removed.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.session.logout()?;

        Ok(())
    }

    fn request(&self, method: Method, path: &str) -> Result<ApiRequest, ApiError> {
        let url = self.base_url.join(path.trim_start_matches('/'))?;

        debug!(%method, %url, "api request");

        let builder = self.http.request(method, url);
        let token = self.session.token();

        let builder = match &token {
            Some(token) => builder.bearer_auth(token.expose()),
            None => builder,
        };

        Ok(ApiRequest { builder, token })
    }

    fn food_multipart(&self, form: FoodForm) -> Result<multipart::Form, ApiError> {
        let multipart = multipart::Form::new()
            .text("name", form.name)
            .text("description", form.description)
            .text("price", form.price.to_decimal(self.currency).to_string())
            .text("category", form.category);

        let Some(image) = form.image else {
            return Ok(multipart);
        };

        let part = multipart::Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.content_type)
            .map_err(ApiError::Client)?;

        Ok(multipart.part("image", part))
    }

    async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let response = self.execute(request).await?;
        let body = response.text().await.map_err(ApiError::Network)?;

        serde_json::from_str(&body).map_err(ApiError::Decode)
    }

    async fn execute(&self, request: ApiRequest) -> Result<Response, ApiError> {
        let ApiRequest { builder, token } = request;

        let response = builder.send().await.map_err(|error| {
            if error.is_builder() {
                ApiError::Client(error)
            } else {
                warn!("request failed without a response: {error}");

                ApiError::Network(error)
            }
        })?;

        self.intercept(response, token.as_ref()).await
    }

    async fn intercept(
        &self,
        response: Response,
        sent: Option<&AuthToken>,
    ) -> Result<Response, ApiError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let message = error_message(response).await;

        match status {
            StatusCode::UNAUTHORIZED => {
                self.expire_session(sent).await;

                Err(ApiError::Authentication(
                    message.unwrap_or_else(|| "please log in again".to_string()),
                ))
            }
            StatusCode::FORBIDDEN => {
                warn!("request forbidden for the current session");

                Err(ApiError::Authorization(message.unwrap_or_else(|| {
                    "you do not have permission to do that".to_string()
                })))
            }
            StatusCode::NOT_FOUND => Err(ApiError::NotFound(
                message.unwrap_or_else(|| "resource does not exist".to_string()),
            )),
            _ => Err(ApiError::Http {
                status: status.as_u16(),
                message: message.unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("unknown error")
                        .to_string()
                }),
            }),
        }
    }

    /// Expire the session that sent `sent` and send the user to login.
    ///
    /// Nothing happens when a newer session replaced it while the request
    /// was in flight.
    async fn expire_session(&self, sent: Option<&AuthToken>) {
        match self.session.expire_if(sent) {
            Ok(true) => {}
            Ok(false) => {
                debug!("ignoring rejection of a superseded session");

                return;
            }
            Err(error) => error!("failed to clear expired session: {error}"),
        }

        let current = self.navigator.current_path();

        let Some(redirect) = expiry_redirect(&self.guard, &current) else {
            debug!(path = %current, "credentials rejected on an authentication page");

            return;
        };

        warn!(resume = %redirect.resume_path, "session expired, redirecting to login");

        if !self.redirect_delay.is_zero() {
            tokio::time::sleep(self.redirect_delay).await;
        }

        self.navigator.redirect(&redirect.location());
    }
}

#[async_trait]
impl OrdersBackend for ApiClient {
    async fn place_order(&self, request: &NewOrderRequest) -> Result<OrderRecord, ApiError> {
        let request = self.request(Method::POST, "orders")?.json(request);
        let envelope: Envelope<OrderRecord> = self.fetch(request).await?;
        let record = envelope.into_inner();

        info!(order_id = %record.id, "order accepted by backend");

        Ok(record)
    }

    async fn list_orders(&self) -> Result<Vec<OrderRecord>, ApiError> {
        let listing: Listing<OrderRecord> = self.fetch(self.request(Method::GET, "orders")?).await?;

        Ok(listing.into_vec())
    }

    async fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
    ) -> Result<(), ApiError> {
        let request = self
            .request(Method::PUT, &format!("orders/{id}/status"))?
            .json(&StatusUpdate { status });

        self.execute(request).await?;

        info!(order_id = %id, %status, "order status updated");

        Ok(())
    }
}

async fn error_message(response: Response) -> Option<String> {
    let body = response.text().await.ok()?;
    let body = body.trim();

    if body.is_empty() {
        return None;
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.message.or(parsed.error),
        Err(_) => Some(body.to_string()),
    }
}

fn base_url(raw: &str) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(raw)?;

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());

        url.set_path(&path);
    }

    Ok(url)
}
