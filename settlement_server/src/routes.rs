//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Any long, non-cpu-bound operation (I/O, database operations, etc.)
//! must be expressed as futures or asynchronous functions so worker threads can interleave requests.
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use gsp_common::Secret;
use log::*;
use serde_json::json;
use settlement_engine::{
    db_types::OutcomeHint,
    redirects::{destination, Disposition},
    traits::{AccountManagement, PaymentGateway, SettlementDatabase},
    OnboardingRequest,
    SettlementApi,
    SettlementApiError,
    WalletApi,
};

use crate::{
    data_objects::{
        CallbackParams,
        CartUpdateRequest,
        CheckoutResponse,
        OnboardingParams,
        RedeemRequest,
        RedeemResponse,
        TopUpRequest,
    },
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

/// The storefront frontend authenticates the shopper and forwards their id in this header.
pub const USER_ID_HEADER: &str = "gsp-user-id";

fn require_user_id(req: &HttpRequest) -> Result<String, ServerError> {
    req.headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.to_string())
        .ok_or(ServerError::MissingUserId)
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Cart  ----------------------------------------------------
route!(update_cart => Post "/cart" impl SettlementDatabase, PaymentGateway);
pub async fn update_cart<B: SettlementDatabase, G: PaymentGateway>(
    req: HttpRequest,
    body: web::Json<CartUpdateRequest>,
    api: web::Data<SettlementApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    let user_id = require_user_id(&req)?;
    debug!("💻️ POST cart for {user_id}");
    let items = serde_json::to_value(&body.into_inner().lines)
        .map_err(|e| ServerError::InvalidRequestBody(e.to_string()))?;
    let cart = api.db().save_cart(&user_id, &items).await.map_err(SettlementApiError::from)?;
    Ok(HttpResponse::Ok().json(json!({ "customer_id": cart.customer_id, "items": items })))
}

route!(get_cart => Get "/cart" impl SettlementDatabase, PaymentGateway);
pub async fn get_cart<B: SettlementDatabase, G: PaymentGateway>(
    req: HttpRequest,
    api: web::Data<SettlementApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    let user_id = require_user_id(&req)?;
    match api.db().fetch_cart(&user_id).await.map_err(SettlementApiError::from)? {
        Some(cart) => {
            let snapshot = cart.snapshot().map_err(|e| ServerError::BackendError(e.to_string()))?;
            Ok(HttpResponse::Ok().json(snapshot))
        },
        None => Ok(HttpResponse::Ok().json(json!({ "lines": [] }))),
    }
}

//----------------------------------------------   Checkout  ----------------------------------------------------
route!(checkout => Post "/checkout" impl SettlementDatabase, PaymentGateway);
/// Initializes an order checkout from the shopper's stored cart. On success the shopper is sent
/// to the returned gateway URL to pay; the callback settles the rest.
pub async fn checkout<B: SettlementDatabase, G: PaymentGateway>(
    req: HttpRequest,
    api: web::Data<SettlementApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    let user_id = require_user_id(&req)?;
    debug!("💻️ POST checkout for {user_id}");
    let initialized = api.begin_checkout(&user_id).await?;
    Ok(HttpResponse::Ok().json(CheckoutResponse {
        correlation_id: initialized.correlation_id,
        redirect_url: initialized.redirect_url,
    }))
}

route!(topup => Post "/wallet/topup" impl SettlementDatabase, PaymentGateway);
pub async fn topup<B: SettlementDatabase, G: PaymentGateway>(
    req: HttpRequest,
    body: web::Json<TopUpRequest>,
    api: web::Data<SettlementApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    let user_id = require_user_id(&req)?;
    debug!("💻️ POST wallet top-up for {user_id}");
    let initialized = api.begin_topup(&user_id, body.amount).await?;
    Ok(HttpResponse::Ok().json(CheckoutResponse {
        correlation_id: initialized.correlation_id,
        redirect_url: initialized.redirect_url,
    }))
}

route!(onboard_reseller => Post "/resellers/onboard" impl SettlementDatabase, PaymentGateway);
pub async fn onboard_reseller<B: SettlementDatabase, G: PaymentGateway>(
    req: HttpRequest,
    body: web::Json<OnboardingParams>,
    api: web::Data<SettlementApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    let user_id = require_user_id(&req)?;
    let params = body.into_inner();
    debug!("💻️ POST reseller onboarding for {user_id} ({})", params.email);
    let request = OnboardingRequest {
        email: params.email,
        name: params.name,
        business_name: params.business_name,
        password: Secret::new(params.password),
        onboarding_fee: params.onboarding_fee,
    };
    let initialized = api.begin_onboarding(&user_id, request).await?;
    Ok(HttpResponse::Ok().json(CheckoutResponse {
        correlation_id: initialized.correlation_id,
        redirect_url: initialized.redirect_url,
    }))
}

//----------------------------------------------   Callbacks  ----------------------------------------------------
route!(payment_return => Get "/payments/callback/{correlation_id}" impl SettlementDatabase, PaymentGateway);
/// The browser return leg of a payment. Always answers with a redirect: the settled destination
/// when the callback could be dispatched, the purpose's error page when the gateway could not be
/// consulted (the intent stays pending and the webhook retry will settle it).
pub async fn payment_return<B: SettlementDatabase, G: PaymentGateway>(
    path: web::Path<String>,
    query: web::Query<CallbackParams>,
    api: web::Data<SettlementApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    let correlation_id = path.into_inner();
    let hint = parse_hint(&query.status)?;
    debug!("💻️ Payment return for [{correlation_id}] with hint {:?}", hint);
    match api.handle_callback(&correlation_id, hint).await {
        Ok(outcome) => Ok(see_other(&outcome.redirect)),
        Err(SettlementApiError::Gateway(e)) => {
            warn!("💻️ Gateway unavailable while settling [{correlation_id}]: {e}");
            let intent = api.db().fetch_intent(&correlation_id).await.map_err(SettlementApiError::from)?;
            Ok(see_other(&destination(intent.purpose, Disposition::Error, None)))
        },
        Err(e) => Err(e.into()),
    }
}

route!(payment_webhook => Post "/payments/callback/{correlation_id}" impl SettlementDatabase, PaymentGateway);
/// The server-to-server webhook leg. Unlike the browser return, errors surface as HTTP statuses
/// so the gateway knows to retry.
pub async fn payment_webhook<B: SettlementDatabase, G: PaymentGateway>(
    path: web::Path<String>,
    query: web::Query<CallbackParams>,
    api: web::Data<SettlementApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    let correlation_id = path.into_inner();
    let hint = parse_hint(&query.status)?;
    debug!("💻️ Payment webhook for [{correlation_id}] with hint {:?}", hint);
    let outcome = api.handle_callback(&correlation_id, hint).await?;
    Ok(HttpResponse::Ok().json(json!({
        "status": outcome.intent.status.to_string(),
        "redirect": outcome.redirect,
    })))
}

fn parse_hint(status: &str) -> Result<OutcomeHint, ServerError> {
    status.parse::<OutcomeHint>().map_err(|e| ServerError::InvalidRequestBody(e.to_string()))
}

fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther().insert_header(("Location", location)).finish()
}

//----------------------------------------------   Redeem  ----------------------------------------------------
route!(redeem => Post "/wallet/redeem" impl SettlementDatabase, PaymentGateway);
pub async fn redeem<B: SettlementDatabase, G: PaymentGateway>(
    req: HttpRequest,
    body: web::Json<RedeemRequest>,
    api: web::Data<SettlementApi<B, G>>,
) -> Result<HttpResponse, ServerError> {
    let user_id = require_user_id(&req)?;
    debug!("💻️ POST redeem for {user_id}");
    let receipt = api.redeem(&body.code, &user_id).await?;
    Ok(HttpResponse::Ok().json(RedeemResponse::from(receipt)))
}

//----------------------------------------------   Wallet  ----------------------------------------------------
route!(my_balance => Get "/wallet" impl AccountManagement);
/// Returns the shopper's wallet balance. A user who has never had a wallet mutation gets a zero
/// balance rather than a 404.
pub async fn my_balance<B: AccountManagement>(
    req: HttpRequest,
    api: web::Data<WalletApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let user_id = require_user_id(&req)?;
    debug!("💻️ GET wallet balance for {user_id}");
    let response = match api.balance(&user_id).await.map_err(|e| ServerError::BackendError(e.to_string()))? {
        Some(account) => json!({ "balance": account.balance.to_string(), "currency": account.currency }),
        None => json!({ "balance": "0.00", "currency": gsp_common::DEFAULT_CURRENCY_CODE }),
    };
    Ok(HttpResponse::Ok().json(response))
}

route!(my_history => Get "/wallet/history" impl AccountManagement);
pub async fn my_history<B: AccountManagement>(
    req: HttpRequest,
    api: web::Data<WalletApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let user_id = require_user_id(&req)?;
    debug!("💻️ GET wallet history for {user_id}");
    let history = api.history(&user_id).await.map_err(|e| ServerError::BackendError(e.to_string()))?;
    Ok(HttpResponse::Ok().json(history))
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(my_orders => Get "/orders" impl AccountManagement);
pub async fn my_orders<B: AccountManagement>(
    req: HttpRequest,
    api: web::Data<WalletApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let user_id = require_user_id(&req)?;
    debug!("💻️ GET orders for {user_id}");
    let orders =
        api.orders_for_customer(&user_id).await.map_err(|e| ServerError::BackendError(e.to_string()))?;
    Ok(HttpResponse::Ok().json(orders))
}

route!(order_by_number => Get "/orders/{order_number}" impl AccountManagement);
pub async fn order_by_number<B: AccountManagement>(
    req: HttpRequest,
    path: web::Path<String>,
    api: web::Data<WalletApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let user_id = require_user_id(&req)?;
    let order_number = path.into_inner();
    debug!("💻️ GET order {order_number} for {user_id}");
    let found = api.order(&order_number).await.map_err(|e| ServerError::BackendError(e.to_string()))?;
    // Shoppers only see their own orders.
    match found.filter(|(order, _)| order.customer_id == user_id) {
        Some((order, items)) => Ok(HttpResponse::Ok().json(json!({ "order": order, "items": items }))),
        None => Err(ServerError::NoRecordFound(format!("Order {order_number}"))),
    }
}

//----------------------------------------------   Notifications  -----------------------------------------------
route!(my_notifications => Get "/notifications" impl AccountManagement);
pub async fn my_notifications<B: AccountManagement>(
    req: HttpRequest,
    api: web::Data<WalletApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let user_id = require_user_id(&req)?;
    let notifications =
        api.notifications(&user_id).await.map_err(|e| ServerError::BackendError(e.to_string()))?;
    Ok(HttpResponse::Ok().json(notifications))
}
