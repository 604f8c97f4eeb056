use std::time::Duration;

use actix_web::{http::KeepAlive, middleware::Logger, web, App, HttpServer};
use settlement_engine::{traits::PaymentGateway, SettlementApi, SqliteDatabase, WalletApi};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::PayHubGateway,
    routes::{
        health,
        CheckoutRoute,
        GetCartRoute,
        MyBalanceRoute,
        MyHistoryRoute,
        MyNotificationsRoute,
        MyOrdersRoute,
        OnboardResellerRoute,
        OrderByNumberRoute,
        PaymentReturnRoute,
        PaymentWebhookRoute,
        RedeemRoute,
        TopupRoute,
        UpdateCartRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let gateway = PayHubGateway::try_new(config.payhub.clone())
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db, gateway)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

pub fn create_server_instance<G>(
    config: ServerConfig,
    db: SqliteDatabase,
    gateway: G,
) -> Result<actix_web::dev::Server, ServerError>
where
    G: PaymentGateway + Send + 'static,
{
    let srv = HttpServer::new(move || {
        let settlement_api = SettlementApi::new(db.clone(), gateway.clone());
        let wallet_api = WalletApi::new(db.clone());
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("gsp::access_log"))
            .app_data(web::Data::new(settlement_api))
            .app_data(web::Data::new(wallet_api));
        let api_scope = web::scope("/api")
            .service(UpdateCartRoute::<SqliteDatabase, G>::new())
            .service(GetCartRoute::<SqliteDatabase, G>::new())
            .service(CheckoutRoute::<SqliteDatabase, G>::new())
            .service(TopupRoute::<SqliteDatabase, G>::new())
            .service(OnboardResellerRoute::<SqliteDatabase, G>::new())
            .service(PaymentReturnRoute::<SqliteDatabase, G>::new())
            .service(PaymentWebhookRoute::<SqliteDatabase, G>::new())
            .service(RedeemRoute::<SqliteDatabase, G>::new())
            .service(MyBalanceRoute::<SqliteDatabase>::new())
            .service(MyHistoryRoute::<SqliteDatabase>::new())
            .service(MyOrdersRoute::<SqliteDatabase>::new())
            .service(OrderByNumberRoute::<SqliteDatabase>::new())
            .service(MyNotificationsRoute::<SqliteDatabase>::new());
        app.service(health).service(api_scope)
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
