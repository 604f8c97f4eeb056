use actix_web::{
    body::MessageBody,
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
};
use settlement_engine::{
    test_utils::{prepare_test_env, random_db_path, ConfirmBehaviour, MockGateway},
    SettlementApi,
    SqliteDatabase,
    WalletApi,
};
use serde_json::json;

use crate::routes::{
    health,
    CheckoutRoute,
    MyBalanceRoute,
    PaymentReturnRoute,
    RedeemRoute,
    TopupRoute,
    UpdateCartRoute,
    USER_ID_HEADER,
};

async fn test_backend() -> (SqliteDatabase, MockGateway) {
    let url = random_db_path();
    prepare_test_env(&url).await;
    let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating database");
    (db, MockGateway::new())
}

fn configure(cfg: &mut ServiceConfig, db: SqliteDatabase, gateway: MockGateway) {
    let settlement_api = SettlementApi::new(db.clone(), gateway);
    let wallet_api = WalletApi::new(db);
    cfg.app_data(web::Data::new(settlement_api))
        .app_data(web::Data::new(wallet_api))
        .service(UpdateCartRoute::<SqliteDatabase, MockGateway>::new())
        .service(CheckoutRoute::<SqliteDatabase, MockGateway>::new())
        .service(TopupRoute::<SqliteDatabase, MockGateway>::new())
        .service(PaymentReturnRoute::<SqliteDatabase, MockGateway>::new())
        .service(RedeemRoute::<SqliteDatabase, MockGateway>::new())
        .service(MyBalanceRoute::<SqliteDatabase>::new());
}

#[actix_web::test]
async fn health_endpoint() {
    let app = test::init_service(App::new().service(health)).await;
    let req = TestRequest::get().uri("/health").to_request();
    let (_req, res) = test::call_service(&app, req).await.into_parts();
    let status = res.status();
    let body = res.into_body().try_into_bytes().unwrap();
    assert!(status.is_success());
    assert_eq!(body, "👍️\n");
}

#[actix_web::test]
async fn checkout_requires_a_user_id() {
    let (db, gateway) = test_backend().await;
    let app = test::init_service(App::new().configure(|cfg| configure(cfg, db, gateway))).await;
    let req = TestRequest::post().uri("/checkout").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status().as_u16(), 401);
}

#[actix_web::test]
async fn topup_and_callback_round_trip() {
    let (db, gateway) = test_backend().await;
    let app =
        test::init_service(App::new().configure(|cfg| configure(cfg, db, gateway))).await;

    let req = TestRequest::post()
        .uri("/wallet/topup")
        .insert_header((USER_ID_HEADER, "user-1"))
        .set_json(json!({ "amount": 2_500 }))
        .to_request();
    let res: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    let correlation_id = res["correlation_id"].as_str().expect("correlation id in response").to_string();
    assert!(res["redirect_url"].as_str().unwrap().starts_with("https://pay.example/session/"));

    // The customer returns from the gateway; the server settles and redirects.
    let req = TestRequest::get()
        .uri(&format!("/payments/callback/{correlation_id}?status=success"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status().as_u16(), 303);
    let location = res.headers().get("Location").unwrap().to_str().unwrap();
    assert_eq!(location, "/account/wallet?status=success");

    let req = TestRequest::get().uri("/wallet").insert_header((USER_ID_HEADER, "user-1")).to_request();
    let res: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(res["balance"], "25.00");
}

#[actix_web::test]
async fn declined_payment_redirects_to_failure_page() {
    let (db, gateway) = test_backend().await;
    let scripter = gateway.clone();
    let app = test::init_service(App::new().configure(|cfg| configure(cfg, db, gateway))).await;

    let req = TestRequest::post()
        .uri("/wallet/topup")
        .insert_header((USER_ID_HEADER, "user-2"))
        .set_json(json!({ "amount": 1_000 }))
        .to_request();
    let res: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    let correlation_id = res["correlation_id"].as_str().unwrap().to_string();

    scripter.script_confirm(ConfirmBehaviour::Declined("DECLINED".into()));
    let req = TestRequest::get()
        .uri(&format!("/payments/callback/{correlation_id}?status=success"))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status().as_u16(), 303);
    let location = res.headers().get("Location").unwrap().to_str().unwrap();
    assert_eq!(location, "/account/wallet?status=failed");
}

#[actix_web::test]
async fn unknown_redeem_code_is_a_404() {
    let (db, gateway) = test_backend().await;
    let app = test::init_service(App::new().configure(|cfg| configure(cfg, db, gateway))).await;
    let req = TestRequest::post()
        .uri("/wallet/redeem")
        .insert_header((USER_ID_HEADER, "user-3"))
        .set_json(json!({ "code": "GSP-XXXX-XXXX-XXXX" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status().as_u16(), 404);
}
