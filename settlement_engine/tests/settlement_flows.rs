//! End-to-end settlement flows against a real SQLite backend and a scripted gateway.
use gsp_common::Money;
use log::*;
use settlement_engine::{
    db_types::*,
    payloads::{CartLine, CartSnapshot, PrepaidCodeSpec},
    test_utils::{prepare_test_env, random_db_path, ConfirmBehaviour, MockGateway},
    AccountManagement,
    OnboardingRequest,
    SettlementApi,
    SettlementApiError,
    SettlementDatabase,
    SqliteDatabase,
    WalletApi,
};
use tokio::runtime::Runtime;

fn test_cart() -> serde_json::Value {
    serde_json::to_value(CartSnapshot {
        lines: vec![
            CartLine {
                product_id: "gems-1000".into(),
                title: "1000 gems".into(),
                variant: Some("EU".into()),
                quantity: 2,
                unit_price: Money::from_units(100),
                prepaid_code: None,
            },
            CartLine {
                product_id: "gift-50".into(),
                title: "50 gift card".into(),
                variant: None,
                quantity: 1,
                unit_price: Money::from_units(50),
                prepaid_code: Some(PrepaidCodeSpec { value: Money::from_units(50), validity_days: 365 }),
            },
        ],
    })
    .unwrap()
}

async fn new_api(url: &str) -> (SettlementApi<SqliteDatabase, MockGateway>, MockGateway, SqliteDatabase) {
    prepare_test_env(url).await;
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating database");
    let gateway = MockGateway::new();
    (SettlementApi::new(db.clone(), gateway.clone()), gateway, db)
}

#[test]
fn order_checkout_settles_end_to_end() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async move {
        let url = random_db_path();
        let (api, gateway, db) = new_api(&url).await;
        db.save_cart("cust-1", &test_cart()).await.unwrap();

        let checkout = api.begin_checkout("cust-1").await.unwrap();
        assert_eq!(checkout.intent.status, IntentStatus::Pending);
        assert_eq!(checkout.intent.amount, Money::from_units(250));
        assert!(checkout.redirect_url.starts_with("https://pay.example/session/"));

        let outcome = api.handle_callback(&checkout.correlation_id, OutcomeHint::Success).await.unwrap();
        assert_eq!(outcome.intent.status, IntentStatus::Completed);
        assert!(outcome.intent.transaction_id.as_deref().unwrap().starts_with("txn-"));
        let order_id = outcome.intent.result_id.expect("completed order intent must carry a result id");
        assert_eq!(outcome.redirect, format!("/store/orders/{order_id}?status=success"));

        // The order and its snapshotted lines are durable.
        let wallet_api = WalletApi::new(db.clone());
        let orders = wallet_api.orders_for_customer("cust-1").await.unwrap();
        assert_eq!(orders.len(), 1);
        let order = &orders[0];
        assert_eq!(order.total, Money::from_units(250));
        assert_eq!(order.payment_status, PaymentStatus::Paid);
        assert!(order.order_number.starts_with("ORD"));
        let items = wallet_api.order(&order.order_number).await.unwrap().unwrap().1;
        assert_eq!(items.len(), 2);

        // The converted cart is gone, and a confirmation was queued.
        assert!(db.fetch_cart("cust-1").await.unwrap().is_none());
        let notes = db.fetch_notifications("cust-1").await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, "order_confirmed");

        // Replayed callback: same stored outcome, no second gateway confirmation, no second order.
        let confirms = gateway.confirm_calls();
        let replay = api.handle_callback(&checkout.correlation_id, OutcomeHint::Success).await.unwrap();
        assert_eq!(replay.redirect, outcome.redirect);
        assert_eq!(gateway.confirm_calls(), confirms);
        assert_eq!(wallet_api.orders_for_customer("cust-1").await.unwrap().len(), 1);
        info!("🧪️ order checkout test complete");
    });
}

#[test]
fn wallet_topup_credits_balance_once() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async move {
        let url = random_db_path();
        let (api, _gateway, db) = new_api(&url).await;

        let checkout = api.begin_topup("user-7", Money::from_units(80)).await.unwrap();
        let outcome = api.handle_callback(&checkout.correlation_id, OutcomeHint::Success).await.unwrap();
        assert_eq!(outcome.intent.status, IntentStatus::Completed);
        assert_eq!(outcome.redirect, "/account/wallet?status=success");

        let wallet_api = WalletApi::new(db);
        let account = wallet_api.balance("user-7").await.unwrap().expect("wallet should be provisioned");
        assert_eq!(account.balance, Money::from_units(80));
        let history = wallet_api.history("user-7").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].direction, EntryDirection::Credit);
        assert_eq!(history[0].amount, Money::from_units(80));

        // A replay must not credit twice.
        api.handle_callback(&checkout.correlation_id, OutcomeHint::Success).await.unwrap();
        let account = wallet_api.balance("user-7").await.unwrap().unwrap();
        assert_eq!(account.balance, Money::from_units(80));
        assert_eq!(wallet_api.history("user-7").await.unwrap().len(), 1);
    });
}

#[test]
fn reseller_onboarding_provisions_store() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async move {
        let url = random_db_path();
        let (api, _gateway, db) = new_api(&url).await;

        let request = OnboardingRequest {
            email: "owner@gempalace.example".into(),
            name: "Owner".into(),
            business_name: "Gem Palace!".into(),
            password: gsp_common::Secret::new("hunter2".to_string()),
            onboarding_fee: Money::from_units(500),
        };
        let checkout = api.begin_onboarding("user-9", request).await.unwrap();
        // The persisted payload carries a hash, never the plaintext.
        assert!(!checkout.intent.payload.contains("hunter2"));

        let outcome = api.handle_callback(&checkout.correlation_id, OutcomeHint::Success).await.unwrap();
        assert_eq!(outcome.intent.status, IntentStatus::Completed);

        let wallet_api = WalletApi::new(db.clone());
        let (reseller, store) = wallet_api.reseller("owner@gempalace.example").await.unwrap().unwrap();
        // A paid application is not an approved one. The account waits for review.
        assert_eq!(reseller.status, ResellerStatus::Pending);
        assert!(settlement_engine::helpers::verify_password("hunter2", &reseller.password_hash).unwrap());
        let store = store.expect("store should be provisioned with the reseller");
        assert_eq!(store.subdomain, "gem-palace");
        assert_eq!(outcome.redirect, "/resellers/onboarding/success");

        // Both the applicant and the operators were notified.
        let welcome = db.fetch_notifications("owner@gempalace.example").await.unwrap();
        assert_eq!(welcome.len(), 1);
        assert_eq!(welcome[0].kind, "reseller_onboarded");
        let admin = db.fetch_notifications("admin").await.unwrap();
        assert_eq!(admin.len(), 1);
        assert_eq!(admin[0].kind, "reseller_application");
    });
}

#[test]
fn declined_confirmation_is_terminal_failure() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async move {
        let url = random_db_path();
        let (api, gateway, db) = new_api(&url).await;

        let checkout = api.begin_topup("user-2", Money::from_units(10)).await.unwrap();
        gateway.script_confirm(ConfirmBehaviour::Declined("DECLINED".into()));
        let outcome = api.handle_callback(&checkout.correlation_id, OutcomeHint::Success).await.unwrap();
        assert_eq!(outcome.intent.status, IntentStatus::Failed);
        assert_eq!(outcome.intent.failure_reason.as_deref(), Some("Gateway reported status 'DECLINED'"));
        assert_eq!(outcome.redirect, "/account/wallet?status=failed");
        assert!(WalletApi::new(db.clone()).balance("user-2").await.unwrap().is_none());

        // A later success hint cannot resurrect a failed intent.
        gateway.script_confirm(ConfirmBehaviour::Confirmed);
        let confirms = gateway.confirm_calls();
        let replay = api.handle_callback(&checkout.correlation_id, OutcomeHint::Success).await.unwrap();
        assert_eq!(replay.intent.status, IntentStatus::Failed);
        assert_eq!(gateway.confirm_calls(), confirms);
        assert!(WalletApi::new(db).balance("user-2").await.unwrap().is_none());
    });
}

#[test]
fn failure_and_cancel_hints_skip_the_gateway() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async move {
        let url = random_db_path();
        let (api, gateway, db) = new_api(&url).await;

        let checkout = api.begin_topup("user-3", Money::from_units(10)).await.unwrap();
        let outcome = api.handle_callback(&checkout.correlation_id, OutcomeHint::Failure).await.unwrap();
        assert_eq!(outcome.intent.status, IntentStatus::Failed);
        assert_eq!(gateway.confirm_calls(), 0);

        let checkout = api.begin_topup("user-3", Money::from_units(10)).await.unwrap();
        let outcome = api.handle_callback(&checkout.correlation_id, OutcomeHint::Cancel).await.unwrap();
        assert_eq!(outcome.intent.status, IntentStatus::Cancelled);
        assert_eq!(outcome.redirect, "/account/wallet?status=cancelled");
        assert_eq!(gateway.confirm_calls(), 0);

        // Neither outcome touched the wallet: no account, no ledger entries.
        let wallet_api = WalletApi::new(db);
        assert!(wallet_api.balance("user-3").await.unwrap().is_none());
        assert!(wallet_api.history("user-3").await.unwrap().is_empty());
    });
}

#[test]
fn racing_success_callbacks_fulfill_exactly_once() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async move {
        let url = random_db_path();
        let (api, _gateway, db) = new_api(&url).await;
        db.save_cart("cust-race", &test_cart()).await.unwrap();
        let checkout = api.begin_checkout("cust-race").await.unwrap();

        // Two dispatchers settle the same pending intent at once. The loser's fulfillment
        // transaction rolls back on the guarded status flip and reports the winner's outcome.
        let (first, second) = tokio::join!(
            api.handle_callback(&checkout.correlation_id, OutcomeHint::Success),
            api.handle_callback(&checkout.correlation_id, OutcomeHint::Success),
        );
        let first = first.unwrap();
        let second = second.unwrap();
        assert_eq!(first.intent.status, IntentStatus::Completed);
        assert_eq!(second.intent.status, IntentStatus::Completed);
        assert_eq!(first.redirect, second.redirect);
        assert_eq!(first.intent.result_id, second.intent.result_id);

        let orders = WalletApi::new(db.clone()).orders_for_customer("cust-race").await.unwrap();
        assert_eq!(orders.len(), 1);
        assert!(db.fetch_cart("cust-race").await.unwrap().is_none());
    });
}

#[test]
fn gateway_outage_leaves_intent_pending_for_retry() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async move {
        let url = random_db_path();
        let (api, gateway, db) = new_api(&url).await;

        let checkout = api.begin_topup("user-4", Money::from_units(25)).await.unwrap();
        gateway.script_confirm(ConfirmBehaviour::Error(
            settlement_engine::traits::GatewayError::Network("connection reset".into()),
        ));
        let err = api.handle_callback(&checkout.correlation_id, OutcomeHint::Success).await.unwrap_err();
        assert!(matches!(err, SettlementApiError::Gateway(_)));

        // Nothing was finalized; the retried callback settles the intent.
        let intent = db.fetch_intent(&checkout.correlation_id).await.unwrap();
        assert_eq!(intent.status, IntentStatus::Pending);
        gateway.script_confirm(ConfirmBehaviour::Confirmed);
        let outcome = api.handle_callback(&checkout.correlation_id, OutcomeHint::Success).await.unwrap();
        assert_eq!(outcome.intent.status, IntentStatus::Completed);
        let account = WalletApi::new(db).balance("user-4").await.unwrap().unwrap();
        assert_eq!(account.balance, Money::from_units(25));
    });
}

#[test]
fn handler_failure_rolls_back_and_intent_stays_pending() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async move {
        let url = random_db_path();
        let (api, _gateway, db) = new_api(&url).await;

        let request = |fee: i64| OnboardingRequest {
            email: "dup@example.com".into(),
            name: "First".into(),
            business_name: "Dup Store".into(),
            password: gsp_common::Secret::new("pw-one".to_string()),
            onboarding_fee: Money::from_units(fee),
        };
        let first = api.begin_onboarding("user-a", request(500)).await.unwrap();
        api.handle_callback(&first.correlation_id, OutcomeHint::Success).await.unwrap();

        // A second confirmed intent for the same email hits the unique constraint in the handler.
        // The whole fulfillment transaction rolls back and the intent stays Pending.
        let second = api.begin_onboarding("user-b", request(500)).await.unwrap();
        let err = api.handle_callback(&second.correlation_id, OutcomeHint::Success).await.unwrap_err();
        assert!(matches!(
            err,
            SettlementApiError::Settlement(settlement_engine::traits::SettlementError::ResellerAlreadyExists(_))
        ));
        let intent = db.fetch_intent(&second.correlation_id).await.unwrap();
        assert_eq!(intent.status, IntentStatus::Pending);
        assert!(intent.result_id.is_none());
    });
}

#[test]
fn invalid_payloads_never_reach_the_gateway() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async move {
        let url = random_db_path();
        let (api, gateway, _db) = new_api(&url).await;

        let err = api.begin_topup("user-5", Money::from_cents(0)).await.unwrap_err();
        assert!(matches!(err, SettlementApiError::Validation(_)));

        let err = api.begin_checkout("no-cart-customer").await.unwrap_err();
        assert!(matches!(err, SettlementApiError::EmptyCart(_)));

        assert_eq!(gateway.open_calls(), 0);
    });
}

#[test]
fn gateway_open_failure_persists_no_intent() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async move {
        let url = random_db_path();
        let (api, gateway, db) = new_api(&url).await;
        gateway.fail_open(settlement_engine::traits::GatewayError::Network("refused".into()));

        let err = api.begin_topup("user-6", Money::from_units(10)).await.unwrap_err();
        assert!(matches!(err, SettlementApiError::Gateway(_)));
        assert_eq!(gateway.open_calls(), 1);
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM payment_intents").fetch_one(db.pool()).await.unwrap();
        assert_eq!(count, 0);
    });
}
