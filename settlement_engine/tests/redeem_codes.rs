//! Redeem code lifecycle: minted at order fulfillment, consumed exactly once, expiry enforced.
use gsp_common::Money;
use settlement_engine::{
    db_types::*,
    payloads::{CartLine, CartSnapshot, PrepaidCodeSpec},
    test_utils::{prepare_test_env, random_db_path, MockGateway},
    SettlementApi,
    SettlementApiError,
    SettlementDatabase,
    SqliteDatabase,
    WalletApi,
};
use tokio::runtime::Runtime;

fn prepaid_cart(quantity: u32) -> serde_json::Value {
    serde_json::to_value(CartSnapshot {
        lines: vec![CartLine {
            product_id: "gift-100".into(),
            title: "100 gift card".into(),
            variant: None,
            quantity,
            unit_price: Money::from_units(100),
            prepaid_code: Some(PrepaidCodeSpec { value: Money::from_units(100), validity_days: 90 }),
        }],
    })
    .unwrap()
}

async fn new_api(url: &str) -> (SettlementApi<SqliteDatabase, MockGateway>, SqliteDatabase) {
    prepare_test_env(url).await;
    let db = SqliteDatabase::new_with_url(url, 5).await.expect("Error creating database");
    (SettlementApi::new(db.clone(), MockGateway::new()), db)
}

async fn codes_for_order(db: &SqliteDatabase, order_id: i64) -> Vec<String> {
    let rows: Vec<(String,)> = sqlx::query_as("SELECT code FROM redeem_codes WHERE order_id = $1 ORDER BY id")
        .bind(order_id)
        .fetch_all(db.pool())
        .await
        .unwrap();
    rows.into_iter().map(|(c,)| c).collect()
}

#[test]
fn purchased_codes_are_minted_and_redeem_once() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async move {
        let url = random_db_path();
        let (api, db) = new_api(&url).await;
        db.save_cart("buyer", &prepaid_cart(2)).await.unwrap();
        let checkout = api.begin_checkout("buyer").await.unwrap();
        let outcome = api.handle_callback(&checkout.correlation_id, OutcomeHint::Success).await.unwrap();
        let order_id = outcome.intent.result_id.unwrap();

        // One code per purchased unit, all active and linked to the order.
        let codes = codes_for_order(&db, order_id).await;
        assert_eq!(codes.len(), 2);
        let wallet_api = WalletApi::new(db.clone());
        for code in &codes {
            let record = wallet_api.redeem_code(code).await.unwrap().unwrap();
            assert_eq!(record.status, RedeemCodeStatus::Active);
            assert_eq!(record.amount, Money::from_units(100));
            assert!(code.starts_with("GSP-"));
        }

        // A friend redeems one of them.
        let receipt = api.redeem(&codes[0], "friend").await.unwrap();
        assert_eq!(receipt.credited, Money::from_units(100));
        assert_eq!(receipt.new_balance, Money::from_units(100));
        let record = wallet_api.redeem_code(&codes[0]).await.unwrap().unwrap();
        assert_eq!(record.status, RedeemCodeStatus::Used);
        assert_eq!(record.redeemed_by.as_deref(), Some("friend"));

        // The same code cannot be consumed again, by anyone.
        for user in ["friend", "stranger"] {
            let err = api.redeem(&codes[0], user).await.unwrap_err();
            assert!(matches!(
                err,
                SettlementApiError::Settlement(settlement_engine::traits::SettlementError::CodeNotRedeemable(_, _))
            ));
        }
        let account = wallet_api.balance("friend").await.unwrap().unwrap();
        assert_eq!(account.balance, Money::from_units(100));

        // The second code is untouched and still redeemable.
        let receipt = api.redeem(&codes[1], "friend").await.unwrap();
        assert_eq!(receipt.new_balance, Money::from_units(200));
    });
}

#[test]
fn unknown_and_expired_codes_are_refused() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async move {
        let url = random_db_path();
        let (api, db) = new_api(&url).await;

        let err = api.redeem("GSP-NOPE-NOPE-NOPE", "user").await.unwrap_err();
        assert!(matches!(
            err,
            SettlementApiError::Settlement(settlement_engine::traits::SettlementError::CodeNotFound(_))
        ));

        // An active code whose expiry has passed flips to Expired and credits nothing.
        sqlx::query(
            "INSERT INTO redeem_codes (code, amount, currency, status, expires_at)
             VALUES ('GSP-OLDC-OLDC-OLDC', 5000, 'SAR', 'Active', '2020-01-01 00:00:00')",
        )
        .execute(db.pool())
        .await
        .unwrap();
        let err = api.redeem("GSP-OLDC-OLDC-OLDC", "user").await.unwrap_err();
        assert!(matches!(
            err,
            SettlementApiError::Settlement(settlement_engine::traits::SettlementError::CodeNotRedeemable(_, _))
        ));
        let record = WalletApi::new(db.clone()).redeem_code("GSP-OLDC-OLDC-OLDC").await.unwrap().unwrap();
        assert_eq!(record.status, RedeemCodeStatus::Expired);
        assert!(WalletApi::new(db).balance("user").await.unwrap().is_none());
    });
}

#[test]
fn balance_always_equals_signed_sum_of_entries() {
    let sys = Runtime::new().unwrap();
    sys.block_on(async move {
        let url = random_db_path();
        let (api, db) = new_api(&url).await;

        let checkout = api.begin_topup("saver", Money::from_units(30)).await.unwrap();
        api.handle_callback(&checkout.correlation_id, OutcomeHint::Success).await.unwrap();
        let checkout = api.begin_topup("saver", Money::from_units(12)).await.unwrap();
        api.handle_callback(&checkout.correlation_id, OutcomeHint::Success).await.unwrap();

        let wallet_api = WalletApi::new(db);
        let account = wallet_api.balance("saver").await.unwrap().unwrap();
        let history = wallet_api.history("saver").await.unwrap();
        let signed_sum: Money = history.iter().map(LedgerEntry::signed_amount).sum();
        assert_eq!(account.balance, signed_sum);
        assert_eq!(account.balance, Money::from_units(42));
    });
}
