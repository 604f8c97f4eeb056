use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use gsp_common::Money;
use log::error;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

use crate::payloads::IntentPayload;

#[derive(Debug, Clone, Error)]
#[error("Invalid status value: {0}")]
pub struct ConversionError(String);

//--------------------------------------      Purpose       ----------------------------------------------------------
/// The domain reason for a payment. The purpose determines which fulfillment handler applies to a
/// confirmed intent; dispatch on it is exhaustive via [`IntentPayload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Purpose {
    #[sqlx(rename = "order")]
    Order,
    #[sqlx(rename = "wallet_topup")]
    WalletTopup,
    #[sqlx(rename = "reseller_onboarding")]
    ResellerOnboarding,
}

impl Display for Purpose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Purpose::Order => write!(f, "order"),
            Purpose::WalletTopup => write!(f, "wallet_topup"),
            Purpose::ResellerOnboarding => write!(f, "reseller_onboarding"),
        }
    }
}

impl FromStr for Purpose {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "order" => Ok(Self::Order),
            "wallet_topup" => Ok(Self::WalletTopup),
            "reseller_onboarding" => Ok(Self::ResellerOnboarding),
            s => Err(ConversionError(format!("Invalid purpose: {s}"))),
        }
    }
}

//--------------------------------------    IntentStatus     ---------------------------------------------------------
/// The settlement state of a payment intent. `Pending` is the only non-terminal state; transitions
/// out of a terminal state never happen (the store guards every terminal write with a
/// `status = 'Pending'` predicate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum IntentStatus {
    /// The intent has been opened at the gateway and no callback has settled it yet.
    Pending,
    /// The charge was confirmed and exactly one fulfillment transaction has been committed.
    Completed,
    /// The gateway declined or could not confirm the charge.
    Failed,
    /// The shopper abandoned the payment.
    Cancelled,
}

impl IntentStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, IntentStatus::Pending)
    }
}

impl Display for IntentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntentStatus::Pending => write!(f, "Pending"),
            IntentStatus::Completed => write!(f, "Completed"),
            IntentStatus::Failed => write!(f, "Failed"),
            IntentStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl FromStr for IntentStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Completed" => Ok(Self::Completed),
            "Failed" => Ok(Self::Failed),
            "Cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid intent status: {s}"))),
        }
    }
}

impl From<String> for IntentStatus {
    fn from(value: String) -> Self {
        value.parse().unwrap_or_else(|_| {
            error!("Invalid intent status: {value}. But this conversion cannot fail. Defaulting to Pending");
            IntentStatus::Pending
        })
    }
}

//--------------------------------------    OutcomeHint      ---------------------------------------------------------
/// The outcome reported by the redirect/webhook. A hint is never trusted on its own; the success
/// path re-confirms against the gateway before any durable write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeHint {
    Success,
    Failure,
    Cancel,
}

impl FromStr for OutcomeHint {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "success" => Ok(Self::Success),
            "failure" | "failed" => Ok(Self::Failure),
            "cancel" | "cancelled" => Ok(Self::Cancel),
            s => Err(ConversionError(format!("Invalid outcome hint: {s}"))),
        }
    }
}

//--------------------------------------   PaymentIntent     ---------------------------------------------------------
/// The durable record of one attempted charge and its purpose-specific payload.
///
/// Created by the initializer in `Pending` state; mutated only by the callback dispatcher; never
/// deleted. The payload embeds everything a handler needs, so the dispatcher stays stateless with
/// respect to upstream carts that may have mutated since checkout began.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PaymentIntent {
    pub id: i64,
    /// Our correlation id, handed to the gateway when the payment was opened.
    pub correlation_id: String,
    /// The gateway's id for the payment, assigned when the payment was opened.
    pub external_id: Option<String>,
    pub user_id: String,
    pub amount: Money,
    pub currency: String,
    pub purpose: Purpose,
    /// JSON-serialized [`IntentPayload`]; decode with [`PaymentIntent::payload`].
    pub payload: String,
    pub status: IntentStatus,
    /// The gateway transaction id, set when the intent completes.
    pub transaction_id: Option<String>,
    /// The id of the entity the fulfillment handler created (order / wallet account / reseller).
    pub result_id: Option<i64>,
    pub failure_reason: Option<String>,
    pub finalized_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PaymentIntent {
    pub fn payload(&self) -> Result<IntentPayload, serde_json::Error> {
        serde_json::from_str(&self.payload)
    }
}

//--------------------------------------  NewPaymentIntent   ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct NewPaymentIntent {
    pub correlation_id: String,
    pub external_id: String,
    pub user_id: String,
    pub amount: Money,
    pub currency: String,
    pub purpose: Purpose,
    pub payload: String,
}

//-------------------------------------- FulfillmentStatus   ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum FulfillmentStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
    Refunded,
}

impl Display for FulfillmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FulfillmentStatus::Pending => write!(f, "Pending"),
            FulfillmentStatus::Processing => write!(f, "Processing"),
            FulfillmentStatus::Completed => write!(f, "Completed"),
            FulfillmentStatus::Failed => write!(f, "Failed"),
            FulfillmentStatus::Cancelled => write!(f, "Cancelled"),
            FulfillmentStatus::Refunded => write!(f, "Refunded"),
        }
    }
}

//--------------------------------------   PaymentStatus     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum PaymentStatus {
    Pending,
    Paid,
    Failed,
    Cancelled,
    Refunded,
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "Pending"),
            PaymentStatus::Paid => write!(f, "Paid"),
            PaymentStatus::Failed => write!(f, "Failed"),
            PaymentStatus::Cancelled => write!(f, "Cancelled"),
            PaymentStatus::Refunded => write!(f, "Refunded"),
        }
    }
}

//--------------------------------------        Order        ---------------------------------------------------------
/// A storefront order. Created only as a side effect of a successfully fulfilled `order` intent;
/// its total is the sum of the snapshotted line items at capture time, never a live cart re-read.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    /// Human-readable order number, `ORD{yy}{mm}{dd}{seq:04}` from a daily sequence.
    pub order_number: String,
    pub customer_id: String,
    pub intent_id: i64,
    pub total: Money,
    pub currency: String,
    pub fulfillment_status: FulfillmentStatus,
    pub payment_status: PaymentStatus,
    /// The gateway receipt: transaction id of the confirmed charge.
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: String,
    pub title: String,
    pub variant: Option<String>,
    pub quantity: i64,
    pub unit_price: Money,
    pub subtotal: Money,
}

//--------------------------------------        Cart         ---------------------------------------------------------
/// Transient pre-checkout state, owned by exactly one customer. Deleted (not archived) the moment
/// its contents are converted into an order.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Cart {
    pub id: i64,
    pub customer_id: String,
    /// JSON-serialized [`crate::payloads::CartSnapshot`].
    pub items: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    pub fn snapshot(&self) -> Result<crate::payloads::CartSnapshot, serde_json::Error> {
        serde_json::from_str(&self.items)
    }
}

//--------------------------------------   EntryDirection    ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum EntryDirection {
    Credit,
    Debit,
}

impl Display for EntryDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryDirection::Credit => write!(f, "Credit"),
            EntryDirection::Debit => write!(f, "Debit"),
        }
    }
}

//--------------------------------------    EntryStatus      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum EntryStatus {
    Pending,
    Completed,
}

//--------------------------------------   WalletAccount     ---------------------------------------------------------
/// A user's wallet. The balance is always equal to the signed sum of the account's completed
/// ledger entries; balance and entry are written together in one transaction, never separately.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct WalletAccount {
    pub id: i64,
    pub user_id: String,
    pub balance: Money,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One immutable, append-only record of a wallet balance change.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: i64,
    pub account_id: i64,
    pub direction: EntryDirection,
    pub amount: Money,
    pub description: String,
    pub status: EntryStatus,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// The entry's contribution to the balance: positive for credits, negative for debits.
    pub fn signed_amount(&self) -> Money {
        match self.direction {
            EntryDirection::Credit => self.amount,
            EntryDirection::Debit => -self.amount,
        }
    }
}

//-------------------------------------- RedeemCodeStatus    ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum RedeemCodeStatus {
    Active,
    Used,
    Expired,
}

impl Display for RedeemCodeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RedeemCodeStatus::Active => write!(f, "Active"),
            RedeemCodeStatus::Used => write!(f, "Used"),
            RedeemCodeStatus::Expired => write!(f, "Expired"),
        }
    }
}

//--------------------------------------     RedeemCode      ---------------------------------------------------------
/// A prepaid-value token, redeemable exactly once for wallet credit. Consumption is a one-way
/// status transition gated by expiry; consuming a used or expired code fails loudly.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct RedeemCode {
    pub id: i64,
    pub code: String,
    pub amount: Money,
    pub currency: String,
    pub status: RedeemCodeStatus,
    pub expires_at: DateTime<Utc>,
    /// The order that minted this code, if it was purchased.
    pub order_id: Option<i64>,
    /// The user who consumed the code, once redeemed.
    pub redeemed_by: Option<String>,
    pub redeemed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------   ResellerStatus    ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
pub enum ResellerStatus {
    Pending,
    Active,
    Suspended,
}

impl Display for ResellerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResellerStatus::Pending => write!(f, "Pending"),
            ResellerStatus::Active => write!(f, "Active"),
            ResellerStatus::Suspended => write!(f, "Suspended"),
        }
    }
}

//--------------------------------------      Reseller       ---------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Reseller {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub business_name: String,
    /// Argon2 hash. Never serialized into responses.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub status: ResellerStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The companion sub-store provisioned for a reseller during onboarding.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct StoreRecord {
    pub id: i64,
    pub reseller_id: i64,
    pub subdomain: String,
    /// Markup bounds in basis points applied to the parent catalog's prices.
    pub markup_min: i64,
    pub markup_max: i64,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------    Notification     ---------------------------------------------------------
/// A queued notification request. Delivery mechanics are out of scope; the engine only records
/// recipient, content and metadata.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub recipient: String,
    pub title: String,
    pub message: String,
    pub kind: String,
    pub metadata: Option<String>,
    pub created_at: DateTime<Utc>,
}

//--------------------------------------   RedeemReceipt     ---------------------------------------------------------
/// The result of a successful code redemption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedeemReceipt {
    pub account_id: i64,
    pub credited: Money,
    pub new_balance: Money,
}
