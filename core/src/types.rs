//! Request and response records for the rewards API.
//!
//! # Design
//! Each POST operation has its own request struct whose serialized form is
//! exactly the payload the provider expects — the structs are what gets
//! schema-checked before transmission. Response DTOs mirror the sandbox's
//! envelope contents but are defined independently of the mock-server crate;
//! integration tests catch any drift between the two.
//!
//! Monetary amounts are integers in cents throughout.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

/// Payload for `POST /raas/v1/accounts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccount {
    pub customer: String,
    pub identifier: String,
    pub email: String,
}

/// Payload for `POST /raas/v1/cc_register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterCreditCard {
    pub customer: String,
    pub account_identifier: String,
    pub client_ip: String,
    pub credit_card: CreditCard,
}

/// Card data nested under `credit_card` in a registration payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditCard {
    pub number: String,
    /// `MM/YYYY`.
    pub expiration: String,
    pub security_code: String,
}

/// Payload for `POST /raas/v1/cc_fund`. `client_ip` appears exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundAccount {
    pub customer: String,
    pub account_identifier: String,
    pub client_ip: String,
    pub amount: i64,
    pub security_code: String,
    pub cc_token: String,
}

/// Payload for `POST /raas/v1/orders`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrder {
    pub customer: String,
    pub account_identifier: String,
    pub recipient: Recipient,
    pub sku: String,
    pub amount: i64,
    pub reward_message: String,
    pub reward_subject: String,
    pub reward_from: String,
}

/// Order recipient, serialized nested as `{"name": ..., "email": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recipient {
    pub name: String,
    pub email: String,
}

// ---------------------------------------------------------------------------
// Response data
// ---------------------------------------------------------------------------

/// A platform account, as returned under the envelope's `account` field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub customer: String,
    pub identifier: String,
    pub email: String,
    #[serde(default)]
    pub available_balance: i64,
}

/// One brand in the reward catalog, with its purchasable rewards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Brand {
    pub description: String,
    pub rewards: Vec<Reward>,
}

/// A purchasable reward SKU.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reward {
    pub sku: String,
    pub description: String,
    pub unit_price: i64,
    pub currency_type: String,
    #[serde(default)]
    pub available: bool,
}

/// Result of a card registration. The token funds the account later.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardRegistration {
    pub cc_token: String,
}

/// Result of funding an account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FundingReceipt {
    pub fund_id: String,
    pub amount: i64,
}

/// Order confirmation, as returned under the envelope's `order` field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Order {
    pub order_id: String,
    pub customer: String,
    pub account_identifier: String,
    pub recipient: Recipient,
    pub sku: String,
    pub amount: i64,
}
