//! In-memory simulation of the rewards provider's sandbox API.
//!
//! Mirrors the envelope conventions the client depends on: every response is
//! a JSON object with a boolean `success`, failures carry an
//! `error_message`, and every route demands a basic-auth `Authorization`
//! header. Accounts, registered cards, and balances live in process memory.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize)]
pub struct Account {
    pub customer: String,
    pub identifier: String,
    pub email: String,
    pub available_balance: i64,
}

#[derive(Deserialize)]
pub struct CreateAccount {
    pub customer: String,
    pub identifier: String,
    pub email: String,
}

#[derive(Deserialize)]
pub struct CreditCard {
    pub number: String,
    pub expiration: String,
    pub security_code: String,
}

#[derive(Deserialize)]
pub struct RegisterCreditCard {
    pub customer: String,
    pub account_identifier: String,
    pub client_ip: String,
    pub credit_card: CreditCard,
}

#[derive(Deserialize)]
pub struct FundAccount {
    pub customer: String,
    pub account_identifier: String,
    pub client_ip: String,
    pub amount: i64,
    pub security_code: String,
    pub cc_token: String,
}

#[derive(Deserialize)]
pub struct Recipient {
    pub name: String,
    pub email: String,
}

#[derive(Deserialize)]
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

/// Accounts keyed by (customer, identifier); cards map a token back to the
/// account they were registered against.
#[derive(Default)]
pub struct Store {
    accounts: HashMap<(String, String), Account>,
    cards: HashMap<String, (String, String)>,
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/raas/v1/accounts", post(create_account))
        .route("/raas/v1/accounts/{customer}/{identifier}", get(get_account))
        .route("/raas/v1/rewards", get(get_rewards))
        .route("/raas/v1/cc_register", post(register_credit_card))
        .route("/raas/v1/cc_fund", post(fund_account))
        .route("/raas/v1/orders", post(create_order))
        .layer(middleware::from_fn(require_basic_auth))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Failure envelope: `success: false` plus a human-readable message.
fn failure(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"success": false, "error_message": message}))).into_response()
}

/// The sandbox accepts any credentials but insists on the header.
async fn require_basic_auth(request: Request, next: Next) -> Response {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.len() > "Basic ".len() && value.starts_with("Basic "));
    if authorized {
        next.run(request).await
    } else {
        failure(StatusCode::UNAUTHORIZED, "basic authentication required")
    }
}

async fn create_account(
    State(db): State<Db>,
    Json(input): Json<CreateAccount>,
) -> Response {
    let mut store = db.write().await;
    let key = (input.customer.clone(), input.identifier.clone());
    if store.accounts.contains_key(&key) {
        return failure(StatusCode::CONFLICT, "account already exists");
    }
    let account = Account {
        customer: input.customer,
        identifier: input.identifier,
        email: input.email,
        available_balance: 0,
    };
    store.accounts.insert(key, account.clone());
    (
        StatusCode::CREATED,
        Json(json!({"success": true, "account": account})),
    )
        .into_response()
}

async fn get_account(
    State(db): State<Db>,
    Path((customer, identifier)): Path<(String, String)>,
) -> Response {
    let store = db.read().await;
    match store.accounts.get(&(customer, identifier)) {
        Some(account) => Json(json!({"success": true, "account": account})).into_response(),
        None => failure(StatusCode::NOT_FOUND, "no such account"),
    }
}

async fn get_rewards() -> Response {
    Json(json!({
        "success": true,
        "brands": [
            {
                "description": "Acme Gift Cards",
                "rewards": [
                    {
                        "sku": "ACME-500",
                        "description": "Acme $5 gift card",
                        "unit_price": 500,
                        "currency_type": "USD",
                        "available": true
                    },
                    {
                        "sku": "ACME-2500",
                        "description": "Acme $25 gift card",
                        "unit_price": 2500,
                        "currency_type": "USD",
                        "available": true
                    }
                ]
            },
            {
                "description": "Globex Rewards",
                "rewards": [
                    {
                        "sku": "GLOBEX-1000",
                        "description": "Globex $10 voucher",
                        "unit_price": 1000,
                        "currency_type": "USD",
                        "available": true
                    }
                ]
            }
        ]
    }))
    .into_response()
}

async fn register_credit_card(
    State(db): State<Db>,
    Json(input): Json<RegisterCreditCard>,
) -> Response {
    let mut store = db.write().await;
    let key = (input.customer.clone(), input.account_identifier.clone());
    if !store.accounts.contains_key(&key) {
        return failure(StatusCode::NOT_FOUND, "no such account");
    }
    if !input.credit_card.number.chars().all(|c| c.is_ascii_digit()) {
        return failure(StatusCode::UNPROCESSABLE_ENTITY, "invalid card number");
    }
    let cc_token = format!("cc-{}", Uuid::new_v4());
    store.cards.insert(cc_token.clone(), key);
    Json(json!({"success": true, "cc_token": cc_token})).into_response()
}

async fn fund_account(State(db): State<Db>, Json(input): Json<FundAccount>) -> Response {
    let mut store = db.write().await;
    let key = (input.customer.clone(), input.account_identifier.clone());
    match store.cards.get(&input.cc_token) {
        None => return failure(StatusCode::NOT_FOUND, "unknown cc_token"),
        Some(owner) if *owner != key => {
            return failure(
                StatusCode::UNPROCESSABLE_ENTITY,
                "cc_token does not belong to this account",
            );
        }
        Some(_) => {}
    }
    if input.amount < 1 {
        return failure(StatusCode::UNPROCESSABLE_ENTITY, "amount must be positive");
    }
    let Some(account) = store.accounts.get_mut(&key) else {
        return failure(StatusCode::NOT_FOUND, "no such account");
    };
    account.available_balance += input.amount;
    Json(json!({
        "success": true,
        "fund_id": format!("fund-{}", Uuid::new_v4()),
        "amount": input.amount
    }))
    .into_response()
}

async fn create_order(State(db): State<Db>, Json(input): Json<CreateOrder>) -> Response {
    let mut store = db.write().await;
    let key = (input.customer.clone(), input.account_identifier.clone());
    let Some(account) = store.accounts.get_mut(&key) else {
        return failure(StatusCode::NOT_FOUND, "no such account");
    };
    if account.available_balance < input.amount {
        return failure(StatusCode::BAD_REQUEST, "insufficient funds");
    }
    account.available_balance -= input.amount;
    (
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "order": {
                "order_id": format!("order-{}", Uuid::new_v4()),
                "customer": input.customer,
                "account_identifier": input.account_identifier,
                "recipient": {
                    "name": input.recipient.name,
                    "email": input.recipient.email
                },
                "sku": input.sku,
                "amount": input.amount
            }
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_serializes_with_balance() {
        let account = Account {
            customer: "acme".to_string(),
            identifier: "u1".to_string(),
            email: "a@b.com".to_string(),
            available_balance: 500,
        };
        let value = serde_json::to_value(&account).unwrap();
        assert_eq!(value["available_balance"], 500);
        assert_eq!(value["customer"], "acme");
    }
}
