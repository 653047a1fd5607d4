//! Schema-validated client for the rewards API.
//!
//! # Design
//! `RaasClient` holds the endpoint, the precomputed basic-auth header, the
//! schema registry, and the transport — all immutable after construction.
//! Each operation assembles a typed payload, validates it against its
//! registered schema (POST operations; a rejected payload never reaches the
//! network), performs exactly one blocking round trip, parses the JSON body,
//! and interprets the provider's `success` envelope. Single request per
//! call: no retries, no timeout override, no pagination.

use base64::Engine;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, UreqTransport};
use crate::schema::SchemaRegistry;
use crate::types::{
    Account, Brand, CardRegistration, CreateAccount, CreateOrder, CreditCard, FundAccount,
    FundingReceipt, Order, Recipient, RegisterCreditCard,
};

/// Fixed sandbox endpoint used by `RaasClient::new`.
pub const SANDBOX_ENDPOINT: &str = "https://sandbox.tangocard.com";

/// Synchronous client for the rewards API.
///
/// Credentials sign every request via HTTP basic authentication and are held
/// for the client's lifetime. Instances share no mutable state, so separate
/// instances may be used concurrently without coordination.
pub struct RaasClient {
    endpoint: String,
    auth_header: String,
    registry: SchemaRegistry,
    transport: Box<dyn HttpTransport>,
}

impl RaasClient {
    /// Client against the provider sandbox, with the bundled schema set and
    /// the ureq transport.
    pub fn new(username: &str, password: &str) -> Result<Self, ApiError> {
        Self::with_endpoint(SANDBOX_ENDPOINT, username, password)
    }

    /// Same as `new`, but against a custom endpoint.
    pub fn with_endpoint(endpoint: &str, username: &str, password: &str) -> Result<Self, ApiError> {
        Ok(Self::with_parts(
            endpoint,
            username,
            password,
            SchemaRegistry::bundled()?,
            Box::new(UreqTransport::new()),
        ))
    }

    /// Fully explicit construction: caller supplies the registry and the
    /// transport. This is also the seam unit tests use to spy on requests.
    pub fn with_parts(
        endpoint: &str,
        username: &str,
        password: &str,
        registry: SchemaRegistry,
        transport: Box<dyn HttpTransport>,
    ) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            auth_header: basic_auth_header(username, password),
            registry,
            transport,
        }
    }

    /// Create a platform account. Returns the created account.
    pub fn create_account(
        &self,
        customer: &str,
        identifier: &str,
        email: &str,
    ) -> Result<Account, ApiError> {
        let payload = CreateAccount {
            customer: customer.to_string(),
            identifier: identifier.to_string(),
            email: email.to_string(),
        };
        let envelope = self.post_json("/raas/v1/accounts", "account_create", &payload)?;
        take_field(envelope, "account")
    }

    /// Look up an existing account. No payload, no schema validation.
    pub fn get_account(&self, customer: &str, identifier: &str) -> Result<Account, ApiError> {
        let envelope = self.get_json(&format!("/raas/v1/accounts/{customer}/{identifier}"))?;
        take_field(envelope, "account")
    }

    /// Fetch the reward catalog.
    pub fn get_rewards(&self) -> Result<Vec<Brand>, ApiError> {
        let envelope = self.get_json("/raas/v1/rewards")?;
        take_field(envelope, "brands")
    }

    /// Register a credit card against an account. The returned token is what
    /// `fund_account` charges later.
    pub fn register_credit_card(
        &self,
        customer: &str,
        identifier: &str,
        client_ip: &str,
        credit_card: CreditCard,
    ) -> Result<CardRegistration, ApiError> {
        let payload = RegisterCreditCard {
            customer: customer.to_string(),
            account_identifier: identifier.to_string(),
            client_ip: client_ip.to_string(),
            credit_card,
        };
        let envelope = self.post_json("/raas/v1/cc_register", "cc_register", &payload)?;
        from_envelope(envelope)
    }

    /// Fund an account from a registered card. `amount` is in cents.
    pub fn fund_account(
        &self,
        customer: &str,
        identifier: &str,
        amount: i64,
        client_ip: &str,
        security_code: &str,
        cc_token: &str,
    ) -> Result<FundingReceipt, ApiError> {
        let payload = FundAccount {
            customer: customer.to_string(),
            account_identifier: identifier.to_string(),
            client_ip: client_ip.to_string(),
            amount,
            security_code: security_code.to_string(),
            cc_token: cc_token.to_string(),
        };
        let envelope = self.post_json("/raas/v1/cc_fund", "cc_fund", &payload)?;
        from_envelope(envelope)
    }

    /// Place a reward order for a recipient. `amount` is in cents.
    #[allow(clippy::too_many_arguments)]
    pub fn place_order(
        &self,
        customer: &str,
        identifier: &str,
        recipient_name: &str,
        recipient_email: &str,
        sku: &str,
        amount: i64,
        reward_message: &str,
        reward_subject: &str,
        reward_from: &str,
    ) -> Result<Order, ApiError> {
        let payload = CreateOrder {
            customer: customer.to_string(),
            account_identifier: identifier.to_string(),
            recipient: Recipient {
                name: recipient_name.to_string(),
                email: recipient_email.to_string(),
            },
            sku: sku.to_string(),
            amount,
            reward_message: reward_message.to_string(),
            reward_subject: reward_subject.to_string(),
            reward_from: reward_from.to_string(),
        };
        let envelope = self.post_json("/raas/v1/orders", "order_create", &payload)?;
        take_field(envelope, "order")
    }

    /// Authenticated GET; parses the body and checks the envelope.
    fn get_json(&self, path: &str) -> Result<Value, ApiError> {
        tracing::debug!(path, "GET");
        let request = HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}{}", self.endpoint, path),
            headers: vec![("authorization".to_string(), self.auth_header.clone())],
            body: None,
        };
        let response = self.transport.execute(&request)?;
        let body = parse_json(&response)?;
        check_envelope(path, None, body)
    }

    /// Validates the payload against `schema`, then issues an authenticated
    /// POST; parses the body and checks the envelope with the payload
    /// attached for diagnostics.
    fn post_json<T: Serialize>(&self, path: &str, schema: &str, payload: &T) -> Result<Value, ApiError> {
        let payload = serde_json::to_value(payload)
            .map_err(|e| ApiError::Serialization(e.to_string()))?;
        self.registry.validate(schema, &payload)?;

        tracing::debug!(path, schema, "POST");
        let request = HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}{}", self.endpoint, path),
            headers: vec![
                ("authorization".to_string(), self.auth_header.clone()),
                ("content-type".to_string(), "application/json".to_string()),
            ],
            body: Some(payload.to_string()),
        };
        let response = self.transport.execute(&request)?;
        let body = parse_json(&response)?;
        check_envelope(path, Some(payload), body)
    }
}

impl std::fmt::Debug for RaasClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RaasClient")
            .field("endpoint", &self.endpoint)
            .field("registry", &self.registry)
            .finish()
    }
}

/// `Authorization` header value per RFC 7617.
fn basic_auth_header(username: &str, password: &str) -> String {
    let credentials =
        base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
    format!("Basic {credentials}")
}

fn parse_json(response: &HttpResponse) -> Result<Value, ApiError> {
    serde_json::from_str(&response.body)
        .map_err(|e| ApiError::Deserialization(format!("response is not JSON: {e}")))
}

/// Pass the envelope through unless its `success` field is missing or false.
fn check_envelope(uri: &str, payload: Option<Value>, body: Value) -> Result<Value, ApiError> {
    match body.get("success").and_then(Value::as_bool) {
        Some(true) => Ok(body),
        _ => Err(ApiError::Api {
            uri: uri.to_string(),
            payload,
            response: body,
        }),
    }
}

/// Deserialize one named field out of a success envelope.
fn take_field<T: DeserializeOwned>(mut envelope: Value, key: &str) -> Result<T, ApiError> {
    let value = envelope
        .get_mut(key)
        .map(Value::take)
        .ok_or_else(|| ApiError::Deserialization(format!("response missing '{key}' field")))?;
    serde_json::from_value(value).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Deserialize a result carried at the top level of a success envelope.
fn from_envelope<T: DeserializeOwned>(envelope: Value) -> Result<T, ApiError> {
    serde_json::from_value(envelope).map_err(|e| ApiError::Deserialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use super::*;

    const ENDPOINT: &str = "http://localhost:3000";

    /// Transport stand-in that records every request and answers each one
    /// with a canned body.
    #[derive(Clone)]
    struct SpyTransport {
        calls: Arc<Mutex<Vec<HttpRequest>>>,
        body: String,
    }

    impl SpyTransport {
        fn returning(body: Value) -> Self {
            Self {
                calls: Arc::new(Mutex::new(Vec::new())),
                body: body.to_string(),
            }
        }

        fn requests(&self) -> Vec<HttpRequest> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl HttpTransport for SpyTransport {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
            self.calls.lock().unwrap().push(request.clone());
            Ok(HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: self.body.clone(),
            })
        }
    }

    fn client_with(spy: &SpyTransport) -> RaasClient {
        RaasClient::with_parts(
            ENDPOINT,
            "sandbox-user",
            "sandbox-pass",
            SchemaRegistry::bundled().unwrap(),
            Box::new(spy.clone()),
        )
    }

    fn card() -> CreditCard {
        CreditCard {
            number: "4111111111111111".to_string(),
            expiration: "01/2030".to_string(),
            security_code: "123".to_string(),
        }
    }

    fn request_body(req: &HttpRequest) -> Value {
        serde_json::from_str(req.body.as_deref().unwrap()).unwrap()
    }

    #[test]
    fn create_account_returns_account_unchanged() {
        let spy = SpyTransport::returning(json!({
            "success": true,
            "account": {
                "customer": "acme", "identifier": "u1",
                "email": "a@b.com", "available_balance": 0
            }
        }));
        let account = client_with(&spy).create_account("acme", "u1", "a@b.com").unwrap();

        assert_eq!(account.customer, "acme");
        assert_eq!(account.identifier, "u1");
        assert_eq!(account.email, "a@b.com");
        assert_eq!(account.available_balance, 0);

        let requests = spy.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, HttpMethod::Post);
        assert_eq!(requests[0].path, format!("{ENDPOINT}/raas/v1/accounts"));
        assert_eq!(
            request_body(&requests[0]),
            json!({"customer": "acme", "identifier": "u1", "email": "a@b.com"})
        );
    }

    #[test]
    fn every_request_carries_basic_auth() {
        let expected = format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode("sandbox-user:sandbox-pass")
        );

        let spy = SpyTransport::returning(json!({"success": true, "brands": []}));
        client_with(&spy).get_rewards().unwrap();

        let spy_post = SpyTransport::returning(json!({
            "success": true,
            "account": {"customer": "acme", "identifier": "u1", "email": "a@b.com"}
        }));
        client_with(&spy_post).create_account("acme", "u1", "a@b.com").unwrap();

        for req in spy.requests().into_iter().chain(spy_post.requests()) {
            let auth = req
                .headers
                .iter()
                .find(|(name, _)| name == "authorization")
                .map(|(_, value)| value.clone());
            assert_eq!(auth.as_deref(), Some(expected.as_str()));
        }
    }

    #[test]
    fn get_account_issues_exact_path_with_no_body() {
        let spy = SpyTransport::returning(json!({
            "success": true,
            "account": {"customer": "acme", "identifier": "u1", "email": "a@b.com"}
        }));
        client_with(&spy).get_account("acme", "u1").unwrap();

        let requests = spy.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, HttpMethod::Get);
        assert_eq!(requests[0].path, format!("{ENDPOINT}/raas/v1/accounts/acme/u1"));
        assert!(requests[0].body.is_none());
    }

    #[test]
    fn get_rewards_returns_catalog() {
        let spy = SpyTransport::returning(json!({
            "success": true,
            "brands": [{
                "description": "Acme Gift Cards",
                "rewards": [{
                    "sku": "ACME-500", "description": "Acme $5",
                    "unit_price": 500, "currency_type": "USD", "available": true
                }]
            }]
        }));
        let brands = client_with(&spy).get_rewards().unwrap();
        assert_eq!(brands.len(), 1);
        assert_eq!(brands[0].rewards[0].sku, "ACME-500");
        assert_eq!(brands[0].rewards[0].unit_price, 500);
    }

    #[test]
    fn register_credit_card_nests_card_and_returns_token() {
        let spy = SpyTransport::returning(json!({"success": true, "cc_token": "cc-42"}));
        let registration = client_with(&spy)
            .register_credit_card("acme", "u1", "203.0.113.10", card())
            .unwrap();
        assert_eq!(registration.cc_token, "cc-42");

        let requests = spy.requests();
        let body = request_body(&requests[0]);
        assert_eq!(requests[0].path, format!("{ENDPOINT}/raas/v1/cc_register"));
        assert_eq!(body["account_identifier"], "u1");
        assert_eq!(
            body["credit_card"],
            json!({
                "number": "4111111111111111",
                "expiration": "01/2030",
                "security_code": "123"
            })
        );
    }

    #[test]
    fn fund_account_sends_client_ip_once_and_returns_receipt() {
        let spy = SpyTransport::returning(json!({
            "success": true, "fund_id": "fund-7", "amount": 2500
        }));
        let receipt = client_with(&spy)
            .fund_account("acme", "u1", 2500, "203.0.113.10", "123", "cc-42")
            .unwrap();
        assert_eq!(receipt.fund_id, "fund-7");
        assert_eq!(receipt.amount, 2500);

        let requests = spy.requests();
        let raw = requests[0].body.as_deref().unwrap();
        assert_eq!(raw.matches("client_ip").count(), 1);
        let body = request_body(&requests[0]);
        assert_eq!(body["cc_token"], "cc-42");
        assert_eq!(body["amount"], 2500);
    }

    #[test]
    fn place_order_nests_recipient_exactly() {
        let spy = SpyTransport::returning(json!({
            "success": true,
            "order": {
                "order_id": "order-1", "customer": "acme", "account_identifier": "u1",
                "recipient": {"name": "Ada", "email": "ada@example.com"},
                "sku": "ACME-500", "amount": 500
            }
        }));
        let order = client_with(&spy)
            .place_order(
                "acme", "u1", "Ada", "ada@example.com", "ACME-500", 500,
                "Thanks!", "A gift for you", "Acme Corp",
            )
            .unwrap();
        assert_eq!(order.order_id, "order-1");
        assert_eq!(order.recipient.name, "Ada");

        let body = request_body(&spy.requests()[0]);
        assert_eq!(
            body["recipient"],
            json!({"name": "Ada", "email": "ada@example.com"})
        );
        assert_eq!(body["reward_from"], "Acme Corp");
    }

    #[test]
    fn invalid_payload_is_rejected_before_any_request() {
        let spy = SpyTransport::returning(json!({"success": true}));
        let client = client_with(&spy);

        let err = client.create_account("", "u1", "a@b.com").unwrap_err();
        assert!(matches!(err, ApiError::Validation { .. }));

        let err = client.create_account("acme", "u1", "not-an-email").unwrap_err();
        assert!(matches!(err, ApiError::Validation { .. }));

        let bad_card = CreditCard {
            number: "not-a-pan".to_string(),
            expiration: "01/2030".to_string(),
            security_code: "123".to_string(),
        };
        let err = client
            .register_credit_card("acme", "u1", "203.0.113.10", bad_card)
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation { .. }));

        let err = client
            .fund_account("acme", "u1", 0, "203.0.113.10", "123", "cc-42")
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation { .. }));

        let err = client
            .place_order("acme", "u1", "Ada", "ada@example.com", "", 500, "", "", "")
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation { .. }));

        assert!(spy.requests().is_empty(), "no request may be issued");
    }

    #[test]
    fn validation_error_names_schema_and_violation() {
        let spy = SpyTransport::returning(json!({"success": true}));
        let err = client_with(&spy).create_account("acme", "u1", "").unwrap_err();
        let ApiError::Validation { schema, violations } = err else {
            panic!("expected validation error");
        };
        assert_eq!(schema, "account_create");
        assert!(violations.iter().any(|v| v.contains("email")));
    }

    #[test]
    fn remote_failure_raises_api_error_with_context() {
        let spy = SpyTransport::returning(json!({
            "success": false, "error_message": "account already exists"
        }));
        let err = client_with(&spy)
            .create_account("acme", "u1", "a@b.com")
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("/raas/v1/accounts"));
        assert!(msg.contains("account already exists"));
        assert!(matches!(err, ApiError::Api { payload: Some(_), .. }));
    }

    #[test]
    fn missing_success_field_is_api_error() {
        let spy = SpyTransport::returning(json!({"account": {}}));
        let err = client_with(&spy).get_account("acme", "u1").unwrap_err();
        assert!(matches!(err, ApiError::Api { payload: None, .. }));
        assert!(err.to_string().contains("/raas/v1/accounts/acme/u1"));
    }

    #[test]
    fn non_json_response_is_deserialization_error() {
        let spy = SpyTransport {
            calls: Arc::new(Mutex::new(Vec::new())),
            body: "<html>bad gateway</html>".to_string(),
        };
        let err = client_with(&spy).get_rewards().unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let spy = SpyTransport::returning(json!({"success": true, "brands": []}));
        let client = RaasClient::with_parts(
            "http://localhost:3000/",
            "u",
            "p",
            SchemaRegistry::bundled().unwrap(),
            Box::new(spy.clone()),
        );
        client.get_rewards().unwrap();
        assert_eq!(
            spy.requests()[0].path,
            "http://localhost:3000/raas/v1/rewards"
        );
    }
}
