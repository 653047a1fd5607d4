//! Synchronous client for a gift-card / rewards issuance REST API.
//!
//! # Overview
//! Translates typed method calls into schema-validated JSON requests against
//! the provider's sandbox, signed with HTTP basic authentication, and
//! normalizes the provider's `success` envelope into returned values or
//! `ApiError`s.
//!
//! # Design
//! - `RaasClient` is immutable after construction — endpoint, credentials,
//!   schema registry, and transport are fixed for its lifetime.
//! - Every POST payload is a typed record (`types`) validated against its
//!   bundled JSON Schema (`schema`) before transmission; a rejected payload
//!   never reaches the network.
//! - I/O happens behind the `HttpTransport` trait (`http`), one blocking
//!   round trip per operation. The production transport is `ureq`; tests
//!   substitute a spy.
//! - Errors carry enough context to diagnose a failed call on their own
//!   (`error`): remote failures keep the request path, outbound payload,
//!   and raw response.

pub mod client;
pub mod error;
pub mod http;
pub mod schema;
pub mod types;

pub use client::{RaasClient, SANDBOX_ENDPOINT};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, UreqTransport};
pub use schema::SchemaRegistry;
pub use types::{
    Account, Brand, CardRegistration, CreateAccount, CreateOrder, CreditCard, FundAccount,
    FundingReceipt, Order, Recipient, Reward, RegisterCreditCard,
};
