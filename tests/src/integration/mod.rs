//! # Integration Flows
//!
//! The real `EncryptedProviderClient` against `fake_provider` over loopback
//! HTTP, driven through the service and the HTTP routes.

mod pan_flows;
