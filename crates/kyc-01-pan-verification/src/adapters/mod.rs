//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements outbound port traits (encrypted provider client, in-memory
//! store) and the inbound HTTP surface.

pub mod http;
mod memory_store;
mod provider_client;

pub use http::{router, user_from_header, AuthenticatedUser, AUTHENTICATED_USER_HEADER, PAN_ROUTE};
pub use memory_store::InMemoryKycStore;
pub use provider_client::{EncryptedProviderClient, CLIENT_ID_HEADER};
