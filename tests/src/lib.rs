//! # KYC Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fake_provider.rs  # In-process provider speaking the envelope protocol
//! └── integration/      # End-to-end verification flows
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p kyc-tests
//!
//! # Benchmarks
//! cargo bench -p kyc-tests
//! ```

pub mod fake_provider;
pub mod integration;
