//! # Domain Layer
//!
//! Pure types and rules for PAN verification. No I/O lives here.

pub mod config;
pub mod entities;
pub mod errors;
pub mod masking;

pub use config::*;
pub use entities::*;
pub use errors::*;
pub use masking::*;
