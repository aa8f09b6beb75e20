//! GSTPro HTTP client
//!
//! Authenticated access to the GSTPro invoicing API with client-side
//! session-expiry gating. See [`client::InvoiceClient`].

pub mod client;

pub use client::error::ClientError;
pub use client::{InvoiceClient, InvoiceClientBuilder, Page};

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
