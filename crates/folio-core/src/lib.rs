//! Domain layer for the Folio conversational session core.
//!
//! This crate owns the session/message data model, the in-memory session
//! store, and the derived typing-state indicator. It knows nothing about
//! transports or rendering; the answering-service boundary lives in
//! `folio-interaction` and the exchange protocol in `folio-application`.

pub mod section;
pub mod session;

// Re-export the section enumeration; nearly every consumer needs it.
pub use section::PortfolioSection;
