//! API route definitions.
//!
//! The service shell only exposes a health check; business routes are
//! mounted by the embedding service.

mod health;

pub use health::health_routes;
