//! Domain models for the marketing service.

pub mod ad;
pub mod health;

pub use ad::{fallback_ad, AdCoercionError, AdMessage};
pub use health::HealthStatus;
