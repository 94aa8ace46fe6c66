//! # API Shared
//!
//! Shared request/response types and services for the trial matcher APIs.
//!
//! Contains:
//! - Wire types with OpenAPI schemas (`wire` module)
//! - Shared services like `HealthService`
//!
//! Used by `api-rest`; clinical logic stays in `ctm-core`.

pub mod health;
pub mod wire;

pub use health::HealthService;
pub use wire::*;
