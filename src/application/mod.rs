//! Application layer: ports and services.
//!
//! Services import only from `crate::domain` and `ports`; infrastructure
//! and presentation are injected by the command handlers.

pub mod ports;
pub mod services;
