//! HTTP handlers.

pub mod analysis;
pub mod health;

pub use health::{health, ready};
