//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, events, errors)
//! - `notification` - Notification aggregate, status lifecycle and events

pub mod foundation;
pub mod notification;
