//! API endpoint handlers.

pub mod events;
pub mod health;
pub mod intake;
