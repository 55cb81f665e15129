//! Notification adapters.
//!
//! Implements the `port::Notifier` trait for delivery backends. The log,
//! null, and composite notifiers live next to the trait in the port.

#[cfg(feature = "telegram")]
pub mod telegram;
