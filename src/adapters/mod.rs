// Adapters layer: concrete implementations for external systems (broker, http).

#[cfg(feature = "nats")]
pub mod broker;
pub mod http;
pub mod memory;
