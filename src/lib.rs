pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;
pub use config::Settings;

#[cfg(feature = "nats")]
pub use adapters::broker::NatsPublisher;
pub use adapters::http::{router, AppState};
pub use adapters::memory::InMemoryPublisher;

pub use core::{DispatchContext, DispatchPipeline};
pub use utils::error::{AggregatorError, Result};
