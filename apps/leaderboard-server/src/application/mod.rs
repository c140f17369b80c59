//! Application Layer
//!
//! Orchestrates the competition domain. It defines:
//!
//! - **Ports**: the durable store the application writes through
//! - **Services**: the competition store and the score mutator

pub mod ports;
pub mod services;

pub use ports::*;
pub use services::*;
