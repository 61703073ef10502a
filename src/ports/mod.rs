//! Ports (trait boundaries) for external dependencies.
//!
//! These traits are owned by the domain and implemented by adapters: training
//! observers (progress, metrics, logs, host callbacks) and agent storage.

pub mod observer;
pub mod repository;

pub use observer::{Observer, Signal};
pub use repository::AgentRepository;
