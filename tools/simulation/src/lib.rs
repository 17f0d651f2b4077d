//! Discrete-Event Trading Venue Simulation
//!
//! Logical-time scheduler delivering typed messages between named
//! participants, and the exchange participant that runs an order book behind
//! that protocol.
//!
//! # Modules
//! - `message`: Message types, payloads and addressing
//! - `queue`: Time-ordered message queue
//! - `agent`: Participant trait and the delivery context
//! - `scheduler`: The simulation lifecycle and message bus
//! - `exchange`: Exchange agent wrapping one order book
//! - `parameters`: Run parameters with `${name}` substitution
//! - `config`: JSON run configuration
//! - `journal`: Delivery journal and replay digest
//! - `runner`: Parallel batch runs

pub mod agent;
pub mod config;
pub mod exchange;
pub mod journal;
pub mod message;
pub mod parameters;
pub mod queue;
pub mod runner;
pub mod scheduler;

pub use agent::{Agent, SimulationContext};
pub use config::{ExchangeConfig, SimulationConfig};
pub use exchange::ExchangeAgent;
pub use message::{Message, MessagePayload, MessageType};
pub use parameters::ParameterStorage;
pub use scheduler::{Simulation, SimulationState};

/// Crate version constant
pub const VERSION: &str = "1.0.0";
