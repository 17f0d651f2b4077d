//! Error types for the simulator
//!
//! Two tiers: `SimulationError` aborts a run, `ProtocolError` is rendered to
//! text and sent back to the requesting participant.

use crate::ids::OrderId;
use thiserror::Error;

/// Fatal configuration/runtime errors. Not recoverable within a run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    #[error("Unknown message target: {name}")]
    UnknownTarget { name: String },

    #[error("Unknown matching algorithm '{name}'")]
    UnknownAlgorithm { name: String },

    #[error("Agent name already registered: {name}")]
    DuplicateAgent { name: String },

    #[error("Unknown parameter '{name}'")]
    UnknownParameter { name: String },

    #[error("Unterminated parameter reference in '{input}'")]
    UnterminatedParameter { input: String },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

/// Request-level errors, reported back as an error-text payload
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    #[error("Unrecognized request type: {message_type}")]
    UnrecognizedRequest { message_type: String },

    #[error("Payload does not match request type: {message_type}")]
    PayloadMismatch { message_type: String },

    #[error("The agent is already subscribed to {topic} events: {agent}")]
    AlreadySubscribed { topic: String, agent: String },

    #[error("The agent is already subscribed to trade events for order {order_id}:{agent}")]
    AlreadySubscribedToOrder { order_id: OrderId, agent: String },
}

/// Malformed decimal string handed to `Money::from_str`
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Invalid money value: '{input}'")]
pub struct MoneyParseError {
    pub input: String,
}
