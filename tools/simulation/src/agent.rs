//! Participant seam
//!
//! Anything that receives messages implements `Agent`. During delivery the
//! scheduler lends the participant a `SimulationContext` through which it
//! reads the clock and parameters, draws random numbers and dispatches new
//! messages.

use std::any::Any;

use rand_chacha::ChaCha8Rng;
use venue_types::errors::SimulationError;
use venue_types::ids::Timestamp;

use crate::message::{Message, MessagePayload, MessageType};
use crate::parameters::ParameterStorage;
use crate::queue::MessageQueue;

pub trait Agent {
    /// Unique name used for addressing
    fn name(&self) -> &str;

    fn receive_message(&mut self, ctx: &mut SimulationContext<'_>, msg: &Message) -> Result<(), SimulationError>;

    /// Downcasting hook for inspection after a run
    fn as_any(&self) -> &dyn Any;
}

/// View of the running simulation handed to a participant during delivery
pub struct SimulationContext<'a> {
    pub(crate) current: Timestamp,
    pub(crate) queue: &'a mut MessageQueue,
    pub(crate) rng: &'a mut ChaCha8Rng,
    pub(crate) parameters: &'a ParameterStorage,
}

impl<'a> SimulationContext<'a> {
    pub fn current_timestamp(&self) -> Timestamp {
        self.current
    }

    pub fn parameters(&self) -> &ParameterStorage {
        self.parameters
    }

    /// The run's seeded random stream
    pub fn rng(&mut self) -> &mut ChaCha8Rng {
        self.rng
    }

    /// Enqueue a message due at `occurrence + delay`; returns its sequence number
    pub fn dispatch_message(
        &mut self,
        occurrence: Timestamp,
        delay: Timestamp,
        source: &str,
        targets: &str,
        message_type: MessageType,
        payload: MessagePayload,
    ) -> u64 {
        self.queue
            .push(Message::new(occurrence, delay, source, targets, message_type, payload))
    }

    /// Reply to `msg` with `RESPONSE_<type>`
    ///
    /// The reply leaves `processing_delay` after the request arrived and
    /// travels for the request's own round-trip delay.
    pub fn respond_to_message(
        &mut self,
        msg: &Message,
        source: &str,
        payload: MessagePayload,
        processing_delay: Timestamp,
    ) -> u64 {
        self.dispatch_message(
            msg.arrival + processing_delay,
            msg.delay(),
            source,
            &msg.source,
            msg.message_type.response(),
            payload,
        )
    }

    /// Reply to `msg` with no transport delay
    pub fn fast_respond_to_message(
        &mut self,
        msg: &Message,
        source: &str,
        payload: MessagePayload,
        processing_delay: Timestamp,
    ) -> u64 {
        self.dispatch_message(
            msg.arrival + processing_delay,
            0,
            source,
            &msg.source,
            msg.message_type.response(),
            payload,
        )
    }
}
