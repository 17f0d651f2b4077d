//! Discrete-event scheduler and message bus
//!
//! Owns the participants, the message queue, the run's parameters and its
//! random stream. Time only moves when messages are delivered or a step
//! completes; nothing here looks at the wall clock.
//!
//! **Key Invariants:**
//! - Messages are delivered in non-decreasing arrival order, FIFO on ties
//! - A step's cutoff is exclusive
//! - Participants are kept sorted by name; names are unique

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace};
use venue_types::errors::SimulationError;
use venue_types::ids::Timestamp;

use crate::agent::{Agent, SimulationContext};
use crate::journal::Journal;
use crate::message::{Message, MessagePayload, MessageType, SIMULATION_NAME};
use crate::parameters::ParameterStorage;
use crate::queue::MessageQueue;

const BROADCAST: &str = "*";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationState {
    Inactive,
    Started,
    Stopped,
}

pub struct Simulation {
    start: Timestamp,
    duration: Timestamp,
    current: Timestamp,
    state: SimulationState,
    seed: u64,
    agents: Vec<Box<dyn Agent>>,
    queue: MessageQueue,
    rng: ChaCha8Rng,
    parameters: ParameterStorage,
    journal: Journal,
    delivered: u64,
}

impl Simulation {
    pub fn new(start: Timestamp, duration: Timestamp) -> Self {
        Self::with_parameters(start, duration, 0, ParameterStorage::new())
    }

    pub fn with_parameters(start: Timestamp, duration: Timestamp, seed: u64, parameters: ParameterStorage) -> Self {
        Self {
            start,
            duration,
            current: start,
            state: SimulationState::Inactive,
            seed,
            agents: Vec::new(),
            queue: MessageQueue::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            parameters,
            journal: Journal::new(),
            delivered: 0,
        }
    }

    /// Replace the journal, e.g. with `Journal::digest_only()` for long runs
    pub fn set_journal(&mut self, journal: Journal) {
        self.journal = journal;
    }

    /// Register a participant, keeping the list sorted by name
    pub fn add_agent(&mut self, agent: Box<dyn Agent>) -> Result<(), SimulationError> {
        match self.agents.binary_search_by(|a| a.name().cmp(agent.name())) {
            Ok(_) => Err(SimulationError::DuplicateAgent {
                name: agent.name().to_string(),
            }),
            Err(index) => {
                self.agents.insert(index, agent);
                Ok(())
            }
        }
    }

    pub fn agent(&self, name: &str) -> Option<&dyn Agent> {
        self.agents
            .binary_search_by(|a| a.name().cmp(name))
            .ok()
            .map(|index| self.agents[index].as_ref())
    }

    /// Look a participant up by name and downcast it
    pub fn agent_as<T: 'static>(&self, name: &str) -> Option<&T> {
        self.agent(name).and_then(|agent| agent.as_any().downcast_ref::<T>())
    }

    pub fn agents(&self) -> impl Iterator<Item = &dyn Agent> {
        self.agents.iter().map(|agent| agent.as_ref())
    }

    /// Enqueue a message due at `occurrence + delay`
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

    /// Broadcast the lifecycle markers and move to `Started`
    pub fn start(&mut self) {
        if self.state != SimulationState::Inactive {
            return;
        }
        self.dispatch_message(
            self.start,
            0,
            SIMULATION_NAME,
            BROADCAST,
            MessageType::EventSimulationStart,
            MessagePayload::Empty,
        );
        self.dispatch_message(
            self.start,
            self.duration - 1,
            SIMULATION_NAME,
            BROADCAST,
            MessageType::EventSimulationStop,
            MessagePayload::Empty,
        );
        self.state = SimulationState::Started;
        info!(
            start = self.start,
            duration = self.duration,
            agents = self.agents.len(),
            seed = self.seed,
            "simulation started"
        );
    }

    /// Deliver every message arriving before `current + step`
    ///
    /// Starts an inactive simulation first; a stopped one is left alone.
    /// Afterwards the clock stands at the cutoff. Returns the number of
    /// messages delivered.
    pub fn step(&mut self, step: Timestamp) -> Result<usize, SimulationError> {
        match self.state {
            SimulationState::Stopped => return Ok(0),
            SimulationState::Inactive => self.start(),
            SimulationState::Started => {}
        }

        let cutoff = self.current + step;
        let mut delivered = 0;
        while let Some(arrival) = self.queue.peek_arrival() {
            if arrival >= cutoff {
                break;
            }
            let Some(message) = self.queue.pop() else {
                break;
            };
            self.current = self.current.max(arrival);
            self.deliver_message(&message)?;
            delivered += 1;
        }
        self.current = self.current.max(cutoff);

        debug!(
            cutoff,
            delivered,
            pending = self.queue.len(),
            "step finished"
        );
        Ok(delivered)
    }

    /// Run to the configured end and stop
    pub fn simulate(&mut self) -> Result<usize, SimulationError> {
        let remaining = self.end() - self.current;
        self.simulate_for(remaining)
    }

    /// Advance by at most `how_much`; stops once the end is reached
    pub fn simulate_for(&mut self, how_much: Timestamp) -> Result<usize, SimulationError> {
        if self.state == SimulationState::Stopped {
            return Ok(0);
        }
        self.start();

        let to_simulate = (self.end() - self.current).min(how_much);
        let delivered = if to_simulate > 0 { self.step(to_simulate)? } else { 0 };

        if self.current >= self.end() {
            self.stop();
        }
        Ok(delivered)
    }

    pub fn stop(&mut self) {
        if self.state == SimulationState::Stopped {
            return;
        }
        self.state = SimulationState::Stopped;
        info!(
            current = self.current,
            delivered = self.delivered,
            pending = self.queue.len(),
            "simulation stopped"
        );
    }

    fn deliver_message(&mut self, message: &Message) -> Result<(), SimulationError> {
        trace!(
            arrival = message.arrival,
            sequence = message.sequence,
            source = %message.source,
            message_type = %message.message_type,
            "delivering"
        );
        self.journal.record(message);
        self.delivered += 1;

        for target in &message.targets {
            if target == BROADCAST {
                self.receive_message(message);
                for index in 0..self.agents.len() {
                    self.deliver_to(index, message)?;
                }
            } else if target == SIMULATION_NAME {
                self.receive_message(message);
            } else if let Some(prefix) = target.strip_suffix('*') {
                let range = self.prefix_range(prefix);
                for index in range {
                    self.deliver_to(index, message)?;
                }
            } else {
                let index = self
                    .agents
                    .binary_search_by(|agent| agent.name().cmp(target.as_str()))
                    .map_err(|_| SimulationError::UnknownTarget { name: target.clone() })?;
                self.deliver_to(index, message)?;
            }
        }
        Ok(())
    }

    /// Indices of participants whose name starts with `prefix`
    fn prefix_range(&self, prefix: &str) -> std::ops::Range<usize> {
        let lower = self.agents.partition_point(|agent| agent.name() < prefix);
        let upper = lower + self.agents[lower..].partition_point(|agent| agent.name().starts_with(prefix));
        lower..upper
    }

    fn deliver_to(&mut self, index: usize, message: &Message) -> Result<(), SimulationError> {
        let mut ctx = SimulationContext {
            current: self.current,
            queue: &mut self.queue,
            rng: &mut self.rng,
            parameters: &self.parameters,
        };
        self.agents[index].receive_message(&mut ctx, message)
    }

    fn receive_message(&self, message: &Message) {
        trace!(message_type = %message.message_type, "scheduler received broadcast");
    }

    pub fn current_timestamp(&self) -> Timestamp {
        self.current
    }

    pub fn start_timestamp(&self) -> Timestamp {
        self.start
    }

    pub fn duration(&self) -> Timestamp {
        self.duration
    }

    pub fn end(&self) -> Timestamp {
        self.start + self.duration
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn parameters(&self) -> &ParameterStorage {
        &self.parameters
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn delivered_count(&self) -> u64 {
        self.delivered
    }

    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }
}
