//! Participants shared by the integration tests

#![allow(dead_code)]

use std::any::Any;

use rand::Rng;
use simulation::message::{PlaceOrderLimitPayload, PlaceOrderMarketPayload};
use simulation::{Agent, Message, MessagePayload, MessageType, SimulationContext};
use venue_types::errors::SimulationError;
use venue_types::ids::Timestamp;
use venue_types::numeric::Money;
use venue_types::order::Direction;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// One message a `ScriptedAgent` sends when the simulation starts
#[derive(Debug, Clone)]
pub struct Scripted {
    pub delay: Timestamp,
    pub targets: String,
    pub message_type: MessageType,
    pub payload: MessagePayload,
}

impl Scripted {
    pub fn new(delay: Timestamp, targets: &str, message_type: MessageType, payload: MessagePayload) -> Self {
        Self {
            delay,
            targets: targets.to_string(),
            message_type,
            payload,
        }
    }
}

/// Sends its script on `EVENT_SIMULATION_START` and records everything it receives
pub struct ScriptedAgent {
    name: String,
    script: Vec<Scripted>,
    pub received: Vec<Message>,
}

impl ScriptedAgent {
    pub fn new(name: &str, script: Vec<Scripted>) -> Self {
        Self {
            name: name.to_string(),
            script,
            received: Vec::new(),
        }
    }

    pub fn boxed(name: &str, script: Vec<Scripted>) -> Box<dyn Agent> {
        Box::new(Self::new(name, script))
    }

    pub fn received_of(&self, message_type: &MessageType) -> Vec<&Message> {
        self.received.iter().filter(|m| m.message_type == *message_type).collect()
    }
}

impl Agent for ScriptedAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn receive_message(&mut self, ctx: &mut SimulationContext<'_>, msg: &Message) -> Result<(), SimulationError> {
        if msg.message_type == MessageType::EventSimulationStart {
            let now = ctx.current_timestamp();
            for step in &self.script {
                ctx.dispatch_message(
                    now,
                    step.delay,
                    &self.name,
                    &step.targets,
                    step.message_type.clone(),
                    step.payload.clone(),
                );
            }
        }
        self.received.push(msg.clone());
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub fn limit(direction: Direction, volume: u64, price: i64) -> MessagePayload {
    MessagePayload::PlaceOrderLimit(PlaceOrderLimitPayload {
        direction,
        volume,
        price: Money::from_whole(price),
    })
}

pub fn market(direction: Direction, volume: u64) -> MessagePayload {
    MessagePayload::PlaceOrderMarket(PlaceOrderMarketPayload { direction, volume })
}

/// Places random orders around a fixed mid, drawing from the run's RNG
pub struct RandomTrader {
    name: String,
    exchange: String,
    pub orders_sent: usize,
    pub responses: usize,
    pub trade_events: usize,
}

impl RandomTrader {
    const WAKEUP: &'static str = "WAKEUP";

    pub fn boxed(name: &str, exchange: &str) -> Box<dyn Agent> {
        Box::new(Self {
            name: name.to_string(),
            exchange: exchange.to_string(),
            orders_sent: 0,
            responses: 0,
            trade_events: 0,
        })
    }

    fn schedule_wakeup(&self, ctx: &mut SimulationContext<'_>) {
        let delay = ctx.rng().gen_range(1..10);
        let now = ctx.current_timestamp();
        ctx.dispatch_message(
            now,
            delay,
            &self.name,
            &self.name,
            MessageType::Custom(Self::WAKEUP.to_string()),
            MessagePayload::Empty,
        );
    }

    fn place_random_order(&mut self, ctx: &mut SimulationContext<'_>) {
        let rng = ctx.rng();
        let direction = if rng.gen_bool(0.5) { Direction::Buy } else { Direction::Sell };
        let volume = rng.gen_range(1..20u64);
        let latency = rng.gen_range(0..3);
        let (message_type, payload) = if rng.gen_bool(0.3) {
            (MessageType::PlaceOrderMarket, market(direction, volume))
        } else {
            let offset = rng.gen_range(0..5i64);
            let price = match direction {
                Direction::Buy => 100 - offset,
                Direction::Sell => 98 + offset,
            };
            (MessageType::PlaceOrderLimit, limit(direction, volume, price))
        };

        let now = ctx.current_timestamp();
        ctx.dispatch_message(now, latency, &self.name, &self.exchange, message_type, payload);
        self.orders_sent += 1;
    }
}

impl Agent for RandomTrader {
    fn name(&self) -> &str {
        &self.name
    }

    fn receive_message(&mut self, ctx: &mut SimulationContext<'_>, msg: &Message) -> Result<(), SimulationError> {
        match &msg.message_type {
            MessageType::EventSimulationStart => {
                let now = ctx.current_timestamp();
                ctx.dispatch_message(
                    now,
                    1,
                    &self.name,
                    &self.exchange,
                    MessageType::SubscribeEventTrade,
                    MessagePayload::Empty,
                );
                self.schedule_wakeup(ctx);
            }
            MessageType::Custom(tag) if tag == Self::WAKEUP => {
                self.place_random_order(ctx);
                self.schedule_wakeup(ctx);
            }
            MessageType::EventTrade => self.trade_events += 1,
            ty if ty.is_response() => self.responses += 1,
            _ => {}
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
