//! Exchange agent
//!
//! The venue participant: wraps one `OrderBook`, answers the request side of
//! the protocol and pushes order and trade events to subscribers.
//!
//! Trades are pushed while the aggressing order is being matched, so trade
//! events are enqueued before the placement response and the order event.

use std::any::Any;
use std::collections::{BTreeSet, HashMap};

use matching_engine::{MatchingPolicy, OrderBook};
use tracing::{debug, warn};
use venue_types::errors::{ProtocolError, SimulationError};
use venue_types::ids::{OrderId, Timestamp};
use venue_types::order::Order;
use venue_types::trade::Trade;

use crate::agent::{Agent, SimulationContext};
use crate::message::{
    CancelOrdersPayload, CancelOrdersResponsePayload, CancellationResult, Message, MessagePayload, MessageType,
    PlaceOrderLimitPayload, PlaceOrderLimitResponsePayload, PlaceOrderMarketPayload,
    PlaceOrderMarketResponsePayload, RetrieveBookPayload, RetrieveBookResponsePayload, RetrieveL1ResponsePayload,
    RetrieveOrdersPayload, RetrieveOrdersResponsePayload, SubscribeEventTradeByOrderPayload,
};

/// Subscriber sets, each kept sorted and free of duplicates
#[derive(Debug, Default)]
struct Subscribers {
    market_orders: BTreeSet<String>,
    limit_orders: BTreeSet<String>,
    trades: BTreeSet<String>,
    trades_by_order: HashMap<OrderId, BTreeSet<String>>,
}

impl Subscribers {
    /// Generic trade subscribers first, then those of the aggressing order,
    /// then those of the resting order
    fn notify_trade(&self, ctx: &mut SimulationContext<'_>, source: &str, delay: Timestamp, trade: &Trade) {
        let current = ctx.current_timestamp();
        let by_order = |id: OrderId| self.trades_by_order.get(&id).into_iter().flatten();
        let recipients = self
            .trades
            .iter()
            .chain(by_order(trade.aggressing_order_id))
            .chain(by_order(trade.resting_order_id));

        for subscriber in recipients {
            ctx.dispatch_message(
                current,
                delay,
                source,
                subscriber,
                MessageType::EventTrade,
                MessagePayload::EventTrade(trade.clone()),
            );
        }
    }

    fn notify_order(
        subscribers: &BTreeSet<String>,
        ctx: &mut SimulationContext<'_>,
        source: &str,
        delay: Timestamp,
        message_type: MessageType,
        order: &Order,
    ) {
        let current = ctx.current_timestamp();
        for subscriber in subscribers {
            ctx.dispatch_message(
                current,
                delay,
                source,
                subscriber,
                message_type.clone(),
                MessagePayload::EventOrder(order.clone()),
            );
        }
    }
}

#[derive(Debug)]
pub struct ExchangeAgent {
    name: String,
    book: OrderBook,
    processing_delay: Timestamp,
    subscribers: Subscribers,
}

impl ExchangeAgent {
    pub fn new(name: impl Into<String>, policy: MatchingPolicy, processing_delay: Timestamp) -> Self {
        Self {
            name: name.into(),
            book: OrderBook::new(policy),
            processing_delay,
            subscribers: Subscribers::default(),
        }
    }

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    pub fn processing_delay(&self) -> Timestamp {
        self.processing_delay
    }

    pub fn is_subscribed_to_trades(&self, agent: &str) -> bool {
        self.subscribers.trades.contains(agent)
    }

    pub fn is_subscribed_to_order_trades(&self, order_id: OrderId, agent: &str) -> bool {
        self.subscribers
            .trades_by_order
            .get(&order_id)
            .is_some_and(|set| set.contains(agent))
    }

    fn place_limit_order(&mut self, ctx: &mut SimulationContext<'_>, msg: &Message, request: &PlaceOrderLimitPayload) {
        let Self {
            name,
            book,
            processing_delay,
            subscribers,
        } = self;
        let name = name.as_str();
        let subscribers = &*subscribers;
        let delay = *processing_delay;

        let mut fills = 0usize;
        let order = book.place_limit_order_with(
            request.direction,
            msg.arrival,
            request.volume,
            request.price,
            &mut |trade: &Trade| {
                fills += 1;
                subscribers.notify_trade(ctx, name, delay, trade);
            },
        );
        debug!(
            exchange = %name,
            order_id = %order.id,
            direction = %request.direction,
            price = %request.price,
            volume = request.volume,
            fills,
            "limit order placed"
        );

        let response = MessagePayload::PlaceOrderLimitResponse(PlaceOrderLimitResponsePayload {
            id: order.id,
            request: request.clone(),
        });
        ctx.respond_to_message(msg, name, response, delay);
        Subscribers::notify_order(&subscribers.limit_orders, ctx, name, delay, MessageType::EventOrderLimit, &order);
    }

    fn place_market_order(&mut self, ctx: &mut SimulationContext<'_>, msg: &Message, request: &PlaceOrderMarketPayload) {
        let Self {
            name,
            book,
            processing_delay,
            subscribers,
        } = self;
        let name = name.as_str();
        let subscribers = &*subscribers;
        let delay = *processing_delay;

        let mut fills = 0usize;
        let order = book.place_market_order_with(request.direction, msg.arrival, request.volume, &mut |trade: &Trade| {
            fills += 1;
            subscribers.notify_trade(ctx, name, delay, trade);
        });
        debug!(
            exchange = %name,
            order_id = %order.id,
            direction = %request.direction,
            volume = request.volume,
            unfilled = order.volume,
            fills,
            "market order placed"
        );

        let response = MessagePayload::PlaceOrderMarketResponse(PlaceOrderMarketResponsePayload {
            id: order.id,
            request: request.clone(),
        });
        ctx.respond_to_message(msg, name, response, delay);
        Subscribers::notify_order(&subscribers.market_orders, ctx, name, delay, MessageType::EventOrderMarket, &order);
    }

    fn cancel_orders(&mut self, ctx: &mut SimulationContext<'_>, msg: &Message, request: &CancelOrdersPayload) {
        let cancellations: Vec<_> = request
            .cancellations
            .iter()
            .map(|cancellation| CancellationResult {
                id: cancellation.id,
                remaining_volume: self.book.cancel_order_volume(cancellation.id, cancellation.volume),
            })
            .collect();
        debug!(exchange = %self.name, count = cancellations.len(), "orders cancelled");

        let response = MessagePayload::CancelOrdersResponse(CancelOrdersResponsePayload { cancellations });
        ctx.respond_to_message(msg, &self.name, response, self.processing_delay);
    }

    fn retrieve_orders(&self, ctx: &mut SimulationContext<'_>, msg: &Message, request: &RetrieveOrdersPayload) {
        let orders = request
            .ids
            .iter()
            .filter_map(|id| self.book.try_get_order(*id))
            .cloned()
            .collect();
        let response = MessagePayload::RetrieveOrdersResponse(RetrieveOrdersResponsePayload { orders });
        ctx.respond_to_message(msg, &self.name, response, self.processing_delay);
    }

    fn retrieve_l1(&self, ctx: &mut SimulationContext<'_>, msg: &Message) {
        let response = MessagePayload::RetrieveL1Response(RetrieveL1ResponsePayload {
            time: ctx.current_timestamp(),
            top: self.book.top_of_book(),
        });
        ctx.respond_to_message(msg, &self.name, response, self.processing_delay);
    }

    fn retrieve_book(&self, ctx: &mut SimulationContext<'_>, msg: &Message, request: &RetrieveBookPayload) {
        let levels = match msg.message_type {
            MessageType::RetrieveBookAsk => self.book.ask_depth(request.depth),
            _ => self.book.bid_depth(request.depth),
        };
        let response = MessagePayload::RetrieveBookResponse(RetrieveBookResponsePayload {
            time: ctx.current_timestamp(),
            levels,
        });
        ctx.respond_to_message(msg, &self.name, response, self.processing_delay);
    }

    fn subscribe(&mut self, ctx: &mut SimulationContext<'_>, msg: &Message) {
        let (set, topic) = match msg.message_type {
            MessageType::SubscribeEventOrderMarket => (&mut self.subscribers.market_orders, "order"),
            MessageType::SubscribeEventOrderLimit => (&mut self.subscribers.limit_orders, "order"),
            _ => (&mut self.subscribers.trades, "trade"),
        };

        if set.insert(msg.source.clone()) {
            let text = format!("Agent subscribed successfully to {} events: {}", topic, msg.source);
            ctx.fast_respond_to_message(msg, &self.name, MessagePayload::success(text), 0);
        } else {
            let err = ProtocolError::AlreadySubscribed {
                topic: topic.to_string(),
                agent: msg.source.clone(),
            };
            self.reject(ctx, msg, err);
        }
    }

    fn subscribe_order_trades(
        &mut self,
        ctx: &mut SimulationContext<'_>,
        msg: &Message,
        request: &SubscribeEventTradeByOrderPayload,
    ) {
        let set = self.subscribers.trades_by_order.entry(request.id).or_default();

        if set.insert(msg.source.clone()) {
            let text = format!("Agent subscribed to trade events for order {}:{}", request.id, msg.source);
            ctx.fast_respond_to_message(msg, &self.name, MessagePayload::success(text), 0);
        } else {
            let err = ProtocolError::AlreadySubscribedToOrder {
                order_id: request.id,
                agent: msg.source.clone(),
            };
            self.reject(ctx, msg, err);
        }
    }

    fn reject(&self, ctx: &mut SimulationContext<'_>, msg: &Message, err: ProtocolError) {
        warn!(exchange = %self.name, source = %msg.source, error = %err, "request rejected");
        ctx.fast_respond_to_message(msg, &self.name, MessagePayload::error(err.to_string()), 0);
    }
}

impl Agent for ExchangeAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn receive_message(&mut self, ctx: &mut SimulationContext<'_>, msg: &Message) -> Result<(), SimulationError> {
        match (&msg.message_type, &msg.payload) {
            (MessageType::PlaceOrderLimit, MessagePayload::PlaceOrderLimit(request)) => {
                self.place_limit_order(ctx, msg, request)
            }
            (MessageType::PlaceOrderMarket, MessagePayload::PlaceOrderMarket(request)) => {
                self.place_market_order(ctx, msg, request)
            }
            (MessageType::CancelOrders, MessagePayload::CancelOrders(request)) => self.cancel_orders(ctx, msg, request),
            (MessageType::RetrieveOrders, MessagePayload::RetrieveOrders(request)) => {
                self.retrieve_orders(ctx, msg, request)
            }
            (MessageType::RetrieveL1, _) => self.retrieve_l1(ctx, msg),
            (MessageType::RetrieveBookAsk | MessageType::RetrieveBookBid, MessagePayload::RetrieveBook(request)) => {
                self.retrieve_book(ctx, msg, request)
            }
            (
                MessageType::SubscribeEventOrderMarket
                | MessageType::SubscribeEventOrderLimit
                | MessageType::SubscribeEventTrade,
                _,
            ) => self.subscribe(ctx, msg),
            (MessageType::SubscribeEventOrderTrade, MessagePayload::SubscribeEventTradeByOrder(request)) => {
                self.subscribe_order_trades(ctx, msg, request)
            }
            (MessageType::EventSimulationStart | MessageType::EventSimulationStop, _) => {}
            (
                MessageType::PlaceOrderLimit
                | MessageType::PlaceOrderMarket
                | MessageType::CancelOrders
                | MessageType::RetrieveOrders
                | MessageType::RetrieveBookAsk
                | MessageType::RetrieveBookBid
                | MessageType::SubscribeEventOrderTrade,
                _,
            ) => {
                let err = ProtocolError::PayloadMismatch {
                    message_type: msg.message_type.to_string(),
                };
                self.reject(ctx, msg, err);
            }
            (other, _) => {
                let err = ProtocolError::UnrecognizedRequest {
                    message_type: other.to_string(),
                };
                self.reject(ctx, msg, err);
            }
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
